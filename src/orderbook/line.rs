//! A single entry in an order book: an amount at a price, tagged bid or ask.

use crate::money::MonetaryAmount;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BookSide {
    Bid,
    Ask,
}

/// A caller-supplied line before it is packed into tick-scaled storage.
#[derive(Clone, Copy, Debug)]
pub struct OrderBookLineInput {
    pub amount: MonetaryAmount,
    pub price: MonetaryAmount,
    pub side: BookSide,
}

impl OrderBookLineInput {
    pub fn new(amount: MonetaryAmount, price: MonetaryAmount, side: BookSide) -> Self {
        OrderBookLineInput { amount, price, side }
    }

    pub fn bid(amount: MonetaryAmount, price: MonetaryAmount) -> Self {
        Self::new(amount, price, BookSide::Bid)
    }

    pub fn ask(amount: MonetaryAmount, price: MonetaryAmount) -> Self {
        Self::new(amount, price, BookSide::Ask)
    }
}

/// Tick-scaled storage: amount and price as int64 multiples of the book's
/// stored decimal counts. Negative amount marks an ask, positive a bid, zero
/// is reserved for the synthetic limit-price placeholder of ticker-expanded
/// books.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PackedLine {
    pub amount_ticks: i64,
    pub price_ticks: i64,
}
