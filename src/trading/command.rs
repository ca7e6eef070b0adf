//! The decision returned by a user algorithm on every replay tick.

use crate::trade_side::TradeSide;

/// How a placed order is priced against the book.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PriceStrategy {
    /// Rest at the same-side best price (highest bid to buy, lowest ask to sell).
    Maker,
    /// Cross to the opposite-side best price, matching what is available there.
    Nibble,
    /// Walk the book for a full market-price fill.
    Taker,
}

/// `order_id == None` in [`TraderCommand::Cancel`] means "cancel every open order".
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraderCommand {
    Wait,
    Buy { intensity_percentage: i8, strategy: PriceStrategy },
    Sell { intensity_percentage: i8, strategy: PriceStrategy },
    UpdatePrice { order_id: i64, strategy: PriceStrategy },
    Cancel { order_id: Option<i64> },
}

impl TraderCommand {
    pub fn buy(intensity_percentage: i8, strategy: PriceStrategy) -> Self {
        assert!((1..=100).contains(&intensity_percentage));
        TraderCommand::Buy { intensity_percentage, strategy }
    }

    pub fn sell(intensity_percentage: i8, strategy: PriceStrategy) -> Self {
        assert!((1..=100).contains(&intensity_percentage));
        TraderCommand::Sell { intensity_percentage, strategy }
    }

    pub fn place(side: TradeSide, intensity_percentage: i8, strategy: PriceStrategy) -> Self {
        match side {
            TradeSide::Buy => TraderCommand::buy(intensity_percentage, strategy),
            TradeSide::Sell => TraderCommand::sell(intensity_percentage, strategy),
        }
    }

    pub fn cancel_all() -> Self {
        TraderCommand::Cancel { order_id: None }
    }

    pub fn cancel(order_id: i64) -> Self {
        TraderCommand::Cancel { order_id: Some(order_id) }
    }
}
