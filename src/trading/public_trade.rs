//! A trade that happened on the exchange, fed into the engine alongside
//! order books.

use chrono::{DateTime, Utc};

use crate::money::MonetaryAmount;
use crate::trade_side::TradeSide;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PublicTrade {
    side: TradeSide,
    amount: MonetaryAmount,
    price: MonetaryAmount,
    time: DateTime<Utc>,
}

impl PublicTrade {
    pub fn new(side: TradeSide, amount: MonetaryAmount, price: MonetaryAmount, time: DateTime<Utc>) -> Self {
        PublicTrade { side, amount, price, time }
    }

    pub fn side(&self) -> TradeSide {
        self.side
    }

    pub fn amount(&self) -> MonetaryAmount {
        self.amount
    }

    pub fn price(&self) -> MonetaryAmount {
        self.price
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn is_valid(&self) -> bool {
        !self.amount.is_zero() && self.amount.amount() > 0 && self.price.amount() > 0
    }
}
