//! Open and closed orders, sharing the fields common to both.

use chrono::{DateTime, Utc};

use crate::error::{MoneyError, TradingResult};
use crate::money::MonetaryAmount;
use crate::trade_side::TradeSide;

/// Fields shared by [`OpenedOrder`] and [`ClosedOrder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderCommon {
    pub id: i64,
    pub matched_volume: MonetaryAmount,
    pub price: MonetaryAmount,
    pub placed_time: DateTime<Utc>,
    pub side: TradeSide,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OpenedOrder {
    pub common: OrderCommon,
    pub remaining_volume: MonetaryAmount,
}

impl OpenedOrder {
    pub fn new(
        id: i64,
        matched_volume: MonetaryAmount,
        remaining_volume: MonetaryAmount,
        price: MonetaryAmount,
        placed_time: DateTime<Utc>,
        side: TradeSide,
    ) -> Self {
        OpenedOrder {
            common: OrderCommon { id, matched_volume, price, placed_time, side },
            remaining_volume,
        }
    }

    pub fn id(&self) -> i64 {
        self.common.id
    }

    pub fn side(&self) -> TradeSide {
        self.common.side
    }

    pub fn price(&self) -> MonetaryAmount {
        self.common.price
    }

    pub fn placed_time(&self) -> DateTime<Utc> {
        self.common.placed_time
    }

    pub fn matched_volume(&self) -> MonetaryAmount {
        self.common.matched_volume
    }

    pub fn remaining_volume(&self) -> MonetaryAmount {
        self.remaining_volume
    }

    pub fn original_volume(&self) -> MonetaryAmount {
        self.matched_volume() + self.remaining_volume
    }

    #[must_use]
    pub fn with_additional_match(&self, newly_matched: MonetaryAmount) -> OpenedOrder {
        OpenedOrder {
            common: OrderCommon {
                matched_volume: self.common.matched_volume + newly_matched,
                ..self.common
            },
            remaining_volume: self.remaining_volume - newly_matched,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClosedOrder {
    pub common: OrderCommon,
    pub matched_time: DateTime<Utc>,
}

impl ClosedOrder {
    pub fn new(
        id: i64,
        matched_volume: MonetaryAmount,
        price: MonetaryAmount,
        placed_time: DateTime<Utc>,
        matched_time: DateTime<Utc>,
        side: TradeSide,
    ) -> Self {
        ClosedOrder {
            common: OrderCommon { id, matched_volume, price, placed_time, side },
            matched_time,
        }
    }

    pub fn id(&self) -> i64 {
        self.common.id
    }

    pub fn side(&self) -> TradeSide {
        self.common.side
    }

    pub fn price(&self) -> MonetaryAmount {
        self.common.price
    }

    pub fn matched_volume(&self) -> MonetaryAmount {
        self.common.matched_volume
    }

    pub fn matched_time(&self) -> DateTime<Utc> {
        self.matched_time
    }

    /// Combines two partial fills of the same order id: volumes sum, and
    /// both price and matched time become volume-weighted means.
    pub fn merge_with(&self, other: &ClosedOrder) -> TradingResult<ClosedOrder> {
        let total_volume = self.matched_volume().checked_add(other.matched_volume())?;

        let price = if self.price() == other.price() {
            self.price()
        } else {
            let weighted = self.price().checked_mul(self.matched_volume().to_neutral())?
                .checked_add(other.price().checked_mul(other.matched_volume().to_neutral())?)?;
            weighted.checked_div(total_volume.to_neutral())?
        };

        let self_ts = self.matched_time.timestamp_millis();
        let other_ts = other.matched_time.timestamp_millis();
        let self_vol = self.matched_volume().to_neutral();
        let other_vol = other.matched_volume().to_neutral();
        let avg_ts_num = self_vol.checked_mul_scalar(self_ts)?.checked_add(other_vol.checked_mul_scalar(other_ts)?)?;
        let avg_ts = avg_ts_num
            .checked_div(total_volume.to_neutral())?
            .amount_at(0)
            .ok_or(MoneyError::ArithmeticError)?;
        let matched_time = DateTime::from_timestamp_millis(avg_ts).unwrap_or(self.matched_time);

        Ok(ClosedOrder::new(self.id(), total_volume, price, self.common.placed_time, matched_time, self.side()))
    }
}
