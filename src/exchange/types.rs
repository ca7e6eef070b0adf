//! Supporting value types exchanged with an [`super::Exchange`] adapter.

use crate::money::{CurrencyCode, MonetaryAmount};

/// Opaque order identifier assigned by the exchange.
pub type OrderId = String;

/// Opaque withdrawal identifier assigned by the exchange.
pub type WithdrawId = String;

/// What an exchange reports about a currency it lists: its trading
/// precision and whether deposits/withdrawals are currently open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyDetail {
    pub code: CurrencyCode,
    pub deposit_enabled: bool,
    pub withdraw_enabled: bool,
}

impl CurrencyDetail {
    pub fn new(code: CurrencyCode, deposit_enabled: bool, withdraw_enabled: bool) -> Self {
        CurrencyDetail { code, deposit_enabled, withdraw_enabled }
    }
}

/// The two legs of one fill: what left one currency and what arrived in
/// the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TradedAmounts {
    pub traded_from: MonetaryAmount,
    pub traded_to: MonetaryAmount,
}

impl TradedAmounts {
    pub fn new(traded_from: MonetaryAmount, traded_to: MonetaryAmount) -> Self {
        TradedAmounts { traded_from, traded_to }
    }

    pub fn zero(from: CurrencyCode, to: CurrencyCode) -> Self {
        TradedAmounts {
            traded_from: MonetaryAmount::zero(from),
            traded_to: MonetaryAmount::zero(to),
        }
    }
}

impl std::ops::Add for TradedAmounts {
    type Output = TradedAmounts;

    fn add(self, rhs: TradedAmounts) -> TradedAmounts {
        TradedAmounts {
            traded_from: self.traded_from + rhs.traded_from,
            traded_to: self.traded_to + rhs.traded_to,
        }
    }
}

impl std::ops::AddAssign for TradedAmounts {
    fn add_assign(&mut self, rhs: TradedAmounts) {
        *self = *self + rhs;
    }
}

/// The current state of a previously-placed order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderInfo {
    pub traded_amounts: TradedAmounts,
    pub is_closed: bool,
}

impl OrderInfo {
    pub fn new(traded_amounts: TradedAmounts, is_closed: bool) -> Self {
        OrderInfo { traded_amounts, is_closed }
    }
}
