//! Trade-fee configuration: a maker and a taker rate, applied as a
//! percentage deduction from the matched amount.

use crate::error::MoneyResult;
use crate::money::{CurrencyCode, MonetaryAmount};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FeeType {
    Maker,
    Taker,
}

#[derive(Clone, Copy, Debug)]
pub struct TradeFees {
    maker: MonetaryAmount,
    taker: MonetaryAmount,
}

impl TradeFees {
    /// `maker`/`taker` are percentages, e.g. `0.1` for 0.1%.
    pub fn new(maker: MonetaryAmount, taker: MonetaryAmount) -> Self {
        TradeFees { maker, taker }
    }

    pub fn zero() -> Self {
        let neutral = MonetaryAmount::zero(CurrencyCode::NEUTRAL);
        TradeFees::new(neutral, neutral)
    }

    pub fn fee(&self, fee_type: FeeType) -> MonetaryAmount {
        match fee_type {
            FeeType::Maker => self.maker,
            FeeType::Taker => self.taker,
        }
    }

    /// Converts a gross matched amount into a net amount after `fee_type`'s
    /// rate: `amount * (100 - fee) / 100`.
    pub fn apply_fee(&self, amount: MonetaryAmount, fee_type: FeeType) -> MoneyResult<MonetaryAmount> {
        let hundred = MonetaryAmount::new(100, CurrencyCode::NEUTRAL, 0);
        let factor = hundred.checked_sub(self.fee(fee_type).to_neutral())?;
        amount.checked_mul(factor.to_neutral())?.checked_div_scalar(100)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn taker_fee_shrinks_the_matched_amount() {
        let fees = TradeFees::new(
            MonetaryAmount::parse("0.1").unwrap(),
            MonetaryAmount::parse("0.2").unwrap(),
        );
        let gross = MonetaryAmount::parse("1000 USDT").unwrap();
        let net = fees.apply_fee(gross, FeeType::Taker).unwrap();
        assert_eq!(net, MonetaryAmount::parse("998 USDT").unwrap());
    }

    #[test]
    fn zero_fees_are_a_no_op() {
        let fees = TradeFees::zero();
        let gross = MonetaryAmount::parse("1000 USDT").unwrap();
        assert_eq!(fees.apply_fee(gross, FeeType::Maker).unwrap(), gross);
    }
}
