//! Fixed-point monetary amount: a signed 64-bit integer scaled by a decimal
//! count, tagged with a [`CurrencyCode`]. Every arithmetic operation keeps
//! the amount normalized (trailing zero decimals stripped) and fails rather
//! than silently mixing currencies.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MoneyError, MoneyResult};
use crate::money::currency::CurrencyCode;

/// Direction used by [`MonetaryAmount::round`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RoundType {
    Down,
    Up,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MonetaryAmount {
    amount: i64,
    currency_code: CurrencyCode,
    nb_decimals: i8,
}

impl MonetaryAmount {
    pub fn new(amount: i64, currency_code: CurrencyCode, nb_decimals: i8) -> Self {
        let mut m = MonetaryAmount {
            amount,
            currency_code,
            nb_decimals,
        };
        m.simplify();
        m
    }

    pub fn zero(currency_code: CurrencyCode) -> Self {
        MonetaryAmount::new(0, currency_code, 0)
    }

    fn simplify(&mut self) {
        if self.amount == 0 {
            self.nb_decimals = 0;
            return;
        }
        while self.nb_decimals > 0 && self.amount % 10 == 0 {
            self.amount /= 10;
            self.nb_decimals -= 1;
        }
    }

    /// Parses `[-] digits [. digits] [ currency]`. The currency suffix is
    /// optional; if absent the amount is neutral.
    pub fn parse(text: &str) -> MoneyResult<Self> {
        let text = text.trim();
        let split_at = text
            .find(|ch: char| ch.is_ascii_alphabetic() || ch == '_')
            .unwrap_or(text.len());
        let (number_part, currency_part) = text.split_at(split_at);
        let currency_code = CurrencyCode::new(currency_part.trim())?;
        Self::with_currency(number_part.trim(), currency_code)
    }

    /// Parses a bare number string against an explicit currency.
    pub fn with_currency(number: &str, currency_code: CurrencyCode) -> MoneyResult<Self> {
        let (neg, number) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (int_part, dec_part) = match number.split_once('.') {
            Some((i, d)) => (i, d),
            None => (number, ""),
        };
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !dec_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(MoneyError::ArithmeticError);
        }
        let nb_decimals = dec_part.len() as i8;
        let digits: String = int_part.chars().chain(dec_part.chars()).collect();
        let digits = if digits.is_empty() { "0" } else { &digits };
        let mut amount: i64 = digits.parse().map_err(|_| MoneyError::ArithmeticError)?;
        if neg {
            amount = -amount;
        }
        Ok(MonetaryAmount::new(amount, currency_code, nb_decimals))
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency_code(&self) -> CurrencyCode {
        self.currency_code
    }

    pub fn nb_decimals(&self) -> i8 {
        self.nb_decimals
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Integer representation at `nb_decimals` decimal places, or `None` on
    /// overflow.
    pub fn amount_at(&self, nb_decimals: i8) -> Option<i64> {
        scale_i128(self.amount, self.nb_decimals, nb_decimals).and_then(fits_i64)
    }

    pub fn to_f64(&self) -> f64 {
        self.amount as f64 / 10f64.powi(self.nb_decimals as i32)
    }

    pub fn to_neutral(&self) -> MonetaryAmount {
        MonetaryAmount::new(self.amount, CurrencyCode::NEUTRAL, self.nb_decimals)
    }

    pub fn with_currency_code(&self, currency_code: CurrencyCode) -> MonetaryAmount {
        MonetaryAmount {
            amount: self.amount,
            currency_code,
            nb_decimals: self.nb_decimals,
        }
    }

    pub fn neg(&self) -> MonetaryAmount {
        MonetaryAmount::new(-self.amount, self.currency_code, self.nb_decimals)
    }

    pub fn abs(&self) -> MonetaryAmount {
        MonetaryAmount::new(self.amount.abs(), self.currency_code, self.nb_decimals)
    }

    /// Addition. Target precision is the greater of the two operands',
    /// capped at the result currency's decimal capacity (§3: 15 decimals for
    /// 9-10 character codes, 63 otherwise); if representing the rescaled
    /// operands or their sum at that precision would overflow, precision is
    /// dropped one digit at a time until it fits.
    pub fn checked_add(&self, other: MonetaryAmount) -> MoneyResult<MonetaryAmount> {
        let result_currency = result_currency(self.currency_code, other.currency_code)?;
        let mut dec = self.nb_decimals.max(other.nb_decimals).min(result_currency.max_decimals());
        loop {
            if let (Some(a), Some(b)) = (
                scale_i128(self.amount, self.nb_decimals, dec),
                scale_i128(other.amount, other.nb_decimals, dec),
            ) {
                let sum = a + b;
                if let Some(sum) = fits_i64(sum) {
                    return Ok(MonetaryAmount::new(sum, result_currency, dec));
                }
            }
            if dec == 0 {
                return Err(MoneyError::ArithmeticError);
            }
            dec -= 1;
        }
    }

    pub fn checked_sub(&self, other: MonetaryAmount) -> MoneyResult<MonetaryAmount> {
        self.checked_add(other.neg())
    }

    pub fn checked_mul_scalar(&self, mult: i64) -> MoneyResult<MonetaryAmount> {
        let max_dec = self.currency_code.max_decimals();
        let mut dec = self.nb_decimals.min(max_dec);
        let mut product = if dec < self.nb_decimals {
            scale_i128(self.amount, self.nb_decimals, dec)
                .map(|scaled| scaled * mult as i128)
                .unwrap_or(0)
        } else {
            self.amount as i128 * mult as i128
        };
        while fits_i64(product).is_none() && dec > 0 {
            product /= 10;
            dec -= 1;
        }
        let product = fits_i64(product).ok_or(MoneyError::ArithmeticError)?;
        Ok(MonetaryAmount::new(product, self.currency_code, dec))
    }

    /// Multiplication of two amounts: at most one may carry a real currency.
    /// Target precision is the sum of both operands' decimals, capped at the
    /// result currency's decimal capacity; overflow is resolved the same way
    /// as in [`Self::checked_add`].
    pub fn checked_mul(&self, other: MonetaryAmount) -> MoneyResult<MonetaryAmount> {
        if self.currency_code.is_defined() && other.currency_code.is_defined() {
            return Err(MoneyError::CurrencyMismatch);
        }
        let result_currency = if self.currency_code.is_defined() {
            self.currency_code
        } else {
            other.currency_code
        };
        let natural_dec = self.nb_decimals + other.nb_decimals;
        let mut dec = natural_dec.min(result_currency.max_decimals());
        let full = self.amount as i128 * other.amount as i128;
        let mut product = if natural_dec > dec {
            pow10_checked((natural_dec - dec) as u32)
                .map(|p| full / p)
                .unwrap_or(0)
        } else {
            full
        };
        while fits_i64(product).is_none() && dec > 0 {
            product /= 10;
            dec -= 1;
        }
        let product = fits_i64(product).ok_or(MoneyError::ArithmeticError)?;
        Ok(MonetaryAmount::new(product, result_currency, dec))
    }

    pub fn checked_div_scalar(&self, div: i64) -> MoneyResult<MonetaryAmount> {
        if div == 0 {
            return Err(MoneyError::ArithmeticError);
        }
        self.checked_div(MonetaryAmount::new(div, CurrencyCode::NEUTRAL, 0))
    }

    /// Division. Result currency is `self`'s currency when `other` is
    /// neutral, otherwise neutral (a pure ratio). Starts at the result
    /// currency's decimal capacity (§3) and drops precision until the
    /// quotient fits in an `i64`.
    pub fn checked_div(&self, other: MonetaryAmount) -> MoneyResult<MonetaryAmount> {
        if other.amount == 0 {
            return Err(MoneyError::ArithmeticError);
        }
        let result_currency = if other.currency_code.is_neutral() {
            self.currency_code
        } else {
            CurrencyCode::NEUTRAL
        };
        let mut dec = result_currency.max_decimals();
        loop {
            let exponent = (dec as i32 - self.nb_decimals as i32 + other.nb_decimals as i32).max(0) as u32;
            if let Some(pow) = pow10_checked(exponent) {
                if let Some(numerator) = (self.amount as i128).checked_mul(pow) {
                    let quotient = numerator / (other.amount as i128);
                    if let Some(quotient) = fits_i64(quotient) {
                        return Ok(MonetaryAmount::new(quotient, result_currency, dec));
                    }
                }
            }
            if dec == 0 {
                return Err(MoneyError::ArithmeticError);
            }
            dec -= 1;
        }
    }

    /// Converts this amount into the currency of `price`, as `price *
    /// self.to_neutral()`.
    pub fn convert_to(&self, price: MonetaryAmount) -> MoneyResult<MonetaryAmount> {
        price.checked_mul(self.to_neutral())
    }

    /// Rounds to the nearest multiple of `step`, which must be strictly
    /// positive. Result carries `self`'s currency.
    pub fn round(&self, step: MonetaryAmount, round_type: RoundType) -> MoneyResult<MonetaryAmount> {
        if step.amount <= 0 {
            return Err(MoneyError::ArithmeticError);
        }
        let dec = self.nb_decimals.max(step.nb_decimals);
        let self_scaled =
            scale_i128(self.amount, self.nb_decimals, dec).ok_or(MoneyError::ArithmeticError)?;
        let step_scaled =
            scale_i128(step.amount, step.nb_decimals, dec).ok_or(MoneyError::ArithmeticError)?;
        let floor_q = self_scaled.div_euclid(step_scaled);
        let rem = self_scaled.rem_euclid(step_scaled);
        let q = match round_type {
            RoundType::Down => floor_q,
            RoundType::Up => {
                if rem == 0 {
                    floor_q
                } else {
                    floor_q + 1
                }
            }
        };
        let result = q * step_scaled;
        fits_i64(result)
            .map(|amount| MonetaryAmount::new(amount, self.currency_code, dec))
            .ok_or(MoneyError::ArithmeticError)
    }
}

fn result_currency(a: CurrencyCode, b: CurrencyCode) -> MoneyResult<CurrencyCode> {
    if a.is_defined() && b.is_defined() && a != b {
        return Err(MoneyError::CurrencyMismatch);
    }
    Ok(if a.is_defined() { a } else { b })
}

fn scale_i128(amount: i64, from_dec: i8, to_dec: i8) -> Option<i128> {
    let diff = to_dec as i32 - from_dec as i32;
    if diff >= 0 {
        10i128.checked_pow(diff as u32).map(|f| amount as i128 * f)
    } else {
        pow10_checked((-diff) as u32).map(|f| amount as i128 / f)
    }
}

/// `10^exp` as an `i128`, or `None` if it would overflow (exponents up to
/// 126 are reachable once two 63-decimal amounts are multiplied together).
fn pow10_checked(exp: u32) -> Option<i128> {
    10i128.checked_pow(exp)
}

fn fits_i64(v: i128) -> Option<i64> {
    if v >= i64::MIN as i128 && v <= i64::MAX as i128 {
        Some(v as i64)
    } else {
        None
    }
}

impl PartialEq for MonetaryAmount {
    fn eq(&self, other: &Self) -> bool {
        self.currency_code == other.currency_code && compare_scaled(self, other) == Ordering::Equal
    }
}

impl Eq for MonetaryAmount {}

impl PartialOrd for MonetaryAmount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(compare_scaled(self, other))
    }
}

impl Ord for MonetaryAmount {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_scaled(self, other)
    }
}

fn compare_scaled(a: &MonetaryAmount, b: &MonetaryAmount) -> Ordering {
    let dec = a.nb_decimals.max(b.nb_decimals);
    let sa = scale_i128(a.amount, a.nb_decimals, dec).unwrap_or(i128::from(a.amount));
    let sb = scale_i128(b.amount, b.nb_decimals, dec).unwrap_or(i128::from(b.amount));
    sa.cmp(&sb)
}

impl std::ops::Add for MonetaryAmount {
    type Output = MonetaryAmount;
    fn add(self, rhs: MonetaryAmount) -> MonetaryAmount {
        self.checked_add(rhs).expect("currency mismatch or overflow in +")
    }
}

impl std::ops::Sub for MonetaryAmount {
    type Output = MonetaryAmount;
    fn sub(self, rhs: MonetaryAmount) -> MonetaryAmount {
        self.checked_sub(rhs).expect("currency mismatch or overflow in -")
    }
}

impl std::ops::Neg for MonetaryAmount {
    type Output = MonetaryAmount;
    fn neg(self) -> MonetaryAmount {
        MonetaryAmount::neg(&self)
    }
}

impl std::ops::Mul<i64> for MonetaryAmount {
    type Output = MonetaryAmount;
    fn mul(self, rhs: i64) -> MonetaryAmount {
        self.checked_mul_scalar(rhs).expect("overflow in *")
    }
}

impl std::ops::Mul<MonetaryAmount> for MonetaryAmount {
    type Output = MonetaryAmount;
    fn mul(self, rhs: MonetaryAmount) -> MonetaryAmount {
        self.checked_mul(rhs).expect("currency mismatch or overflow in *")
    }
}

impl std::ops::Div<i64> for MonetaryAmount {
    type Output = MonetaryAmount;
    fn div(self, rhs: i64) -> MonetaryAmount {
        self.checked_div_scalar(rhs).expect("division error in /")
    }
}

impl std::ops::Div<MonetaryAmount> for MonetaryAmount {
    type Output = MonetaryAmount;
    fn div(self, rhs: MonetaryAmount) -> MonetaryAmount {
        self.checked_div(rhs).expect("division error in /")
    }
}

impl FromStr for MonetaryAmount {
    type Err = MoneyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MonetaryAmount::parse(s)
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let neg = self.amount < 0;
        let abs = self.amount.unsigned_abs();
        if neg {
            write!(f, "-")?;
        }
        if self.nb_decimals == 0 {
            write!(f, "{abs}")?;
        } else {
            let scale = 10u64.pow(self.nb_decimals as u32);
            write!(f, "{}.{:0width$}", abs / scale, abs % scale, width = self.nb_decimals as usize)?;
        }
        if self.currency_code.is_defined() {
            write!(f, " {}", self.currency_code)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cur(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn parses_with_currency() {
        let m = MonetaryAmount::parse("15020.67 EUR").unwrap();
        assert_eq!(m.amount_at(4), Some(150206700));
        assert_eq!(m.currency_code(), cur("EUR"));
    }

    #[test]
    fn parses_negative_neutral() {
        let m = MonetaryAmount::parse("-345.8909").unwrap();
        assert!(m.currency_code().is_neutral());
        assert_eq!(m.amount(), -3458909);
        assert_eq!(m.nb_decimals(), 4);
    }

    #[test]
    fn simplifies_trailing_zeros() {
        let a = MonetaryAmount::new(100, cur("EUR"), 2);
        assert_eq!(a.amount(), 1);
        assert_eq!(a.nb_decimals(), 0);
    }

    #[test]
    fn equality_ignores_representation() {
        let a = MonetaryAmount::new(10, cur("BTC"), 1);
        let b = MonetaryAmount::new(100, cur("BTC"), 2);
        assert_eq!(a, b);
    }

    #[test]
    fn add_requires_matching_currency() {
        let a = MonetaryAmount::new(10, cur("BTC"), 0);
        let b = MonetaryAmount::new(10, cur("ETH"), 0);
        assert_eq!(a.checked_add(b), Err(MoneyError::CurrencyMismatch));
    }

    #[test]
    fn add_keeps_greater_precision() {
        let a = MonetaryAmount::new(1050, cur("EUR"), 2); // 10.50
        let b = MonetaryAmount::new(1, cur("EUR"), 0); // 1
        let sum = a.checked_add(b).unwrap();
        assert_eq!(sum, MonetaryAmount::new(1150, cur("EUR"), 2));
    }

    #[test]
    fn mul_requires_a_neutral_operand() {
        let a = MonetaryAmount::new(10, cur("BTC"), 0);
        let b = MonetaryAmount::new(10, cur("ETH"), 0);
        assert_eq!(a.checked_mul(b), Err(MoneyError::CurrencyMismatch));
    }

    #[test]
    fn mul_carries_non_neutral_currency() {
        let price = MonetaryAmount::new(16000, cur("EUR"), 0);
        let qty = MonetaryAmount::new(2, CurrencyCode::NEUTRAL, 0);
        let total = price.checked_mul(qty).unwrap();
        assert_eq!(total.currency_code(), cur("EUR"));
        assert_eq!(total, MonetaryAmount::new(32000, cur("EUR"), 0));
    }

    #[test]
    fn div_by_zero_fails() {
        let a = MonetaryAmount::new(10, cur("EUR"), 0);
        let z = MonetaryAmount::zero(CurrencyCode::NEUTRAL);
        assert_eq!(a.checked_div(z), Err(MoneyError::ArithmeticError));
    }

    #[test]
    fn round_on_exact_boundary_is_a_no_op() {
        let x = MonetaryAmount::new(12340, cur("EUR"), 2); // 123.40
        let step = MonetaryAmount::new(1, cur("EUR"), 1); // 0.1
        let down = x.round(step, RoundType::Down).unwrap();
        let up = x.round(step, RoundType::Up).unwrap();
        assert_eq!(down, x);
        assert_eq!(up, down);
    }

    #[test]
    fn round_up_crosses_when_not_exact() {
        let x = MonetaryAmount::new(12346, cur("EUR"), 2); // 123.46
        let step = MonetaryAmount::new(1, cur("EUR"), 1); // 0.1
        let down = x.round(step, RoundType::Down).unwrap();
        let up = x.round(step, RoundType::Up).unwrap();
        assert!(down <= x);
        assert!(x <= up);
        assert_eq!(up.checked_sub(down).unwrap(), step);
    }

    #[test]
    fn display_trims_and_keeps_currency() {
        let a = MonetaryAmount::new(1050, cur("EUR"), 2);
        assert_eq!(a.to_string(), "10.5 EUR");
        let b = MonetaryAmount::new(1005, cur("EUR"), 2);
        assert_eq!(b.to_string(), "10.05 EUR");
    }
}
