//! Money and currency primitives: every other component is built on top of
//! [`CurrencyCode`] and [`MonetaryAmount`].

mod amount;
mod currency;

pub use amount::{MonetaryAmount, RoundType};
pub use currency::CurrencyCode;
