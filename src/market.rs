//! A tradable pair of currencies. `BASE-QUOTE` is not the same market as
//! `QUOTE-BASE`; use [`Market::reverse`] to flip it.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CurrencyError, CurrencyResult};
use crate::money::CurrencyCode;

/// Whether a market's price comes from an exchange's order book or from an
/// external fiat-rate service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(i8)]
pub enum MarketKind {
    RegularExchange = 0,
    FiatConversion = 1,
}

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct Market {
    base: CurrencyCode,
    quote: CurrencyCode,
}

impl Market {
    pub fn new(base: CurrencyCode, quote: CurrencyCode) -> Self {
        Self::with_kind(base, quote, MarketKind::RegularExchange)
    }

    pub fn with_kind(base: CurrencyCode, quote: CurrencyCode, kind: MarketKind) -> Self {
        Market {
            base: base.with_additional_bits(kind as u8),
            quote,
        }
    }

    /// Parses `BASE-QUOTE` (optionally `*`-prefixed for a fiat-conversion
    /// market) using `sep` as the separator.
    pub fn parse(text: &str, sep: char) -> CurrencyResult<Self> {
        let (kind, rest) = match text.strip_prefix('*') {
            Some(rest) => (MarketKind::FiatConversion, rest),
            None => (MarketKind::RegularExchange, text),
        };
        let (base, quote) = rest
            .split_once(sep)
            .ok_or_else(|| CurrencyError::InvalidCurrency(text.to_string()))?;
        Ok(Market::with_kind(
            CurrencyCode::new(base)?,
            CurrencyCode::new(quote)?,
            kind,
        ))
    }

    pub fn base(&self) -> CurrencyCode {
        self.base
    }

    pub fn quote(&self) -> CurrencyCode {
        self.quote
    }

    pub fn kind(&self) -> MarketKind {
        if self.base.additional_bits() != 0 {
            MarketKind::FiatConversion
        } else {
            MarketKind::RegularExchange
        }
    }

    pub fn is_fiat_conversion(&self) -> bool {
        self.kind() == MarketKind::FiatConversion
    }

    pub fn is_defined(&self) -> bool {
        self.base.is_defined() && self.quote.is_defined()
    }

    /// Swaps base and quote, keeping the market kind.
    #[must_use]
    pub fn reverse(&self) -> Market {
        Market::with_kind(self.quote, self.base, self.kind())
    }

    /// Given a currency traded by this market, returns the other one.
    pub fn opposite(&self, cur: CurrencyCode) -> CurrencyCode {
        if self.quote == cur {
            self.base
        } else {
            self.quote
        }
    }

    pub fn can_trade(&self, cur: CurrencyCode) -> bool {
        cur == self.base || cur == self.quote
    }

    fn write_pair(&self, f: &mut fmt::Formatter<'_>, lower: bool, sep: char) -> fmt::Result {
        if self.is_fiat_conversion() {
            write!(f, "*")?;
        }
        if lower {
            write!(f, "{}{}{}", self.base.to_string().to_lowercase(), sep, self.quote.to_string().to_lowercase())
        } else {
            write!(f, "{}{}{}", self.base, sep, self.quote)
        }
    }

    pub fn str_upper(&self, sep: char) -> String {
        struct W<'a>(&'a Market, char);
        impl fmt::Display for W<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.write_pair(f, false, self.1)
            }
        }
        W(self, sep).to_string()
    }

    pub fn str_lower(&self, sep: char) -> String {
        struct W<'a>(&'a Market, char);
        impl fmt::Display for W<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.write_pair(f, true, self.1)
            }
        }
        W(self, sep).to_string()
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_pair(f, false, '-')
    }
}

impl fmt::Debug for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Market({self})")
    }
}

impl Serialize for Market {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Market {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Market::parse(&s, '-').map_err(DeError::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cur(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    #[test]
    fn displays_base_quote() {
        let m = Market::new(cur("BTC"), cur("ETH"));
        assert_eq!(m.to_string(), "BTC-ETH");
    }

    #[test]
    fn reverse_swaps_operands_and_keeps_kind() {
        let m = Market::with_kind(cur("EUR"), cur("USD"), MarketKind::FiatConversion);
        let r = m.reverse();
        assert_eq!(r.base(), cur("USD"));
        assert_eq!(r.quote(), cur("EUR"));
        assert!(r.is_fiat_conversion());
    }

    #[test]
    fn fiat_conversion_prints_with_star() {
        let m = Market::with_kind(cur("EUR"), cur("USD"), MarketKind::FiatConversion);
        assert_eq!(m.to_string(), "*EUR-USD");
    }

    #[test]
    fn parses_round_trip() {
        let m = Market::parse("*EUR-USD", '-').unwrap();
        assert_eq!(m.to_string(), "*EUR-USD");
        assert!(m.is_fiat_conversion());
    }

    #[test]
    fn opposite_returns_the_other_currency() {
        let m = Market::new(cur("BTC"), cur("EUR"));
        assert_eq!(m.opposite(cur("BTC")), cur("EUR"));
        assert_eq!(m.opposite(cur("EUR")), cur("BTC"));
    }

    #[test]
    fn btc_eth_is_not_eth_btc() {
        let a = Market::new(cur("BTC"), cur("ETH"));
        let b = Market::new(cur("ETH"), cur("BTC"));
        assert_ne!(a, b);
    }
}
