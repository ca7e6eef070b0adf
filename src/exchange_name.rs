//! Identifiers naming exchanges and exchange accounts.
//!
//! [`ExchangeName`] names one of the supported exchange platforms.
//! [`PrivateExchangeName`] additionally names a specific account (API key)
//! on that platform, letting the orchestrator address several accounts on
//! the same exchange (e.g. `kraken_mainaccount` vs. `kraken_subaccount`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, OrchestratorResult};

/// One of the platforms this crate knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeName {
    Binance,
    Bithumb,
    Huobi,
    Kraken,
    Kucoin,
    Upbit,
}

/// All platforms this crate supports, in a stable order.
pub const SUPPORTED_EXCHANGES: [ExchangeName; 6] = [
    ExchangeName::Binance,
    ExchangeName::Bithumb,
    ExchangeName::Huobi,
    ExchangeName::Kraken,
    ExchangeName::Kucoin,
    ExchangeName::Upbit,
];

impl ExchangeName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExchangeName::Binance => "binance",
            ExchangeName::Bithumb => "bithumb",
            ExchangeName::Huobi => "huobi",
            ExchangeName::Kraken => "kraken",
            ExchangeName::Kucoin => "kucoin",
            ExchangeName::Upbit => "upbit",
        }
    }
}

impl fmt::Display for ExchangeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExchangeName {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binance" => Ok(ExchangeName::Binance),
            "bithumb" => Ok(ExchangeName::Bithumb),
            "huobi" => Ok(ExchangeName::Huobi),
            "kraken" => Ok(ExchangeName::Kraken),
            "kucoin" => Ok(ExchangeName::Kucoin),
            "upbit" => Ok(ExchangeName::Upbit),
            other => Err(OrchestratorError::InvalidArgument(format!(
                "unsupported exchange name '{other}'"
            ))),
        }
    }
}

/// Names one account on one exchange: `<exchange>` or `<exchange>_<keyName>`.
///
/// It is the first `_` that separates exchange from key name, so `_` is
/// allowed inside the key name itself but not inside the exchange name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrivateExchangeName {
    exchange: ExchangeName,
    key_name: Option<String>,
}

impl PrivateExchangeName {
    pub fn new(exchange: ExchangeName, key_name: Option<String>) -> Self {
        PrivateExchangeName { exchange, key_name }
    }

    /// Parses `<exchange>` or `<exchange>_<keyName>`.
    pub fn parse(global_name: &str) -> OrchestratorResult<Self> {
        match global_name.split_once('_') {
            Some((exchange, key_name)) => Ok(PrivateExchangeName {
                exchange: exchange.parse()?,
                key_name: Some(key_name.to_string()),
            }),
            None => Ok(PrivateExchangeName {
                exchange: global_name.parse()?,
                key_name: None,
            }),
        }
    }

    pub fn exchange(&self) -> ExchangeName {
        self.exchange
    }

    pub fn key_name(&self) -> Option<&str> {
        self.key_name.as_deref()
    }

    pub fn is_key_name_defined(&self) -> bool {
        self.key_name.is_some()
    }
}

impl fmt::Display for PrivateExchangeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key_name {
            Some(key) => write!(f, "{}_{key}", self.exchange),
            None => write!(f, "{}", self.exchange),
        }
    }
}

impl FromStr for PrivateExchangeName {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrivateExchangeName::parse(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_exchange_only_name() {
        let n = PrivateExchangeName::parse("kraken").unwrap();
        assert_eq!(n.exchange(), ExchangeName::Kraken);
        assert_eq!(n.key_name(), None);
        assert!(!n.is_key_name_defined());
        assert_eq!(n.to_string(), "kraken");
    }

    #[test]
    fn parses_exchange_with_key_name() {
        let n = PrivateExchangeName::parse("kraken_mainaccount").unwrap();
        assert_eq!(n.exchange(), ExchangeName::Kraken);
        assert_eq!(n.key_name(), Some("mainaccount"));
        assert!(n.is_key_name_defined());
        assert_eq!(n.to_string(), "kraken_mainaccount");
    }

    #[test]
    fn key_name_may_itself_contain_underscores() {
        let n = PrivateExchangeName::parse("binance_my_sub_account").unwrap();
        assert_eq!(n.exchange(), ExchangeName::Binance);
        assert_eq!(n.key_name(), Some("my_sub_account"));
    }

    #[test]
    fn rejects_unknown_exchange() {
        assert!(PrivateExchangeName::parse("coinbase").is_err());
        assert!(PrivateExchangeName::parse("coinbase_acct").is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for exchange in SUPPORTED_EXCHANGES {
            let n = PrivateExchangeName::new(exchange, Some("acct".to_string()));
            let parsed: PrivateExchangeName = n.to_string().parse().unwrap();
            assert_eq!(n, parsed);
        }
    }
}
