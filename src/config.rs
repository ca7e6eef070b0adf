//! Per-exchange configuration: trading fees and the payment-currency
//! preference order consumed by the path resolver (§4.4) and the trading
//! engine (§4.5). Loading this from disk is out of scope here; only the
//! in-memory shape and its builder are.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::money::{CurrencyCode, MonetaryAmount};
use crate::trading::TradeFees;

/// Maker/taker fee ratios plus the ordered list of currencies the path
/// resolver should prefer when several conversion paths are equally short.
#[derive(Clone, Debug, Builder)]
#[builder(setter(into))]
pub struct ExchangeConfig {
    pub maker_fee_ratio: MonetaryAmount,
    pub taker_fee_ratio: MonetaryAmount,
    #[builder(default)]
    pub preferred_payment_currencies: Vec<CurrencyCode>,
}

impl ExchangeConfig {
    pub fn trade_fees(&self) -> TradeFees {
        TradeFees::new(self.maker_fee_ratio, self.taker_fee_ratio)
    }

    pub fn preferred_payment_currencies(&self) -> &[CurrencyCode] {
        &self.preferred_payment_currencies
    }
}

/// The wire form of [`ExchangeConfig`]: a plain serde record with string
/// currency codes, as it would be read out of a configuration file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExchangeConfigRecord {
    pub maker_fee_ratio: String,
    pub taker_fee_ratio: String,
    #[serde(default)]
    pub preferred_payment_currencies: Vec<String>,
}

impl ExchangeConfigRecord {
    pub fn into_config(self) -> Result<ExchangeConfig, crate::error::MoneyError> {
        let preferred_payment_currencies = self
            .preferred_payment_currencies
            .iter()
            .map(|s| CurrencyCode::new(s).map_err(crate::error::MoneyError::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ExchangeConfig {
            maker_fee_ratio: MonetaryAmount::parse(&self.maker_fee_ratio)?,
            taker_fee_ratio: MonetaryAmount::parse(&self.taker_fee_ratio)?,
            preferred_payment_currencies,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builder_defaults_preferred_currencies_to_empty() {
        let config = ExchangeConfigBuilder::default()
            .maker_fee_ratio(MonetaryAmount::parse("0.1").unwrap())
            .taker_fee_ratio(MonetaryAmount::parse("0.2").unwrap())
            .build()
            .unwrap();
        assert!(config.preferred_payment_currencies().is_empty());
    }

    #[test]
    fn record_parses_into_a_usable_config() {
        let record = ExchangeConfigRecord {
            maker_fee_ratio: "0.1".to_string(),
            taker_fee_ratio: "0.2".to_string(),
            preferred_payment_currencies: vec!["USDT".to_string(), "BTC".to_string()],
        };
        let config = record.into_config().unwrap();
        assert_eq!(config.preferred_payment_currencies().len(), 2);
    }
}
