//! Shapes of the UTF-8 JSON files the core reads and writes directly (§6).
//! No I/O lives here: these are the serde records a process layer would
//! serialize to or deserialize from disk.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// `exchange -> account -> currency -> "address[,tag]"`.
pub type DepositAddressesFile = HashMap<String, HashMap<String, HashMap<String, String>>>;

/// One entry of the fiat-rate cache: `BASE-QUOTE -> {rate, timestamp_epoch_s}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FiatRateEntry {
    pub rate: f64,
    pub timestamp_epoch_s: i64,
}

/// `BASE-QUOTE -> FiatRateEntry`.
pub type FiatRateCacheFile = HashMap<String, FiatRateEntry>;

/// One currency's withdrawal terms, as cached per exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalAsset {
    pub min: String,
    pub fee: String,
}

/// `{timestamp_epoch_s, assets: {currency -> WithdrawalAsset}}`, one per
/// exchange.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalInfoCacheEntry {
    pub timestamp_epoch_s: i64,
    pub assets: HashMap<String, WithdrawalAsset>,
}

/// `exchange -> WithdrawalInfoCacheEntry`.
pub type WithdrawalInfoCacheFile = HashMap<String, WithdrawalInfoCacheEntry>;

/// One-to-one `FROM_CUR -> TO_CUR` rename table.
pub type CurrencyEquivalenceMapFile = HashMap<String, String>;

/// One-to-one `stable_cur -> fiat_cur` table.
pub type StableCoinMapFile = HashMap<String, String>;
