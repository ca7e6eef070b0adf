//! Error kinds surfaced by the core, one `thiserror` enum per concern.
//!
//! Money/currency errors are hot-path and returned synchronously (never wrapped
//! in adapter-style retries); replay validation instead counts errors and
//! continues. See `trading::engine` for the latter.

use thiserror::Error;

pub type CurrencyResult<T> = std::result::Result<T, CurrencyError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    #[error("invalid currency code '{0}'")]
    InvalidCurrency(String),
}

pub type MoneyResult<T> = std::result::Result<T, MoneyError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error(transparent)]
    InvalidCurrency(#[from] CurrencyError),
    #[error("cannot combine amounts of different currencies")]
    CurrencyMismatch,
    #[error("arithmetic overflow or division by zero")]
    ArithmeticError,
}

pub type OrderBookResult<T> = std::result::Result<T, OrderBookError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderBookError {
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error("order book is crossed or unsorted: {0}")]
    InvalidOrderBook(String),
}

pub type TradingResult<T> = std::result::Result<T, TradingError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TradingError {
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    OrderBook(#[from] OrderBookError),
    #[error("order {0} not found")]
    OrderNotFound(i64),
    #[error("unsupported trader command")]
    UnsupportedCommand,
    #[error("market {0} is inconsistent with the engine's start amounts")]
    InconsistentMarket(String),
    #[error("a market trader is already registered on this engine")]
    TraderAlreadyRegistered,
    #[error("no market trader registered on this engine")]
    NoTraderRegistered,
}

pub type PathResult<T> = std::result::Result<T, PathError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("no conversion path found from {from} to {to}")]
    NoConversionPath { from: String, to: String },
}

pub type AdapterResult<T> = std::result::Result<T, AdapterError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("not implemented")]
    NotImplemented,
    #[error("http error: {0}")]
    Http(String),
    #[error("invalid credentials")]
    InvalidCredentials,
}

pub type OrchestratorResult<T> = std::result::Result<T, OrchestratorError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error(transparent)]
    Money(#[from] MoneyError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("invalid command composition: {0}")]
    InvalidArgument(String),
    #[error("adapter call failed: {0}")]
    AdapterError(String),
}
