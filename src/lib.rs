//! Multi-exchange cryptocurrency trading-engine core: fixed-point money and
//! currency primitives, a tick-scaled order book, a conversion-path
//! resolver, a per-market trading simulator, and a cross-exchange command
//! orchestrator. HTTP transport, request signing, and config-file loading
//! are external collaborators reached through the traits in [`exchange`].

pub mod cache;
pub mod config;
pub mod error;
pub mod exchange;
pub mod exchange_name;
pub mod formats;
pub mod market;
pub mod money;
pub mod orchestrator;
pub mod orderbook;
pub mod path;
pub mod trade_side;
pub mod trading;

pub use crate::error::{
    AdapterError, AdapterResult, CurrencyError, CurrencyResult, MoneyError, MoneyResult, OrchestratorError,
    OrchestratorResult, OrderBookError, OrderBookResult, PathError, PathResult, TradingError, TradingResult,
};
pub use crate::exchange::Exchange;
pub use crate::exchange_name::{ExchangeName, PrivateExchangeName};
pub use crate::market::Market;
pub use crate::money::{CurrencyCode, MonetaryAmount};
pub use crate::orderbook::MarketOrderBook;
pub use crate::trade_side::TradeSide;
