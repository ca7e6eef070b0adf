//! Per-market trading engine: replays historical order books and public
//! trades against a user-supplied [`MarketTrader`] algorithm, maintaining
//! synthetic balances and a ledger of opened/closed orders.

mod algorithm;
mod command;
mod engine;
mod fees;
mod order;
mod public_trade;
mod range_stats;
mod result;
mod state;
mod view;

pub use algorithm::{DummyMarketTrader, ExampleMarketTrader, MarketTrader};
pub use command::{PriceStrategy, TraderCommand};
pub use engine::MarketTraderEngine;
pub use fees::{FeeType, TradeFees};
pub use order::{ClosedOrder, OpenedOrder, OrderCommon};
pub use public_trade::PublicTrade;
pub use range_stats::{TradeRangeResultsStats, TradeRangeStats};
pub use result::MarketTradingResult;
pub use state::TradeEngineState;
pub use view::MarketDataView;
