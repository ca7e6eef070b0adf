//! The core's upstream collaborator: one [`Exchange`] implementation per
//! supported trading platform. The trait owns no transport; every method
//! defaults to [`AdapterError::NotImplemented`] so a marker adapter can be
//! named and passed around before (or instead of) wiring real HTTP calls.

mod markers;
mod types;

pub use markers::{Binance, Bithumb, Huobi, Kraken, Kucoin, Upbit};
pub use types::{CurrencyDetail, OrderId, OrderInfo, TradedAmounts, WithdrawId};

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::{AdapterError, AdapterResult};
use crate::market::Market;
use crate::money::{CurrencyCode, MonetaryAmount};
use crate::orderbook::MarketOrderBook;
use crate::trade_side::TradeSide;
use crate::trading::{PriceStrategy, PublicTrade};

/// Whether a placed order should actually transact or merely be simulated
/// against the live book (useful for dry-run scripts and tests).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderMode {
    Real,
    Simulation,
}

#[async_trait]
pub trait Exchange: Send + Sync {
    fn name(&self) -> crate::exchange_name::ExchangeName;

    async fn health_check(&self) -> AdapterResult<bool> {
        Err(AdapterError::NotImplemented)
    }

    async fn currencies(&self) -> AdapterResult<Vec<CurrencyDetail>> {
        Err(AdapterError::NotImplemented)
    }

    async fn markets(&self) -> AdapterResult<Vec<Market>> {
        Err(AdapterError::NotImplemented)
    }

    async fn order_book(&self, market: Market, depth: u32) -> AdapterResult<MarketOrderBook> {
        let _ = (market, depth);
        Err(AdapterError::NotImplemented)
    }

    async fn all_order_books(&self, depth: u32) -> AdapterResult<HashMap<Market, MarketOrderBook>> {
        let _ = depth;
        Err(AdapterError::NotImplemented)
    }

    async fn last_price(&self, market: Market) -> AdapterResult<MonetaryAmount> {
        let _ = market;
        Err(AdapterError::NotImplemented)
    }

    async fn last_trades(&self, market: Market, n: u32) -> AdapterResult<Vec<PublicTrade>> {
        let _ = (market, n);
        Err(AdapterError::NotImplemented)
    }

    async fn withdrawal_fees(&self) -> AdapterResult<HashMap<CurrencyCode, MonetaryAmount>> {
        Err(AdapterError::NotImplemented)
    }

    async fn balance(&self, account: &str) -> AdapterResult<HashMap<CurrencyCode, MonetaryAmount>> {
        let _ = account;
        Err(AdapterError::NotImplemented)
    }

    async fn place_order(
        &self,
        market: Market,
        side: TradeSide,
        amount: MonetaryAmount,
        price: MonetaryAmount,
        strategy: PriceStrategy,
        mode: OrderMode,
    ) -> AdapterResult<OrderId> {
        let _ = (market, side, amount, price, strategy, mode);
        Err(AdapterError::NotImplemented)
    }

    async fn cancel(&self, order_id: &OrderId) -> AdapterResult<()> {
        let _ = order_id;
        Err(AdapterError::NotImplemented)
    }

    async fn query_order(&self, order_id: &OrderId) -> AdapterResult<OrderInfo> {
        let _ = order_id;
        Err(AdapterError::NotImplemented)
    }

    async fn withdraw(
        &self,
        currency: CurrencyCode,
        amount: MonetaryAmount,
        destination_address: &str,
    ) -> AdapterResult<WithdrawId> {
        let _ = (currency, amount, destination_address);
        Err(AdapterError::NotImplemented)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::exchange_name::ExchangeName;

    #[tokio::test]
    async fn a_marker_adapter_reports_its_own_name_but_nothing_else() {
        let kraken = Kraken::default();
        assert_eq!(kraken.name(), ExchangeName::Kraken);
        assert!(matches!(kraken.health_check().await, Err(AdapterError::NotImplemented)));
        assert!(matches!(kraken.currencies().await, Err(AdapterError::NotImplemented)));
    }
}
