//! The user-supplied trading algorithm interface replayed by
//! [`crate::trading::MarketTraderEngine`], plus two reference
//! implementations used as fixtures and documentation.

use crate::trading::command::{PriceStrategy, TraderCommand};
use crate::trading::view::MarketDataView;
use crate::trade_side::TradeSide;

/// A trading algorithm: given the market data seen so far, decide the next
/// move. Called exactly once per replayed order book.
pub trait MarketTrader {
    fn name(&self) -> &str;

    fn trade(&mut self, view: &MarketDataView<'_>) -> TraderCommand;
}

/// Always waits. Useful as a no-op fixture to test that an engine with no
/// trading activity produces a zero P&L.
#[derive(Default)]
pub struct DummyMarketTrader;

impl MarketTrader for DummyMarketTrader {
    fn name(&self) -> &str {
        "dummy-trader"
    }

    fn trade(&mut self, _view: &MarketDataView<'_>) -> TraderCommand {
        TraderCommand::Wait
    }
}

/// Alternates a full-intensity taker sell and a full-intensity taker buy on
/// every tick. Exercises both trade sides with a single, predictable
/// strategy; useful as an engine test fixture.
pub struct ExampleMarketTrader {
    next_side: TradeSide,
}

impl Default for ExampleMarketTrader {
    fn default() -> Self {
        ExampleMarketTrader { next_side: TradeSide::Sell }
    }
}

impl MarketTrader for ExampleMarketTrader {
    fn name(&self) -> &str {
        "example-trader"
    }

    fn trade(&mut self, _view: &MarketDataView<'_>) -> TraderCommand {
        let side = self.next_side;
        self.next_side = match side {
            TradeSide::Buy => TradeSide::Sell,
            TradeSide::Sell => TradeSide::Buy,
        };
        TraderCommand::place(side, 100, PriceStrategy::Taker)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn dummy_trader_always_waits() {
        let view = MarketDataView::new(&[], &[]);
        let mut trader = DummyMarketTrader;
        assert_eq!(trader.trade(&view), TraderCommand::Wait);
    }

    #[test]
    fn example_trader_alternates_sides() {
        let view = MarketDataView::new(&[], &[]);
        let mut trader = ExampleMarketTrader::default();
        let first = trader.trade(&view);
        let second = trader.trade(&view);
        assert_eq!(first, TraderCommand::place(TradeSide::Sell, 100, PriceStrategy::Taker));
        assert_eq!(second, TraderCommand::place(TradeSide::Buy, 100, PriceStrategy::Taker));
    }
}
