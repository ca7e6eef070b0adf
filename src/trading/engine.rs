//! Replays historical order books and public trades for a single market
//! against a registered [`MarketTrader`], maintaining synthetic balances.

use chrono::{DateTime, Utc};

use crate::error::{TradingError, TradingResult};
use crate::market::Market;
use crate::money::MonetaryAmount;
use crate::orderbook::MarketOrderBook;
use crate::trade_side::TradeSide;
use crate::trading::algorithm::MarketTrader;
use crate::trading::command::{PriceStrategy, TraderCommand};
use crate::trading::fees::{FeeType, TradeFees};
use crate::trading::public_trade::PublicTrade;
use crate::trading::range_stats::{TradeRangeResultsStats, TradeRangeStats};
use crate::trading::result::MarketTradingResult;
use crate::trading::state::TradeEngineState;
use crate::trading::view::MarketDataView;

/// Anything a replay range can be validated and chronologically ordered by:
/// order books and public trades.
trait Replayable {
    fn is_valid(&self) -> bool;
    fn time(&self) -> DateTime<Utc>;
}

impl Replayable for MarketOrderBook {
    fn is_valid(&self) -> bool {
        MarketOrderBook::is_valid(self)
    }

    fn time(&self) -> DateTime<Utc> {
        MarketOrderBook::time(self)
    }
}

impl Replayable for PublicTrade {
    fn is_valid(&self) -> bool {
        PublicTrade::is_valid(self)
    }

    fn time(&self) -> DateTime<Utc> {
        PublicTrade::time(self)
    }
}

/// Drops invalid records and records out of chronological order (relative to
/// `earliest_possible_time` and each other), logging how many were dropped.
fn validate_range<T: Replayable>(vec: &mut Vec<T>, earliest_possible_time: DateTime<Utc>, kind: &str) -> TradeRangeResultsStats {
    let nb_successful = vec.len() as i32;

    let before_valid = vec.len();
    vec.retain(|obj| obj.is_valid());
    let nb_invalid = before_valid - vec.len();
    if nb_invalid != 0 {
        tracing::error!(kind, nb_invalid, "record(s) with invalid data detected");
    }

    let mut earliest = earliest_possible_time;
    let before_sorted = vec.len();
    vec.retain(|obj| {
        if obj.time() < earliest {
            false
        } else {
            earliest = obj.time();
            true
        }
    });
    let nb_unsorted = before_sorted - vec.len();
    if nb_unsorted != 0 {
        tracing::error!(kind, nb_unsorted, "record(s) are not in chronological order");
    }

    let time_window = match (vec.first(), vec.last()) {
        (Some(first), Some(last)) => Some((first.time(), last.time())),
        _ => None,
    };
    let nb_error = (nb_invalid + nb_unsorted) as i32;

    TradeRangeResultsStats {
        nb_successful: nb_successful - nb_error,
        nb_error,
        time_window,
    }
}

/// Per-market simulation engine: feeds historical market data to a
/// [`MarketTrader`] and executes the commands it returns against a synthetic
/// balance, one order book at a time.
pub struct MarketTraderEngine {
    market: Market,
    start_base_amount: MonetaryAmount,
    start_quote_amount: MonetaryAmount,
    fees: TradeFees,
    state: TradeEngineState,
    trader: Option<Box<dyn MarketTrader>>,
    last_order_book: Option<MarketOrderBook>,
}

impl MarketTraderEngine {
    pub fn new(
        market: Market,
        start_base_amount: MonetaryAmount,
        start_quote_amount: MonetaryAmount,
        fees: TradeFees,
    ) -> TradingResult<Self> {
        if market.base() != start_base_amount.currency_code() || market.quote() != start_quote_amount.currency_code() {
            return Err(TradingError::InconsistentMarket(format!(
                "{market} vs start amounts {start_base_amount} & {start_quote_amount}"
            )));
        }
        Ok(MarketTraderEngine {
            market,
            start_base_amount,
            start_quote_amount,
            fees,
            state: TradeEngineState::new(start_base_amount, start_quote_amount),
            trader: None,
            last_order_book: None,
        })
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn state(&self) -> &TradeEngineState {
        &self.state
    }

    pub fn register_market_trader(&mut self, trader: Box<dyn MarketTrader>) -> TradingResult<()> {
        if self.trader.is_some() {
            return Err(TradingError::TraderAlreadyRegistered);
        }
        self.trader = Some(trader);
        Ok(())
    }

    /// Validates, then replays, a batch of order books and public trades
    /// against the registered trader. Order books and trades failing
    /// validation are dropped and counted rather than aborting the replay.
    pub fn trade_range(
        &mut self,
        mut market_order_books: Vec<MarketOrderBook>,
        mut public_trades: Vec<PublicTrade>,
    ) -> TradingResult<TradeRangeStats> {
        let mut trader = self.trader.take().ok_or(TradingError::NoTraderRegistered)?;

        let earliest_possible_time = self
            .last_order_book
            .as_ref()
            .map(|book| book.time())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let stats = TradeRangeStats {
            market_order_book_stats: validate_range(&mut market_order_books, earliest_possible_time, "order book"),
            public_trade_stats: validate_range(&mut public_trades, earliest_possible_time, "trade"),
        };

        if market_order_books.is_empty() {
            self.trader = Some(trader);
            return Ok(stats);
        }

        tracing::info!(
            trader = trader.name(),
            market = %self.market,
            nb_order_books = market_order_books.len(),
            nb_trades = public_trades.len(),
            "replaying trade range",
        );

        let result = (|| -> TradingResult<()> {
            let mut view = MarketDataView::new(&market_order_books, &public_trades);

            for order_book in &market_order_books {
                self.check_opened_orders_matching(order_book)?;

                view.advance_until(order_book.time());

                let command = trader.trade(&view);
                self.dispatch(order_book, command)?;
            }
            Ok(())
        })();

        self.last_order_book = market_order_books.last().cloned();
        self.trader = Some(trader);
        result?;

        Ok(stats)
    }

    fn dispatch(&mut self, order_book: &MarketOrderBook, command: TraderCommand) -> TradingResult<()> {
        match command {
            TraderCommand::Wait => Ok(()),
            TraderCommand::Buy { strategy, .. } => match self.state.resolve_place_amount(&command)? {
                Some((_, from)) => self.buy(order_book, from, strategy),
                None => Ok(()),
            },
            TraderCommand::Sell { strategy, .. } => match self.state.resolve_place_amount(&command)? {
                Some((_, volume)) => self.sell(order_book, volume, strategy),
                None => Ok(()),
            },
            TraderCommand::UpdatePrice { order_id, strategy } => self.update_price(order_book, order_id, strategy),
            TraderCommand::Cancel { order_id } => self.cancel(order_id),
        }
    }

    fn buy(&mut self, order_book: &MarketOrderBook, from: MonetaryAmount, strategy: PriceStrategy) -> TradingResult<()> {
        match strategy {
            PriceStrategy::Maker => {
                let Some(price) = order_book.highest_bid_price() else { return Ok(()) };
                let remaining_volume = from.to_neutral().checked_div(price)?.with_currency_code(self.market.base());
                let matched_volume = MonetaryAmount::zero(self.market.base());
                self.state
                    .place_buy_order(&self.fees, order_book.time(), remaining_volume, price, matched_volume, from, FeeType::Maker)?;
            }
            PriceStrategy::Nibble => {
                let Some(price) = order_book.lowest_ask_price() else { return Ok(()) };
                let volume = from.to_neutral().checked_div(price)?.with_currency_code(self.market.base());
                let at_ask = order_book.amount_at_ask().unwrap_or(MonetaryAmount::zero(self.market.base()));
                let matched_volume = volume.min(at_ask);
                let remaining_volume = volume.checked_sub(matched_volume)?;
                self.state
                    .place_buy_order(&self.fees, order_book.time(), remaining_volume, price, matched_volume, from, FeeType::Taker)?;
            }
            PriceStrategy::Taker => {
                let (matched_volume, avg_price) = order_book.avg_price_and_matched_amount_taker(from)?;
                if !matched_volume.is_zero() {
                    let remaining_volume = MonetaryAmount::zero(self.market.base());
                    self.state.place_buy_order(
                        &self.fees,
                        order_book.time(),
                        remaining_volume,
                        avg_price,
                        matched_volume,
                        from,
                        FeeType::Taker,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn sell(&mut self, order_book: &MarketOrderBook, volume: MonetaryAmount, strategy: PriceStrategy) -> TradingResult<()> {
        match strategy {
            PriceStrategy::Maker => {
                let Some(price) = order_book.lowest_ask_price() else { return Ok(()) };
                let matched_volume = MonetaryAmount::zero(self.market.base());
                self.state
                    .place_sell_order(&self.fees, order_book.time(), volume, price, matched_volume, FeeType::Maker)?;
            }
            PriceStrategy::Nibble => {
                let Some(price) = order_book.highest_bid_price() else { return Ok(()) };
                let at_bid = order_book.amount_at_bid().unwrap_or(MonetaryAmount::zero(self.market.base()));
                let matched_volume = volume.min(at_bid);
                let remaining_volume = volume.checked_sub(matched_volume)?;
                self.state
                    .place_sell_order(&self.fees, order_book.time(), remaining_volume, price, matched_volume, FeeType::Taker)?;
            }
            PriceStrategy::Taker => {
                let (matched_volume, avg_price) = order_book.avg_price_and_matched_amount_taker(volume)?;
                if !matched_volume.is_zero() {
                    let remaining_volume = MonetaryAmount::zero(self.market.base());
                    self.state.place_sell_order(
                        &self.fees,
                        order_book.time(),
                        remaining_volume,
                        avg_price,
                        matched_volume,
                        FeeType::Taker,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn update_price(&mut self, order_book: &MarketOrderBook, order_id: i64, strategy: PriceStrategy) -> TradingResult<()> {
        let order = self.state.find_opened_order(order_id)?;
        self.state.cancel_opened_order(order_id)?;

        match order.side() {
            TradeSide::Buy => {
                let from = order.remaining_volume().to_neutral().checked_mul(order.price())?;
                self.buy(order_book, from, strategy)
            }
            TradeSide::Sell => self.sell(order_book, order.remaining_volume(), strategy),
        }
    }

    fn cancel(&mut self, order_id: Option<i64>) -> TradingResult<()> {
        match order_id {
            None => self.state.cancel_all_opened_orders(),
            Some(id) => self.state.cancel_opened_order(id),
        }
    }

    /// Matches resting opened orders against a freshly arrived order book,
    /// closing or partially filling them before the trader sees this tick.
    fn check_opened_orders_matching(&mut self, order_book: &MarketOrderBook) -> TradingResult<()> {
        let mut newly_closed = Vec::new();
        for order in self.state.opened_orders().to_vec() {
            let (newly_matched, avg_price) =
                order_book.avg_price_and_matched_volume(order.side(), order.remaining_volume(), order.price())?;
            if newly_matched.is_zero() {
                continue;
            }

            self.state
                .count_matched_part(&self.fees, &order, avg_price, newly_matched, order_book.time())?;

            if newly_matched == order.remaining_volume() {
                newly_closed.push(order.id());
            } else {
                self.state.adjust_opened_order_remaining_volume(order.id(), newly_matched)?;
            }
        }
        self.state.erase_closed_opened_orders(&newly_closed);
        Ok(())
    }

    /// Cancels every still-open order and computes the P&L, expressed
    /// entirely in quote currency: the quote balance change, plus the base
    /// balance change converted at the last seen order book's taker price.
    pub fn finalize_and_compute_result(&mut self) -> TradingResult<MarketTradingResult> {
        self.state.cancel_all_opened_orders()?;

        let mut quote_amount_delta = self.state.available_quote_amount().checked_sub(self.start_quote_amount)?;
        let base_amount_delta = self.state.available_base_amount().checked_sub(self.start_base_amount)?;

        match &self.last_order_book {
            Some(book) => {
                let (_, avg_price) = book.avg_price_and_matched_amount_taker(base_amount_delta.abs())?;
                quote_amount_delta = quote_amount_delta.checked_add(base_amount_delta.to_neutral().checked_mul(avg_price)?)?;
            }
            None => {
                tracing::debug!("finalizing a market trader engine that was never run");
            }
        }

        let algorithm_name = self.trader.as_ref().map(|t| t.name().to_string()).unwrap_or_default();

        Ok(MarketTradingResult {
            algorithm_name,
            start_base_amount: self.start_base_amount,
            start_quote_amount: self.start_quote_amount,
            quote_amount_delta,
            matched_orders: self.state.closed_orders().to_vec(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::money::CurrencyCode;
    use crate::orderbook::OrderBookLineInput;
    use crate::trading::algorithm::DummyMarketTrader;
    use crate::trading::command::TraderCommand;

    fn cur(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn book_at(time: DateTime<Utc>) -> MarketOrderBook {
        let market = Market::new(cur("ETH"), cur("EUR"));
        let lines = vec![
            OrderBookLineInput::bid(MonetaryAmount::parse("0.65").unwrap(), MonetaryAmount::parse("1300.50").unwrap()),
            OrderBookLineInput::bid(MonetaryAmount::parse("0.24").unwrap(), MonetaryAmount::parse("1301").unwrap()),
            OrderBookLineInput::ask(MonetaryAmount::parse("1.4009").unwrap(), MonetaryAmount::parse("1302").unwrap()),
            OrderBookLineInput::ask(MonetaryAmount::parse("3.78").unwrap(), MonetaryAmount::parse("1302.50").unwrap()),
        ];
        MarketOrderBook::new(market, lines, 8, 8, time).unwrap()
    }

    #[test]
    fn rejects_a_market_inconsistent_with_start_amounts() {
        let market = Market::new(cur("ETH"), cur("EUR"));
        let err = MarketTraderEngine::new(
            market,
            MonetaryAmount::new(1, cur("BTC"), 0),
            MonetaryAmount::new(1000, cur("EUR"), 0),
            TradeFees::zero(),
        )
        .unwrap_err();
        assert!(matches!(err, TradingError::InconsistentMarket(_)));
    }

    #[test]
    fn cannot_register_two_traders() {
        let market = Market::new(cur("ETH"), cur("EUR"));
        let mut engine = MarketTraderEngine::new(
            market,
            MonetaryAmount::new(10, cur("ETH"), 0),
            MonetaryAmount::new(10000, cur("EUR"), 0),
            TradeFees::zero(),
        )
        .unwrap();
        engine.register_market_trader(Box::new(DummyMarketTrader)).unwrap();
        assert_eq!(
            engine.register_market_trader(Box::new(DummyMarketTrader)).unwrap_err(),
            TradingError::TraderAlreadyRegistered
        );
    }

    #[test]
    fn a_dummy_trader_yields_zero_pnl() {
        let market = Market::new(cur("ETH"), cur("EUR"));
        let start_base = MonetaryAmount::new(10, cur("ETH"), 0);
        let start_quote = MonetaryAmount::new(10000, cur("EUR"), 0);
        let mut engine = MarketTraderEngine::new(market, start_base, start_quote, TradeFees::zero()).unwrap();
        engine.register_market_trader(Box::new(DummyMarketTrader)).unwrap();

        let t0 = Utc::now();
        let books = vec![book_at(t0)];
        let stats = engine.trade_range(books, vec![]).unwrap();
        assert_eq!(stats.market_order_book_stats.nb_successful, 1);
        assert_eq!(stats.market_order_book_stats.nb_error, 0);

        let result = engine.finalize_and_compute_result().unwrap();
        assert!(result.quote_amount_delta.is_zero());
        assert!(result.matched_orders.is_empty());
    }

    #[test]
    fn a_taker_buy_reduces_quote_and_credits_base() {
        let market = Market::new(cur("ETH"), cur("EUR"));
        let start_base = MonetaryAmount::zero(cur("ETH"));
        let start_quote = MonetaryAmount::new(10000, cur("EUR"), 0);
        let mut engine = MarketTraderEngine::new(market, start_base, start_quote, TradeFees::zero()).unwrap();

        struct FullBuyOnce(bool);
        impl MarketTrader for FullBuyOnce {
            fn name(&self) -> &str {
                "full-buy-once"
            }
            fn trade(&mut self, _view: &MarketDataView<'_>) -> TraderCommand {
                if self.0 {
                    self.0 = false;
                    TraderCommand::buy(100, PriceStrategy::Taker)
                } else {
                    TraderCommand::Wait
                }
            }
        }

        engine.register_market_trader(Box::new(FullBuyOnce(true))).unwrap();
        engine.trade_range(vec![book_at(Utc::now())], vec![]).unwrap();

        assert!(engine.state().available_base_amount().amount() > 0);
        assert_eq!(engine.state().available_base_amount().currency_code(), cur("ETH"));
        assert!(engine.state().available_quote_amount() < start_quote);
        assert_eq!(engine.state().closed_orders().len(), 1);
    }

    #[test]
    fn invalid_trades_are_dropped_and_counted() {
        let market = Market::new(cur("ETH"), cur("EUR"));
        let start_base = MonetaryAmount::new(1, cur("ETH"), 0);
        let start_quote = MonetaryAmount::new(1000, cur("EUR"), 0);
        let mut engine = MarketTraderEngine::new(market, start_base, start_quote, TradeFees::zero()).unwrap();
        engine.register_market_trader(Box::new(DummyMarketTrader)).unwrap();

        let trades = vec![PublicTrade::new(TradeSide::Buy, MonetaryAmount::zero(cur("ETH")), MonetaryAmount::new(1300, cur("EUR"), 0), Utc::now())];
        let stats = engine.trade_range(vec![book_at(Utc::now())], trades).unwrap();
        assert_eq!(stats.public_trade_stats.nb_error, 1);
        assert_eq!(stats.public_trade_stats.nb_successful, 0);
    }
}
