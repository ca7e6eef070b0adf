//! Rolling window of historical order books and public trades exposed to the
//! user algorithm on each replay tick.

use chrono::{DateTime, Utc};

use crate::orderbook::MarketOrderBook;
use crate::trading::public_trade::PublicTrade;

pub struct MarketDataView<'a> {
    order_books: &'a [MarketOrderBook],
    public_trades: &'a [PublicTrade],
    current_order_book_end: usize,
    current_trades_begin: usize,
    current_trades_end: usize,
}

impl<'a> MarketDataView<'a> {
    pub(crate) fn new(order_books: &'a [MarketOrderBook], public_trades: &'a [PublicTrade]) -> Self {
        MarketDataView {
            order_books,
            public_trades,
            current_order_book_end: 0,
            current_trades_begin: 0,
            current_trades_end: 0,
        }
    }

    /// Advances the view to include every order book and trade up to (and
    /// including) `time`.
    pub(crate) fn advance_until(&mut self, time: DateTime<Utc>) {
        while self.current_order_book_end < self.order_books.len()
            && self.order_books[self.current_order_book_end].time() <= time
        {
            self.current_order_book_end += 1;
        }
        self.current_trades_begin = self.current_trades_end;
        while self.current_trades_end < self.public_trades.len()
            && self.public_trades[self.current_trades_end].time() <= time
        {
            self.current_trades_end += 1;
        }
    }

    /// `None` if no order book has been advanced into the view yet. The
    /// original implementation indexes a raw pointer here, which is
    /// undefined behavior if called too early; returning `Option` trades
    /// that for an explicit check.
    pub fn current_market_order_book(&self) -> Option<&MarketOrderBook> {
        self.current_order_book_end.checked_sub(1).map(|i| &self.order_books[i])
    }

    pub fn past_market_order_books(&self) -> &[MarketOrderBook] {
        &self.order_books[..self.current_order_book_end]
    }

    pub fn current_public_trades(&self) -> &[PublicTrade] {
        &self.public_trades[self.current_trades_begin..self.current_trades_end]
    }

    pub fn past_public_trades(&self) -> &[PublicTrade] {
        &self.public_trades[..self.current_trades_end]
    }
}
