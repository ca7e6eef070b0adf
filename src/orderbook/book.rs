//! Sorted asks/bids at a timestamp, with the conversion and matching queries
//! that price trades against the book.

use chrono::{DateTime, Utc};

use crate::error::{MoneyError, OrderBookError, OrderBookResult};
use crate::market::Market;
use crate::money::MonetaryAmount;
use crate::orderbook::line::{BookSide, OrderBookLineInput, PackedLine};
use crate::trade_side::TradeSide;

/// A sorted vector of bid/ask lines. Bids occupy `[0, ask_start)`, asks
/// `[ask_start, len)`; prices are strictly increasing across the whole
/// vector, which is what guarantees `highest_bid < lowest_ask`.
#[derive(Clone, Debug)]
pub struct MarketOrderBook {
    market: Market,
    lines: Vec<PackedLine>,
    ask_start: usize,
    vol_decimals: i8,
    price_decimals: i8,
    time: DateTime<Utc>,
    artificially_extended: bool,
}

impl MarketOrderBook {
    /// Builds a book from a flat list of bid/ask lines. Lines are sorted by
    /// ascending price and lines sharing a price are coalesced by summing
    /// their amounts. A crossed or unsorted result is rejected.
    pub fn new(
        market: Market,
        input_lines: Vec<OrderBookLineInput>,
        vol_decimals: i8,
        price_decimals: i8,
        time: DateTime<Utc>,
    ) -> OrderBookResult<Self> {
        Self::build(market, input_lines, vol_decimals, price_decimals, time, false)
    }

    /// Materializes a synthetic book of `2*depth+1` entries from a ticker's
    /// best bid/ask, stepping price by `price_step` and halving volume at
    /// each successive level. Marked as artificially extended: callers must
    /// not trust fills deeper than this synthetic depth.
    #[allow(clippy::too_many_arguments)]
    pub fn from_ticker(
        market: Market,
        bid_price: MonetaryAmount,
        bid_volume: MonetaryAmount,
        ask_price: MonetaryAmount,
        ask_volume: MonetaryAmount,
        depth: usize,
        price_step: MonetaryAmount,
        vol_decimals: i8,
        price_decimals: i8,
        time: DateTime<Utc>,
    ) -> OrderBookResult<Self> {
        if bid_price >= ask_price {
            return Err(OrderBookError::InvalidOrderBook(
                "ticker bid price is not below ask price".to_string(),
            ));
        }
        let mut input_lines = Vec::with_capacity(depth * 2);
        for i in 0..depth {
            let step = price_step.checked_mul_scalar(i as i64)?;
            let divisor = 1i64 << i.min(62);
            let bid_p = bid_price.checked_sub(step)?;
            let bid_v = bid_volume.checked_div_scalar(divisor)?;
            input_lines.push(OrderBookLineInput::bid(bid_v, bid_p));
            let ask_p = ask_price.checked_add(step)?;
            let ask_v = ask_volume.checked_div_scalar(divisor)?;
            input_lines.push(OrderBookLineInput::ask(ask_v, ask_p));
        }
        Self::build(market, input_lines, vol_decimals, price_decimals, time, true)
    }

    fn build(
        market: Market,
        input_lines: Vec<OrderBookLineInput>,
        vol_decimals: i8,
        price_decimals: i8,
        time: DateTime<Utc>,
        artificially_extended: bool,
    ) -> OrderBookResult<Self> {
        let mut packed = Vec::with_capacity(input_lines.len());
        for line in input_lines {
            let price_ticks = line
                .price
                .amount_at(price_decimals)
                .ok_or_else(|| OrderBookError::InvalidOrderBook("price overflows book precision".to_string()))?;
            let amount_ticks = line
                .amount
                .amount_at(vol_decimals)
                .ok_or_else(|| OrderBookError::InvalidOrderBook("amount overflows book precision".to_string()))?;
            let signed = match line.side {
                BookSide::Bid => amount_ticks,
                BookSide::Ask => -amount_ticks,
            };
            if signed != 0 {
                packed.push(PackedLine {
                    amount_ticks: signed,
                    price_ticks,
                });
            }
        }
        packed.sort_by_key(|l| l.price_ticks);
        let mut merged: Vec<PackedLine> = Vec::with_capacity(packed.len());
        for line in packed {
            if let Some(last) = merged.last_mut() {
                if last.price_ticks == line.price_ticks {
                    last.amount_ticks += line.amount_ticks;
                    continue;
                }
            }
            merged.push(line);
        }
        merged.retain(|l| l.amount_ticks != 0);

        let ask_start = merged
            .iter()
            .position(|l| l.amount_ticks < 0)
            .unwrap_or(merged.len());
        if merged[..ask_start].iter().any(|l| l.amount_ticks <= 0)
            || merged[ask_start..].iter().any(|l| l.amount_ticks >= 0)
        {
            return Err(OrderBookError::InvalidOrderBook(
                "order book is crossed or unsorted".to_string(),
            ));
        }

        Ok(MarketOrderBook {
            market,
            lines: merged,
            ask_start,
            vol_decimals,
            price_decimals,
            time,
            artificially_extended,
        })
    }

    pub fn market(&self) -> Market {
        self.market
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn is_artificially_extended(&self) -> bool {
        self.artificially_extended
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Structural validity of the book. Always `true` in this
    /// implementation: a crossed or negative-amount book cannot be
    /// constructed in the first place (see `build`). Kept as a method so
    /// replay validation can treat order books uniformly with public trades,
    /// whose `is_valid` does carry real checks.
    pub fn is_valid(&self) -> bool {
        true
    }

    fn base(&self) -> crate::money::CurrencyCode {
        self.market.base()
    }

    fn quote(&self) -> crate::money::CurrencyCode {
        self.market.quote()
    }

    fn amount_of(&self, ticks: i64) -> MonetaryAmount {
        MonetaryAmount::new(ticks, self.base(), self.vol_decimals)
    }

    fn price_of(&self, ticks: i64) -> MonetaryAmount {
        MonetaryAmount::new(ticks, self.quote(), self.price_decimals)
    }

    pub fn highest_bid_price(&self) -> Option<MonetaryAmount> {
        (self.ask_start > 0).then(|| self.price_of(self.lines[self.ask_start - 1].price_ticks))
    }

    pub fn lowest_ask_price(&self) -> Option<MonetaryAmount> {
        self.lines
            .get(self.ask_start)
            .map(|l| self.price_of(l.price_ticks))
    }

    pub fn amount_at_bid(&self) -> Option<MonetaryAmount> {
        (self.ask_start > 0).then(|| self.amount_of(self.lines[self.ask_start - 1].amount_ticks))
    }

    pub fn amount_at_ask(&self) -> Option<MonetaryAmount> {
        self.lines
            .get(self.ask_start)
            .map(|l| self.amount_of(-l.amount_ticks))
    }

    pub fn average_price(&self) -> Option<MonetaryAmount> {
        let bid = self.highest_bid_price()?;
        let ask = self.lowest_ask_price()?;
        bid.checked_add(ask).ok()?.checked_div_scalar(2).ok()
    }

    /// `i < 0` reads down the bid book (`-1` is the highest bid), `i > 0` up
    /// the ask book (`1` is the lowest ask), `i == 0` is the average price.
    pub fn index(&self, i: i64) -> Option<MonetaryAmount> {
        if i == 0 {
            return self.average_price();
        }
        if i < 0 {
            let offset = (-i) as usize;
            if offset > self.ask_start {
                return None;
            }
            Some(self.price_of(self.lines[self.ask_start - offset].price_ticks))
        } else {
            let idx = self.ask_start + (i as usize) - 1;
            self.lines.get(idx).map(|l| self.price_of(l.price_ticks))
        }
    }

    pub fn cumul_amount_bought_at(&self, price: MonetaryAmount) -> OrderBookResult<MonetaryAmount> {
        self.require_quote(price)?;
        let mut total = MonetaryAmount::zero(self.base());
        for line in &self.lines[self.ask_start..] {
            let level_price = self.price_of(line.price_ticks);
            if level_price > price {
                break;
            }
            total = total.checked_add(self.amount_of(-line.amount_ticks))?;
        }
        Ok(total)
    }

    pub fn cumul_amount_sold_at(&self, price: MonetaryAmount) -> OrderBookResult<MonetaryAmount> {
        self.require_quote(price)?;
        let mut total = MonetaryAmount::zero(self.base());
        for line in self.lines[..self.ask_start].iter().rev() {
            let level_price = self.price_of(line.price_ticks);
            if level_price < price {
                break;
            }
            total = total.checked_add(self.amount_of(line.amount_ticks))?;
        }
        Ok(total)
    }

    pub fn max_price_to_buy(&self, amount: MonetaryAmount) -> OrderBookResult<Option<MonetaryAmount>> {
        let mut cumulated = MonetaryAmount::zero(self.base());
        let mut last_price = None;
        for line in &self.lines[self.ask_start..] {
            cumulated = cumulated.checked_add(self.amount_of(-line.amount_ticks))?;
            last_price = Some(self.price_of(line.price_ticks));
            if cumulated >= amount {
                return Ok(last_price);
            }
        }
        Ok(None)
    }

    pub fn min_price_to_sell(&self, amount: MonetaryAmount) -> OrderBookResult<Option<MonetaryAmount>> {
        let mut cumulated = MonetaryAmount::zero(self.base());
        let mut last_price = None;
        for line in self.lines[..self.ask_start].iter().rev() {
            cumulated = cumulated.checked_add(self.amount_of(line.amount_ticks))?;
            last_price = Some(self.price_of(line.price_ticks));
            if cumulated >= amount {
                return Ok(last_price);
            }
        }
        Ok(None)
    }

    fn require_quote(&self, price: MonetaryAmount) -> OrderBookResult<()> {
        if !price.currency_code().is_neutral() && price.currency_code() != self.quote() {
            return Err(MoneyError::CurrencyMismatch.into());
        }
        Ok(())
    }

    /// Full-depth market-price conversion. `None` if the book does not have
    /// enough volume to absorb `amount` entirely.
    pub fn convert(&self, amount: MonetaryAmount) -> OrderBookResult<Option<MonetaryAmount>> {
        if amount.currency_code() == self.base() {
            if amount.is_zero() {
                return Ok(Some(MonetaryAmount::zero(self.quote())));
            }
            let mut remaining = amount;
            let mut quote_total = MonetaryAmount::zero(self.quote());
            for line in self.lines[..self.ask_start].iter().rev() {
                if remaining.is_zero() {
                    break;
                }
                let level_price = self.price_of(line.price_ticks);
                let level_amount = self.amount_of(line.amount_ticks);
                let matched = if level_amount <= remaining { level_amount } else { remaining };
                quote_total = quote_total.checked_add(level_price.checked_mul(matched.to_neutral())?)?;
                remaining = remaining.checked_sub(matched)?;
            }
            Ok(remaining.is_zero().then_some(quote_total))
        } else if amount.currency_code() == self.quote() {
            if amount.is_zero() {
                return Ok(Some(MonetaryAmount::zero(self.base())));
            }
            let mut remaining = amount;
            let mut base_total = MonetaryAmount::zero(self.base());
            for line in &self.lines[self.ask_start..] {
                if remaining.is_zero() {
                    break;
                }
                let level_price = self.price_of(line.price_ticks);
                let level_amount = self.amount_of(-line.amount_ticks);
                let level_value = level_price.checked_mul(level_amount.to_neutral())?;
                let from_i = if level_value <= remaining { level_value } else { remaining };
                let matched = from_i
                    .to_neutral()
                    .checked_div(level_price)?
                    .with_currency_code(self.base());
                base_total = base_total.checked_add(matched)?;
                remaining = remaining.checked_sub(from_i)?;
            }
            Ok(remaining.is_zero().then_some(base_total))
        } else {
            Err(MoneyError::CurrencyMismatch.into())
        }
    }

    /// Simulates a taker order consuming `input` (in base or quote currency),
    /// walking the opposite side until exhausted or the book ends. Returns
    /// `(matched, avg_price)`: `matched` is always in base currency (the
    /// volume actually filled, ready to credit/debit a base balance
    /// directly), `avg_price` is always in quote currency. Both are zero on
    /// an empty book or zero input.
    pub fn avg_price_and_matched_amount_taker(
        &self,
        input: MonetaryAmount,
    ) -> OrderBookResult<(MonetaryAmount, MonetaryAmount)> {
        if input.currency_code() == self.base() {
            self.taker_sell(input)
        } else if input.currency_code() == self.quote() || input.currency_code().is_neutral() {
            self.taker_buy(input)
        } else {
            Err(MoneyError::CurrencyMismatch.into())
        }
    }

    fn taker_buy(&self, from_quote: MonetaryAmount) -> OrderBookResult<(MonetaryAmount, MonetaryAmount)> {
        let mut remaining = from_quote.with_currency_code(self.quote());
        let mut base_matched = MonetaryAmount::zero(self.base());
        let mut weighted_sum = MonetaryAmount::zero(self.quote());
        for line in &self.lines[self.ask_start..] {
            if remaining.is_zero() {
                break;
            }
            let level_price = self.price_of(line.price_ticks);
            let level_amount = self.amount_of(-line.amount_ticks);
            let level_value = level_price.checked_mul(level_amount.to_neutral())?;
            let from_i = if level_value <= remaining { level_value } else { remaining };
            if from_i.is_zero() {
                continue;
            }
            let matched_i = from_i
                .to_neutral()
                .checked_div(level_price)?
                .with_currency_code(self.base());
            base_matched = base_matched.checked_add(matched_i)?;
            weighted_sum = weighted_sum.checked_add(from_i)?;
            remaining = remaining.checked_sub(from_i)?;
        }
        if base_matched.is_zero() {
            Ok((MonetaryAmount::zero(self.base()), MonetaryAmount::zero(self.quote())))
        } else {
            let avg = weighted_sum.checked_div(base_matched.to_neutral())?;
            Ok((base_matched, avg))
        }
    }

    fn taker_sell(&self, volume_base: MonetaryAmount) -> OrderBookResult<(MonetaryAmount, MonetaryAmount)> {
        let mut remaining = volume_base.with_currency_code(self.base());
        let mut quote_matched = MonetaryAmount::zero(self.quote());
        let mut base_matched = MonetaryAmount::zero(self.base());
        for line in self.lines[..self.ask_start].iter().rev() {
            if remaining.is_zero() {
                break;
            }
            let level_price = self.price_of(line.price_ticks);
            let level_amount = self.amount_of(line.amount_ticks);
            let matched_i = if level_amount <= remaining { level_amount } else { remaining };
            if matched_i.is_zero() {
                continue;
            }
            let value_i = level_price.checked_mul(matched_i.to_neutral())?;
            quote_matched = quote_matched.checked_add(value_i)?;
            base_matched = base_matched.checked_add(matched_i)?;
            remaining = remaining.checked_sub(matched_i)?;
        }
        if base_matched.is_zero() {
            Ok((MonetaryAmount::zero(self.base()), MonetaryAmount::zero(self.quote())))
        } else {
            let avg = quote_matched.checked_div(base_matched.to_neutral())?;
            Ok((base_matched, avg))
        }
    }

    /// Simulates a resting limit order of `side` crossing the book up to
    /// `limit_price`, matching at most `volume` base units.
    pub fn avg_price_and_matched_volume(
        &self,
        side: TradeSide,
        volume: MonetaryAmount,
        limit_price: MonetaryAmount,
    ) -> OrderBookResult<(MonetaryAmount, MonetaryAmount)> {
        let parts = self.compute_matched_parts(side, volume, limit_price)?;
        let mut matched_base = MonetaryAmount::zero(self.base());
        let mut weighted_sum = MonetaryAmount::zero(self.quote());
        for (amount, price) in &parts {
            matched_base = matched_base.checked_add(*amount)?;
            weighted_sum = weighted_sum.checked_add(price.checked_mul(amount.to_neutral())?)?;
        }
        if matched_base.is_zero() {
            Ok((MonetaryAmount::zero(self.base()), MonetaryAmount::zero(self.quote())))
        } else {
            let avg = weighted_sum.checked_div(matched_base.to_neutral())?;
            Ok((matched_base, avg))
        }
    }

    /// Returns the list of `(amount, price)` fills a resting limit order of
    /// `side` would produce against the current book, up to `limit_price`.
    pub fn compute_matched_parts(
        &self,
        side: TradeSide,
        volume: MonetaryAmount,
        limit_price: MonetaryAmount,
    ) -> OrderBookResult<Vec<(MonetaryAmount, MonetaryAmount)>> {
        let mut remaining = volume.with_currency_code(self.base());
        let mut parts = Vec::new();
        match side {
            TradeSide::Buy => {
                for line in &self.lines[self.ask_start..] {
                    if remaining.is_zero() {
                        break;
                    }
                    let level_price = self.price_of(line.price_ticks);
                    if level_price > limit_price {
                        break;
                    }
                    let level_amount = self.amount_of(-line.amount_ticks);
                    let matched = if level_amount <= remaining { level_amount } else { remaining };
                    if matched.is_zero() {
                        continue;
                    }
                    parts.push((matched, level_price));
                    remaining = remaining.checked_sub(matched)?;
                }
            }
            TradeSide::Sell => {
                for line in self.lines[..self.ask_start].iter().rev() {
                    if remaining.is_zero() {
                        break;
                    }
                    let level_price = self.price_of(line.price_ticks);
                    if level_price < limit_price {
                        break;
                    }
                    let level_amount = self.amount_of(line.amount_ticks);
                    let matched = if level_amount <= remaining { level_amount } else { remaining };
                    if matched.is_zero() {
                        continue;
                    }
                    parts.push((matched, level_price));
                    remaining = remaining.checked_sub(matched)?;
                }
            }
        }
        Ok(parts)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::money::CurrencyCode;

    fn eth_eur_book() -> MarketOrderBook {
        let market = Market::new(CurrencyCode::new("ETH").unwrap(), CurrencyCode::new("EUR").unwrap());
        let lines = vec![
            OrderBookLineInput::bid(MonetaryAmount::parse("0.65").unwrap(), MonetaryAmount::parse("1300.50").unwrap()),
            OrderBookLineInput::bid(MonetaryAmount::parse("0.24").unwrap(), MonetaryAmount::parse("1301").unwrap()),
            OrderBookLineInput::ask(MonetaryAmount::parse("1.4009").unwrap(), MonetaryAmount::parse("1302").unwrap()),
            OrderBookLineInput::ask(MonetaryAmount::parse("3.78").unwrap(), MonetaryAmount::parse("1302.50").unwrap()),
            OrderBookLineInput::ask(MonetaryAmount::parse("56.10001267").unwrap(), MonetaryAmount::parse("1303").unwrap()),
        ];
        MarketOrderBook::new(market, lines, 8, 8, Utc::now()).unwrap()
    }

    #[test]
    fn rejects_crossed_book() {
        let market = Market::new(CurrencyCode::new("ETH").unwrap(), CurrencyCode::new("EUR").unwrap());
        let lines = vec![
            OrderBookLineInput::bid(MonetaryAmount::parse("1").unwrap(), MonetaryAmount::parse("1305").unwrap()),
            OrderBookLineInput::ask(MonetaryAmount::parse("1").unwrap(), MonetaryAmount::parse("1300").unwrap()),
        ];
        assert!(MarketOrderBook::new(market, lines, 8, 8, Utc::now()).is_err());
    }

    #[test]
    fn best_bid_and_ask() {
        let book = eth_eur_book();
        assert_eq!(book.highest_bid_price().unwrap(), MonetaryAmount::parse("1301").unwrap());
        assert_eq!(book.lowest_ask_price().unwrap(), MonetaryAmount::parse("1302").unwrap());
    }

    #[test]
    fn convert_base_to_quote() {
        let book = eth_eur_book();
        let result = book.convert(MonetaryAmount::parse("0.56 ETH").unwrap()).unwrap().unwrap();
        assert_eq!(result, MonetaryAmount::parse("728.4 EUR").unwrap());
    }

    #[test]
    fn convert_quote_to_base() {
        let book = eth_eur_book();
        let result = book.convert(MonetaryAmount::parse("800 EUR").unwrap()).unwrap().unwrap();
        assert_eq!(result.currency_code(), CurrencyCode::new("ETH").unwrap());
        // Depth is ample: at least the first ask level alone (1.4009 ETH @
        // 1302 EUR = 1824.37 EUR) exceeds 800 EUR, so the whole amount
        // matches at a single level and the average price is exactly it.
        let expected = MonetaryAmount::parse("800").unwrap() / MonetaryAmount::parse("1302").unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn taker_average_matches_top_of_book_when_shallow() {
        let book = eth_eur_book();
        let (matched, avg) = book
            .avg_price_and_matched_amount_taker(MonetaryAmount::parse("1000 EUR").unwrap())
            .unwrap();
        assert!(!matched.is_zero());
        assert_eq!(matched.currency_code(), CurrencyCode::new("ETH").unwrap());
        assert_eq!(avg, MonetaryAmount::parse("1302 EUR").unwrap());
    }

    #[test]
    fn taker_matched_amount_is_always_base_currency() {
        let book = eth_eur_book();
        let (buy_matched, _) = book
            .avg_price_and_matched_amount_taker(MonetaryAmount::parse("500 EUR").unwrap())
            .unwrap();
        assert_eq!(buy_matched.currency_code(), CurrencyCode::new("ETH").unwrap());

        let (sell_matched, sell_avg) = book
            .avg_price_and_matched_amount_taker(MonetaryAmount::parse("0.5 ETH").unwrap())
            .unwrap();
        assert_eq!(sell_matched.currency_code(), CurrencyCode::new("ETH").unwrap());
        assert_eq!(sell_matched, MonetaryAmount::parse("0.5 ETH").unwrap());
        // 0.24 @ 1301 + 0.26 @ 1300.50 = (312.24 + 338.13) / 0.5 = 1300.74
        assert_eq!(sell_avg, MonetaryAmount::parse("1300.74 EUR").unwrap());
    }

    #[test]
    fn empty_book_returns_zero() {
        let market = Market::new(CurrencyCode::new("ETH").unwrap(), CurrencyCode::new("EUR").unwrap());
        let book = MarketOrderBook::new(market, vec![], 8, 8, Utc::now()).unwrap();
        let (matched, avg) = book
            .avg_price_and_matched_amount_taker(MonetaryAmount::parse("100 EUR").unwrap())
            .unwrap();
        assert!(matched.is_zero());
        assert!(avg.is_zero());
    }

    #[test]
    fn cumul_amount_bought_matches_top_of_book_at_ask_price() {
        let book = eth_eur_book();
        let at_ask = book.cumul_amount_bought_at(MonetaryAmount::parse("1302").unwrap()).unwrap();
        assert_eq!(at_ask, book.amount_at_ask().unwrap());
    }

    #[test]
    fn ticker_synthetic_book_is_never_crossed() {
        let market = Market::new(CurrencyCode::new("BTC").unwrap(), CurrencyCode::new("USDT").unwrap());
        let book = MarketOrderBook::from_ticker(
            market,
            MonetaryAmount::parse("29990").unwrap(),
            MonetaryAmount::parse("2").unwrap(),
            MonetaryAmount::parse("30010").unwrap(),
            MonetaryAmount::parse("2").unwrap(),
            5,
            MonetaryAmount::parse("1").unwrap(),
            8,
            2,
            Utc::now(),
        )
        .unwrap();
        assert!(book.is_artificially_extended());
        assert!(book.highest_bid_price().unwrap() < book.lowest_ask_price().unwrap());
    }
}
