//! Synthetic balances and order books maintained by the trading engine
//! across a replay.

use chrono::{DateTime, Utc};

use crate::error::{TradingError, TradingResult};
use crate::money::MonetaryAmount;
use crate::trade_side::TradeSide;
use crate::trading::command::TraderCommand;
use crate::trading::fees::{FeeType, TradeFees};
use crate::trading::order::{ClosedOrder, OpenedOrder};

pub struct TradeEngineState {
    available_base: MonetaryAmount,
    available_quote: MonetaryAmount,
    opened_orders: Vec<OpenedOrder>,
    closed_orders: Vec<ClosedOrder>,
    next_order_id: i64,
}

impl TradeEngineState {
    pub fn new(start_base: MonetaryAmount, start_quote: MonetaryAmount) -> Self {
        TradeEngineState {
            available_base: start_base,
            available_quote: start_quote,
            opened_orders: Vec::new(),
            closed_orders: Vec::new(),
            next_order_id: 1,
        }
    }

    pub fn available_base_amount(&self) -> MonetaryAmount {
        self.available_base
    }

    pub fn available_quote_amount(&self) -> MonetaryAmount {
        self.available_quote
    }

    pub fn opened_orders(&self) -> &[OpenedOrder] {
        &self.opened_orders
    }

    pub fn closed_orders(&self) -> &[ClosedOrder] {
        &self.closed_orders
    }

    pub fn compute_buy_from(&self, intensity_percentage: i8) -> TradingResult<MonetaryAmount> {
        Ok(self
            .available_quote
            .checked_mul_scalar(intensity_percentage as i64)?
            .checked_div_scalar(100)?)
    }

    pub fn compute_sell_volume(&self, intensity_percentage: i8) -> TradingResult<MonetaryAmount> {
        Ok(self
            .available_base
            .checked_mul_scalar(intensity_percentage as i64)?
            .checked_div_scalar(100)?)
    }

    fn next_order_id(&mut self) -> i64 {
        let id = self.next_order_id;
        self.next_order_id += 1;
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn place_buy_order(
        &mut self,
        fees: &TradeFees,
        placed_time: DateTime<Utc>,
        remaining_volume: MonetaryAmount,
        price: MonetaryAmount,
        matched_volume: MonetaryAmount,
        from: MonetaryAmount,
        fee_type: FeeType,
    ) -> TradingResult<()> {
        self.available_base = self.available_base.checked_add(fees.apply_fee(matched_volume, fee_type)?)?;
        self.available_quote = self.available_quote.checked_sub(from)?;

        let id = self.next_order_id();
        if remaining_volume.is_zero() {
            self.closed_orders
                .push(ClosedOrder::new(id, matched_volume, price, placed_time, placed_time, TradeSide::Buy));
        } else {
            self.opened_orders
                .push(OpenedOrder::new(id, matched_volume, remaining_volume, price, placed_time, TradeSide::Buy));
        }
        Ok(())
    }

    pub fn place_sell_order(
        &mut self,
        fees: &TradeFees,
        placed_time: DateTime<Utc>,
        remaining_volume: MonetaryAmount,
        price: MonetaryAmount,
        matched_volume: MonetaryAmount,
        fee_type: FeeType,
    ) -> TradingResult<()> {
        self.available_base = self.available_base.checked_sub(remaining_volume.checked_add(matched_volume)?)?;
        let proceeds = matched_volume.to_neutral().checked_mul(price)?;
        self.available_quote = self.available_quote.checked_add(fees.apply_fee(proceeds, fee_type)?)?;

        let id = self.next_order_id();
        if remaining_volume.is_zero() {
            self.closed_orders
                .push(ClosedOrder::new(id, matched_volume, price, placed_time, placed_time, TradeSide::Sell));
        } else {
            self.opened_orders
                .push(OpenedOrder::new(id, matched_volume, remaining_volume, price, placed_time, TradeSide::Sell));
        }
        Ok(())
    }

    pub fn adjust_opened_order_remaining_volume(
        &mut self,
        order_id: i64,
        newly_matched: MonetaryAmount,
    ) -> TradingResult<()> {
        let order = self
            .opened_orders
            .iter_mut()
            .find(|o| o.id() == order_id)
            .ok_or(TradingError::OrderNotFound(order_id))?;
        *order = order.with_additional_match(newly_matched);
        Ok(())
    }

    pub fn count_matched_part(
        &mut self,
        fees: &TradeFees,
        matched_order: &OpenedOrder,
        price: MonetaryAmount,
        newly_matched: MonetaryAmount,
        matched_time: DateTime<Utc>,
    ) -> TradingResult<()> {
        match matched_order.side() {
            TradeSide::Buy => {
                self.available_base = self
                    .available_base
                    .checked_add(fees.apply_fee(newly_matched, FeeType::Maker)?)?;
            }
            TradeSide::Sell => {
                let proceeds = newly_matched.to_neutral().checked_mul(price)?;
                self.available_quote = self
                    .available_quote
                    .checked_add(fees.apply_fee(proceeds, FeeType::Maker)?)?;
            }
        }

        let new_closed = ClosedOrder::new(
            matched_order.id(),
            newly_matched,
            price,
            matched_order.placed_time(),
            matched_time,
            matched_order.side(),
        );

        match self.closed_orders.iter_mut().rev().find(|c| c.id() == matched_order.id()) {
            Some(existing) => *existing = existing.merge_with(&new_closed)?,
            None => self.closed_orders.push(new_closed),
        }
        Ok(())
    }

    pub fn find_opened_order(&self, order_id: i64) -> TradingResult<OpenedOrder> {
        self.opened_orders
            .iter()
            .find(|o| o.id() == order_id)
            .copied()
            .ok_or(TradingError::OrderNotFound(order_id))
    }

    pub fn cancel_opened_order(&mut self, order_id: i64) -> TradingResult<()> {
        let position = self
            .opened_orders
            .iter()
            .position(|o| o.id() == order_id)
            .ok_or(TradingError::OrderNotFound(order_id))?;
        let order = self.opened_orders.remove(position);
        self.adjust_available_amounts_cancel(&order)
    }

    pub fn cancel_all_opened_orders(&mut self) -> TradingResult<()> {
        for order in std::mem::take(&mut self.opened_orders) {
            self.adjust_available_amounts_cancel(&order)?;
        }
        Ok(())
    }

    fn adjust_available_amounts_cancel(&mut self, order: &OpenedOrder) -> TradingResult<()> {
        match order.side() {
            TradeSide::Buy => {
                self.available_quote = self
                    .available_quote
                    .checked_add(order.remaining_volume().to_neutral().checked_mul(order.price())?)?;
            }
            TradeSide::Sell => {
                self.available_base = self.available_base.checked_add(order.remaining_volume())?;
            }
        }
        Ok(())
    }

    pub fn erase_closed_opened_orders(&mut self, ids: &[i64]) {
        self.opened_orders.retain(|o| !ids.contains(&o.id()));
    }

    /// Resolves the `(from, volume)` a [`TraderCommand::Buy`]/`Sell` command
    /// should place, or `None` if the computed amount is zero (a no-op).
    pub fn resolve_place_amount(&self, command: &TraderCommand) -> TradingResult<Option<(TradeSide, MonetaryAmount)>> {
        match *command {
            TraderCommand::Buy { intensity_percentage, .. } => {
                let from = self.compute_buy_from(intensity_percentage)?;
                Ok((!from.is_zero()).then_some((TradeSide::Buy, from)))
            }
            TraderCommand::Sell { intensity_percentage, .. } => {
                let volume = self.compute_sell_volume(intensity_percentage)?;
                Ok((!volume.is_zero()).then_some((TradeSide::Sell, volume)))
            }
            _ => Err(TradingError::UnsupportedCommand),
        }
    }
}
