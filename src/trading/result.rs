//! The outcome of a complete replay, returned by
//! [`crate::trading::MarketTraderEngine::finalize_and_compute_result`].

use crate::money::MonetaryAmount;
use crate::trading::order::ClosedOrder;

#[derive(Clone, Debug, PartialEq)]
pub struct MarketTradingResult {
    pub algorithm_name: String,
    pub start_base_amount: MonetaryAmount,
    pub start_quote_amount: MonetaryAmount,
    pub quote_amount_delta: MonetaryAmount,
    pub matched_orders: Vec<ClosedOrder>,
}
