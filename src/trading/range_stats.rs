//! Outcome of validating one batch of order books or public trades before
//! replay: how many records were accepted, how many were dropped, and the
//! time span the accepted records cover.

use chrono::{DateTime, Utc};

/// Validation outcome for a single kind of record (order books or trades).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TradeRangeResultsStats {
    pub nb_successful: i32,
    pub nb_error: i32,
    pub time_window: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl TradeRangeResultsStats {
    fn merge_window(
        a: Option<(DateTime<Utc>, DateTime<Utc>)>,
        b: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (a, b) {
            (None, other) => other,
            (other, None) => other,
            (Some((a_from, a_to)), Some((b_from, b_to))) => Some((a_from.min(b_from), a_to.max(b_to))),
        }
    }
}

impl std::ops::Add for TradeRangeResultsStats {
    type Output = TradeRangeResultsStats;
    fn add(self, rhs: TradeRangeResultsStats) -> TradeRangeResultsStats {
        TradeRangeResultsStats {
            nb_successful: self.nb_successful + rhs.nb_successful,
            nb_error: self.nb_error + rhs.nb_error,
            time_window: Self::merge_window(self.time_window, rhs.time_window),
        }
    }
}

impl std::ops::AddAssign for TradeRangeResultsStats {
    fn add_assign(&mut self, rhs: TradeRangeResultsStats) {
        *self = *self + rhs;
    }
}

/// Validation outcome of one ingested batch, for order books and trades
/// independently.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TradeRangeStats {
    pub market_order_book_stats: TradeRangeResultsStats,
    pub public_trade_stats: TradeRangeResultsStats,
}

impl std::ops::Add for TradeRangeStats {
    type Output = TradeRangeStats;
    fn add(self, rhs: TradeRangeStats) -> TradeRangeStats {
        TradeRangeStats {
            market_order_book_stats: self.market_order_book_stats + rhs.market_order_book_stats,
            public_trade_stats: self.public_trade_stats + rhs.public_trade_stats,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn adding_stats_sums_counts() {
        let a = TradeRangeResultsStats { nb_successful: 3, nb_error: 1, time_window: None };
        let b = TradeRangeResultsStats { nb_successful: 2, nb_error: 0, time_window: None };
        let sum = a + b;
        assert_eq!(sum.nb_successful, 5);
        assert_eq!(sum.nb_error, 1);
    }
}
