//! Breadth-first shortest-path search over an exchange's undirected market
//! graph, used to chain markets when no direct pair exists between two
//! currencies.

use std::collections::{HashSet, VecDeque};

use crate::error::{PathError, PathResult};
use crate::market::Market;
use crate::money::CurrencyCode;

/// One hop of a resolved conversion path: the market traversed, and whether
/// it is crossed base→quote (`forward`) or quote→base (`reversed`).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PathHop {
    pub market: Market,
    pub forward: bool,
}

/// Deterministic breadth-first search from `from` to `to` over `markets`,
/// preferring paths whose intermediate currencies appear earlier in
/// `preferred`. Empty `markets` or no connecting path yields
/// `NoConversionPath`.
pub fn find_path(
    markets: &[Market],
    preferred: &[CurrencyCode],
    from: CurrencyCode,
    to: CurrencyCode,
) -> PathResult<Vec<PathHop>> {
    if from == to {
        return Ok(Vec::new());
    }

    let mut visited = HashSet::new();
    visited.insert(from);
    let mut queue = VecDeque::new();
    queue.push_back(from);
    // parent[cur] = (previous currency, market used to get here, forward?)
    let mut parent: std::collections::HashMap<CurrencyCode, (CurrencyCode, Market, bool)> =
        std::collections::HashMap::new();

    while let Some(current) = queue.pop_front() {
        let mut neighbors: Vec<(CurrencyCode, Market, bool)> = markets
            .iter()
            .filter_map(|m| {
                if m.base() == current {
                    Some((m.quote(), *m, true))
                } else if m.quote() == current {
                    Some((m.base(), *m, false))
                } else {
                    None
                }
            })
            .collect();

        // Tie-break: neighbors whose currency appears earlier in `preferred`
        // are expanded first, so the BFS favors them when multiple
        // shortest paths exist.
        neighbors.sort_by_key(|(cur, _, _)| preferred_rank(preferred, *cur));

        for (neighbor, market, forward) in neighbors {
            if visited.contains(&neighbor) {
                continue;
            }
            visited.insert(neighbor);
            parent.insert(neighbor, (current, market, forward));
            if neighbor == to {
                return Ok(reconstruct(&parent, from, to));
            }
            queue.push_back(neighbor);
        }
    }

    Err(PathError::NoConversionPath {
        from: from.to_string(),
        to: to.to_string(),
    })
}

fn preferred_rank(preferred: &[CurrencyCode], cur: CurrencyCode) -> usize {
    preferred.iter().position(|&p| p == cur).unwrap_or(preferred.len())
}

fn reconstruct(
    parent: &std::collections::HashMap<CurrencyCode, (CurrencyCode, Market, bool)>,
    from: CurrencyCode,
    to: CurrencyCode,
) -> Vec<PathHop> {
    let mut hops = Vec::new();
    let mut cur = to;
    while cur != from {
        let (prev, market, forward) = parent[&cur];
        hops.push(PathHop { market, forward });
        cur = prev;
    }
    hops.reverse();
    hops
}

#[cfg(test)]
mod test {
    use super::*;

    fn cur(s: &str) -> CurrencyCode {
        CurrencyCode::new(s).unwrap()
    }

    fn market(base: &str, quote: &str) -> Market {
        Market::new(cur(base), cur(quote))
    }

    #[test]
    fn direct_market_is_a_single_forward_hop() {
        let markets = [market("BTC", "USDT")];
        let path = find_path(&markets, &[], cur("BTC"), cur("USDT")).unwrap();
        assert_eq!(path, vec![PathHop { market: markets[0], forward: true }]);
    }

    #[test]
    fn reversed_hop_is_reported_as_such() {
        let markets = [market("BTC", "USDT")];
        let path = find_path(&markets, &[], cur("USDT"), cur("BTC")).unwrap();
        assert_eq!(path, vec![PathHop { market: markets[0], forward: false }]);
    }

    #[test]
    fn same_currency_is_an_empty_path() {
        let markets = [market("BTC", "USDT")];
        let path = find_path(&markets, &[], cur("BTC"), cur("BTC")).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn prefers_payment_currency_on_the_shortest_path() {
        let markets = [market("ETH", "BTC"), market("BTC", "USDT"), market("XRP", "BTC")];
        let path = find_path(&markets, &[cur("USDT")], cur("XRP"), cur("USDT")).unwrap();
        assert_eq!(
            path,
            vec![
                PathHop { market: market("XRP", "BTC"), forward: true },
                PathHop { market: market("BTC", "USDT"), forward: true },
            ]
        );
    }

    #[test]
    fn no_path_is_reported() {
        let markets = [market("BTC", "USDT")];
        assert!(find_path(&markets, &[], cur("BTC"), cur("XRP")).is_err());
    }
}
