//! A cache that memoizes a function call per argument key for at most a TTL.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Rehash/evict every this many accesses, bounding memory under long runs.
const FLUSH_CHECK_COUNTER: u64 = 20_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Standard,
    Frozen,
}

struct Entry<V> {
    value: V,
    last_updated: Instant,
}

struct Inner<K, V> {
    map: HashMap<K, Entry<V>>,
    state: State,
    flush_counter: u64,
}

/// Memoizes `F: Fn(&K) -> V` per key, refreshing an entry once it is older
/// than `ttl`. Register with a [`crate::cache::CacheVault`] to participate in
/// coordinated freeze/unfreeze snapshots.
pub struct Cache<K, V, F> {
    func: F,
    ttl: Duration,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V, F> Cache<K, V, F>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: Fn(&K) -> V,
{
    pub fn new(ttl: Duration, func: F) -> Self {
        Cache {
            func,
            ttl,
            inner: Mutex::new(Inner {
                map: HashMap::new(),
                state: State::Standard,
                flush_counter: 0,
            }),
        }
    }

    /// Returns the cached value for `key`, invoking the underlying function
    /// if there is no entry or it is older than the TTL.
    pub fn get(&self, key: &K) -> V {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap();

        if inner.state != State::Frozen {
            Self::check_periodic_rehash(&mut inner, self.ttl, now);
        }

        let needs_refresh = match inner.map.get(key) {
            None => true,
            Some(entry) => inner.state != State::Frozen && now.duration_since(entry.last_updated) > self.ttl,
        };
        if needs_refresh {
            let value = (self.func)(key);
            inner.map.insert(
                key.clone(),
                Entry {
                    value: value.clone(),
                    last_updated: now,
                },
            );
            value
        } else {
            inner.map.get(key).unwrap().value.clone()
        }
    }

    /// Inserts or overwrites `key`'s entry, but only if `time` is strictly
    /// newer than what is already stored. Used to seed the cache from an
    /// external source such as a file.
    pub fn set(&self, value: V, time: Instant, key: K) {
        let mut inner = self.inner.lock().unwrap();
        Self::check_periodic_rehash(&mut inner, self.ttl, Instant::now());
        match inner.map.get(&key) {
            Some(entry) if entry.last_updated >= time => {}
            _ => {
                inner.map.insert(
                    key,
                    Entry {
                        value,
                        last_updated: time,
                    },
                );
            }
        }
    }

    /// Non-mutating lookup: the stored value and its last-refresh time, if
    /// any.
    pub fn retrieve(&self, key: &K) -> Option<(V, Instant)> {
        let inner = self.inner.lock().unwrap();
        inner.map.get(key).map(|e| (e.value.clone(), e.last_updated))
    }

    /// Holds every currently-cached value as-is until [`Self::unfreeze`];
    /// keys with no existing entry still refresh once on first access.
    pub(crate) fn freeze(&self) {
        self.inner.lock().unwrap().state = State::Frozen;
    }

    pub(crate) fn unfreeze(&self) {
        self.inner.lock().unwrap().state = State::Standard;
    }

    fn check_periodic_rehash(inner: &mut Inner<K, V>, ttl: Duration, now: Instant) {
        inner.flush_counter += 1;
        if inner.flush_counter < FLUSH_CHECK_COUNTER {
            return;
        }
        inner.flush_counter = 0;
        inner.map.retain(|_, entry| now.duration_since(entry.last_updated) <= ttl);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    #[test]
    fn get_invokes_once_within_ttl() {
        let calls = RefCell::new(0);
        let cache = Cache::new(Duration::from_secs(60), |_: &i32| {
            *calls.borrow_mut() += 1;
            *calls.borrow()
        });
        assert_eq!(cache.get(&1), 1);
        assert_eq!(cache.get(&1), 1);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn distinct_keys_are_independent() {
        let cache = Cache::new(Duration::from_secs(60), |k: &i32| k * 10);
        assert_eq!(cache.get(&1), 10);
        assert_eq!(cache.get(&2), 20);
    }

    #[test]
    fn set_ignores_older_timestamp() {
        let cache = Cache::new(Duration::from_secs(60), |_: &i32| 0);
        let t0 = Instant::now();
        cache.set(5, t0 + Duration::from_secs(1), 1);
        cache.set(999, t0, 1);
        let (value, _) = cache.retrieve(&1).unwrap();
        assert_eq!(value, 5);
    }

    #[test]
    fn freeze_holds_value_until_unfrozen() {
        let calls = RefCell::new(0);
        let cache = Cache::new(Duration::from_millis(0), |_: &i32| {
            *calls.borrow_mut() += 1;
            *calls.borrow()
        });
        cache.get(&1);
        cache.freeze();
        let first = cache.get(&1);
        let second = cache.get(&1);
        assert_eq!(first, second);
        cache.unfreeze();
        assert_ne!(cache.get(&1), first);
    }
}
