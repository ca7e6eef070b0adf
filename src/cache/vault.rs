//! A process-wide registry used to take point-in-time consistent snapshots
//! across several caches during one command.

use std::sync::{Mutex, Weak};

use crate::cache::result::Cache;

/// Object-safe freeze/unfreeze surface implemented by every [`Cache`],
/// letting the vault hold a heterogeneous set of them.
trait Freezable: Send + Sync {
    fn freeze(&self);
    fn unfreeze(&self);
}

impl<K, V, F> Freezable for Cache<K, V, F>
where
    K: Eq + std::hash::Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
    F: Fn(&K) -> V + Send + Sync,
{
    fn freeze(&self) {
        Cache::freeze(self);
    }

    fn unfreeze(&self) {
        Cache::unfreeze(self);
    }
}

#[derive(Default)]
pub struct CacheVault {
    caches: Mutex<Vec<Weak<dyn Freezable>>>,
    all_frozen: Mutex<bool>,
}

impl CacheVault {
    pub fn new() -> Self {
        CacheVault::default()
    }

    /// Registers a cache, held weakly so the vault never keeps it alive past
    /// its owner.
    pub fn register<K, V, F>(&self, cache: &std::sync::Arc<Cache<K, V, F>>)
    where
        K: Eq + std::hash::Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        let weak: Weak<dyn Freezable> = std::sync::Arc::downgrade(cache) as Weak<dyn Freezable>;
        self.caches.lock().unwrap().push(weak);
    }

    pub fn freeze_all(&self) {
        let mut all_frozen = self.all_frozen.lock().unwrap();
        if *all_frozen {
            return;
        }
        let caches = self.caches.lock().unwrap();
        let mut nb_frozen = 0;
        for weak in caches.iter() {
            if let Some(cache) = weak.upgrade() {
                cache.freeze();
                nb_frozen += 1;
            }
        }
        *all_frozen = true;
        tracing::debug!(nb_frozen, "cache vault frozen");
    }

    pub fn unfreeze_all(&self) {
        let mut all_frozen = self.all_frozen.lock().unwrap();
        if !*all_frozen {
            return;
        }
        let caches = self.caches.lock().unwrap();
        let mut nb_unfrozen = 0;
        for weak in caches.iter() {
            if let Some(cache) = weak.upgrade() {
                cache.unfreeze();
                nb_unfrozen += 1;
            }
        }
        *all_frozen = false;
        tracing::debug!(nb_unfrozen, "cache vault unfrozen");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    #[test]
    fn freeze_all_holds_every_registered_cache() {
        let vault = CacheVault::new();
        let cache = Arc::new(Cache::new(Duration::from_millis(0), |k: &i32| *k));
        vault.register(&cache);

        assert_eq!(cache.get(&1), 1);
        cache.set(1, Instant::now(), 1);

        vault.freeze_all();
        let first = cache.get(&1);
        let second = cache.get(&1);
        assert_eq!(first, second);

        vault.unfreeze_all();
    }
}
