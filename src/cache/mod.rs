//! Per-(function, key) memoization with TTL, and a vault for coordinated
//! freeze/unfreeze snapshots across several caches.

mod result;
mod vault;

pub use result::Cache;
pub use vault::CacheVault;
