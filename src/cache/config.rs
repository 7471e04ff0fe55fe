//! Cache tuning knobs.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 300;
const DEFAULT_CAPACITY: usize = 64;

/// Configuration for the list-response cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve cached pages without revalidation while younger than this.
    pub ttl: Duration,
    /// Maximum number of distinct (collection, query) pages retained.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            ttl: settings.ttl,
            capacity: settings.capacity,
        }
    }
}

impl CacheConfig {
    /// Capacity as `NonZeroUsize`, clamping to 1 if zero.
    pub(crate) fn capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
