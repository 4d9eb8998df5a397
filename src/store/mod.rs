pub mod disk;
pub mod memory;

use crate::core::cache::MetricsCache;
use crate::core::config::AppConfig;
use disk::DiskCache;
use tracing::{debug, warn};

/// Opens the persistent metrics cache when the config enables it.
///
/// A cache that cannot be opened is skipped, metrics are then computed
/// directly.
pub fn open_metrics_cache(config: &AppConfig) -> Option<Box<dyn MetricsCache>> {
    if !config.cache.enabled {
        debug!("Metrics cache disabled");
        return None;
    }

    let path = match config.cache_path() {
        Ok(path) => path,
        Err(e) => {
            warn!("Could not determine cache path: {}", e);
            return None;
        }
    };

    match DiskCache::open(&path, config.cache.ttl()) {
        Ok(cache) => Some(Box::new(cache)),
        Err(e) => {
            warn!("Could not open metrics cache at {}: {}", path.display(), e);
            None
        }
    }
}
