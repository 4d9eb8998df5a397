use crate::core::cache::{CacheKey, MetricsCache};
use crate::core::metrics::MetricsBundle;
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;

/// In-memory metrics cache for the lifetime of one process.
#[derive(Default)]
pub struct MemoryCache {
    inner: RefCell<HashMap<CacheKey, MetricsBundle>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl MetricsCache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<MetricsBundle> {
        let value = self.inner.borrow().get(key).cloned();
        if value.is_some() {
            debug!("Cache HIT for key: {}", key);
        } else {
            debug!("Cache MISS for key: {}", key);
        }
        value
    }

    fn put(&self, key: CacheKey, metrics: &MetricsBundle) {
        debug!("Cache PUT for key: {}", key);
        self.inner.borrow_mut().insert(key, metrics.clone());
    }
}
