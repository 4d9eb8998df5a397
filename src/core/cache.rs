//! Memoization of computed metrics, keyed by input content.
use crate::core::filter::FilterSelection;
use crate::core::metrics::{self, MetricsBundle};
use crate::core::record::RetailerRecord;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Display;
use tracing::debug;

/// SHA-256 over the filtered records and the selection that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_input(records: &[RetailerRecord], selection: &FilterSelection) -> Result<Self> {
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(selection)?);
        hasher.update(serde_json::to_vec(records)?);
        Ok(Self(format!("{:x}", hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub trait MetricsCache {
    fn get(&self, key: &CacheKey) -> Option<MetricsBundle>;
    fn put(&self, key: CacheKey, metrics: &MetricsBundle);
}

/// Computes metrics for `records`, consulting `cache` first when given.
///
/// The result is identical with or without a cache.
pub fn calculate_metrics_cached(
    records: &[RetailerRecord],
    selection: &FilterSelection,
    cache: Option<&dyn MetricsCache>,
) -> MetricsBundle {
    let Some(cache) = cache else {
        return metrics::calculate_metrics(records, &selection.bnpl_providers);
    };

    let key = match CacheKey::for_input(records, selection) {
        Ok(key) => key,
        Err(e) => {
            debug!("Could not derive cache key: {}", e);
            return metrics::calculate_metrics(records, &selection.bnpl_providers);
        }
    };

    if let Some(cached) = cache.get(&key) {
        debug!("Using cached metrics for {}", key);
        return cached;
    }

    let computed = metrics::calculate_metrics(records, &selection.bnpl_providers);
    cache.put(key, &computed);
    computed
}
