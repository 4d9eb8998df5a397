use crate::core::cache::{CacheKey, MetricsCache};
use crate::core::metrics::MetricsBundle;
use anyhow::{Result, bail};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::debug;

const PARTITION: &str = "metrics";

#[derive(Serialize, Deserialize)]
struct CacheEntry<M> {
    metrics: M,
    expires_at: Option<SystemTime>,
}

/// Metrics cache persisted in a fjall keyspace, entries are JSON encoded.
///
/// Entries older than `ttl` are evicted on lookup. Without a ttl they are
/// kept until the cache directory is removed.
pub struct DiskCache {
    _keyspace: Keyspace,
    partition: PartitionHandle,
    ttl: Option<Duration>,
}

impl DiskCache {
    pub fn open(path: &Path, ttl: Option<Duration>) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let keyspace = Config::new(path).open()?;
        let partition = keyspace.open_partition(PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened metrics cache at {}", path.display());
        Ok(Self {
            _keyspace: keyspace,
            partition,
            ttl,
        })
    }

    fn read(&self, key: &CacheKey) -> Result<Option<MetricsBundle>> {
        let Some(bytes) = self.partition.get(key.as_str())? else {
            return Ok(None);
        };
        let entry: CacheEntry<MetricsBundle> = serde_json::from_slice(&bytes)?;
        if let Some(expires_at) = entry.expires_at {
            if SystemTime::now() > expires_at {
                debug!("Cache entry expired for key: {}", key);
                self.remove(key)?;
                return Ok(None);
            }
        }
        if !entry.metrics.is_well_formed() {
            self.remove(key)?;
            bail!("Malformed metrics entry for key {}", key);
        }
        Ok(Some(entry.metrics))
    }

    fn write(&self, key: &CacheKey, metrics: &MetricsBundle) -> Result<()> {
        let entry = CacheEntry {
            metrics,
            expires_at: self.ttl.map(|ttl| SystemTime::now() + ttl),
        };
        self.partition
            .insert(key.as_str(), serde_json::to_vec(&entry)?)?;
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<()> {
        self.partition.remove(key.as_str())?;
        Ok(())
    }
}

impl MetricsCache for DiskCache {
    fn get(&self, key: &CacheKey) -> Option<MetricsBundle> {
        match self.read(key) {
            Ok(Some(metrics)) => {
                debug!("Cache HIT for key: {}", key);
                Some(metrics)
            }
            Ok(None) => {
                debug!("Cache MISS for key: {}", key);
                None
            }
            Err(e) => {
                debug!("DiskCache get error: {}", e);
                None
            }
        }
    }

    fn put(&self, key: CacheKey, metrics: &MetricsBundle) {
        match self.write(&key, metrics) {
            Ok(()) => debug!("Cache PUT for key: {}", key),
            Err(e) => debug!("DiskCache put error: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::calculate_metrics_cached;
    use crate::core::filter::FilterSelection;
    use crate::core::metrics::calculate_metrics;
    use crate::core::record::{BnplType, RetailerRecord};
    use crate::core::table::Matrix;
    use tempfile::tempdir;

    fn retailer(
        country: &str,
        revenue: f64,
        bnpl_type: BnplType,
        provider: &str,
        rank: u32,
    ) -> RetailerRecord {
        RetailerRecord {
            country: country.to_string(),
            annual_revenue: revenue,
            product_category: "Home & Furniture".to_string(),
            bnpl_type,
            bnpl_provider: provider.to_string(),
            retailer_rank: rank,
            year: 2023,
        }
    }

    fn sample() -> (CacheKey, MetricsBundle) {
        let records = vec![retailer("NL", 1250.0, BnplType::OutsourcedOnly, "Klarna", 7)];
        let selection = FilterSelection {
            bnpl_providers: vec!["Klarna".to_string()],
            ..FilterSelection::default()
        };
        let key = CacheKey::for_input(&records, &selection).unwrap();
        (key, calculate_metrics(&records, &selection.bnpl_providers))
    }

    /// Revenues and counts whose shares are repeating fractions.
    fn fractional_records() -> Vec<RetailerRecord> {
        let providers = ["Klarna", "Riverty", "PayPal"];
        let types = [
            BnplType::OutsourcedOnly,
            BnplType::InHouseAndOutsourced,
            BnplType::InHouseOnly,
            BnplType::NoBnpl,
        ];
        (0..210u32)
            .map(|i| {
                let bnpl_type = types[(i % 4) as usize];
                let provider = if bnpl_type == BnplType::NoBnpl {
                    "No BNPL"
                } else {
                    providers[(i % 3) as usize]
                };
                retailer(
                    &format!("C{}", i % 37),
                    (i as f64 + 1.0) * 1000.0 / 7.0 + 1.0 / 3.0,
                    bnpl_type,
                    provider,
                    i * 13 % 1700 + 1,
                )
            })
            .collect()
    }

    fn bits(matrix: &Matrix<f64>) -> Vec<u64> {
        matrix
            .iter_rows()
            .flat_map(|(_, values)| values.iter().map(|v| v.to_bits()))
            .collect()
    }

    #[test]
    fn test_disk_cache_get_put() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), None).unwrap();
        let (key, metrics) = sample();

        assert!(cache.get(&key).is_none());
        cache.put(key.clone(), &metrics);
        assert_eq!(cache.get(&key), Some(metrics));
    }

    #[test]
    fn test_cached_fractions_are_bit_identical() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), None).unwrap();
        let records = fractional_records();
        let selection = FilterSelection {
            bnpl_providers: vec!["Riverty".to_string(), "Klarna".to_string()],
            ..FilterSelection::default()
        };
        let computed = calculate_metrics(&records, &selection.bnpl_providers);

        calculate_metrics_cached(&records, &selection, Some(&cache));
        let key = CacheKey::for_input(&records, &selection).unwrap();
        assert!(cache.get(&key).is_some());
        let cached = calculate_metrics_cached(&records, &selection, Some(&cache));

        let series_bits = |m: &MetricsBundle| -> Vec<u64> {
            m.tam
                .values()
                .chain(m.sam.values())
                .chain(m.som.values())
                .chain(m.product_revenues.values())
                .map(f64::to_bits)
                .collect()
        };
        assert_eq!(series_bits(&cached), series_bits(&computed));
        assert_eq!(bits(&cached.market_share_revenue), bits(&computed.market_share_revenue));
        assert_eq!(bits(&cached.bnpl_adoption), bits(&computed.bnpl_adoption));
        assert_eq!(bits(&cached.tier_contribution), bits(&computed.tier_contribution));
        assert_eq!(bits(&cached.provider_tiers), bits(&computed.provider_tiers));
        assert_eq!(cached, computed);
    }

    #[test]
    fn test_disk_cache_ttl_expiration() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), Some(Duration::from_millis(10))).unwrap();
        let (key, metrics) = sample();

        cache.put(key.clone(), &metrics);
        assert_eq!(cache.get(&key), Some(metrics));

        std::thread::sleep(Duration::from_millis(20));
        assert!(cache.get(&key).is_none());
        assert!(cache.partition.get(key.as_str()).unwrap().is_none());
    }

    #[test]
    fn test_malformed_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = DiskCache::open(dir.path(), None).unwrap();
        let (key, metrics) = sample();

        let mut entry = serde_json::to_value(CacheEntry {
            metrics,
            expires_at: None,
        })
        .unwrap();
        entry["metrics"]["bnpl_adoption"]["values"] = serde_json::json!([]);
        cache
            .partition
            .insert(key.as_str(), serde_json::to_vec(&entry).unwrap())
            .unwrap();

        assert!(cache.get(&key).is_none());
        assert!(cache.partition.get(key.as_str()).unwrap().is_none());
    }
}
