use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

/// Region name that always means every country in the dataset.
pub const ALL_REGIONS: &str = "All";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CacheConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub path: Option<String>,
    /// Hours a cached entry stays valid, `null` keeps entries forever.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: Option<u64>,
}

fn default_ttl_hours() -> Option<u64> {
    Some(24 * 7)
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: false,
            path: None,
            ttl_hours: default_ttl_hours(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_hours.map(|h| Duration::from_secs(h * 60 * 60))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default = "default_year")]
    pub default_year: i32,
    #[serde(default = "default_regions")]
    pub regions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub default_providers: Vec<String>,
    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_year() -> i32 {
    2023
}

fn default_regions() -> BTreeMap<String, Vec<String>> {
    let region = |countries: &[&str]| -> Vec<String> {
        countries.iter().map(|c| c.to_string()).collect()
    };
    BTreeMap::from([
        ("DACH".to_string(), region(&["DE", "AT", "CH"])),
        ("BENE".to_string(), region(&["BE", "NL"])),
        ("NORDICS".to_string(), region(&["SE", "NO", "FI", "DK"])),
    ])
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_path: None,
            default_year: default_year(),
            regions: default_regions(),
            default_providers: Vec::new(),
            cache: CacheConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to built-in
    /// defaults when no file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.cache.path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.data_dir().join("cache"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("io", "bnpl-dash", "bnpl-dash")
            .context("Could not determine project directories")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
data_path: "data/retailers.csv"
default_year: 2024
regions:
  IBERIA: ["ES", "PT"]
default_providers: ["Klarna", "Riverty"]
cache:
  enabled: true
  path: "/tmp/bnpl-cache"
  ttl_hours: 12
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.data_path.as_deref(), Some("data/retailers.csv"));
        assert_eq!(config.default_year, 2024);
        assert_eq!(config.regions.len(), 1);
        assert_eq!(config.regions["IBERIA"], vec!["ES", "PT"]);
        assert_eq!(config.default_providers, vec!["Klarna", "Riverty"]);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(12 * 60 * 60)));
        assert_eq!(
            config.cache_path().unwrap(),
            PathBuf::from("/tmp/bnpl-cache")
        );
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").expect("Failed to deserialize");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_year, 2023);
        assert_eq!(config.regions["DACH"], vec!["DE", "AT", "CH"]);
        assert_eq!(config.regions["BENE"], vec!["BE", "NL"]);
        assert_eq!(config.regions["NORDICS"], vec!["SE", "NO", "FI", "DK"]);
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(7 * 24 * 60 * 60)));
    }

    #[test]
    fn test_cache_ttl_can_be_disabled() {
        let yaml_str = "cache:\n  enabled: true\n  ttl_hours: null\n";
        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.cache.ttl(), None);
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = AppConfig::load_from_path(dir.path().join("missing.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
