//! Filter selection: which retailers feed the metrics.
use crate::core::config::{ALL_REGIONS, AppConfig};
use crate::core::dataset::Dataset;
use crate::core::record::{BnplType, NO_BNPL_PROVIDER, RetailerRecord};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Number of providers shown in the tier table when none are configured.
const DEFAULT_PROVIDER_COUNT: usize = 2;

/// The resolved filter values.
///
/// An empty set selects nothing. `year: None` places no constraint on the
/// year. `bnpl_providers` does not restrict rows, it picks the providers
/// compared in the tier distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub countries: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub bnpl_types: BTreeSet<BnplType>,
    pub bnpl_providers: Vec<String>,
    /// Requested countries dropped because they lie outside the region.
    #[serde(skip)]
    pub ignored_countries: Vec<String>,
}

impl FilterSelection {
    pub fn matches(&self, record: &RetailerRecord) -> bool {
        self.year.is_none_or(|y| y == record.year)
            && self.countries.contains(&record.country)
            && self.categories.contains(&record.product_category)
            && self.bnpl_types.contains(&record.bnpl_type)
    }
}

/// Filter values as requested by the user. Empty lists mean "no preference".
#[derive(Debug, Clone, Default)]
pub struct FilterArgs {
    pub year: Option<i32>,
    pub region: Option<String>,
    pub countries: Vec<String>,
    pub categories: Vec<String>,
    pub bnpl_types: Vec<String>,
    pub providers: Vec<String>,
}

impl FilterArgs {
    /// Fills unspecified values from the config and the dataset.
    pub fn resolve(&self, dataset: &Dataset, config: &AppConfig) -> Result<FilterSelection> {
        let year = self.year.or_else(|| default_year(dataset, config.default_year));

        let region_countries: Vec<String> = match self.region.as_deref() {
            None | Some(ALL_REGIONS) => dataset.countries(),
            Some(name) => match config.regions.get(name) {
                Some(countries) => countries.clone(),
                None => {
                    let known: Vec<&str> = std::iter::once(ALL_REGIONS)
                        .chain(config.regions.keys().map(String::as_str))
                        .collect();
                    bail!("Unknown region '{}', expected one of: {}", name, known.join(", "));
                }
            },
        };

        let (countries, ignored_countries): (BTreeSet<String>, Vec<String>) =
            if self.countries.is_empty() {
                (region_countries.into_iter().collect(), Vec::new())
            } else {
                let (kept, ignored): (Vec<String>, Vec<String>) = dedup(&self.countries)
                    .into_iter()
                    .partition(|c| region_countries.contains(c));
                for country in &ignored {
                    warn!("Country {} is outside the selected region and is ignored", country);
                }
                (kept.into_iter().collect(), ignored)
            };

        let categories = if self.categories.is_empty() {
            dataset.categories().into_iter().collect()
        } else {
            self.categories.iter().cloned().collect()
        };

        let bnpl_types = if self.bnpl_types.is_empty() {
            BnplType::ALL.into_iter().collect()
        } else {
            self.bnpl_types
                .iter()
                .map(|t| t.parse::<BnplType>())
                .collect::<Result<BTreeSet<_>>>()?
        };

        let bnpl_providers = if !self.providers.is_empty() {
            dedup(&self.providers)
        } else if !config.default_providers.is_empty() {
            dedup(&config.default_providers)
        } else {
            dataset
                .providers()
                .into_iter()
                .filter(|p| p != NO_BNPL_PROVIDER)
                .take(DEFAULT_PROVIDER_COUNT)
                .collect()
        };

        let selection = FilterSelection {
            year,
            countries,
            categories,
            bnpl_types,
            bnpl_providers,
            ignored_countries,
        };
        debug!("Resolved filter selection: {selection:?}");
        Ok(selection)
    }
}

/// The configured year when the dataset has it, otherwise the latest year
/// present.
fn default_year(dataset: &Dataset, configured: i32) -> Option<i32> {
    let years = dataset.years();
    if years.contains(&configured) {
        Some(configured)
    } else {
        years.last().copied()
    }
}

fn dedup(values: &[String]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}
