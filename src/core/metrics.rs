//! Market sizing and adoption metrics computed from a filtered retailer table.
//!
//! Every function here is a pure function of its inputs. Per-country tables
//! take an explicit [`CountryIndex`] so they always share the row set and
//! order of the TAM ranking.
use crate::core::record::{BnplType, RetailerRecord};
use crate::core::table::{CountryIndex, Matrix, Series};
use crate::core::tiers;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Share of SAM assumed to be capturable by a single provider.
pub const CAPTURE_RATE: f64 = 0.15;

/// Every table derived from one filtered selection of retailers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    pub tam: Series<f64>,
    pub sam: Series<f64>,
    pub som: Series<f64>,
    pub market_share_count: Matrix<u64>,
    pub market_share_revenue: Matrix<f64>,
    pub product_volumes: Series<u64>,
    pub product_revenues: Series<f64>,
    pub bnpl_adoption: Matrix<f64>,
    pub bnpl_distribution: Matrix<u64>,
    pub tier_contribution: Matrix<f64>,
    pub provider_tiers: Matrix<f64>,
}

/// Retailer count and revenue per product category, each ranked on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductBreakdown {
    pub volumes: Series<u64>,
    pub revenues: Series<f64>,
}

/// Computes the full bundle. `providers` selects the columns of the provider
/// tier distribution.
pub fn calculate_metrics(records: &[RetailerRecord], providers: &[String]) -> MetricsBundle {
    debug!(
        records = records.len(),
        providers = providers.len(),
        "Calculating metrics"
    );
    let tam = tam(records);
    let index = CountryIndex::from_series(&tam);
    let sam = sam(records, &index);
    let som = sam.scaled(CAPTURE_RATE);
    let products = product_breakdown(records);
    let bnpl_distribution = bnpl_distribution(records, &index);

    MetricsBundle {
        market_share_count: market_share_by_count(records, &index),
        market_share_revenue: market_share_by_revenue(records, &index),
        product_volumes: products.volumes,
        product_revenues: products.revenues,
        bnpl_adoption: adoption_from_distribution(&bnpl_distribution),
        bnpl_distribution,
        tier_contribution: tiers::revenue_contribution_by_tier(records, &index),
        provider_tiers: tiers::provider_tier_distribution(records, providers),
        tam,
        sam,
        som,
    }
}

/// Total revenue per country, largest market first. Ties keep the order in
/// which countries first appear in `records`.
pub fn tam(records: &[RetailerRecord]) -> Series<f64> {
    Series::sorted_descending(sum_in_appearance_order(
        records.iter().map(|r| (r.country.as_str(), r.annual_revenue)),
    ))
}

/// Revenue of retailers offering any form of BNPL, per country.
pub fn sam(records: &[RetailerRecord], index: &CountryIndex) -> Series<f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for record in records.iter().filter(|r| r.bnpl_type.offers_bnpl()) {
        *totals.entry(record.country.clone()).or_default() += record.annual_revenue;
    }
    index.reindex(&totals)
}

pub fn som(records: &[RetailerRecord], index: &CountryIndex) -> Series<f64> {
    sam(records, index).scaled(CAPTURE_RATE)
}

/// Number of retailers per (country, provider).
pub fn market_share_by_count(records: &[RetailerRecord], index: &CountryIndex) -> Matrix<u64> {
    provider_pivot(records, index, |_| 1)
}

/// Revenue per (country, provider).
pub fn market_share_by_revenue(records: &[RetailerRecord], index: &CountryIndex) -> Matrix<f64> {
    provider_pivot(records, index, |r| r.annual_revenue)
}

pub fn product_breakdown(records: &[RetailerRecord]) -> ProductBreakdown {
    ProductBreakdown {
        volumes: Series::sorted_descending(sum_in_appearance_order(
            records.iter().map(|r| (r.product_category.as_str(), 1u64)),
        )),
        revenues: Series::sorted_descending(sum_in_appearance_order(
            records
                .iter()
                .map(|r| (r.product_category.as_str(), r.annual_revenue)),
        )),
    }
}

/// Percentage of each country's retailers per BNPL type.
pub fn bnpl_adoption(records: &[RetailerRecord], index: &CountryIndex) -> Matrix<f64> {
    adoption_from_distribution(&bnpl_distribution(records, index))
}

/// Number of retailers per (country, BNPL type).
pub fn bnpl_distribution(records: &[RetailerRecord], index: &CountryIndex) -> Matrix<u64> {
    let columns = BnplType::ALL.iter().map(|t| t.label().to_string()).collect();
    let mut matrix = Matrix::zeros(index.countries().to_vec(), columns);
    for record in records {
        if let Some(row) = index.position(&record.country) {
            let column = BnplType::ALL
                .iter()
                .position(|t| *t == record.bnpl_type)
                .unwrap_or_default();
            *matrix.cell_mut(row, column) += 1;
        }
    }
    matrix
}

impl MetricsBundle {
    /// Share of retailers offering any BNPL, per country.
    pub fn offering_share(&self) -> Series<f64> {
        let no_bnpl = BnplType::NoBnpl.label();
        let columns = self.bnpl_adoption.columns();
        Series::from_entries(
            self.bnpl_adoption
                .iter_rows()
                .map(|(country, values)| {
                    let share = columns
                        .iter()
                        .zip(values)
                        .filter(|(c, _)| c.as_str() != no_bnpl)
                        .map(|(_, v)| *v)
                        .sum();
                    (country.to_string(), share)
                })
                .collect(),
        )
    }

    /// Whether every table has one value per row and column. Bundles read
    /// back from storage are checked before use.
    pub fn is_well_formed(&self) -> bool {
        self.market_share_count.is_well_formed()
            && self.market_share_revenue.is_well_formed()
            && self.bnpl_adoption.is_well_formed()
            && self.bnpl_distribution.is_well_formed()
            && self.tier_contribution.is_well_formed()
            && self.provider_tiers.is_well_formed()
    }

    /// Mean of [`Self::offering_share`] across countries, `None` when there
    /// are no countries in the selection.
    pub fn average_offering_share(&self) -> Option<f64> {
        let shares = self.offering_share();
        if shares.is_empty() {
            return None;
        }
        Some(shares.total() / shares.len() as f64)
    }
}

fn adoption_from_distribution(distribution: &Matrix<u64>) -> Matrix<f64> {
    distribution.map(|row, count| {
        let total: u64 = row.iter().sum();
        if total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / total as f64
        }
    })
}

fn provider_pivot<V>(
    records: &[RetailerRecord],
    index: &CountryIndex,
    value: impl Fn(&RetailerRecord) -> V,
) -> Matrix<V>
where
    V: Copy + Default + std::ops::AddAssign,
{
    let with_provider: Vec<&RetailerRecord> = records.iter().filter(|r| r.has_provider()).collect();
    let providers: Vec<String> = with_provider
        .iter()
        .map(|r| r.bnpl_provider.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut matrix = Matrix::zeros(index.countries().to_vec(), providers);
    for record in with_provider {
        let row = index.position(&record.country);
        let column = matrix
            .columns()
            .iter()
            .position(|p| *p == record.bnpl_provider);
        if let (Some(row), Some(column)) = (row, column) {
            *matrix.cell_mut(row, column) += value(record);
        }
    }
    matrix
}

fn sum_in_appearance_order<'a, V>(items: impl Iterator<Item = (&'a str, V)>) -> Vec<(String, V)>
where
    V: Copy + Default + std::ops::AddAssign,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<(String, V)> = Vec::new();
    for (label, value) in items {
        let i = *positions.entry(label).or_insert_with(|| {
            totals.push((label.to_string(), V::default()));
            totals.len() - 1
        });
        totals[i].1 += value;
    }
    totals
}
