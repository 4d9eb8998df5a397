//! Retailer tiers by global revenue rank.
use crate::core::record::RetailerRecord;
use crate::core::table::{CountryIndex, Matrix};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Tier {
    Top10,
    Top11To100,
    Top101To1000,
    Beyond1000,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Top10,
        Tier::Top11To100,
        Tier::Top101To1000,
        Tier::Beyond1000,
    ];

    pub fn from_rank(rank: u32) -> Tier {
        match rank {
            0..=10 => Tier::Top10,
            11..=100 => Tier::Top11To100,
            101..=1000 => Tier::Top101To1000,
            _ => Tier::Beyond1000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Top10 => "Top 10",
            Tier::Top11To100 => "Top 11-100",
            Tier::Top101To1000 => "Top 101-1000",
            Tier::Beyond1000 => "1000+",
        }
    }

    fn column(&self) -> usize {
        Tier::ALL.iter().position(|t| t == self).unwrap_or_default()
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn tier_labels() -> Vec<String> {
    Tier::ALL.iter().map(|t| t.label().to_string()).collect()
}

/// Percentage of each country's revenue generated by each rank tier.
///
/// Rows follow `index`; a country without revenue has 0% in every tier.
pub fn revenue_contribution_by_tier(
    records: &[RetailerRecord],
    index: &CountryIndex,
) -> Matrix<f64> {
    let mut revenue: Matrix<f64> = Matrix::zeros(index.countries().to_vec(), tier_labels());
    for record in records {
        if let Some(row) = index.position(&record.country) {
            *revenue.cell_mut(row, Tier::from_rank(record.retailer_rank).column()) +=
                record.annual_revenue;
        }
    }
    as_row_percentages(&revenue)
}

/// Percentage of each provider's retailers falling into each rank tier.
///
/// Rows are tiers, columns are `providers` in the given order. A provider
/// without retailers in `records` has 0% in every tier. No records give an
/// empty table.
pub fn provider_tier_distribution(records: &[RetailerRecord], providers: &[String]) -> Matrix<f64> {
    if records.is_empty() {
        return Matrix::zeros(Vec::new(), Vec::new());
    }
    let mut counts: Matrix<f64> = Matrix::zeros(tier_labels(), providers.to_vec());
    for record in records {
        if let Some(column) = providers.iter().position(|p| *p == record.bnpl_provider) {
            *counts.cell_mut(Tier::from_rank(record.retailer_rank).column(), column) += 1.0;
        }
    }

    let totals = counts.column_totals();
    let totals: Vec<f64> = totals.values().collect();
    let mut shares: Matrix<f64> = Matrix::zeros(tier_labels(), providers.to_vec());
    for (row, (_, values)) in counts.iter_rows().enumerate() {
        for (column, count) in values.iter().enumerate() {
            if totals[column] > 0.0 {
                *shares.cell_mut(row, column) = count * 100.0 / totals[column];
            }
        }
    }
    shares
}

fn as_row_percentages(matrix: &Matrix<f64>) -> Matrix<f64> {
    matrix.map(|row, value| {
        let total: f64 = row.iter().sum();
        if total > 0.0 {
            value * 100.0 / total
        } else {
            0.0
        }
    })
}
