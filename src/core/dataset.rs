//! Loading, filtering and exporting the retailer CSV.
use crate::core::filter::FilterSelection;
use crate::core::record::{BnplType, RetailerRecord};
use csv::StringRecord;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

pub const COUNTRY: &str = "Country";
/// Header prefix, the reference dataset spells it `Annual revenue (€)`.
pub const ANNUAL_REVENUE: &str = "Annual revenue";
pub const PRODUCT_CATEGORY: &str = "Product Category";
pub const BNPL_TYPE: &str = "BNPL type";
pub const BNPL_PROVIDER: &str = "BNPL provider";
pub const RETAILER_RANK: &str = "Retailer rank";
pub const YEAR: &str = "Year";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Missing required column: {column}")]
    MissingColumn { column: &'static str },

    #[error("Invalid value {value:?} in column '{column}' on line {line}: {reason}")]
    InvalidValue {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Positions of the required columns within the header row.
struct ColumnMap {
    country: usize,
    annual_revenue: usize,
    product_category: usize,
    bnpl_type: usize,
    bnpl_provider: usize,
    retailer_rank: usize,
    year: usize,
}

impl ColumnMap {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or(LoadError::MissingColumn { column })
        };
        let annual_revenue = headers
            .iter()
            .position(|h| h.trim().starts_with(ANNUAL_REVENUE))
            .ok_or(LoadError::MissingColumn {
                column: ANNUAL_REVENUE,
            })?;

        Ok(Self {
            country: find(COUNTRY)?,
            annual_revenue,
            product_category: find(PRODUCT_CATEGORY)?,
            bnpl_type: find(BNPL_TYPE)?,
            bnpl_provider: find(BNPL_PROVIDER)?,
            retailer_rank: find(RETAILER_RANK)?,
            year: find(YEAR)?,
        })
    }

    fn parse(&self, headers: &StringRecord, row: &StringRecord) -> Result<RetailerRecord, LoadError> {
        let line = row.position().map_or(0, |p| p.line());
        let field = |i: usize| row.get(i).unwrap_or_default().trim();
        let invalid = |i: usize, reason: &str| LoadError::InvalidValue {
            line,
            column: headers.get(i).unwrap_or_default().to_string(),
            value: field(i).to_string(),
            reason: reason.to_string(),
        };

        let annual_revenue: f64 = field(self.annual_revenue)
            .parse()
            .map_err(|_| invalid(self.annual_revenue, "not a number"))?;
        if !annual_revenue.is_finite() || annual_revenue < 0.0 {
            return Err(invalid(self.annual_revenue, "must be a non-negative amount"));
        }

        let retailer_rank: u32 = field(self.retailer_rank)
            .parse()
            .map_err(|_| invalid(self.retailer_rank, "not a whole number"))?;
        if retailer_rank == 0 {
            return Err(invalid(self.retailer_rank, "rank starts at 1"));
        }

        let year: i32 = field(self.year)
            .parse()
            .map_err(|_| invalid(self.year, "not a year"))?;

        let bnpl_type: BnplType = field(self.bnpl_type)
            .parse()
            .map_err(|_| invalid(self.bnpl_type, "unknown BNPL type"))?;

        let country = field(self.country);
        if country.is_empty() {
            return Err(invalid(self.country, "country is empty"));
        }

        Ok(RetailerRecord {
            country: country.to_string(),
            annual_revenue,
            product_category: field(self.product_category).to_string(),
            bnpl_type,
            bnpl_provider: field(self.bnpl_provider).to_string(),
            retailer_rank,
            year,
        })
    }
}

/// A retailer table together with the text it was read from, so a filtered
/// view can be written back out with the original columns untouched.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: StringRecord,
    records: Vec<RetailerRecord>,
    rows: Vec<StringRecord>,
}

impl Dataset {
    pub fn load<P: AsRef<Path>>(path: P, update_callback: &dyn Fn()) -> Result<Self, LoadError> {
        let path = path.as_ref();
        debug!("Loading retailers from {}", path.display());
        let file = File::open(path)?;
        let dataset = Self::from_reader(file, update_callback)?;
        info!(
            rows = dataset.len(),
            "Loaded retailers from {}",
            path.display()
        );
        Ok(dataset)
    }

    /// Reads a full table. The first malformed row aborts the load.
    pub fn from_reader<R: Read>(reader: R, update_callback: &dyn Fn()) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();
        let columns = ColumnMap::resolve(&headers)?;

        let mut records = Vec::new();
        let mut rows = Vec::new();
        for result in reader.records() {
            let row = result?;
            records.push(columns.parse(&headers, &row)?);
            rows.push(row);
            update_callback();
        }

        Ok(Self {
            headers,
            records,
            rows,
        })
    }

    pub fn records(&self) -> &[RetailerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the rows matching `selection`, in their original order.
    pub fn filter(&self, selection: &FilterSelection) -> Dataset {
        let (records, rows): (Vec<RetailerRecord>, Vec<StringRecord>) = self
            .records
            .iter()
            .zip(&self.rows)
            .filter(|(record, _)| selection.matches(record))
            .map(|(record, row)| (record.clone(), row.clone()))
            .unzip();
        let filtered = Dataset {
            headers: self.headers.clone(),
            records,
            rows,
        };
        debug!(
            total = self.len(),
            kept = filtered.len(),
            "Applied filter selection"
        );
        filtered
    }

    /// Writes the header and every row with the original column order and
    /// field text.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), LoadError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn countries(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.country.as_str()))
    }

    pub fn categories(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.product_category.as_str()))
    }

    pub fn providers(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.bnpl_provider.as_str()))
    }
}

/// Distinct values in order of first appearance.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const CSV: &str = "\
Retailer,Country,Annual revenue (€),Product Category,BNPL type,BNPL provider,Retailer rank,Year
Alpha,DE,1000,Electronics,Outsourced only BNPL,Klarna,5,2023
Beta,AT,250.5,DIY,No BNPL,No BNPL,1200,2023
\"Gamma, Inc\",DE,400,Fashion & Beauty,In-house only BNPL,In-house,80,2022
";

    fn load(text: &str) -> Result<Dataset, LoadError> {
        Dataset::from_reader(text.as_bytes(), &|| ())
    }

    #[test]
    fn test_load_parses_records() {
        let dataset = load(CSV).unwrap();

        assert_eq!(dataset.len(), 3);
        let first = &dataset.records()[0];
        assert_eq!(first.country, "DE");
        assert_eq!(first.annual_revenue, 1000.0);
        assert_eq!(first.bnpl_type, BnplType::OutsourcedOnly);
        assert_eq!(first.bnpl_provider, "Klarna");
        assert_eq!(first.retailer_rank, 5);
        assert_eq!(dataset.records()[1].annual_revenue, 250.5);
        assert_eq!(dataset.years(), vec![2022, 2023]);
        assert_eq!(dataset.countries(), vec!["DE", "AT"]);
        assert_eq!(dataset.providers(), vec!["Klarna", "No BNPL", "In-house"]);
    }

    #[test]
    fn test_load_reports_progress_per_row() {
        let rows = std::cell::Cell::new(0);
        Dataset::from_reader(CSV.as_bytes(), &|| rows.set(rows.get() + 1)).unwrap();
        assert_eq!(rows.get(), 3);
    }

    #[test]
    fn test_missing_column() {
        let err = load("Country,Annual revenue,BNPL type,BNPL provider,Retailer rank,Year\n")
            .unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn {
                column: PRODUCT_CATEGORY
            }
        ));
        assert_eq!(err.to_string(), "Missing required column: Product Category");
    }

    #[test]
    fn test_non_numeric_revenue_is_rejected() {
        let text = CSV.replace("250.5", "n/a");
        match load(&text).unwrap_err() {
            LoadError::InvalidValue {
                line, column, value, ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Annual revenue (€)");
                assert_eq!(value, "n/a");
            }
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_revenue_is_rejected() {
        let text = CSV.replace("250.5", "-1");
        assert!(matches!(
            load(&text).unwrap_err(),
            LoadError::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_unknown_bnpl_type_is_rejected() {
        let text = CSV.replace("In-house only BNPL", "in-house only bnpl");
        let err = load(&text).unwrap_err();
        assert!(err.to_string().contains("unknown BNPL type"));
    }

    #[test]
    fn test_filter_and_export_keep_original_columns() {
        let dataset = load(CSV).unwrap();
        let selection = FilterSelection {
            year: Some(2023),
            countries: BTreeSet::from(["DE".to_string(), "AT".to_string()]),
            categories: BTreeSet::from(["Electronics".to_string(), "DIY".to_string()]),
            bnpl_types: BnplType::ALL.into_iter().collect(),
            bnpl_providers: Vec::new(),
            ignored_countries: Vec::new(),
        };
        let filtered = dataset.filter(&selection);
        assert_eq!(filtered.len(), 2);

        let mut out = Vec::new();
        filtered.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), CSV.lines().next());
        assert_eq!(lines.next(), CSV.lines().nth(1));
        assert_eq!(lines.next(), CSV.lines().nth(2));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_filter_excluding_everything_keeps_header() {
        let dataset = load(CSV).unwrap();
        let filtered = dataset.filter(&FilterSelection::default());
        assert!(filtered.is_empty());

        let mut out = Vec::new();
        filtered.write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
