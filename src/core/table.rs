//! Labelled one- and two-dimensional tables produced by the aggregator.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::iter::Sum;

/// An ordered mapping from label to value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series<V> {
    entries: Vec<(String, V)>,
}

impl<V: Copy> Series<V> {
    pub fn from_entries(entries: Vec<(String, V)>) -> Self {
        Self { entries }
    }

    /// Builds a series ordered by descending value. The sort is stable, so
    /// equal values keep the order they were given in.
    pub fn sorted_descending(mut entries: Vec<(String, V)>) -> Self
    where
        V: PartialOrd,
    {
        entries.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(Ordering::Equal));
        Self { entries }
    }

    pub fn get(&self, label: &str) -> Option<V> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| *v)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = V> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, V)> {
        self.entries.iter().map(|(l, v)| (l.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> V
    where
        V: Sum<V>,
    {
        self.values().sum()
    }
}

impl Series<f64> {
    pub fn scaled(&self, factor: f64) -> Series<f64> {
        Series {
            entries: self
                .entries
                .iter()
                .map(|(l, v)| (l.clone(), v * factor))
                .collect(),
        }
    }
}

/// The reference row ordering shared by every per-country table.
///
/// Built from the TAM series, so all derived tables line up row for row with
/// the market size ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryIndex {
    countries: Vec<String>,
    positions: HashMap<String, usize>,
}

impl CountryIndex {
    pub fn new(countries: Vec<String>) -> Self {
        let positions = countries
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            countries,
            positions,
        }
    }

    pub fn from_series<V: Copy>(series: &Series<V>) -> Self {
        Self::new(series.labels().map(str::to_string).collect())
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn position(&self, country: &str) -> Option<usize> {
        self.positions.get(country).copied()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Lays `values` out in index order. Countries without a value get
    /// `V::default()`, values for countries outside the index are dropped.
    pub fn reindex<V: Copy + Default>(&self, values: &HashMap<String, V>) -> Series<V> {
        Series::from_entries(
            self.countries
                .iter()
                .map(|c| (c.clone(), values.get(c).copied().unwrap_or_default()))
                .collect(),
        )
    }
}

/// A dense table with labelled rows and columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<V> {
    rows: Vec<String>,
    columns: Vec<String>,
    values: Vec<Vec<V>>,
}

impl<V: Copy + Default> Matrix<V> {
    pub fn zeros(rows: Vec<String>, columns: Vec<String>) -> Self {
        let values = vec![vec![V::default(); columns.len()]; rows.len()];
        Self {
            rows,
            columns,
            values,
        }
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether every row holds exactly one value per column.
    pub fn is_well_formed(&self) -> bool {
        self.values.len() == self.rows.len()
            && self.values.iter().all(|row| row.len() == self.columns.len())
    }

    pub fn row(&self, label: &str) -> Option<&[V]> {
        self.rows
            .iter()
            .position(|r| r == label)
            .map(|i| self.values[i].as_slice())
    }

    pub fn get(&self, row: &str, column: &str) -> Option<V> {
        let c = self.columns.iter().position(|l| l == column)?;
        self.row(row).map(|values| values[c])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = (&str, &[V])> {
        self.rows
            .iter()
            .zip(&self.values)
            .map(|(l, v)| (l.as_str(), v.as_slice()))
    }

    pub(crate) fn cell_mut(&mut self, row: usize, column: usize) -> &mut V {
        &mut self.values[row][column]
    }

    pub(crate) fn map<U: Copy + Default>(&self, f: impl Fn(&[V], V) -> U) -> Matrix<U> {
        Matrix {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| f(row.as_slice(), *v)).collect())
                .collect(),
        }
    }

    pub fn row_total(&self, label: &str) -> Option<V>
    where
        V: Sum<V>,
    {
        self.row(label).map(|values| values.iter().copied().sum())
    }

    /// Sums each column over all rows, in column order.
    pub fn column_totals(&self) -> Series<V>
    where
        V: Sum<V>,
    {
        Series::from_entries(
            self.columns
                .iter()
                .enumerate()
                .map(|(c, label)| (label.clone(), self.values.iter().map(|row| row[c]).sum()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sorted_descending_is_stable_for_ties() {
        let series = Series::sorted_descending(vec![
            ("NL".to_string(), 10.0),
            ("DE".to_string(), 30.0),
            ("AT".to_string(), 10.0),
        ]);
        assert_eq!(series.labels().collect::<Vec<_>>(), vec!["DE", "NL", "AT"]);
        assert_eq!(series.total(), 50.0);
    }

    #[test]
    fn test_reindex_fills_missing_countries() {
        let index = CountryIndex::new(labels(&["DE", "AT", "CH"]));
        let mut values = HashMap::new();
        values.insert("AT".to_string(), 5u64);
        values.insert("FR".to_string(), 9u64);

        let series = index.reindex(&values);
        assert_eq!(
            series.iter().collect::<Vec<_>>(),
            vec![("DE", 0), ("AT", 5), ("CH", 0)]
        );
        assert_eq!(index.position("CH"), Some(2));
        assert_eq!(index.position("FR"), None);
    }

    #[test]
    fn test_matrix_totals() {
        let mut matrix: Matrix<u64> = Matrix::zeros(labels(&["DE", "AT"]), labels(&["A", "B"]));
        *matrix.cell_mut(0, 0) += 2;
        *matrix.cell_mut(0, 1) += 1;
        *matrix.cell_mut(1, 1) += 4;

        assert_eq!(matrix.get("DE", "A"), Some(2));
        assert_eq!(matrix.get("AT", "A"), Some(0));
        assert_eq!(matrix.get("FR", "A"), None);
        assert_eq!(matrix.row_total("AT"), Some(4));
        assert_eq!(
            matrix.column_totals().iter().collect::<Vec<_>>(),
            vec![("A", 2), ("B", 5)]
        );
    }

    #[test]
    fn test_matrix_shape_check() {
        let matrix: Matrix<u64> = Matrix::zeros(labels(&["DE", "NL"]), labels(&["Klarna"]));
        assert!(matrix.is_well_formed());

        let missing_row: Matrix<u64> = serde_json::from_str(
            r#"{"rows":["DE","NL"],"columns":["Klarna"],"values":[[1]]}"#,
        )
        .unwrap();
        assert!(!missing_row.is_well_formed());

        let short_row: Matrix<u64> = serde_json::from_str(
            r#"{"rows":["DE"],"columns":["Klarna","Riverty"],"values":[[1]]}"#,
        )
        .unwrap();
        assert!(!short_row.is_well_formed());
    }
}
