//! Terminal rendering of the dashboard sections

pub mod adoption;
pub mod categories;
pub mod export;
pub mod market;
pub mod setup;
pub mod share;
pub mod tiers;
pub mod ui;

use crate::core::{Dataset, FilterSelection, MetricsBundle};
use anyhow::{Context, Result};
use std::path::Path;

pub(crate) const NO_MATCHES: &str = "No retailers match the selected filters.";

/// A dashboard section that renders from the metrics bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Market,
    Share,
    Categories,
    Adoption,
    Tiers,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Market,
        Section::Share,
        Section::Categories,
        Section::Adoption,
        Section::Tiers,
    ];

    pub fn render(&self, metrics: &MetricsBundle) -> String {
        match self {
            Section::Market => market::render(metrics),
            Section::Share => share::render(metrics),
            Section::Categories => categories::render(metrics),
            Section::Adoption => adoption::render(metrics),
            Section::Tiers => tiers::render(metrics),
        }
    }
}

/// One line describing the active filters, printed above every report.
pub fn describe_selection(selection: &FilterSelection, rows: usize) -> String {
    let year = selection
        .year
        .map_or("all years".to_string(), |y| y.to_string());
    let countries = selection
        .countries
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let mut banner = ui::style_text(
        &format!("Year {year} | Countries: {countries} | {rows} retailers"),
        ui::StyleType::Subtle,
    );
    if !selection.ignored_countries.is_empty() {
        banner.push('\n');
        banner.push_str(&ui::style_text(
            &format!(
                "Ignored outside the selected region: {}",
                selection.ignored_countries.join(", ")
            ),
            ui::StyleType::Insight,
        ));
    }
    banner
}

/// Renders `sections` one after another, separated by rules.
pub fn render_sections(
    sections: &[Section],
    selection: &FilterSelection,
    metrics: &MetricsBundle,
    rows: usize,
) -> String {
    let mut output = format!("{}\n\n", describe_selection(selection, rows));
    let rendered: Vec<String> = sections.iter().map(|s| s.render(metrics)).collect();
    output.push_str(&rendered.join(&ui::separator()));
    output
}

/// Reads the dataset behind a spinner.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let pb = ui::new_spinner("Loading retailers...");
    let result = Dataset::load(path, &|| pb.inc(1));
    pb.finish_and_clear();
    result.with_context(|| format!("Failed to load dataset: {}", path.display()))
}
