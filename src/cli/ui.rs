use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Insight,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Insight => style(text).cyan(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats a monetary amount the way the headline figures read.
pub fn format_large_number(value: f64) -> String {
    if value >= 1_000_000_000.0 {
        format!("€ {:.1} Billion", value / 1_000_000_000.0)
    } else if value >= 1_000_000.0 {
        format!("€ {:.1} Million", value / 1_000_000.0)
    } else {
        format!("€ {}", group_thousands(value.round() as u64))
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn amount_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}")).set_alignment(CellAlignment::Right)
}

pub fn count_cell(value: u64) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

pub fn percentage_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.1}%")).set_alignment(CellAlignment::Right)
}

/// Formats a cell with bold and green text
pub fn total_percentage_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.0}%"))
        .add_attribute(Attribute::Bold)
        .fg(Color::Green)
        .set_alignment(CellAlignment::Right)
}

/// Percentage cell shaded by intensity, for heatmap-like tables.
pub fn heat_cell(value: f64) -> Cell {
    let color = if value >= 40.0 {
        Color::DarkGreen
    } else if value >= 20.0 {
        Color::Green
    } else if value > 0.0 {
        Color::Grey
    } else {
        Color::DarkGrey
    };
    Cell::new(format!("{value:.1}"))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// Share of `part` in `total` as a percentage, 0 when `total` is 0.
pub fn share_of(part: f64, total: f64) -> f64 {
    if total > 0.0 { part * 100.0 / total } else { 0.0 }
}

/// Creates a spinner reporting the number of rows read so far.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg} {pos} rows") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Returns a separator line matching the terminal width.
pub fn separator() -> String {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    format!("\n{}\n", "─".repeat(term_width))
}
