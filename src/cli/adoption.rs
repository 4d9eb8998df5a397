use super::{ui, NO_MATCHES};
use crate::core::{Matrix, MetricsBundle};
use comfy_table::{Cell, Table};

/// Share of retailers offering BNPL per country, and the raw distribution of
/// payment options.
pub fn render(metrics: &MetricsBundle) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Retailer BNPL Adoption", ui::StyleType::Title)
    );
    if metrics.bnpl_adoption.is_empty() {
        output.push_str(NO_MATCHES);
        return output;
    }

    let offering = metrics.offering_share();
    let mut adoption = header_table(&metrics.bnpl_adoption, "Offering BNPL");
    for (country, values) in metrics.bnpl_adoption.iter_rows() {
        let mut row = vec![Cell::new(country)];
        row.extend(values.iter().map(|v| ui::percentage_cell(*v)));
        row.push(ui::total_percentage_cell(
            offering.get(country).unwrap_or_default(),
        ));
        adoption.add_row(row);
    }

    let mut distribution = header_table(&metrics.bnpl_distribution, "Retailers");
    for (country, values) in metrics.bnpl_distribution.iter_rows() {
        let mut row = vec![Cell::new(country)];
        row.extend(values.iter().map(|v| ui::count_cell(*v)));
        row.push(ui::count_cell(values.iter().sum()));
        distribution.add_row(row);
    }

    output.push_str(&format!(
        "{}\n\n{}",
        ui::style_text(
            "Share of Retailers Offering BNPL by Country (%)",
            ui::StyleType::TotalLabel
        ),
        adoption
    ));
    if let Some(average) = metrics.average_offering_share() {
        output.push_str(&format!(
            "\n\n{}",
            ui::style_text(
                &format!(
                    "On average, {average:.0}% of retailers in the selected region offer BNPL services."
                ),
                ui::StyleType::Insight
            )
        ));
    }
    output.push_str(&format!(
        "\n\n{}\n\n{}",
        ui::style_text("BNPL Payment Options Distribution", ui::StyleType::TotalLabel),
        distribution
    ));
    output
}

fn header_table<V: Copy + Default>(matrix: &Matrix<V>, total_label: &str) -> Table {
    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Country")];
    header.extend(matrix.columns().iter().map(|c| ui::header_cell(c)));
    header.push(ui::header_cell(total_label));
    table.set_header(header);
    table
}
