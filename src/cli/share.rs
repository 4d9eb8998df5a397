use super::ui;
use crate::core::MetricsBundle;
use comfy_table::Cell;

const NO_PROVIDERS: &str = "No retailers with a BNPL provider match the selected filters.";

/// Provider market share by retailer count and by revenue.
pub fn render(metrics: &MetricsBundle) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Market Share of BNPL Players", ui::StyleType::Title)
    );
    let counts = metrics.market_share_count.column_totals();
    let revenues = metrics.market_share_revenue.column_totals();
    if counts.is_empty() {
        output.push_str(NO_PROVIDERS);
        return output;
    }

    let total_count = counts.total() as f64;
    let total_revenue = revenues.total();

    let mut totals = ui::new_styled_table();
    totals.set_header(vec![
        ui::header_cell("Provider"),
        ui::header_cell("Retailers"),
        ui::header_cell("Share by Count"),
        ui::header_cell("Revenue (€)"),
        ui::header_cell("Share by Revenue"),
    ]);
    for (provider, count) in counts.iter() {
        let revenue = revenues.get(provider).unwrap_or_default();
        totals.add_row(vec![
            Cell::new(provider),
            ui::count_cell(count),
            ui::total_percentage_cell(ui::share_of(count as f64, total_count)),
            ui::amount_cell(revenue),
            ui::total_percentage_cell(ui::share_of(revenue, total_revenue)),
        ]);
    }
    output.push_str(&totals.to_string());

    let mut by_country = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Country")];
    header.extend(
        metrics
            .market_share_count
            .columns()
            .iter()
            .map(|p| ui::header_cell(p)),
    );
    by_country.set_header(header);
    for (country, values) in metrics.market_share_count.iter_rows() {
        let mut row = vec![Cell::new(country)];
        row.extend(values.iter().map(|v| ui::count_cell(*v)));
        by_country.add_row(row);
    }

    output.push_str(&format!(
        "\n\n{}\n\n{}",
        ui::style_text("Retailers per Provider and Country", ui::StyleType::TotalLabel),
        by_country
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::calculate_metrics;
    use crate::core::record::{BnplType, RetailerRecord};

    fn retailer(country: &str, revenue: f64, provider: &str) -> RetailerRecord {
        RetailerRecord {
            country: country.to_string(),
            annual_revenue: revenue,
            product_category: "Electronics".to_string(),
            bnpl_type: BnplType::OutsourcedOnly,
            bnpl_provider: provider.to_string(),
            retailer_rank: 150,
            year: 2023,
        }
    }

    #[test]
    fn test_render_share() {
        console::set_colors_enabled(false);
        let records = vec![
            retailer("DE", 300.0, "Klarna"),
            retailer("DE", 100.0, "Riverty"),
            retailer("NL", 100.0, "Klarna"),
            retailer("NL", 500.0, "Klarna"),
        ];
        let output = render(&calculate_metrics(&records, &[]));

        assert!(output.contains("Klarna"));
        assert!(output.contains("Riverty"));
        assert!(output.contains("75%"));
        assert!(output.contains("90%"));
        assert!(output.contains("Retailers per Provider and Country"));
    }

    #[test]
    fn test_render_without_providers() {
        let mut record = retailer("DE", 300.0, "No BNPL");
        record.bnpl_type = BnplType::NoBnpl;
        let output = render(&calculate_metrics(&[record], &[]));
        assert!(output.contains(NO_PROVIDERS));
    }
}
