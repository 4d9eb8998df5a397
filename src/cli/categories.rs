use super::{ui, NO_MATCHES};
use crate::core::MetricsBundle;
use comfy_table::Cell;

/// Product categories ranked by retailer volume and by revenue.
pub fn render(metrics: &MetricsBundle) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Promising Product Categories", ui::StyleType::Title)
    );
    if metrics.product_volumes.is_empty() {
        output.push_str(NO_MATCHES);
        return output;
    }

    let total_count = metrics.product_volumes.total() as f64;
    let mut volumes = ui::new_styled_table();
    volumes.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Retailers"),
        ui::header_cell("Share"),
    ]);
    for (category, count) in metrics.product_volumes.iter() {
        volumes.add_row(vec![
            Cell::new(category),
            ui::count_cell(count),
            ui::percentage_cell(ui::share_of(count as f64, total_count)),
        ]);
    }

    let total_revenue = metrics.product_revenues.total();
    let mut revenues = ui::new_styled_table();
    revenues.set_header(vec![
        ui::header_cell("Category"),
        ui::header_cell("Revenue (€)"),
        ui::header_cell("Share"),
    ]);
    for (category, revenue) in metrics.product_revenues.iter() {
        revenues.add_row(vec![
            Cell::new(category),
            ui::amount_cell(revenue),
            ui::percentage_cell(ui::share_of(revenue, total_revenue)),
        ]);
    }

    output.push_str(&format!(
        "{}\n\n{}\n\n{}\n\n{}",
        ui::style_text("By Retailer Volume", ui::StyleType::TotalLabel),
        volumes,
        ui::style_text("By Revenue Potential", ui::StyleType::TotalLabel),
        revenues
    ));
    output
}
