use super::{ui, NO_MATCHES};
use crate::core::{CAPTURE_RATE, MetricsBundle};
use comfy_table::Cell;

/// Headline TAM/SAM/SOM figures followed by the per-country breakdown.
pub fn render(metrics: &MetricsBundle) -> String {
    let mut output = format!("{}\n\n", ui::style_text("Market Size", ui::StyleType::Title));
    if metrics.tam.is_empty() {
        output.push_str(NO_MATCHES);
        return output;
    }

    for (label, value) in [
        ("TAM", metrics.tam.total()),
        ("SAM", metrics.sam.total()),
        ("SOM", metrics.som.total()),
    ] {
        output.push_str(&format!(
            "{}: {}\n",
            ui::style_text(label, ui::StyleType::TotalLabel),
            ui::style_text(&ui::format_large_number(value), ui::StyleType::TotalValue)
        ));
    }
    output.push('\n');

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Country"),
        ui::header_cell("TAM (€)"),
        ui::header_cell("SAM (€)"),
        ui::header_cell("SOM (€)"),
        ui::header_cell("SAM of TAM"),
    ]);
    for (country, tam) in metrics.tam.iter() {
        let sam = metrics.sam.get(country).unwrap_or_default();
        let som = metrics.som.get(country).unwrap_or_default();
        table.add_row(vec![
            Cell::new(country),
            ui::amount_cell(tam),
            ui::amount_cell(sam),
            ui::amount_cell(som),
            ui::percentage_cell(ui::share_of(sam, tam)),
        ]);
    }
    output.push_str(&table.to_string());

    output.push_str(&format!(
        "\n\n{}",
        ui::style_text(
            &format!(
                "SOM assumes a single provider captures {:.0}% of SAM.",
                CAPTURE_RATE * 100.0
            ),
            ui::StyleType::Subtle
        )
    ));
    output
}
