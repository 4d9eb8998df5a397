use super::{ui, NO_MATCHES};
use crate::core::MetricsBundle;
use comfy_table::Cell;

/// Revenue contribution per rank tier and country, then the tier spread of
/// the selected providers' retailers.
pub fn render(metrics: &MetricsBundle) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Revenue Contribution by Retailer Tier", ui::StyleType::Title)
    );
    if metrics.tier_contribution.is_empty() {
        output.push_str(NO_MATCHES);
        return output;
    }

    let mut contribution = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Country")];
    header.extend(
        metrics
            .tier_contribution
            .columns()
            .iter()
            .map(|t| ui::header_cell(t)),
    );
    contribution.set_header(header);
    for (country, values) in metrics.tier_contribution.iter_rows() {
        let mut row = vec![Cell::new(country)];
        row.extend(values.iter().map(|v| ui::heat_cell(*v)));
        contribution.add_row(row);
    }
    output.push_str(&format!(
        "{}\n\n{}",
        ui::style_text("% Contribution", ui::StyleType::TotalLabel),
        contribution
    ));

    output.push_str(&format!(
        "\n\n{}\n\n",
        ui::style_text("Retail Merchant Distribution by Tier", ui::StyleType::Title)
    ));
    if metrics.provider_tiers.columns().is_empty() {
        output.push_str("No BNPL providers selected.");
        return output;
    }

    let mut providers = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Tier")];
    header.extend(
        metrics
            .provider_tiers
            .columns()
            .iter()
            .map(|p| ui::header_cell(p)),
    );
    providers.set_header(header);
    for (tier, values) in metrics.provider_tiers.iter_rows() {
        let mut row = vec![Cell::new(tier)];
        row.extend(values.iter().map(|v| ui::percentage_cell(*v)));
        providers.add_row(row);
    }
    output.push_str(&format!(
        "{}\n\n{}",
        ui::style_text("% of Retail Merchants", ui::StyleType::TotalLabel),
        providers
    ));
    output
}
