use crate::core::{Regime, TableCell};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
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

fn regime_color(regime: Regime) -> Color {
    match regime {
        Regime::TrendPersistent => Color::Green,
        Regime::MeanReverting => Color::Yellow,
        Regime::Efficient => Color::DarkGrey,
    }
}

/// Label and exponent, e.g. `TR 0.6156`; failures read `unavailable: <reason>`.
pub fn result_cell(cell: &TableCell) -> Cell {
    match (cell.classification.regime(), cell.exponent()) {
        (Some(regime), Some(exponent)) => Cell::new(format!("{regime} {exponent:.4}"))
            .fg(regime_color(regime))
            .set_alignment(CellAlignment::Right),
        _ => Cell::new(cell.classification.to_string()).fg(Color::Red),
    }
}

/// Placeholder for a cell that was never recorded.
pub fn na_cell() -> Cell {
    Cell::new("N/A").fg(Color::DarkGrey)
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EstimateError, TaskError};

    #[test]
    fn test_result_cell_content() {
        let cell = TableCell::new(Ok(0.61557));
        assert_eq!(result_cell(&cell).content(), "TR 0.6156");

        let cell = TableCell::new(Err(TaskError::Estimate(EstimateError::InsufficientData {
            required: 3,
            actual: 1,
        })));
        assert_eq!(
            result_cell(&cell).content(),
            "unavailable: insufficient data: need at least 3 prices, got 1"
        );
    }
}
