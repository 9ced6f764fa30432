//! Information display module for control coefficients
//!
//! Formats a control coefficient and its control patterns as a table of names, values
//! and percentage contributions. Values are read through the usual caches, so the
//! table shows whatever was last computed.

use tabled::{builder::Builder, settings::Style};

use crate::control::{coefficient::CCoef, error::SymcaError};

/// Renders a coefficient as a table with one row per control pattern and a final row
/// for the coefficient itself.
///
/// Values that cannot be evaluated are shown as `NaN` so that formatting never fails.
pub fn coefficient_table(coefficient: &CCoef) -> String {
    let mut builder = Builder::default();
    builder.push_record(vec!["Name", "Value", "Percentage"]);

    for pattern in coefficient.control_patterns().values() {
        builder.push_record(vec![
            pattern.name().to_string(),
            format_value(pattern.value()),
            format_value(pattern.percentage()),
        ]);
    }

    builder.push_record(vec![
        coefficient.name().to_string(),
        format_value(coefficient.value()),
        String::new(),
    ]);

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn format_value(value: Result<f64, SymcaError>) -> String {
    match value {
        Ok(v) => format!("{v:.3}"),
        Err(_) => "NaN".to_string(),
    }
}
