//! Scan Result Module
//!
//! This module provides the data structures returned by parameter scans and their
//! visualisation.
//!
//! # Key Components
//!
//! - [`ScanResult`]: Table of scan values, one column per control pattern
//! - [`AxisProperties`]: Axis labels, scales and limits for plotting a result
//! - [`AxisScale`]: Linear or logarithmic axis
//!
//! The first column of the table always holds the scanned parameter values. It is
//! followed by one column per control pattern in pattern order and, for value scans,
//! a final column for the coefficient.

use plotly::{
    common::{Mode, Title},
    layout::{Axis, AxisType},
    Layout, Plot, Scatter,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{control::error::SymcaError, scan::setup::ScanType};

/// Scale of a plot axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    #[default]
    Linear,
    Log,
}

impl From<AxisScale> for AxisType {
    fn from(scale: AxisScale) -> Self {
        match scale {
            AxisScale::Linear => AxisType::Linear,
            AxisScale::Log => AxisType::Log,
        }
    }
}

/// Axis metadata of a scan result.
///
/// # Fields
///
/// * `x_label` - The parameter name, or `[name]` when the parameter is a species
/// * `y_label` - Depends on the scan type
/// * `x_scale` - Scale of the x-axis
/// * `y_scale` - Scale of the y-axis
/// * `x_lim` - First and last value of the scan range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisProperties {
    pub x_label: String,
    pub y_label: String,
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    pub x_lim: [f64; 2],
}

/// Tabular result of a parameter scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub data: DataFrame,
    pub axis: AxisProperties,
    pub scan_type: ScanType,
}

impl ScanResult {
    /// Assembles a result from named columns of equal length.
    ///
    /// # Arguments
    ///
    /// * `column_names` - Names of the columns, parameter first
    /// * `columns` - Column data in the same order as `column_names`
    /// * `axis` - Axis metadata
    /// * `scan_type` - The kind of scan that produced the data
    ///
    /// # Errors
    ///
    /// Returns [`SymcaError::Table`] if the columns cannot form a table, for instance
    /// because of duplicate names or differing lengths.
    pub fn new(
        column_names: &[String],
        columns: Vec<Vec<f64>>,
        axis: AxisProperties,
        scan_type: ScanType,
    ) -> Result<Self, SymcaError> {
        let series: Vec<Series> = column_names
            .iter()
            .zip(columns)
            .map(|(name, values)| Series::new(name, values))
            .collect();

        Ok(Self {
            data: DataFrame::new(series)?,
            axis,
            scan_type,
        })
    }

    /// Names of all columns, parameter first.
    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    /// Number of scan points.
    pub fn n_rows(&self) -> usize {
        self.data.height()
    }

    /// Values of the column `name`.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, SymcaError> {
        Ok(self
            .data
            .column(name)?
            .f64()?
            .into_iter()
            .map(|value| value.unwrap_or(f64::NAN))
            .collect())
    }

    /// Creates a line plot with one trace per non-parameter column.
    ///
    /// # Arguments
    ///
    /// * `show` - Whether to display the plot immediately
    pub fn plot(&self, show: bool) -> Result<Plot, SymcaError> {
        let names = self.column_names();
        let (parameter, traces) = names
            .split_first()
            .ok_or_else(|| SymcaError::InvalidScanRange("empty scan result".to_string()))?;
        let x = self.column(parameter)?;

        let mut plot = Plot::new();
        for name in traces {
            let trace = Scatter::new(x.clone(), self.column(name)?)
                .name(name)
                .mode(Mode::Lines);
            plot.add_trace(trace);
        }

        plot.set_layout(
            Layout::new()
                .x_axis(
                    Axis::new()
                        .title(Title::from(self.axis.x_label.as_str()))
                        .type_(self.axis.x_scale.into())
                        .range(self.axis.x_lim.to_vec()),
                )
                .y_axis(
                    Axis::new()
                        .title(Title::from(self.axis.y_label.as_str()))
                        .type_(self.axis.y_scale.into()),
                ),
        );

        if show {
            plot.show();
        }

        Ok(plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> AxisProperties {
        AxisProperties {
            x_label: "p".to_string(),
            y_label: ScanType::Value.y_label().to_string(),
            x_scale: AxisScale::Linear,
            y_scale: AxisScale::Linear,
            x_lim: [1.0, 2.0],
        }
    }

    #[test]
    fn test_new_and_columns() {
        let names = vec!["p".to_string(), "CP1".to_string()];
        let result = ScanResult::new(
            &names,
            vec![vec![1.0, 2.0], vec![0.5, 0.25]],
            axis(),
            ScanType::Value,
        )
        .unwrap();

        assert_eq!(result.column_names(), names);
        assert_eq!(result.n_rows(), 2);
        assert_eq!(result.column("CP1").unwrap(), vec![0.5, 0.25]);
        assert!(result.column("CP2").is_err());
    }

    #[test]
    fn test_duplicate_columns_are_rejected() {
        let names = vec!["CP1".to_string(), "CP1".to_string()];
        let result = ScanResult::new(
            &names,
            vec![vec![1.0], vec![2.0]],
            axis(),
            ScanType::Percentage,
        );

        assert!(matches!(result, Err(SymcaError::Table(_))));
    }

    #[test]
    fn test_plot_has_trace_per_pattern() {
        let names = vec!["p".to_string(), "CP1".to_string(), "CP2".to_string()];
        let result = ScanResult::new(
            &names,
            vec![vec![1.0, 2.0], vec![60.0, 50.0], vec![40.0, 50.0]],
            axis(),
            ScanType::Percentage,
        )
        .unwrap();

        let json = result.plot(false).unwrap().to_json();
        assert!(json.contains("\"CP1\""));
        assert!(json.contains("\"CP2\""));
    }
}
