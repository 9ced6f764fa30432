//! Setup module for configuring parameter scans.
//!
//! This module provides the [`ScanSetup`] struct and its builder for configuring a scan
//! of one model parameter over a sequence of values:
//!
//! - The parameter to assign at each step
//! - The values to assign, in order
//! - Whether pattern percentages or values are recorded
//! - Whether the parameter is restored afterwards

use std::{fmt::Display, str::FromStr};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::control::error::SymcaError;

/// What a scan records at each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// Percentage contribution of each control pattern
    #[default]
    Percentage,
    /// Value of each control pattern followed by the coefficient value
    Value,
}

impl ScanType {
    /// Label of the y-axis for results of this scan type.
    pub fn y_label(&self) -> &'static str {
        match self {
            ScanType::Percentage => "Control pattern percentage contribution",
            ScanType::Value => "Control coefficient/pattern value",
        }
    }
}

impl FromStr for ScanType {
    type Err = SymcaError;

    /// Parses `"percentage"` or `"value"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(ScanType::Percentage),
            "value" => Ok(ScanType::Value),
            _ => Err(SymcaError::InvalidScanType(s.to_string())),
        }
    }
}

impl Display for ScanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanType::Percentage => write!(f, "percentage"),
            ScanType::Value => write!(f, "value"),
        }
    }
}

/// Configuration of a parameter scan
///
/// # Fields
///
/// * `parameter` - Name of the settable model attribute to scan
/// * `scan_range` - Values assigned to the parameter, in order
/// * `scan_type` - What to record at each step (default: percentage)
/// * `init_return` - Restore the parameter and re-solve afterwards (default: true)
///
/// # Examples
///
/// ```
/// use symca::scan::setup::{ScanSetupBuilder, ScanType};
///
/// let setup = ScanSetupBuilder::default()
///     .parameter("Vmax2")
///     .scan_range(vec![1.0, 2.0, 3.0])
///     .scan_type(ScanType::Value)
///     .build()
///     .unwrap();
///
/// assert!(setup.init_return);
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct ScanSetup {
    pub parameter: String,
    pub scan_range: Vec<f64>,
    #[builder(default)]
    pub scan_type: ScanType,
    #[builder(default = "true")]
    pub init_return: bool,
}

impl ScanSetup {
    /// Checks that the scan range is non-empty and finite.
    pub fn validate(&self) -> Result<(), SymcaError> {
        if self.scan_range.is_empty() {
            return Err(SymcaError::InvalidScanRange(format!(
                "no values given for {}",
                self.parameter
            )));
        }

        if let Some(value) = self.scan_range.iter().find(|v| !v.is_finite()) {
            return Err(SymcaError::InvalidScanRange(format!(
                "{value} is not a finite value for {}",
                self.parameter
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_type() {
        assert_eq!("percentage".parse::<ScanType>().unwrap(), ScanType::Percentage);
        assert_eq!("value".parse::<ScanType>().unwrap(), ScanType::Value);
        assert!(matches!(
            "bogus".parse::<ScanType>(),
            Err(SymcaError::InvalidScanType(s)) if s == "bogus"
        ));
    }

    #[test]
    fn test_builder_defaults() {
        let setup = ScanSetupBuilder::default()
            .parameter("p")
            .scan_range(vec![1.0])
            .build()
            .unwrap();

        assert_eq!(setup.scan_type, ScanType::Percentage);
        assert!(setup.init_return);
    }

    #[test]
    fn test_missing_parameter() {
        let result = ScanSetupBuilder::default().scan_range(vec![1.0]).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_range() {
        let mut setup = ScanSetupBuilder::default()
            .parameter("p")
            .scan_range(Vec::<f64>::new())
            .build()
            .unwrap();
        assert!(matches!(setup.validate(), Err(SymcaError::InvalidScanRange(_))));

        setup.scan_range = vec![1.0, f64::NAN];
        assert!(matches!(setup.validate(), Err(SymcaError::InvalidScanRange(_))));

        setup.scan_range = vec![1.0, 2.0];
        assert!(setup.validate().is_ok());
    }
}
