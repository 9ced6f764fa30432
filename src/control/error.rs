//! Control Analysis Error Module
//!
//! This module provides the error type shared by expression evaluation, control
//! coefficient decomposition and parameter scans.
//!
//! # Key Error Types
//!
//! The [`SymcaError`] enum covers the failure points of the analysis:
//! - Symbols without a value on the model
//! - Arithmetic domain errors during evaluation
//! - Invalid scan modes, ranges and setups
//! - Model re-solution failures
//! - Table assembly errors
//!
//! Errors are never recovered locally. Any failure aborts the current value access
//! or scan and is returned to the caller unchanged.

use polars::prelude::PolarsError;
use thiserror::Error;

use crate::scan::setup::ScanSetupBuilderError;

#[derive(Error, Debug)]
pub enum SymcaError {
    #[error("No model attribute bound to symbol '{0}'")]
    UnboundVariable(String),
    #[error("Error evaluating expression: {0}")]
    Evaluation(String),
    #[error("Invalid scan type '{0}': expected 'percentage' or 'value'")]
    InvalidScanType(String),
    #[error("Invalid scan range: {0}")]
    InvalidScanRange(String),
    #[error("Scanned parameter '{0}' collides with a result column of the same name")]
    DuplicateColumn(String),
    #[error("Invalid scan setup: {0}")]
    InvalidScanSetup(#[from] ScanSetupBuilderError),
    #[error("Parameter '{0}' is not a settable model attribute")]
    UnknownParameter(String),
    #[error("Could not parse expression {0}")]
    ExpressionParse(String),
    #[error("Control pattern '{0}' outlived its control coefficient")]
    DetachedPattern(String),
    #[error("Steady state could not be computed: {0}")]
    SteadyState(String),
    #[error("Failed to assemble scan table: {0}")]
    Table(#[from] PolarsError),
}
