//! Symbolic Control Analysis Library
//!
//! This library decomposes symbolic control coefficients of metabolic models into
//! control patterns and evaluates them against a live model, including:
//! - Lazily evaluated, cached coefficient and pattern values
//! - Plain-text and LaTeX renderings of coefficients and patterns
//! - Parameter scans tabulating pattern contributions
//! - An assignment-rule reference model and its JSON definition format

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::control::base::{AsExpr, CCBase};
    pub use crate::control::coefficient::{CCoef, ControlPatterns};
    pub use crate::control::error::SymcaError;
    pub use crate::control::pattern::CPattern;
    pub use crate::expression::{Substitution, SymExpr};
    pub use crate::io::*;
    pub use crate::latex::{DefaultLatexRenderer, LatexRenderer, SharedRenderer};
    pub use crate::model::{
        AssignmentModel, AssignmentRule, AssignmentRuleBuilder, ModelBridge, SharedModel,
        Verbosity,
    };
    pub use crate::scan::result::*;
    pub use crate::scan::setup::*;
    pub use crate::state::StateKeeper;
}

/// Symbolic expressions, their parsing and numeric evaluation
pub mod expression;

/// LaTeX rendering of expressions and symbol names
pub mod latex;

/// Access to the live model an analysis is bound to
pub mod model;

/// Control analysis entities
pub mod control {
    /// Shared value cache and rendering of a symbolic expression
    pub mod base;
    /// Lazily computed fields
    pub mod cache;
    /// Control coefficients and their decomposition into patterns
    pub mod coefficient;
    /// Error types for control analysis failures
    pub mod error;
    /// Single additive terms of a coefficient numerator
    pub mod pattern;
}

/// Parameter scans over control coefficients
pub mod scan {
    /// Scan result tables and plotting
    pub mod result;
    /// Scan execution
    pub mod runner;
    /// Scan setup and configuration
    pub mod setup;
}

/// Steady-state change tracking
pub mod state;

/// Tabular summaries of coefficients
pub mod info;

/// IO functionality
pub mod io;
