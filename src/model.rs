//! Model State Bridge
//!
//! This module defines how control coefficients talk to a live metabolic model. A model
//! exposes named numeric attributes (rates, concentrations, elasticities), a steady-state
//! re-solution and a topology query. The analysis only ever reads attributes while
//! evaluating and writes them while scanning.
//!
//! # Key Components
//!
//! - [`ModelBridge`]: Read/write access to named attributes and steady-state re-solution
//! - [`Verbosity`]: Output mode passed explicitly into each re-solution
//! - [`SharedModel`]: Single-threaded shared handle held by every entity of an analysis
//! - [`AssignmentModel`]: Reference model whose steady state is given by explicit
//!   assignment rules evaluated in order

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use derive_builder::Builder;
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    control::error::SymcaError,
    expression::{Substitution, SymExpr},
};

/// Shared handle to a model. Entities hold clones of this handle; the scan runner is the
/// only component that mutates through it.
pub type SharedModel = Rc<RefCell<dyn ModelBridge>>;

/// Whether a re-solution may report on its progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Loud,
}

/// Access to a live model's state.
pub trait ModelBridge {
    /// Returns the current value of the attribute `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SymcaError::UnboundVariable`] if the model has no such attribute.
    fn get(&self, name: &str) -> Result<f64, SymcaError>;

    /// Assigns `value` to the settable attribute `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SymcaError::UnknownParameter`] if `name` cannot be set.
    fn set(&mut self, name: &str, value: f64) -> Result<(), SymcaError>;

    /// Recomputes the steady state and every attribute derived from it.
    fn recompute_steady_state(&mut self, verbosity: Verbosity) -> Result<(), SymcaError>;

    /// Whether `name` is a species of the model's topology.
    fn is_species(&self, name: &str) -> bool;

    /// Ordered snapshot of the current steady state (fluxes, then concentrations).
    fn state(&self) -> Vec<f64>;
}

/// Resolves the value of every symbol in `symbols` from the model.
pub fn resolve_substitution<'a>(
    model: &dyn ModelBridge,
    symbols: impl IntoIterator<Item = &'a String>,
) -> Result<Substitution, SymcaError> {
    symbols
        .into_iter()
        .map(|name| Ok((name.clone(), model.get(name)?)))
        .collect()
}

/// A derived attribute `target = equation`.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
#[builder(setter(into))]
pub struct AssignmentRule {
    pub target: String,
    pub equation: String,
}

/// A model whose steady state is described by explicit assignment rules.
///
/// Parameters are the settable attributes. On every re-solution the rules are evaluated
/// in declaration order; a rule may refer to parameters and to the targets of earlier
/// rules. Targets named `J_<reaction>` and `<species>_ss` make up the state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentModel {
    pub name: String,
    #[serde(default)]
    pub parameters: IndexMap<String, f64>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub rules: Vec<AssignmentRule>,
    #[serde(skip)]
    derived: HashMap<String, f64>,
    #[serde(skip)]
    solves: usize,
}

impl AssignmentModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a settable parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: f64) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Declares a species. Species are usually also given as parameters holding their
    /// fixed concentration.
    pub fn with_species(mut self, name: impl Into<String>) -> Self {
        self.species.push(name.into());
        self
    }

    /// Appends an assignment rule.
    pub fn with_rule(mut self, target: impl Into<String>, equation: impl Into<String>) -> Self {
        self.rules.push(AssignmentRule {
            target: target.into(),
            equation: equation.into(),
        });
        self
    }

    /// Number of completed re-solutions.
    pub fn solve_count(&self) -> usize {
        self.solves
    }

    /// Wraps the model into a shared handle.
    pub fn into_shared(self) -> Rc<RefCell<AssignmentModel>> {
        Rc::new(RefCell::new(self))
    }
}

impl ModelBridge for AssignmentModel {
    fn get(&self, name: &str) -> Result<f64, SymcaError> {
        self.parameters
            .get(name)
            .copied()
            .or_else(|| self.derived.get(name).copied())
            .ok_or_else(|| SymcaError::UnboundVariable(name.to_string()))
    }

    fn set(&mut self, name: &str, value: f64) -> Result<(), SymcaError> {
        let slot = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| SymcaError::UnknownParameter(name.to_string()))?;
        *slot = value;
        Ok(())
    }

    fn recompute_steady_state(&mut self, verbosity: Verbosity) -> Result<(), SymcaError> {
        let mut values: Substitution = self
            .parameters
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();

        for rule in &self.rules {
            let equation = SymExpr::parse(&rule.equation)?;
            let value = equation.evaluate(&values).map_err(|e| {
                SymcaError::SteadyState(format!("{} = {}: {e}", rule.target, rule.equation))
            })?;
            values.insert(rule.target.clone(), value);
        }

        self.derived = self
            .rules
            .iter()
            .filter_map(|rule| values.get(&rule.target).map(|v| (rule.target.clone(), *v)))
            .collect();
        self.solves += 1;

        match verbosity {
            Verbosity::Loud => info!(
                "{}: steady state recomputed ({} derived attributes)",
                self.name,
                self.derived.len()
            ),
            Verbosity::Quiet => debug!("{}: steady state recomputed", self.name),
        }

        Ok(())
    }

    fn is_species(&self, name: &str) -> bool {
        self.species.iter().any(|s| s == name)
    }

    fn state(&self) -> Vec<f64> {
        let fluxes = self
            .rules
            .iter()
            .filter(|rule| rule.target.starts_with("J_"));
        let concentrations = self
            .rules
            .iter()
            .filter(|rule| rule.target.ends_with("_ss"));

        fluxes
            .chain(concentrations)
            .filter_map(|rule| self.derived.get(&rule.target).copied())
            .collect()
    }
}
