//! Tracks whether a model's steady state has moved since coefficients were last
//! evaluated.
//!
//! Control coefficients never invalidate themselves. A [`StateKeeper`] remembers the
//! steady-state snapshot a coefficient was last synchronised with and triggers a
//! recompute only when the model reports a different one.

use log::debug;

use crate::control::{coefficient::CCoef, error::SymcaError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateKeeper {
    last_state: Vec<f64>,
}

impl StateKeeper {
    /// Starts tracking from a known snapshot, usually the model's current `state()`.
    pub fn new(state: Vec<f64>) -> Self {
        Self { last_state: state }
    }

    pub fn last_state(&self) -> &[f64] {
        &self.last_state
    }

    /// Recomputes `coefficient` if its model's state differs from the last snapshot.
    ///
    /// # Returns
    ///
    /// Whether a recompute was performed.
    pub fn sync(&mut self, coefficient: &CCoef) -> Result<bool, SymcaError> {
        let state = coefficient.model().borrow().state();
        if state == self.last_state {
            return Ok(false);
        }

        debug!("Steady state changed, recomputing {}", coefficient.name());
        coefficient.recompute()?;
        self.last_state = state;
        Ok(true)
    }
}
