//! Control coefficients
//!
//! A [`CCoef`] is a symbolic control coefficient `numerator / denominator`. On
//! construction its numerator is split into additive terms, each of which becomes a
//! [`CPattern`] named `CP1`, `CP2`, … in the order the terms appear. The coefficient's
//! value is the sum of its pattern values, computed in one batched pass that reads the
//! model once and hands the resolved symbols to every pattern.

use std::{
    fmt::{self, Display},
    rc::Rc,
};

use indexmap::IndexMap;
use log::debug;

use crate::{
    control::{
        base::{format_repr_latex, AsExpr, CCBase},
        cache::LazyField,
        error::SymcaError,
        pattern::CPattern,
    },
    expression::{self, SymExpr},
    latex::SharedRenderer,
    model::SharedModel,
};

/// Ordered mapping from pattern name to pattern.
pub type ControlPatterns = IndexMap<String, CPattern>;

/// A control coefficient decomposed into control patterns.
pub struct CCoef {
    base: CCBase,
    numerator: SymExpr,
    denominator: Rc<CCBase>,
    control_patterns: ControlPatterns,
    latex_numerator: LazyField<String>,
    latex_expression_full: LazyField<String>,
    latex_name: LazyField<String>,
}

impl CCoef {
    /// Creates a control coefficient and its control patterns.
    ///
    /// # Arguments
    ///
    /// * `model` - The model supplying symbol values
    /// * `name` - Name of the coefficient, e.g. `ccJR1_R2`
    /// * `numerator` - Numerator expression, decomposed into one pattern per term
    /// * `denominator` - Denominator entity shared with other coefficients
    /// * `renderer` - Renderer for the textual and LaTeX forms
    ///
    /// # Returns
    ///
    /// The coefficient behind an `Rc`, since its patterns refer back to it.
    pub fn new(
        model: SharedModel,
        name: impl Into<String>,
        numerator: SymExpr,
        denominator: Rc<CCBase>,
        renderer: SharedRenderer,
    ) -> Rc<Self> {
        let name = name.into();
        let expression = expression::divide(numerator.clone(), denominator.as_expr());

        Rc::new_cyclic(|parent| {
            let control_patterns: ControlPatterns = numerator
                .terms()
                .into_iter()
                .enumerate()
                .map(|(i, term)| {
                    let pattern_name = format!("CP{}", i + 1);
                    let pattern = CPattern::new(
                        model.clone(),
                        pattern_name.clone(),
                        term,
                        denominator.clone(),
                        parent.clone(),
                        renderer.clone(),
                    );
                    (pattern_name, pattern)
                })
                .collect();

            debug!("{name} decomposed into {} patterns", control_patterns.len());

            Self {
                base: CCBase::new(model, name, expression, renderer),
                numerator,
                denominator,
                control_patterns,
                latex_numerator: LazyField::new(),
                latex_expression_full: LazyField::new(),
                latex_name: LazyField::new(),
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    pub fn numerator(&self) -> &SymExpr {
        &self.numerator
    }

    /// Expression of the shared denominator.
    pub fn denominator(&self) -> &SymExpr {
        self.denominator.expression()
    }

    pub fn denominator_object(&self) -> &Rc<CCBase> {
        &self.denominator
    }

    /// `numerator / denominator`.
    pub fn expression(&self) -> &SymExpr {
        self.base.expression()
    }

    pub fn model(&self) -> &SharedModel {
        self.base.model()
    }

    pub fn control_patterns(&self) -> &ControlPatterns {
        &self.control_patterns
    }

    /// Looks up a pattern by name, e.g. `"CP2"`.
    pub fn pattern(&self, name: &str) -> Option<&CPattern> {
        self.control_patterns.get(name)
    }

    /// Returns the coefficient value, running a batched evaluation on first access.
    pub fn value(&self) -> Result<f64, SymcaError> {
        self.base.cached_value(|| self.evaluate_patterns())
    }

    /// Re-evaluates every pattern against the current model state and stores their sum
    /// as the coefficient value.
    pub fn recompute(&self) -> Result<f64, SymcaError> {
        let value = self.evaluate_patterns()?;
        self.base.store_value(value);
        Ok(value)
    }

    fn evaluate_patterns(&self) -> Result<f64, SymcaError> {
        let subs = self.base.substitution()?;
        let mut total = 0.0;
        for pattern in self.control_patterns.values() {
            total += pattern.recompute(Some(&subs))?;
        }
        debug!("{} = {total}", self.name());
        Ok(total)
    }

    /// Whether all pattern values are strictly positive or all strictly negative.
    ///
    /// This is a diagnostic only. Mixed signs are legitimate, but then pattern
    /// percentages no longer partition the coefficient.
    pub fn check_control_patterns(&self) -> Result<bool, SymcaError> {
        let values = self
            .control_patterns
            .values()
            .map(CPattern::value)
            .collect::<Result<Vec<f64>, SymcaError>>()?;

        Ok(values.iter().all(|v| *v > 0.0) || values.iter().all(|v| *v < 0.0))
    }

    pub fn string_expression(&self) -> String {
        self.base.string_expression()
    }

    pub fn latex_numerator(&self) -> String {
        self.latex_numerator
            .get_or_init(|| self.base.renderer().expression_to_latex(&self.numerator))
    }

    /// `(<numerator>)/ \Sigma`
    pub fn latex_expression(&self) -> String {
        self.base
            .cached_latex(|| format!("({})/ \\,\\Sigma", self.latex_numerator()))
    }

    /// `\frac{<numerator>}{<denominator>}`
    pub fn latex_expression_full(&self) -> String {
        self.latex_expression_full.get_or_init(|| {
            format!(
                "\\frac{{{}}}{{{}}}",
                self.latex_numerator(),
                self.denominator.latex_expression()
            )
        })
    }

    pub fn latex_name(&self) -> String {
        self.latex_name
            .get_or_init(|| self.base.renderer().name_to_latex(self.name()))
    }

    pub fn repr_latex(&self) -> Result<String, SymcaError> {
        Ok(format_repr_latex(
            &self.latex_name(),
            &self.latex_expression(),
            self.value()?,
        ))
    }
}

impl AsExpr for CCoef {
    fn as_expr(&self) -> SymExpr {
        self.base.as_expr()
    }
}

impl Display for CCoef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::info::coefficient_table(self))
    }
}
