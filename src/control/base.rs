//! Base entity for control coefficients and control patterns.
//!
//! A [`CCBase`] couples a symbolic expression with a live model. Its numeric value and
//! its renderings are memoised independently: each is computed on first access and
//! reused until [`CCBase::recompute`] is called, even if the model has changed since.
//! Plain `CCBase` instances serve as the shared denominator of a set of coefficients.

use std::fmt::{self, Display};

use log::debug;

use crate::{
    control::{cache::LazyField, error::SymcaError},
    expression::{self, Substitution, SymExpr},
    latex::SharedRenderer,
    model::{resolve_substitution, SharedModel},
};

/// Name shown for the shared denominator.
pub const SIGMA: &str = "\\Sigma";

/// A symbolic expression evaluated against a live model.
pub struct CCBase {
    pub name: String,
    expression: SymExpr,
    model: SharedModel,
    renderer: SharedRenderer,
    value: LazyField<f64>,
    string_expression: LazyField<String>,
    latex_expression: LazyField<String>,
}

impl CCBase {
    /// Creates a new entity. Nothing is evaluated until first access.
    ///
    /// # Arguments
    ///
    /// * `model` - The model supplying symbol values
    /// * `name` - Identifier of the entity
    /// * `expression` - The expression this entity represents
    /// * `renderer` - Renderer for the textual and LaTeX forms
    pub fn new(
        model: SharedModel,
        name: impl Into<String>,
        expression: SymExpr,
        renderer: SharedRenderer,
    ) -> Self {
        Self {
            name: name.into(),
            expression,
            model,
            renderer,
            value: LazyField::new(),
            string_expression: LazyField::new(),
            latex_expression: LazyField::new(),
        }
    }

    pub fn expression(&self) -> &SymExpr {
        &self.expression
    }

    pub fn model(&self) -> &SharedModel {
        &self.model
    }

    pub fn renderer(&self) -> &SharedRenderer {
        &self.renderer
    }

    /// Returns the numeric value, evaluating it on first access.
    ///
    /// # Errors
    ///
    /// * [`SymcaError::UnboundVariable`] if the model lacks a symbol of the expression
    /// * [`SymcaError::Evaluation`] on arithmetic domain errors
    pub fn value(&self) -> Result<f64, SymcaError> {
        self.value.get_or_try_init(|| self.evaluate(None))
    }

    /// Discards the cached value and evaluates against the current model state.
    pub fn recompute(&self) -> Result<f64, SymcaError> {
        self.recompute_with(None)
    }

    /// Like [`CCBase::recompute`], but evaluates with a substitution resolved by the
    /// caller when one is given.
    pub fn recompute_with(&self, subs: Option<&Substitution>) -> Result<f64, SymcaError> {
        self.value.invalidate();
        let value = self.evaluate(subs)?;
        self.value.set(value);
        Ok(value)
    }

    /// Resolves the value of every free symbol of the expression from the model.
    pub fn substitution(&self) -> Result<Substitution, SymcaError> {
        let model = self.model.borrow();
        resolve_substitution(&*model, self.expression.free_symbols().iter())
    }

    fn evaluate(&self, subs: Option<&Substitution>) -> Result<f64, SymcaError> {
        let value = match subs {
            Some(subs) => self.expression.evaluate(subs)?,
            None => self.expression.evaluate(&self.substitution()?)?,
        };
        debug!("{} evaluated to {value}", self.name);
        Ok(value)
    }

    pub(crate) fn cached_value(
        &self,
        init: impl FnOnce() -> Result<f64, SymcaError>,
    ) -> Result<f64, SymcaError> {
        self.value.get_or_try_init(init)
    }

    pub(crate) fn store_value(&self, value: f64) {
        self.value.set(value);
    }

    pub(crate) fn cached_latex(&self, init: impl FnOnce() -> String) -> String {
        self.latex_expression.get_or_init(init)
    }

    /// Plain-text form of the expression, rendered once.
    pub fn string_expression(&self) -> String {
        self.string_expression
            .get_or_init(|| self.renderer.expression_to_string(&self.expression))
    }

    /// LaTeX form of the expression, rendered once.
    pub fn latex_expression(&self) -> String {
        self.cached_latex(|| self.renderer.expression_to_latex(&self.expression))
    }

    pub fn latex_name(&self) -> String {
        SIGMA.to_string()
    }

    /// Returns `$<name> = <expression> = <value>$` for notebook-style display.
    pub fn repr_latex(&self) -> Result<String, SymcaError> {
        Ok(format_repr_latex(
            &self.latex_name(),
            &self.latex_expression(),
            self.value()?,
        ))
    }
}

pub(crate) fn format_repr_latex(name: &str, expression: &str, value: f64) -> String {
    format!("${name} = {expression} = {value:.3}$")
}

impl Display for CCBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.string_expression())
    }
}

/// Anything that stands for a symbolic expression.
///
/// The composition methods combine the underlying expressions and return a raw
/// [`SymExpr`]. Cached values of the operands are not consulted or carried over.
pub trait AsExpr {
    fn as_expr(&self) -> SymExpr;

    fn add_expr(&self, other: &dyn AsExpr) -> SymExpr {
        expression::add(self.as_expr(), other.as_expr())
    }

    fn sub_expr(&self, other: &dyn AsExpr) -> SymExpr {
        expression::subtract(self.as_expr(), other.as_expr())
    }

    fn mul_expr(&self, other: &dyn AsExpr) -> SymExpr {
        expression::multiply(self.as_expr(), other.as_expr())
    }

    fn div_expr(&self, other: &dyn AsExpr) -> SymExpr {
        expression::divide(self.as_expr(), other.as_expr())
    }

    fn pow_expr(&self, other: &dyn AsExpr) -> SymExpr {
        expression::power(self.as_expr(), other.as_expr())
    }
}

impl AsExpr for SymExpr {
    fn as_expr(&self) -> SymExpr {
        self.clone()
    }
}

impl AsExpr for f64 {
    fn as_expr(&self) -> SymExpr {
        SymExpr::Number(*self)
    }
}

impl AsExpr for CCBase {
    fn as_expr(&self) -> SymExpr {
        self.expression.clone()
    }
}
