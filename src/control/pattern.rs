//! Control patterns
//!
//! A control pattern is one additive term of a control coefficient's numerator, divided
//! by the coefficient's shared denominator. Patterns are created by the coefficient
//! when it is constructed and keep a non-owning reference back to it, which is used to
//! express each pattern as a percentage of the whole coefficient.

use std::{
    fmt::{self, Display},
    rc::{Rc, Weak},
};

use crate::{
    control::{
        base::{format_repr_latex, AsExpr, CCBase},
        cache::LazyField,
        coefficient::CCoef,
        error::SymcaError,
    },
    expression::{self, Substitution, SymExpr},
    latex::SharedRenderer,
    model::SharedModel,
};

/// One additive term of a control coefficient.
pub struct CPattern {
    base: CCBase,
    numerator: SymExpr,
    denominator: Rc<CCBase>,
    parent: Weak<CCoef>,
    latex_numerator: LazyField<String>,
    latex_expression_full: LazyField<String>,
}

impl CPattern {
    pub(crate) fn new(
        model: SharedModel,
        name: impl Into<String>,
        numerator: SymExpr,
        denominator: Rc<CCBase>,
        parent: Weak<CCoef>,
        renderer: SharedRenderer,
    ) -> Self {
        let expression = expression::divide(numerator.clone(), denominator.as_expr());
        Self {
            base: CCBase::new(model, name, expression, renderer),
            numerator,
            denominator,
            parent,
            latex_numerator: LazyField::new(),
            latex_expression_full: LazyField::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.base.name
    }

    /// The pattern's term of the coefficient numerator.
    pub fn numerator(&self) -> &SymExpr {
        &self.numerator
    }

    /// `numerator / denominator`.
    pub fn expression(&self) -> &SymExpr {
        self.base.expression()
    }

    pub fn denominator_object(&self) -> &Rc<CCBase> {
        &self.denominator
    }

    /// The owning coefficient, if it is still alive.
    pub fn parent(&self) -> Option<Rc<CCoef>> {
        self.parent.upgrade()
    }

    /// Returns the numeric value, evaluating it on first access.
    pub fn value(&self) -> Result<f64, SymcaError> {
        self.base.value()
    }

    /// Re-evaluates the pattern. A substitution resolved by the parent coefficient may
    /// be passed in to avoid reading the model again; without one the pattern resolves
    /// its own symbols.
    pub fn recompute(&self, subs: Option<&Substitution>) -> Result<f64, SymcaError> {
        self.base.recompute_with(subs)
    }

    /// Contribution of this pattern to its coefficient, in percent.
    ///
    /// Always derived from the currently cached values of the pattern and its parent, so
    /// it is as stale as they are. Percentages only partition 100% when every pattern
    /// has the sign of the coefficient.
    pub fn percentage(&self) -> Result<f64, SymcaError> {
        let parent = self
            .parent()
            .ok_or_else(|| SymcaError::DetachedPattern(self.name().to_string()))?;
        let total = parent.value()?;
        let value = self.value()?;
        if total == 0.0 {
            return Err(SymcaError::Evaluation(format!(
                "{} has a value of zero, percentage of {} is undefined",
                parent.name(),
                self.name()
            )));
        }
        Ok(value / total * 100.0)
    }

    pub fn string_expression(&self) -> String {
        self.base.string_expression()
    }

    pub fn latex_numerator(&self) -> String {
        self.latex_numerator
            .get_or_init(|| self.base.renderer().expression_to_latex(&self.numerator))
    }

    /// `<numerator> / \Sigma`
    pub fn latex_expression(&self) -> String {
        self.base
            .cached_latex(|| format!("{}/ \\,\\Sigma", self.latex_numerator()))
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
        self.name().to_string()
    }

    pub fn repr_latex(&self) -> Result<String, SymcaError> {
        Ok(format_repr_latex(
            &self.latex_name(),
            &self.latex_expression(),
            self.value()?,
        ))
    }
}

impl AsExpr for CPattern {
    fn as_expr(&self) -> SymExpr {
        self.base.as_expr()
    }
}

impl Display for CPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}
