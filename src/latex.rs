//! LaTeX rendering of symbolic expressions
//!
//! Control coefficients hand their expressions to a [`LatexRenderer`] to obtain the
//! strings shown in reports and plots. The renderer is a seam: callers may supply their
//! own, for instance one that knows the naming scheme of a particular model.
//! [`DefaultLatexRenderer`] understands the usual metabolic control analysis symbols:
//!
//! - `ecR1_S` renders as the elasticity `\varepsilon^{R1}_{S}`
//! - `ccJR1_R2` renders as the control coefficient `C^{JR1}_{R2}`
//! - `J_R1` renders as `J_{R1}`

use std::rc::Rc;

use crate::expression::SymExpr;

/// Shared handle to a renderer used by every entity of an analysis.
pub type SharedRenderer = Rc<dyn LatexRenderer>;

/// Converts expressions and names into display strings.
pub trait LatexRenderer {
    /// Renders an expression as LaTeX.
    fn expression_to_latex(&self, expr: &SymExpr) -> String;

    /// Renders a bare name (a coefficient or symbol name) as LaTeX.
    fn name_to_latex(&self, name: &str) -> String {
        symbol_to_latex(name)
    }

    /// Renders an expression as plain text.
    fn expression_to_string(&self, expr: &SymExpr) -> String {
        expr.to_string()
    }
}

/// Renderer for metabolic control analysis symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLatexRenderer;

impl LatexRenderer for DefaultLatexRenderer {
    fn expression_to_latex(&self, expr: &SymExpr) -> String {
        to_latex(expr)
    }
}

/// Converts a symbol name following the `ec`/`cc`/`X_Y` conventions into LaTeX.
pub fn symbol_to_latex(name: &str) -> String {
    let split = |rest: &str| {
        rest.split_once('_')
            .map(|(upper, lower)| (upper.to_string(), lower.replace('_', " ")))
    };

    if let Some((upper, lower)) = name.strip_prefix("ec").and_then(split) {
        return format!("\\varepsilon^{{{upper}}}_{{{lower}}}");
    }
    if let Some((upper, lower)) = name.strip_prefix("cc").and_then(split) {
        return format!("C^{{{upper}}}_{{{lower}}}");
    }
    match name.split_once('_') {
        Some((base, sub)) if !base.is_empty() => format!("{base}_{{{}}}", sub.replace('_', " ")),
        _ => name.to_string(),
    }
}

fn to_latex(expr: &SymExpr) -> String {
    match expr {
        SymExpr::Number(n) => format!("{n}"),
        SymExpr::Symbol(name) => symbol_to_latex(name),
        SymExpr::Neg(inner) => match inner.as_ref() {
            SymExpr::Add(_) => format!("-\\left({}\\right)", to_latex(inner)),
            _ => format!("-{}", to_latex(inner)),
        },
        SymExpr::Add(items) => {
            let mut out = String::new();
            for (i, item) in items.iter().enumerate() {
                match (i, item) {
                    (0, _) => out.push_str(&to_latex(item)),
                    (_, SymExpr::Neg(inner)) => {
                        out.push_str(" - ");
                        match inner.as_ref() {
                            SymExpr::Add(_) => {
                                out.push_str(&format!("\\left({}\\right)", to_latex(inner)))
                            }
                            _ => out.push_str(&to_latex(inner)),
                        }
                    }
                    _ => {
                        out.push_str(" + ");
                        out.push_str(&to_latex(item));
                    }
                }
            }
            out
        }
        SymExpr::Mul(items) => items
            .iter()
            .map(|item| match item {
                SymExpr::Add(_) => format!("\\left({}\\right)", to_latex(item)),
                _ => to_latex(item),
            })
            .collect::<Vec<_>>()
            .join(" \\cdot "),
        SymExpr::Div(num, den) => format!("\\frac{{{}}}{{{}}}", to_latex(num), to_latex(den)),
        SymExpr::Pow(base, exp) => {
            let base = match base.as_ref() {
                SymExpr::Number(_) | SymExpr::Symbol(_) => to_latex(base),
                _ => format!("\\left({}\\right)", to_latex(base)),
            };
            format!("{base}^{{{}}}", to_latex(exp))
        }
        SymExpr::Func(name, args) => {
            let args = args.iter().map(to_latex).collect::<Vec<_>>().join(", ");
            match name.as_str() {
                "sqrt" => format!("\\sqrt{{{args}}}"),
                "exp" | "ln" => format!("\\{name}\\left({args}\\right)"),
                _ => format!("\\operatorname{{{name}}}\\left({args}\\right)"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_conventions() {
        assert_eq!(symbol_to_latex("ecR1_S"), "\\varepsilon^{R1}_{S}");
        assert_eq!(symbol_to_latex("ccJR1_R2"), "C^{JR1}_{R2}");
        assert_eq!(symbol_to_latex("J_R1"), "J_{R1}");
        assert_eq!(symbol_to_latex("Vmax"), "Vmax");
    }

    #[test]
    fn test_expression_to_latex() {
        let expr = SymExpr::parse("ecR2_S * J_R2 - ecR1_S / (a + b)").unwrap();
        let latex = DefaultLatexRenderer.expression_to_latex(&expr);

        assert_eq!(
            latex,
            "\\varepsilon^{R2}_{S} \\cdot J_{R2} - \\frac{\\varepsilon^{R1}_{S}}{a + b}"
        );
    }

    #[test]
    fn test_negated_sum_keeps_parentheses() {
        let parsed = SymExpr::parse("a + -(b + c)").unwrap();
        assert_eq!(DefaultLatexRenderer.expression_to_latex(&parsed), "a - b - c");

        let nested = SymExpr::Add(vec![
            SymExpr::symbol("a"),
            SymExpr::Neg(Box::new(SymExpr::parse("b + c").unwrap())),
        ]);
        assert_eq!(
            DefaultLatexRenderer.expression_to_latex(&nested),
            "a - \\left(b + c\\right)"
        );
    }
}
