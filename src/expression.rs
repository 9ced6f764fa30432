//! Symbolic Expression Module
//!
//! This module provides the symbolic expression type used by control coefficients and
//! control patterns. Expressions are parsed with `meval`, whose tokenizer already orders
//! the input into reverse polish notation, and folded into an immutable [`SymExpr`] tree.
//!
//! # Key Components
//!
//! - [`SymExpr`]: Expression tree over named symbols and arithmetic operators
//! - [`Substitution`]: Numeric bindings used to evaluate an expression
//! - [`add`], [`subtract`], [`multiply`], [`divide`], [`power`]: Composition functions
//!
//! # Decomposition
//!
//! Sums and products are stored n-ary and flattened while parsing, so the additive
//! terms returned by [`SymExpr::terms`] appear in the order they were written.
//! Subtraction is stored as an added [`SymExpr::Neg`] term.

use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display};
use std::str::FromStr;

use meval::tokenizer::{Operation, Token};

use crate::control::error::SymcaError;

/// Numeric values bound to symbol names during evaluation.
pub type Substitution = HashMap<String, f64>;

/// An immutable symbolic expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SymExpr {
    Number(f64),
    Symbol(String),
    Neg(Box<SymExpr>),
    Add(Vec<SymExpr>),
    Mul(Vec<SymExpr>),
    Div(Box<SymExpr>, Box<SymExpr>),
    Pow(Box<SymExpr>, Box<SymExpr>),
    Func(String, Vec<SymExpr>),
}

impl SymExpr {
    /// Parses an expression string such as `"ecR1_S * J_R1 - ecR2_S * J_R2"`.
    ///
    /// # Arguments
    ///
    /// * `input` - The expression in infix notation. Powers are written with `^`.
    ///
    /// # Returns
    ///
    /// Returns the parsed expression or [`SymcaError::ExpressionParse`] if the input is
    /// malformed or uses an unsupported operator.
    pub fn parse(input: &str) -> Result<Self, SymcaError> {
        let rpn: meval::Expr = input
            .parse()
            .map_err(|e: meval::Error| SymcaError::ExpressionParse(format!("{input}: {e}")))?;

        let mut stack: Vec<SymExpr> = Vec::new();
        for token in rpn.iter() {
            match token {
                Token::Number(n) => stack.push(SymExpr::Number(*n)),
                Token::Var(name) => stack.push(SymExpr::Symbol(name.clone())),
                Token::Unary(Operation::Plus) => {}
                Token::Unary(Operation::Minus) => {
                    let operand = pop_operand(&mut stack, input)?;
                    stack.push(negate(operand));
                }
                Token::Binary(op) => {
                    let rhs = pop_operand(&mut stack, input)?;
                    let lhs = pop_operand(&mut stack, input)?;
                    let combined = match op {
                        Operation::Plus => add(lhs, rhs),
                        Operation::Minus => subtract(lhs, rhs),
                        Operation::Times => multiply(lhs, rhs),
                        Operation::Div => divide(lhs, rhs),
                        Operation::Pow => power(lhs, rhs),
                        other => {
                            return Err(SymcaError::ExpressionParse(format!(
                                "{input}: unsupported operator {other:?}"
                            )))
                        }
                    };
                    stack.push(combined);
                }
                Token::Func(name, nargs) => {
                    let nargs = nargs.unwrap_or(1);
                    if stack.len() < nargs {
                        return Err(SymcaError::ExpressionParse(format!(
                            "{input}: missing arguments for {name}"
                        )));
                    }
                    let args = stack.split_off(stack.len() - nargs);
                    stack.push(SymExpr::Func(name.clone(), args));
                }
                other => {
                    return Err(SymcaError::ExpressionParse(format!(
                        "{input}: unexpected token {other:?}"
                    )))
                }
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(expr), true) => Ok(expr),
            _ => Err(SymcaError::ExpressionParse(format!(
                "{input}: does not form a single expression"
            ))),
        }
    }

    /// Creates a symbol expression.
    pub fn symbol(name: impl Into<String>) -> Self {
        SymExpr::Symbol(name.into())
    }

    /// Creates a numeric constant.
    pub fn number(value: f64) -> Self {
        SymExpr::Number(value)
    }

    /// Returns the names of all free symbols, sorted.
    pub fn free_symbols(&self) -> BTreeSet<String> {
        let mut symbols = BTreeSet::new();
        self.collect_symbols(&mut symbols);
        symbols
    }

    fn collect_symbols(&self, symbols: &mut BTreeSet<String>) {
        match self {
            SymExpr::Number(_) => {}
            SymExpr::Symbol(name) => {
                symbols.insert(name.clone());
            }
            SymExpr::Neg(inner) => inner.collect_symbols(symbols),
            SymExpr::Add(items) | SymExpr::Mul(items) | SymExpr::Func(_, items) => {
                items.iter().for_each(|item| item.collect_symbols(symbols))
            }
            SymExpr::Div(lhs, rhs) | SymExpr::Pow(lhs, rhs) => {
                lhs.collect_symbols(symbols);
                rhs.collect_symbols(symbols);
            }
        }
    }

    /// Splits the expression into its additive terms.
    ///
    /// The terms of a top-level sum are returned in stored order. The literal zero has no
    /// terms; any other expression is its own single term. Numeric constants in a sum
    /// are kept as terms of their own rather than split off as a coefficient.
    pub fn terms(&self) -> Vec<SymExpr> {
        match self {
            SymExpr::Add(items) => items.clone(),
            SymExpr::Number(n) if *n == 0.0 => Vec::new(),
            other => vec![other.clone()],
        }
    }

    /// Evaluates the expression with the given symbol bindings.
    ///
    /// # Errors
    ///
    /// * [`SymcaError::UnboundVariable`] if a symbol has no binding
    /// * [`SymcaError::Evaluation`] on division by zero or any other domain error
    pub fn evaluate(&self, subs: &Substitution) -> Result<f64, SymcaError> {
        match self {
            SymExpr::Number(n) => Ok(*n),
            SymExpr::Symbol(name) => subs
                .get(name)
                .copied()
                .ok_or_else(|| SymcaError::UnboundVariable(name.clone())),
            SymExpr::Neg(inner) => Ok(-inner.evaluate(subs)?),
            SymExpr::Add(items) => items
                .iter()
                .try_fold(0.0, |acc, item| -> Result<f64, SymcaError> {
                    Ok(acc + item.evaluate(subs)?)
                }),
            SymExpr::Mul(items) => items
                .iter()
                .try_fold(1.0, |acc, item| -> Result<f64, SymcaError> {
                    Ok(acc * item.evaluate(subs)?)
                }),
            SymExpr::Div(num, den) => {
                let numerator = num.evaluate(subs)?;
                let denominator = den.evaluate(subs)?;
                if denominator == 0.0 {
                    return Err(SymcaError::Evaluation(format!("division by zero in {self}")));
                }
                Ok(numerator / denominator)
            }
            SymExpr::Pow(base, exp) => {
                let base_value = base.evaluate(subs)?;
                let exp_value = exp.evaluate(subs)?;
                let result = base_value.powf(exp_value);
                if !result.is_finite() {
                    return Err(SymcaError::Evaluation(format!(
                        "invalid exponent in {self}: {base_value}^{exp_value}"
                    )));
                }
                Ok(result)
            }
            SymExpr::Func(name, args) => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(subs))
                    .collect::<Result<Vec<f64>, SymcaError>>()?;
                apply_function(name, &values)
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            SymExpr::Add(_) | SymExpr::Neg(_) => 1,
            SymExpr::Number(n) if *n < 0.0 => 1,
            SymExpr::Mul(_) | SymExpr::Div(_, _) => 2,
            SymExpr::Pow(_, _) => 4,
            SymExpr::Number(_) | SymExpr::Symbol(_) | SymExpr::Func(_, _) => 5,
        }
    }
}

fn pop_operand(stack: &mut Vec<SymExpr>, input: &str) -> Result<SymExpr, SymcaError> {
    stack
        .pop()
        .ok_or_else(|| SymcaError::ExpressionParse(format!("{input}: missing operand")))
}

fn apply_function(name: &str, values: &[f64]) -> Result<f64, SymcaError> {
    let single = |values: &[f64]| match values {
        [x] => Ok(*x),
        _ => Err(SymcaError::Evaluation(format!(
            "{name} expects one argument, got {}",
            values.len()
        ))),
    };

    match name {
        "exp" => Ok(single(values)?.exp()),
        "abs" => Ok(single(values)?.abs()),
        "ln" | "log10" => {
            let x = single(values)?;
            if x <= 0.0 {
                return Err(SymcaError::Evaluation(format!("{name}({x}) is undefined")));
            }
            Ok(if name == "ln" { x.ln() } else { x.log10() })
        }
        "sqrt" => {
            let x = single(values)?;
            if x < 0.0 {
                return Err(SymcaError::Evaluation(format!("sqrt({x}) is undefined")));
            }
            Ok(x.sqrt())
        }
        _ => Err(SymcaError::Evaluation(format!("unknown function {name}"))),
    }
}

/// Returns `lhs + rhs`, flattening nested sums.
pub fn add(lhs: SymExpr, rhs: SymExpr) -> SymExpr {
    let mut items = match lhs {
        SymExpr::Add(items) => items,
        other => vec![other],
    };
    match rhs {
        SymExpr::Add(more) => items.extend(more),
        other => items.push(other),
    }
    SymExpr::Add(items)
}

/// Returns `lhs - rhs` as a sum with negated terms.
pub fn subtract(lhs: SymExpr, rhs: SymExpr) -> SymExpr {
    add(lhs, negate(rhs))
}

/// Returns `lhs * rhs`, flattening nested products.
pub fn multiply(lhs: SymExpr, rhs: SymExpr) -> SymExpr {
    let mut items = match lhs {
        SymExpr::Mul(items) => items,
        other => vec![other],
    };
    match rhs {
        SymExpr::Mul(more) => items.extend(more),
        other => items.push(other),
    }
    SymExpr::Mul(items)
}

/// Returns `lhs / rhs`.
pub fn divide(lhs: SymExpr, rhs: SymExpr) -> SymExpr {
    SymExpr::Div(Box::new(lhs), Box::new(rhs))
}

/// Returns `base ^ exponent`.
pub fn power(base: SymExpr, exponent: SymExpr) -> SymExpr {
    SymExpr::Pow(Box::new(base), Box::new(exponent))
}

/// Returns `-expr`. Numbers are negated in place, double negations cancel and a sum
/// is negated term by term.
pub fn negate(expr: SymExpr) -> SymExpr {
    match expr {
        SymExpr::Number(n) => SymExpr::Number(-n),
        SymExpr::Neg(inner) => *inner,
        SymExpr::Add(items) => SymExpr::Add(items.into_iter().map(negate).collect()),
        other => SymExpr::Neg(Box::new(other)),
    }
}

impl FromStr for SymExpr {
    type Err = SymcaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SymExpr::parse(s)
    }
}

impl From<f64> for SymExpr {
    fn from(value: f64) -> Self {
        SymExpr::Number(value)
    }
}

impl Display for SymExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymExpr::Number(n) => write!(f, "{n}"),
            SymExpr::Symbol(name) => write!(f, "{name}"),
            SymExpr::Neg(inner) => {
                write!(f, "-")?;
                match inner.as_ref() {
                    SymExpr::Pow(_, _) => write!(f, "({inner})"),
                    _ => write_operand(f, inner, 2),
                }
            }
            SymExpr::Add(items) => {
                for (i, item) in items.iter().enumerate() {
                    match (i, item) {
                        (0, _) => write_operand(f, item, 1)?,
                        (_, SymExpr::Neg(inner)) => {
                            write!(f, " - ")?;
                            write_operand(f, inner, 2)?;
                        }
                        (_, SymExpr::Number(n)) if *n < 0.0 => write!(f, " - {}", -n)?,
                        _ => {
                            write!(f, " + ")?;
                            write_operand(f, item, 2)?;
                        }
                    }
                }
                Ok(())
            }
            SymExpr::Mul(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "*")?;
                    }
                    write_operand(f, item, 2)?;
                }
                Ok(())
            }
            SymExpr::Div(num, den) => {
                write_operand(f, num, 2)?;
                write!(f, "/")?;
                write_operand(f, den, 3)
            }
            SymExpr::Pow(base, exp) => {
                write_operand(f, base, 5)?;
                write!(f, "^")?;
                write_operand(f, exp, 4)
            }
            SymExpr::Func(name, args) => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Writes `expr`, parenthesised when it binds weaker than `min_precedence`.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &SymExpr, min_precedence: u8) -> fmt::Result {
    if expr.precedence() < min_precedence {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}
