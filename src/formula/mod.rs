//! Formula evaluation for drafting objects.
//!
//! Every numeric input of a construction tool (a length, an angle, a radius)
//! is a formula over the document's variable table. Evaluation is
//! deterministic: the function context deliberately has no `random`.

use std::collections::HashMap;

use meval::{Context, ContextProvider, Expr};
use thiserror::Error;

use crate::units::Unit;

/// Why a formula failed to produce a usable number. The display strings are
/// part of the public contract; tools surface them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("Formula is empty")]
    Empty,
    #[error("Math parser error: {0}")]
    Parser(String),
    #[error("Result is infinite")]
    Infinite,
    #[error("Result is NaN")]
    NotANumber,
    #[error("Result is zero")]
    Zero,
    #[error("Result less than zero")]
    LessThanZero,
}

/// Range checks applied after evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Reject a result of exactly zero.
    pub check_zero: bool,
    /// Reject a negative result.
    pub check_less_than_zero: bool,
}

impl EvalOptions {
    /// Checks for a strictly positive quantity such as a radius or length.
    pub const POSITIVE: Self = Self {
        check_zero: true,
        check_less_than_zero: true,
    };

    /// No range checks, any finite number is accepted.
    pub const ANY: Self = Self {
        check_zero: false,
        check_less_than_zero: false,
    };
}

struct VariableBindings<'a> {
    table: &'a HashMap<String, f64>,
}

impl ContextProvider for VariableBindings<'_> {
    fn get_var(&self, name: &str) -> Option<f64> {
        self.table.get(name).copied()
    }
}

/// Evaluate `text` against the given variable bindings.
pub fn evaluate(
    text: &str,
    bindings: &HashMap<String, f64>,
    options: EvalOptions,
) -> Result<f64, FormulaError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FormulaError::Empty);
    }

    let expr: Expr = trimmed
        .parse()
        .map_err(|error: meval::Error| FormulaError::Parser(error.to_string()))?;

    let variables = VariableBindings { table: bindings };
    let result = expr
        .eval_with_context((&variables, function_context()))
        .map_err(|error| FormulaError::Parser(error.to_string()))?;

    if result.is_infinite() {
        return Err(FormulaError::Infinite);
    }
    if result.is_nan() {
        return Err(FormulaError::NotANumber);
    }
    if options.check_zero && result == 0.0 {
        return Err(FormulaError::Zero);
    }
    if options.check_less_than_zero && result < 0.0 {
        return Err(FormulaError::LessThanZero);
    }

    Ok(result)
}

/// The fixed function vocabulary available inside formulas.
fn function_context() -> Context<'static> {
    let mut context = Context::new();
    context.func("deg", f64::to_degrees);
    context.func("rad", f64::to_radians);
    context.func("frac", |value: f64| value.fract());
    context.func("sign", f64::signum);
    context.func("sgn", f64::signum);
    context.func("sec", |value: f64| 1.0 / value.cos());
    context.func("csc", |value: f64| 1.0 / value.sin());
    context.func("cot", |value: f64| 1.0 / value.tan());
    context.func2("mod", modulo);
    context.func3("clamp", clamp);
    context.func3("lerp", |a, b, t| a + (b - a) * t);
    context
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    let lower = min.min(max);
    let upper = min.max(max);
    value.clamp(lower, upper)
}

fn modulo(dividend: f64, divisor: f64) -> f64 {
    if divisor == 0.0 {
        return f64::NAN;
    }
    let remainder = dividend % divisor;
    if remainder != 0.0 && (remainder < 0.0) != (divisor < 0.0) {
        remainder + divisor
    } else {
        remainder
    }
}

/// A formula together with its cached evaluation state. Tools keep one per
/// numeric input so dialogs and the recipe can show the last value without
/// re-evaluating.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    text: String,
    unit: Unit,
    options: EvalOptions,
    value: f64,
    error: bool,
    reason: String,
}

impl Formula {
    #[must_use]
    pub fn new(text: impl Into<String>, unit: Unit, options: EvalOptions) -> Self {
        let mut formula = Self {
            text: text.into(),
            unit,
            options,
            value: f64::NAN,
            error: true,
            reason: String::new(),
        };
        formula.reset_state();
        formula
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the formula text and invalidate the cache.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.reset_state();
    }

    /// Last evaluated value, NaN while invalidated.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.error
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Invalidate the cached value.
    pub fn reset_state(&mut self) {
        self.error = true;
        self.value = f64::NAN;
        self.reason = "Not evaluated".to_owned();
    }

    /// Evaluate and cache. On failure the cache records the reason and keeps
    /// the error flag raised.
    pub fn eval(&mut self, bindings: &HashMap<String, f64>) -> Result<f64, FormulaError> {
        match evaluate(&self.text, bindings, self.options) {
            Ok(value) => {
                self.value = value;
                self.error = false;
                self.reason.clear();
                Ok(value)
            }
            Err(error) => {
                self.value = f64::NAN;
                self.error = true;
                self.reason = error.to_string();
                Err(error)
            }
        }
    }

    /// Locale-free display string: the cached value followed by the unit
    /// label, or `Error` while invalid.
    #[must_use]
    pub fn display(&self) -> String {
        if self.error {
            return "Error".to_owned();
        }
        format!("{} {}", format_number(self.value), self.unit.label())
    }
}

/// Format with up to three fractional digits, trailing zeros trimmed.
#[must_use]
pub fn format_number(value: f64) -> String {
    let mut text = format!("{value:.3}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}
