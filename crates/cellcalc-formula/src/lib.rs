//! # cellcalc-formula
//!
//! Formula parser and evaluator for cellcalc.
//!
//! Parsing is table driven: a fixed grammar is compiled once into SLR(1)
//! action and goto tables, and the shift-reduce [`engine`] walks the token
//! stream against them. There is no syntax tree. Each reduction computes
//! its value on the spot, so a formula is evaluated in the same pass that
//! recognizes it.
//!
//! This crate provides:
//! - [`lexer`] - formula text to tokens
//! - [`grammar`] - productions, precedence and the generated tables
//! - [`engine`] - the shift-reduce automaton
//! - [`reduce`] - one evaluator per production
//! - [`functions`] - the name to callable registry and the built-ins
//!
//! ## Example
//!
//! ```rust
//! use cellcalc_core::Value;
//! use cellcalc_formula::{evaluate, EvaluationContext};
//!
//! let mut ctx = EvaluationContext::simple();
//! assert_eq!(evaluate("=1+2*3", &mut ctx).unwrap(), Value::Number(7.0));
//! assert_eq!(evaluate("=\"a\"&\"b\"", &mut ctx).unwrap(), Value::text("ab"));
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod functions;
pub mod grammar;
pub mod lexer;
pub mod reduce;
pub mod symbol;

pub use context::{CalculationOptions, CellReader, EvaluationContext, Pending};
pub use engine::ParseStats;
pub use error::{FormulaError, FormulaResult};
pub use functions::{default_registry, shared_registry, FunctionDef, FunctionImpl, FunctionRegistry};
pub use grammar::{Action, ActionTable, ProductionId};
pub use lexer::{tokenize, Token};
pub use symbol::Symbol;

use cellcalc_core::Value;

/// Lex and evaluate `formula` in `ctx`
///
/// A leading `=` is optional. Malformed formulas return
/// [`FormulaError::Syntax`]; everything else, including spreadsheet errors
/// such as `#DIV/0!`, comes back as a [`Value`].
pub fn evaluate(formula: &str, ctx: &mut EvaluationContext) -> FormulaResult<Value> {
    let tokens = tokenize(formula);
    engine::run(&tokens, ctx)
}
