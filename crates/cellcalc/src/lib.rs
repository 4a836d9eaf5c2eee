//! # cellcalc
//!
//! A spreadsheet formula engine: formulas are parsed by a table-driven
//! shift-reduce parser that evaluates as it reduces, and a [`Matrix`] of
//! cells keeps dependency edges so edits recalculate exactly the cells
//! that read them.
//!
//! ## Features
//!
//! - Numbers, text, booleans, error literals and `{1,2;3,4}` array literals
//! - `A1`, `$A$1` and `A1:B2` references
//! - Infix, prefix and `%` operators with spreadsheet coercion rules
//! - A case-insensitive function registry with math, logical, text,
//!   information and date built-ins
//! - Transitive recalculation with cycle detection (`#REF!`)
//!
//! ## Example
//!
//! ```rust
//! use cellcalc::prelude::*;
//!
//! let mut matrix = Matrix::new();
//! matrix.set_value("A1", 1.0).unwrap();
//! matrix.set_value("A2", 2.0).unwrap();
//! matrix.set_formula("A3", "=SUM(A1:A2)*50%").unwrap();
//! assert_eq!(matrix.get_value("A3").unwrap(), Value::Number(1.5));
//!
//! matrix.set_formula("B1", "=B2").unwrap();
//! matrix.set_formula("B2", "=B1").unwrap();
//! assert_eq!(matrix.get_error("B1").unwrap(), Some(ErrorKind::Ref));
//! ```

pub mod cell;
pub mod error;
pub mod matrix;
pub mod prelude;

pub use cell::{Cell, CellId, CellState, Formula, IntoCellAddress};
pub use error::{Error, Result};
pub use matrix::{Matrix, RecalcStats};

// Re-export core types
pub use cellcalc_core::{coerce, CellAddress, CellRange, ErrorKind, Value};

// Re-export formula types
pub use cellcalc_formula::{
    evaluate, CalculationOptions, CellReader, EvaluationContext, FormulaError, FunctionDef,
    FunctionImpl, FunctionRegistry, ParseStats, Pending,
};
