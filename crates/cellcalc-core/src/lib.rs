//! # cellcalc-core
//!
//! Core data structures shared by the cellcalc parser, evaluator and
//! recalculation matrix.
//!
//! This crate provides:
//! - [`Value`] - the runtime value union (numbers, text, booleans, errors, arrays)
//! - [`ErrorKind`] - the closed set of spreadsheet-visible errors
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`coerce`] - the total coercions every operator and function goes through
//!
//! ## Example
//!
//! ```rust
//! use cellcalc_core::{coerce, CellAddress, ErrorKind, Value};
//!
//! let addr = CellAddress::parse("$B$2").unwrap();
//! assert_eq!((addr.row, addr.col), (1, 1));
//!
//! assert_eq!(coerce::to_number(&Value::text("1,234.5")), Ok(1234.5));
//! assert_eq!(coerce::to_boolean(&Value::text("TRUE")), Err(ErrorKind::Value));
//! ```

pub mod cell;
pub mod coerce;
pub mod error;

pub use cell::{CellAddress, CellRange, ErrorKind, Value};
pub use error::{Error, Result};

/// Maximum number of rows addressable by A1 notation
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns addressable by A1 notation
pub const MAX_COLS: u16 = 16_384;
