//! Prelude module - common imports for cellcalc users
//!
//! ```rust
//! use cellcalc::prelude::*;
//! ```

pub use crate::{
    // Configuration
    CalculationOptions,
    // Cell types
    CellAddress,
    CellRange,
    CellState,
    // Error types
    Error,
    ErrorKind,
    // Functions
    FunctionDef,
    FunctionRegistry,
    IntoCellAddress,
    // Main types
    Matrix,
    RecalcStats,
    Result,
    Value,
};
