//! Formula error types

use cellcalc_core::CellAddress;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that stop a formula from producing a value.
///
/// Spreadsheet errors like `#VALUE!` are not in here: they are ordinary
/// [`Value`](cellcalc_core::Value)s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The token stream does not fit the grammar
    #[error("Syntax error at position {position}: unexpected {found}")]
    Syntax { position: usize, found: String },

    /// A referenced cell has not been evaluated yet in this session
    #[error("Cell {0} has not been evaluated yet")]
    Unresolved(CellAddress),

    /// The grammar tables are inconsistent
    #[error("Grammar error: {0}")]
    Grammar(String),
}
