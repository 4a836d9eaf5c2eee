//! Error types for cellcalc

use thiserror::Error;

/// Result type alias for cellcalc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cellcalc
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Bad cell address or range
    #[error(transparent)]
    Address(#[from] cellcalc_core::Error),

    /// Formula engine failure that is not a spreadsheet error value
    #[error(transparent)]
    Formula(#[from] cellcalc_formula::FormulaError),
}
