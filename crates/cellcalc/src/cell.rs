//! Cells held by a [`Matrix`](crate::Matrix)

use crate::error::Result;
use cellcalc_core::{CellAddress, ErrorKind, Value};
use cellcalc_formula::{engine, tokenize, FormulaError, Token};
use std::collections::BTreeSet;

/// Index of a cell in its matrix's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub(crate) usize);

impl CellId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Where a cell is in the recalculation state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Scheduled for evaluation in the current session
    Unevaluated,
    /// On the evaluation stack
    Evaluating,
    /// Holds a non-error value
    Valid,
    /// Holds an error value
    Errored,
}

/// Formula text and its tokens, lexed and checked once when the formula is
/// set
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    tokens: Vec<Token>,
    syntax_error: Option<FormulaError>,
}

impl Formula {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let tokens = tokenize(&source);
        let syntax_error = engine::recognize(&tokens)
            .err()
            .filter(|e| matches!(e, FormulaError::Syntax { .. }));
        Self {
            source,
            tokens,
            syntax_error,
        }
    }

    /// Why the formula cannot be parsed. Such a formula evaluates to
    /// `#ERROR!` without reading any cell.
    pub fn syntax_error(&self) -> Option<&FormulaError> {
        self.syntax_error.as_ref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}

/// A single cell
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub(crate) address: CellAddress,
    pub(crate) formula: Option<Formula>,
    pub(crate) value: Value,
    pub(crate) state: CellState,
    /// Cells read by the most recent evaluation
    pub(crate) dependencies: BTreeSet<CellAddress>,
}

impl Cell {
    /// A blank cell
    pub(crate) fn new(address: CellAddress) -> Self {
        Self {
            address,
            formula: None,
            value: Value::blank(),
            state: CellState::Valid,
            dependencies: BTreeSet::new(),
        }
    }

    pub fn address(&self) -> CellAddress {
        self.address
    }

    pub fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }

    /// Last value. Errored cells hold [`Value::Error`].
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Last error, if the cell is errored
    pub fn error(&self) -> Option<ErrorKind> {
        self.value.as_error()
    }

    pub fn state(&self) -> CellState {
        self.state
    }

    pub fn dependencies(&self) -> &BTreeSet<CellAddress> {
        &self.dependencies
    }

    /// Store a result and move to `Valid` or `Errored`
    pub(crate) fn commit(&mut self, value: Value) {
        self.state = if value.is_error() {
            CellState::Errored
        } else {
            CellState::Valid
        };
        self.value = value;
    }
}

/// Anything that names a cell
pub trait IntoCellAddress {
    fn into_address(self) -> Result<CellAddress>;
}

impl IntoCellAddress for CellAddress {
    fn into_address(self) -> Result<CellAddress> {
        Ok(self)
    }
}

impl IntoCellAddress for &str {
    fn into_address(self) -> Result<CellAddress> {
        Ok(CellAddress::parse(self)?)
    }
}

impl IntoCellAddress for &String {
    fn into_address(self) -> Result<CellAddress> {
        self.as_str().into_address()
    }
}

/// `(row, col)`, both 0-based
impl IntoCellAddress for (u32, u16) {
    fn into_address(self) -> Result<CellAddress> {
        Ok(CellAddress::new(self.0, self.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_commit_sets_state() {
        let mut cell = Cell::new(CellAddress::new(0, 0));
        assert_eq!(cell.state(), CellState::Valid);
        assert!(cell.value().is_blank());

        cell.commit(Value::Error(ErrorKind::DivZero));
        assert_eq!(cell.state(), CellState::Errored);
        assert_eq!(cell.error(), Some(ErrorKind::DivZero));

        cell.commit(Value::Number(1.0));
        assert_eq!(cell.state(), CellState::Valid);
        assert_eq!(cell.error(), None);
    }

    #[test]
    fn test_formula_is_lexed_once() {
        let formula = Formula::new("=A1+1");
        assert_eq!(formula.source(), "=A1+1");
        assert_eq!(formula.tokens().len(), 4);
        assert_eq!(formula.syntax_error(), None);
    }

    #[test]
    fn test_formula_records_syntax_error() {
        let formula = Formula::new("=A1+");
        assert!(matches!(
            formula.syntax_error(),
            Some(FormulaError::Syntax { position: 4, .. })
        ));
        // Absorbed by the error productions, so not a syntax fault
        assert_eq!(Formula::new("=1 #REF!").syntax_error(), None);
    }

    #[test]
    fn test_into_address() {
        assert_eq!("B3".into_address(), Ok(CellAddress::new(2, 1)));
        assert_eq!((2u32, 1u16).into_address(), Ok(CellAddress::new(2, 1)));
        assert!("3B".into_address().is_err());
    }
}
