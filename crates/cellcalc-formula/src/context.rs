//! Evaluation context
//!
//! The context is everything a reduction can see besides its own operands:
//! the cell being evaluated, the function registry, access to other cells
//! and the set of cells read so far.

use crate::error::{FormulaError, FormulaResult};
use crate::functions::{self, FunctionRegistry};
use cellcalc_core::{CellAddress, CellRange, ErrorKind, Value};
use std::collections::BTreeSet;

/// Options that bound evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculationOptions {
    /// Ranges with more cells than this evaluate to `#REF!` without being read
    pub max_range_cells: usize,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            max_range_cells: 1_048_576,
        }
    }
}

/// Signal that a cell has a formula which has not been evaluated yet.
///
/// The caller is expected to evaluate that cell and then re-run the formula
/// that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending;

/// Source of other cells' values
pub trait CellReader {
    /// Current value of `addr`. Blank cells read as empty text.
    fn read(&mut self, addr: CellAddress) -> Result<Value, Pending>;
}

/// Per-formula evaluation state
pub struct EvaluationContext<'a> {
    /// Cell whose formula is being evaluated, if any
    pub current: Option<CellAddress>,
    registry: &'a FunctionRegistry,
    reader: Option<&'a mut dyn CellReader>,
    options: CalculationOptions,
    dependencies: BTreeSet<CellAddress>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context that reads other cells through `reader`
    ///
    /// Use [`EvaluationContext::at`] to name the cell being evaluated.
    pub fn new(registry: &'a FunctionRegistry, reader: &'a mut dyn CellReader) -> Self {
        Self {
            current: None,
            registry,
            reader: Some(reader),
            options: CalculationOptions::default(),
            dependencies: BTreeSet::new(),
        }
    }

    /// Create a context with no cells behind it (for testing and one-off
    /// formulas). References read as blank but are still recorded.
    pub fn simple() -> EvaluationContext<'static> {
        EvaluationContext {
            current: None,
            registry: functions::default_registry(),
            reader: None,
            options: CalculationOptions::default(),
            dependencies: BTreeSet::new(),
        }
    }

    pub fn with_options(mut self, options: CalculationOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the cell `ROW()` and `COLUMN()` report
    pub fn at(mut self, current: CellAddress) -> Self {
        self.current = Some(current);
        self
    }

    pub fn registry(&self) -> &FunctionRegistry {
        self.registry
    }

    pub fn options(&self) -> &CalculationOptions {
        &self.options
    }

    /// Cells read so far, in row-major order
    pub fn dependencies(&self) -> &BTreeSet<CellAddress> {
        &self.dependencies
    }

    pub fn into_dependencies(self) -> BTreeSet<CellAddress> {
        self.dependencies
    }

    /// Read one cell and record the dependency edge
    pub fn read_cell(&mut self, addr: CellAddress) -> FormulaResult<Value> {
        self.dependencies.insert(addr);
        match self.reader.as_deref_mut() {
            Some(reader) => reader
                .read(addr)
                .map_err(|Pending| FormulaError::Unresolved(addr)),
            None => Ok(Value::blank()),
        }
    }

    /// Read a rectangular range as an array of row arrays.
    ///
    /// Every cell becomes a dependency. Oversized ranges are `#REF!`.
    pub fn read_range(&mut self, range: CellRange) -> FormulaResult<Value> {
        if range.cell_count() > self.options.max_range_cells as u64 {
            log::debug!(
                "range {} exceeds {} cells",
                range,
                self.options.max_range_cells
            );
            return Ok(Value::Error(ErrorKind::Ref));
        }

        let mut rows = Vec::with_capacity(range.row_count() as usize);
        for row in range.start.row..=range.end.row {
            let mut cells = Vec::with_capacity(range.col_count() as usize);
            for col in range.start.col..=range.end.col {
                cells.push(self.read_cell(CellAddress::new(row, col))?);
            }
            rows.push(Value::Array(cells));
        }
        Ok(Value::Array(rows))
    }
}
