//! Cell & dependency matrix
//!
//! The [`Matrix`] owns every cell, records which cells each formula read on
//! its last evaluation and recalculates transitively when something changes.
//!
//! # Recalculation sessions
//!
//! A change starts a session. The changed cells and everything that
//! (transitively) read them are collected through the reverse dependency
//! index, and every formula cell among them is reset to
//! [`CellState::Unevaluated`]. They are visited in topological order over
//! the recorded edges, so a cell normally finds everything it reads already
//! committed. Edges the records do not know yet (a formula set in this
//! session) and cycles are handled by pulling:
//!
//! - a formula that reads an `Unevaluated` cell is abandoned, the cell it
//!   asked for is pushed on an explicit work stack, and the abandoned formula
//!   is re-run from scratch once the dependency has committed;
//! - a formula that reads a cell which is still `Evaluating` (on the stack)
//!   has found a cycle. Every cell on the stack from that one up is a cycle
//!   member and commits `#REF!` whatever its formula computes.
//!
//! A formula that does not parse commits `#ERROR!` without reading anything,
//! so it never takes part in a cycle.
//!
//! No native recursion is involved, so long chains and long cycles are
//! bounded by heap, not stack.
//!
//! # Example
//!
//! ```rust
//! use cellcalc::prelude::*;
//!
//! let mut matrix = Matrix::new();
//! matrix.set_value("A1", 10.0).unwrap();
//! matrix.set_formula("A2", "=A1*2").unwrap();
//! assert_eq!(matrix.get_value("A2").unwrap(), Value::Number(20.0));
//!
//! let stats = matrix.set_value("A1", 1.0).unwrap();
//! assert_eq!(stats.evaluated.len(), 1);
//! assert_eq!(matrix.get_value("A2").unwrap(), Value::Number(2.0));
//! ```

use crate::cell::{Cell, CellId, CellState, Formula, IntoCellAddress};
use crate::error::{Error, Result};
use ahash::{AHashMap, AHashSet};
use cellcalc_core::{CellAddress, ErrorKind, Value};
use cellcalc_formula::{
    engine, functions, CalculationOptions, CellReader, EvaluationContext, FormulaError,
    FunctionRegistry, ParseStats, Pending,
};
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

/// Statistics from one recalculation session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecalcStats {
    /// Cells that committed a result, in commit order
    pub evaluated: Vec<CellAddress>,
    /// Formula runs abandoned to evaluate a dependency first
    pub retries: usize,
    /// Cells committed as members of a circular reference
    pub cycles: usize,
    /// Cells that committed an error value
    pub errors: usize,
    /// Engine counters over every formula run, retries included
    pub parse: ParseStats,
}

/// Owner of all cells and their dependency edges
pub struct Matrix {
    cells: Vec<Cell>,
    index: AHashMap<CellAddress, CellId>,
    /// Cell -> formula cells whose last evaluation read it
    dependents: AHashMap<CellId, AHashSet<CellId>>,
    registry: Arc<FunctionRegistry>,
    options: CalculationOptions,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matrix")
            .field("cells", &self.cells.len())
            .field("options", &self.options)
            .finish()
    }
}

impl Matrix {
    /// Create an empty matrix using the built-in functions
    pub fn new() -> Self {
        Self::with_options(CalculationOptions::default())
    }

    pub fn with_options(options: CalculationOptions) -> Self {
        Self {
            cells: Vec::new(),
            index: AHashMap::new(),
            dependents: AHashMap::new(),
            registry: functions::shared_registry(),
            options,
        }
    }

    /// Use `registry` instead of the built-ins for formulas evaluated from
    /// now on
    pub fn with_registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn options(&self) -> &CalculationOptions {
        &self.options
    }

    /// Number of cells named so far, blanks included
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, address: impl IntoCellAddress) -> Result<Option<&Cell>> {
        let address = address.into_address()?;
        Ok(self.lookup(address).map(|id| &self.cells[id.index()]))
    }

    /// Store a formula and recalculate it and its dependents
    pub fn set_formula(
        &mut self,
        address: impl IntoCellAddress,
        formula: &str,
    ) -> Result<RecalcStats> {
        let id = self.intern(address.into_address()?);
        self.cells[id.index()].formula = Some(Formula::new(formula));
        self.recalculate_from(&[id])
    }

    /// Store a literal value, dropping any formula, and recalculate dependents
    pub fn set_value(
        &mut self,
        address: impl IntoCellAddress,
        value: impl Into<Value>,
    ) -> Result<RecalcStats> {
        let id = self.intern(address.into_address()?);
        self.replace_with_literal(id, value.into());
        self.recalculate_from(&[id])
    }

    /// Reset a cell to blank and recalculate its dependents
    ///
    /// The cell keeps its place in the arena since dependents still name it.
    pub fn remove(&mut self, address: impl IntoCellAddress) -> Result<RecalcStats> {
        let Some(id) = self.lookup(address.into_address()?) else {
            return Ok(RecalcStats::default());
        };
        self.replace_with_literal(id, Value::blank());
        self.recalculate_from(&[id])
    }

    /// Current value. Blank and never-named cells read as empty text.
    pub fn get_value(&self, address: impl IntoCellAddress) -> Result<Value> {
        Ok(self
            .cell(address)?
            .map_or_else(Value::blank, |cell| cell.value().clone()))
    }

    /// Error held by the cell, if any
    pub fn get_error(&self, address: impl IntoCellAddress) -> Result<Option<ErrorKind>> {
        Ok(self.cell(address)?.and_then(Cell::error))
    }

    /// State of the cell, `None` if it was never named
    pub fn get_state(&self, address: impl IntoCellAddress) -> Result<Option<CellState>> {
        Ok(self.cell(address)?.map(Cell::state))
    }

    /// Cells whose last evaluation read this one, sorted
    pub fn get_dependents(&self, address: impl IntoCellAddress) -> Result<Vec<CellAddress>> {
        let Some(id) = self.lookup(address.into_address()?) else {
            return Ok(Vec::new());
        };
        let mut dependents: Vec<CellAddress> = self
            .dependents
            .get(&id)
            .into_iter()
            .flatten()
            .map(|dep| self.cells[dep.index()].address)
            .collect();
        dependents.sort_unstable();
        Ok(dependents)
    }

    /// Cells read by this cell's last evaluation, sorted
    pub fn get_dependencies(&self, address: impl IntoCellAddress) -> Result<Vec<CellAddress>> {
        Ok(self
            .cell(address)?
            .map(|cell| cell.dependencies.iter().copied().collect())
            .unwrap_or_default())
    }

    /// Re-evaluate one cell and everything depending on it
    pub fn recalculate(&mut self, address: impl IntoCellAddress) -> Result<RecalcStats> {
        match self.lookup(address.into_address()?) {
            Some(id) => self.recalculate_from(&[id]),
            None => Ok(RecalcStats::default()),
        }
    }

    /// Re-evaluate every formula cell
    pub fn recalculate_all(&mut self) -> Result<RecalcStats> {
        let seeds: Vec<CellId> = (0..self.cells.len())
            .map(CellId)
            .filter(|id| self.cells[id.index()].has_formula())
            .collect();
        self.recalculate_from(&seeds)
    }

    /// Evaluate a formula against the current cell values without storing it
    ///
    /// Syntax errors come back as [`FormulaError::Syntax`].
    pub fn evaluate(&self, formula: &str) -> Result<Value> {
        let tokens = cellcalc_formula::tokenize(formula);
        let stack: [CellId; 0] = [];
        let mut cycles = AHashSet::new();
        let mut reader = SessionReader {
            matrix: self,
            stack: &stack,
            cycles: &mut cycles,
        };
        let mut ctx = EvaluationContext::new(&self.registry, &mut reader)
            .with_options(self.options.clone());
        Ok(engine::run(&tokens, &mut ctx)?)
    }

    fn lookup(&self, address: CellAddress) -> Option<CellId> {
        self.index.get(&address).copied()
    }

    /// Id for `address`, creating a blank cell the first time it is named
    fn intern(&mut self, address: CellAddress) -> CellId {
        if let Some(id) = self.lookup(address) {
            return id;
        }
        let id = CellId(self.cells.len());
        self.cells.push(Cell::new(address));
        self.index.insert(address, id);
        id
    }

    fn replace_with_literal(&mut self, id: CellId, value: Value) {
        self.record_dependencies(id, BTreeSet::new());
        let cell = &mut self.cells[id.index()];
        cell.formula = None;
        cell.commit(value);
    }

    /// Replace a cell's forward set and patch the reverse index with the
    /// difference
    fn record_dependencies(&mut self, id: CellId, dependencies: BTreeSet<CellAddress>) {
        let old: AHashSet<CellId> = self.cells[id.index()]
            .dependencies
            .iter()
            .filter_map(|addr| self.lookup(*addr))
            .collect();
        let new: AHashSet<CellId> = dependencies.iter().map(|addr| self.intern(*addr)).collect();

        for removed in old.difference(&new) {
            if let Some(set) = self.dependents.get_mut(removed) {
                set.remove(&id);
                if set.is_empty() {
                    self.dependents.remove(removed);
                }
            }
        }
        for added in new.difference(&old) {
            self.dependents.entry(*added).or_default().insert(id);
        }

        self.cells[id.index()].dependencies = dependencies;
    }

    /// `seeds` plus every cell that transitively reads one of them
    fn affected(&self, seeds: &[CellId]) -> Vec<CellId> {
        let mut seen: AHashSet<CellId> = seeds.iter().copied().collect();
        let mut queue: VecDeque<CellId> = seeds.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            for dependent in self.dependents.get(&id).into_iter().flatten() {
                if seen.insert(*dependent) {
                    queue.push_back(*dependent);
                }
            }
        }

        let mut affected: Vec<CellId> = seen.into_iter().collect();
        affected.sort_unstable_by_key(|id| self.cells[id.index()].address);
        affected
    }

    /// Formula cells affected by `seeds`, dependencies before dependents.
    ///
    /// Kahn's algorithm over the recorded edges, ties broken by address.
    /// Cells on a cycle never become ready and are appended in address
    /// order for the evaluation stack to sort out.
    fn recalc_order(&self, seeds: &[CellId]) -> Vec<CellId> {
        let scheduled: Vec<CellId> = self
            .affected(seeds)
            .into_iter()
            .filter(|id| self.cells[id.index()].has_formula())
            .collect();

        let mut in_degree: AHashMap<CellId, usize> =
            scheduled.iter().map(|id| (*id, 0)).collect();
        for id in &scheduled {
            for dependent in self.dependents.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree += 1;
                }
            }
        }

        let mut ready: VecDeque<CellId> = scheduled
            .iter()
            .copied()
            .filter(|id| in_degree.get(id) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(scheduled.len());

        while let Some(id) = ready.pop_front() {
            order.push(id);
            let mut unblocked: Vec<CellId> = Vec::new();
            for dependent in self.dependents.get(&id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        unblocked.push(*dependent);
                    }
                }
            }
            unblocked.sort_unstable_by_key(|id| self.cells[id.index()].address);
            ready.extend(unblocked);
        }

        if order.len() < scheduled.len() {
            let placed: AHashSet<CellId> = order.iter().copied().collect();
            order.extend(scheduled.iter().filter(|id| !placed.contains(id)));
        }
        order
    }

    fn recalculate_from(&mut self, seeds: &[CellId]) -> Result<RecalcStats> {
        let mut stats = RecalcStats::default();

        let scheduled = self.recalc_order(seeds);
        log::debug!(
            "recalculating {} formula cells from {} changed",
            scheduled.len(),
            seeds.len()
        );

        for id in &scheduled {
            self.cells[id.index()].state = CellState::Unevaluated;
        }

        let mut cycles: AHashSet<CellId> = AHashSet::new();
        for id in scheduled {
            if self.cells[id.index()].state == CellState::Unevaluated {
                self.evaluate_from(id, &mut cycles, &mut stats)?;
            }
        }

        log::debug!(
            "recalculated {} cells ({} retries, {} in cycles, {} errors)",
            stats.evaluated.len(),
            stats.retries,
            stats.cycles,
            stats.errors
        );
        Ok(stats)
    }

    /// Evaluate `root`, pulling in any `Unevaluated` cells it reads first
    fn evaluate_from(
        &mut self,
        root: CellId,
        cycles: &mut AHashSet<CellId>,
        stats: &mut RecalcStats,
    ) -> Result<()> {
        let mut stack = vec![root];
        self.cells[root.index()].state = CellState::Evaluating;

        while let Some(&top) = stack.last() {
            let (result, dependencies) = self.run_formula(top, &stack, cycles, &mut stats.parse);

            match result {
                Ok(value) => {
                    stack.pop();
                    self.commit(top, value, dependencies, cycles, stats);
                }
                Err(FormulaError::Unresolved(addr)) => {
                    let pending = self
                        .lookup(addr)
                        .ok_or(Error::Formula(FormulaError::Unresolved(addr)))?;
                    log::trace!(
                        "{} waits for {}",
                        self.cells[top.index()].address,
                        addr
                    );
                    self.cells[pending.index()].state = CellState::Evaluating;
                    stack.push(pending);
                    stats.retries += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    /// Run one cell's formula against the current matrix
    fn run_formula(
        &self,
        id: CellId,
        stack: &[CellId],
        cycles: &mut AHashSet<CellId>,
        parse: &mut ParseStats,
    ) -> (
        std::result::Result<Value, FormulaError>,
        BTreeSet<CellAddress>,
    ) {
        let cell = &self.cells[id.index()];
        let Some(formula) = cell.formula() else {
            return (Ok(cell.value.clone()), BTreeSet::new());
        };
        if formula.syntax_error().is_some() {
            return (Ok(Value::Error(ErrorKind::Generic)), BTreeSet::new());
        }

        let mut reader = SessionReader {
            matrix: self,
            stack,
            cycles,
        };
        let mut ctx = EvaluationContext::new(&self.registry, &mut reader)
            .at(cell.address)
            .with_options(self.options.clone());
        let result = engine::run_lenient(formula.tokens(), &mut ctx, parse);
        (result, ctx.into_dependencies())
    }

    fn commit(
        &mut self,
        id: CellId,
        value: Value,
        dependencies: BTreeSet<CellAddress>,
        cycles: &AHashSet<CellId>,
        stats: &mut RecalcStats,
    ) {
        let value = if cycles.contains(&id) {
            stats.cycles += 1;
            Value::Error(ErrorKind::Ref)
        } else {
            value
        };
        if value.is_error() {
            stats.errors += 1;
        }

        self.record_dependencies(id, dependencies);
        let cell = &mut self.cells[id.index()];
        cell.commit(value);
        stats.evaluated.push(cell.address);
    }
}

/// Gives a formula access to the matrix during a session
struct SessionReader<'m> {
    matrix: &'m Matrix,
    /// The evaluation stack, innermost last
    stack: &'m [CellId],
    cycles: &'m mut AHashSet<CellId>,
}

impl CellReader for SessionReader<'_> {
    fn read(&mut self, addr: CellAddress) -> std::result::Result<Value, Pending> {
        let Some(id) = self.matrix.lookup(addr) else {
            return Ok(Value::blank());
        };
        let cell = &self.matrix.cells[id.index()];

        match cell.state {
            CellState::Evaluating => {
                if let Some(position) = self.stack.iter().position(|s| *s == id) {
                    log::warn!(
                        "circular reference: {} is read while {} cells are being evaluated",
                        addr,
                        self.stack.len() - position
                    );
                    self.cycles.extend(self.stack[position..].iter().copied());
                }
                Ok(Value::Error(ErrorKind::Ref))
            }
            CellState::Unevaluated => Err(Pending),
            CellState::Valid | CellState::Errored => Ok(cell.value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    fn addrs(list: &[&str]) -> Vec<CellAddress> {
        list.iter().map(|s| addr(s)).collect()
    }

    #[test]
    fn test_formula_reads_values() {
        let mut matrix = Matrix::new();
        matrix.set_value("A1", 2.0).unwrap();
        matrix.set_value("A2", "3").unwrap();
        matrix.set_formula("A3", "=A1*A2").unwrap();
        assert_eq!(matrix.get_value("A3").unwrap(), Value::Number(6.0));
        assert_eq!(matrix.get_state("A3").unwrap(), Some(CellState::Valid));
        assert_eq!(matrix.get_dependencies("A3").unwrap(), addrs(&["A1", "A2"]));
        assert_eq!(matrix.get_dependents("A1").unwrap(), addrs(&["A3"]));
    }

    #[test]
    fn test_reading_creates_blank_cells() {
        let mut matrix = Matrix::new();
        assert_eq!(matrix.get_state("B7").unwrap(), None);
        matrix.set_formula("A1", "=B7&\"!\"").unwrap();
        assert_eq!(matrix.get_value("A1").unwrap(), Value::text("!"));
        assert_eq!(matrix.get_state("B7").unwrap(), Some(CellState::Valid));
        assert_eq!(matrix.len(), 2);
    }

    #[test]
    fn test_recorded_edges_give_the_order() {
        let mut matrix = Matrix::new();
        // A1 sorts before the cell it reads
        matrix.set_formula("A1", "=B1+1").unwrap();
        matrix.set_formula("B1", "=C1+1").unwrap();
        matrix.set_value("C1", 1.0).unwrap();

        let stats = matrix.recalculate_all().unwrap();
        assert_eq!(matrix.get_value("A1").unwrap(), Value::Number(3.0));
        assert_eq!(stats.evaluated, addrs(&["B1", "A1"]));
        assert_eq!(stats.retries, 0);
    }

    #[test]
    fn test_fan_in_over_recorded_edges() {
        let mut matrix = Matrix::new();
        matrix.set_formula("A1", "=SUM(B1:B200)").unwrap();
        for row in 0..200u32 {
            matrix.set_formula((row, 1u16), "=C1+1").unwrap();
        }
        assert_eq!(matrix.get_value("A1").unwrap(), Value::Number(200.0));

        let stats = matrix.set_value("C1", 1.0).unwrap();
        assert_eq!(stats.retries, 0);
        assert_eq!(stats.evaluated.len(), 201);
        assert_eq!(stats.evaluated.last(), Some(&addr("A1")));
        assert_eq!(matrix.get_value("A1").unwrap(), Value::Number(400.0));
    }

    #[test]
    fn test_errored_state() {
        let mut matrix = Matrix::new();
        matrix.set_formula("A1", "=1/0").unwrap();
        assert_eq!(matrix.get_state("A1").unwrap(), Some(CellState::Errored));
        assert_eq!(matrix.get_error("A1").unwrap(), Some(ErrorKind::DivZero));

        matrix.set_formula("A2", "=A1+1").unwrap();
        assert_eq!(matrix.get_error("A2").unwrap(), Some(ErrorKind::DivZero));
    }

    #[test]
    fn test_syntax_error_is_generic() {
        let mut matrix = Matrix::new();
        let stats = matrix.set_formula("A1", "=1+").unwrap();
        assert_eq!(matrix.get_error("A1").unwrap(), Some(ErrorKind::Generic));
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_malformed_self_reference_is_generic() {
        let mut matrix = Matrix::new();
        let stats = matrix.set_formula("A1", "=A1+").unwrap();
        assert_eq!(matrix.get_error("A1").unwrap(), Some(ErrorKind::Generic));
        assert_eq!(stats.cycles, 0);
        assert!(matrix.get_dependencies("A1").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_formula_never_joins_a_cycle() {
        let mut matrix = Matrix::new();
        matrix.set_formula("B1", "=C1+").unwrap();
        let stats = matrix.set_formula("C1", "=B1").unwrap();
        assert_eq!(matrix.get_error("B1").unwrap(), Some(ErrorKind::Generic));
        assert_eq!(matrix.get_error("C1").unwrap(), Some(ErrorKind::Generic));
        assert_eq!(stats.cycles, 0);
        assert!(matrix.get_dependents("C1").unwrap().is_empty());

        // Fixing the formula closes the cycle
        matrix.set_formula("B1", "=C1+1").unwrap();
        assert_eq!(matrix.get_error("B1").unwrap(), Some(ErrorKind::Ref));
        assert_eq!(matrix.get_error("C1").unwrap(), Some(ErrorKind::Ref));
    }

    #[test]
    fn test_self_reference() {
        let mut matrix = Matrix::new();
        let stats = matrix.set_formula("A1", "=A1+1").unwrap();
        assert_eq!(matrix.get_error("A1").unwrap(), Some(ErrorKind::Ref));
        assert_eq!(stats.cycles, 1);
        assert_eq!(matrix.get_dependents("A1").unwrap(), addrs(&["A1"]));
    }

    #[test]
    fn test_cycle_members_ignore_their_formula() {
        let mut matrix = Matrix::new();
        matrix.set_formula("A1", "=IFERROR(B1,5)").unwrap();
        matrix.set_formula("B1", "=A1").unwrap();
        assert_eq!(matrix.get_error("A1").unwrap(), Some(ErrorKind::Ref));
        assert_eq!(matrix.get_error("B1").unwrap(), Some(ErrorKind::Ref));
    }

    #[test]
    fn test_breaking_a_cycle() {
        let mut matrix = Matrix::new();
        matrix.set_formula("A1", "=B1").unwrap();
        matrix.set_formula("B1", "=A1").unwrap();
        matrix.set_value("B1", 4.0).unwrap();
        assert_eq!(matrix.get_value("A1").unwrap(), Value::Number(4.0));
        assert_eq!(matrix.get_dependents("A1").unwrap(), Vec::<CellAddress>::new());
    }

    #[test]
    fn test_dependency_edges_follow_the_formula() {
        let mut matrix = Matrix::new();
        matrix.set_value("A1", true).unwrap();
        matrix.set_formula("C1", "=IF(A1,B1,B2)").unwrap();
        assert_eq!(matrix.get_dependencies("C1").unwrap(), addrs(&["A1", "B1", "B2"]));

        matrix.set_formula("C1", "=B2").unwrap();
        assert_eq!(matrix.get_dependencies("C1").unwrap(), addrs(&["B2"]));
        assert!(matrix.get_dependents("A1").unwrap().is_empty());
        assert!(matrix.get_dependents("B1").unwrap().is_empty());
        assert_eq!(matrix.get_dependents("B2").unwrap(), addrs(&["C1"]));
    }

    #[test]
    fn test_remove() {
        let mut matrix = Matrix::new();
        matrix.set_formula("A1", "=2+2").unwrap();
        matrix.set_formula("A2", "=A1*10").unwrap();
        let stats = matrix.remove("A1").unwrap();
        assert_eq!(stats.evaluated, addrs(&["A2"]));
        assert_eq!(matrix.get_value("A1").unwrap(), Value::blank());
        assert_eq!(matrix.get_value("A2").unwrap(), Value::Number(0.0));
        assert!(matrix.remove("Z99").unwrap().evaluated.is_empty());
    }

    #[test]
    fn test_oversized_range_option() {
        let mut matrix = Matrix::with_options(CalculationOptions { max_range_cells: 4 });
        matrix.set_formula("C1", "=SUM(A1:B2)").unwrap();
        matrix.set_formula("C2", "=SUM(A1:B3)").unwrap();
        assert_eq!(matrix.get_value("C1").unwrap(), Value::Number(0.0));
        assert_eq!(matrix.get_error("C2").unwrap(), Some(ErrorKind::Ref));
        assert!(matrix.get_dependencies("C2").unwrap().is_empty());
    }

    #[test]
    fn test_custom_registry() {
        fn fn_double(args: &[Value], _ctx: &EvaluationContext) -> std::result::Result<Value, ErrorKind> {
            Ok(Value::Number(cellcalc_core::coerce::to_number(&args[0])? * 2.0))
        }
        let mut registry = FunctionRegistry::empty();
        registry.register(cellcalc_formula::FunctionDef {
            name: "DOUBLE",
            min_args: 1,
            max_args: Some(1),
            implementation: fn_double,
        });

        let mut matrix = Matrix::new().with_registry(registry);
        matrix.set_formula("A1", "=double(21)").unwrap();
        matrix.set_formula("A2", "=SUM(1)").unwrap();
        assert_eq!(matrix.get_value("A1").unwrap(), Value::Number(42.0));
        assert_eq!(matrix.get_error("A2").unwrap(), Some(ErrorKind::Name));
    }

    #[test]
    fn test_ad_hoc_evaluate() {
        let mut matrix = Matrix::new();
        matrix.set_value("A1", 5.0).unwrap();
        assert_eq!(matrix.evaluate("=A1*A1").unwrap(), Value::Number(25.0));
        assert!(matches!(
            matrix.evaluate("=A1+"),
            Err(Error::Formula(FormulaError::Syntax { .. }))
        ));
        // Nothing stored
        assert!(matrix.get_dependents("A1").unwrap().is_empty());
    }

    #[test]
    fn test_bad_address() {
        let mut matrix = Matrix::new();
        assert!(matches!(
            matrix.set_value("1A", 1.0),
            Err(Error::Address(_))
        ));
    }
}
