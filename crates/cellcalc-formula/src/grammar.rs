//! Grammar productions, operator precedence and the generated SLR(1) tables
//!
//! The productions below are the only description of the formula language.
//! [`ActionTable::build`] turns them into action and goto tables with the
//! usual LR(0) item-set construction plus FOLLOW-set lookaheads. Shift/reduce
//! conflicts between operators are settled yacc-style from [`precedence`];
//! any other conflict fails the build.
//!
//! Operator levels, loosest first. Every level associates to the left.
//!
//! | level | operators |
//! |-------|-----------|
//! | 1 | `=` |
//! | 2 | `<>` `<=` `>=` |
//! | 3 | `<` `>` |
//! | 4 | `+` `-` |
//! | 5 | `*` `/` |
//! | 6 | `^` |
//! | 7 | `&` |
//! | 8 | `%` |
//! | 9 | unary `+` `-` |
//!
//! Because unary minus is the tightest level, `-5^2` is `(-5)^2`, and
//! because `&` binds tighter than `+`, `"a"&1+2` is `("a"&1)+2`.

use crate::error::{FormulaError, FormulaResult};
use crate::symbol::{Symbol as S, Symbol, NONTERMINAL_COUNT, TERMINAL_COUNT};
use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Number of productions
pub const PRODUCTION_COUNT: usize = 41;

/// Level assigned to unary `+` and `-`
pub const UNARY_PRECEDENCE: u8 = 9;

/// Production identifiers, in table order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProductionId {
    Start,
    ExprNum,
    ExprText,
    ExprName,
    ExprCell,
    ExprFixedCell,
    RangeCellCell,
    RangeCellFixed,
    RangeFixedCell,
    RangeFixedFixed,
    Paren,
    Concat,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Negate,
    UnaryPlus,
    CallEmpty,
    Call,
    ArrayLiteral,
    ErrorLiteral,
    ErrorPair,
    Integer,
    Decimal,
    Fraction,
    Percent,
    ArgsFirst,
    ArgsComma,
    ArgsSemicolon,
    RowsFirst,
    RowsNext,
    RowFirst,
    RowNext,
}

/// A grammar rule. The pop count of a reduction is `rhs.len()`.
#[derive(Debug)]
pub struct Production {
    pub lhs: Symbol,
    pub rhs: &'static [Symbol],
    /// Overrides the level of the rightmost operator in `rhs`
    pub precedence: Option<u8>,
}

const fn rule(lhs: Symbol, rhs: &'static [Symbol]) -> Production {
    Production {
        lhs,
        rhs,
        precedence: None,
    }
}

static PRODUCTIONS: [Production; PRODUCTION_COUNT] = [
    rule(S::Start, &[S::Expr]),
    rule(S::Expr, &[S::Num]),
    rule(S::Expr, &[S::Text]),
    rule(S::Expr, &[S::Name]),
    rule(S::Expr, &[S::Cell]),
    rule(S::Expr, &[S::FixedCell]),
    rule(S::Expr, &[S::Cell, S::Colon, S::Cell]),
    rule(S::Expr, &[S::Cell, S::Colon, S::FixedCell]),
    rule(S::Expr, &[S::FixedCell, S::Colon, S::Cell]),
    rule(S::Expr, &[S::FixedCell, S::Colon, S::FixedCell]),
    rule(S::Expr, &[S::LParen, S::Expr, S::RParen]),
    rule(S::Expr, &[S::Expr, S::Amp, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Eq, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Ne, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Lt, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Le, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Gt, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Ge, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Plus, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Minus, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Star, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Slash, S::Expr]),
    rule(S::Expr, &[S::Expr, S::Caret, S::Expr]),
    Production {
        lhs: S::Expr,
        rhs: &[S::Minus, S::Expr],
        precedence: Some(UNARY_PRECEDENCE),
    },
    Production {
        lhs: S::Expr,
        rhs: &[S::Plus, S::Expr],
        precedence: Some(UNARY_PRECEDENCE),
    },
    rule(S::Expr, &[S::Function, S::LParen, S::RParen]),
    rule(S::Expr, &[S::Function, S::LParen, S::Args, S::RParen]),
    rule(S::Expr, &[S::LBrace, S::Rows, S::RBrace]),
    rule(S::Expr, &[S::Error]),
    rule(S::Expr, &[S::Error, S::Error]),
    rule(S::Num, &[S::Number]),
    rule(S::Num, &[S::Number, S::Decimal, S::Number]),
    rule(S::Num, &[S::Decimal, S::Number]),
    rule(S::Num, &[S::Num, S::Percent]),
    rule(S::Args, &[S::Expr]),
    rule(S::Args, &[S::Args, S::Comma, S::Expr]),
    rule(S::Args, &[S::Args, S::Semicolon, S::Expr]),
    rule(S::Rows, &[S::Row]),
    rule(S::Rows, &[S::Rows, S::Semicolon, S::Row]),
    rule(S::Row, &[S::Expr]),
    rule(S::Row, &[S::Row, S::Comma, S::Expr]),
];

impl ProductionId {
    /// Every production, in table order
    pub const ALL: [ProductionId; PRODUCTION_COUNT] = [
        ProductionId::Start,
        ProductionId::ExprNum,
        ProductionId::ExprText,
        ProductionId::ExprName,
        ProductionId::ExprCell,
        ProductionId::ExprFixedCell,
        ProductionId::RangeCellCell,
        ProductionId::RangeCellFixed,
        ProductionId::RangeFixedCell,
        ProductionId::RangeFixedFixed,
        ProductionId::Paren,
        ProductionId::Concat,
        ProductionId::Equal,
        ProductionId::NotEqual,
        ProductionId::Less,
        ProductionId::LessEqual,
        ProductionId::Greater,
        ProductionId::GreaterEqual,
        ProductionId::Add,
        ProductionId::Subtract,
        ProductionId::Multiply,
        ProductionId::Divide,
        ProductionId::Power,
        ProductionId::Negate,
        ProductionId::UnaryPlus,
        ProductionId::CallEmpty,
        ProductionId::Call,
        ProductionId::ArrayLiteral,
        ProductionId::ErrorLiteral,
        ProductionId::ErrorPair,
        ProductionId::Integer,
        ProductionId::Decimal,
        ProductionId::Fraction,
        ProductionId::Percent,
        ProductionId::ArgsFirst,
        ProductionId::ArgsComma,
        ProductionId::ArgsSemicolon,
        ProductionId::RowsFirst,
        ProductionId::RowsNext,
        ProductionId::RowFirst,
        ProductionId::RowNext,
    ];

    pub fn production(self) -> &'static Production {
        &PRODUCTIONS[self as usize]
    }

    /// Symbol pushed in place of the popped entries
    pub fn lhs(self) -> Symbol {
        self.production().lhs
    }

    /// Number of stack entries a reduction consumes
    pub fn pop_count(self) -> usize {
        self.production().rhs.len()
    }
}

impl fmt::Display for ProductionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let production = self.production();
        write!(f, "{} →", production.lhs)?;
        for symbol in production.rhs {
            write!(f, " {}", symbol)?;
        }
        Ok(())
    }
}

impl Production {
    /// Level used to settle shift/reduce conflicts against this rule
    pub fn precedence(&self) -> Option<u8> {
        self.precedence
            .or_else(|| self.rhs.iter().rev().find_map(|s| precedence(*s)))
    }
}

/// Binding level of an operator terminal; higher binds tighter
pub fn precedence(symbol: Symbol) -> Option<u8> {
    match symbol {
        S::Eq => Some(1),
        S::Ne | S::Le | S::Ge => Some(2),
        S::Lt | S::Gt => Some(3),
        S::Plus | S::Minus => Some(4),
        S::Star | S::Slash => Some(5),
        S::Caret => Some(6),
        S::Amp => Some(7),
        S::Percent => Some(8),
        _ => None,
    }
}

/// One cell of the action table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Shift(u32),
    Reduce(ProductionId),
    Accept,
}

static TABLE: Lazy<ActionTable> = Lazy::new(|| match ActionTable::build() {
    Ok(table) => table,
    Err(e) => panic!("formula grammar failed to build: {e}"),
});

/// Action and goto tables indexed by parser state
#[derive(Debug)]
pub struct ActionTable {
    actions: Vec<[Option<Action>; TERMINAL_COUNT]>,
    gotos: Vec<[Option<u32>; NONTERMINAL_COUNT]>,
}

impl ActionTable {
    /// The process-wide table, built on first use
    pub fn get() -> &'static ActionTable {
        &TABLE
    }

    /// Action for `lookahead` in `state`, if any
    pub fn action(&self, state: u32, lookahead: Symbol) -> Option<Action> {
        self.actions
            .get(state as usize)?
            .get(lookahead.index())
            .copied()
            .flatten()
    }

    /// State to enter after reducing to `symbol` on top of `state`
    pub fn goto(&self, state: u32, symbol: Symbol) -> Option<u32> {
        let column = symbol.nonterminal_index()?;
        self.gotos.get(state as usize)?.get(column).copied().flatten()
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    /// Generate the tables from [`ProductionId::ALL`].
    ///
    /// Fails with [`FormulaError::Grammar`] on a reduce/reduce conflict or a
    /// shift/reduce conflict that precedence cannot settle.
    pub fn build() -> FormulaResult<Self> {
        let start = closure(ItemSet::from([Item {
            production: 0,
            dot: 0,
        }]));

        let mut states = vec![start.clone()];
        let mut index = BTreeMap::from([(start, 0u32)]);
        let mut transitions: Vec<Vec<(Symbol, u32)>> = Vec::new();

        let mut next = 0;
        while next < states.len() {
            let mut edges = Vec::new();
            for symbol in Symbol::ALL {
                let target = goto(&states[next], symbol);
                if target.is_empty() {
                    continue;
                }
                let id = match index.get(&target) {
                    Some(id) => *id,
                    None => {
                        let id = states.len() as u32;
                        index.insert(target.clone(), id);
                        states.push(target);
                        id
                    }
                };
                edges.push((symbol, id));
            }
            transitions.push(edges);
            next += 1;
        }

        let follow = follow_sets(&first_sets());

        let mut table = ActionTable {
            actions: vec![[None; TERMINAL_COUNT]; states.len()],
            gotos: vec![[None; NONTERMINAL_COUNT]; states.len()],
        };

        for (state, edges) in transitions.iter().enumerate() {
            for &(symbol, target) in edges {
                match symbol.nonterminal_index() {
                    Some(column) => table.gotos[state][column] = Some(target),
                    None => table.actions[state][symbol.index()] = Some(Action::Shift(target)),
                }
            }
        }

        for (state, items) in states.iter().enumerate() {
            for item in items.iter().filter(|item| item.next_symbol().is_none()) {
                let id = ProductionId::ALL[item.production];
                if id == ProductionId::Start {
                    table.place_accept(state)?;
                    continue;
                }
                for &lookahead in &follow[id.lhs().index()] {
                    table.place_reduce(state, lookahead, id)?;
                }
            }
        }

        log::debug!(
            "formula grammar: {} productions, {} states",
            PRODUCTION_COUNT,
            states.len()
        );

        Ok(table)
    }

    fn place_accept(&mut self, state: usize) -> FormulaResult<()> {
        let slot = &mut self.actions[state][S::End.index()];
        if let Some(existing) = *slot {
            return Err(FormulaError::Grammar(format!(
                "state {state}: accept conflicts with {existing:?} on {}",
                S::End
            )));
        }
        *slot = Some(Action::Accept);
        Ok(())
    }

    fn place_reduce(
        &mut self,
        state: usize,
        lookahead: Symbol,
        id: ProductionId,
    ) -> FormulaResult<()> {
        let slot = &mut self.actions[state][lookahead.index()];
        *slot = match *slot {
            None => Some(Action::Reduce(id)),
            Some(Action::Shift(target)) => {
                match (id.production().precedence(), precedence(lookahead)) {
                    // Ties reduce: every level is left-associative
                    (Some(level), Some(incoming)) if level >= incoming => Some(Action::Reduce(id)),
                    (Some(_), Some(_)) => Some(Action::Shift(target)),
                    _ => {
                        return Err(FormulaError::Grammar(format!(
                            "state {state}: shift/reduce conflict on {lookahead} with `{id}`"
                        )))
                    }
                }
            }
            Some(existing) => {
                return Err(FormulaError::Grammar(format!(
                    "state {state}: {existing:?} conflicts with `{id}` on {lookahead}"
                )))
            }
        };
        Ok(())
    }
}

/// An LR(0) item: a production with a dot before `rhs[dot]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Item {
    production: usize,
    dot: usize,
}

impl Item {
    fn next_symbol(&self) -> Option<Symbol> {
        PRODUCTIONS[self.production].rhs.get(self.dot).copied()
    }
}

type ItemSet = BTreeSet<Item>;

fn closure(mut items: ItemSet) -> ItemSet {
    let mut pending: Vec<Item> = items.iter().copied().collect();
    while let Some(item) = pending.pop() {
        let Some(next) = item.next_symbol() else {
            continue;
        };
        if next.is_terminal() {
            continue;
        }
        for (production, rule) in PRODUCTIONS.iter().enumerate() {
            if rule.lhs == next {
                let added = Item { production, dot: 0 };
                if items.insert(added) {
                    pending.push(added);
                }
            }
        }
    }
    items
}

fn goto(items: &ItemSet, symbol: Symbol) -> ItemSet {
    let moved: ItemSet = items
        .iter()
        .filter(|item| item.next_symbol() == Some(symbol))
        .map(|item| Item {
            production: item.production,
            dot: item.dot + 1,
        })
        .collect();
    if moved.is_empty() {
        moved
    } else {
        closure(moved)
    }
}

/// FIRST sets indexed by symbol id. No production is empty, so only the
/// leading symbol of each right-hand side contributes.
fn first_sets() -> Vec<BTreeSet<Symbol>> {
    let mut first: Vec<BTreeSet<Symbol>> = Symbol::ALL
        .iter()
        .map(|&s| {
            if s.is_terminal() {
                BTreeSet::from([s])
            } else {
                BTreeSet::new()
            }
        })
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for rule in &PRODUCTIONS {
            let Some(&lead) = rule.rhs.first() else {
                continue;
            };
            let additions: Vec<Symbol> = first[lead.index()].iter().copied().collect();
            for symbol in additions {
                changed |= first[rule.lhs.index()].insert(symbol);
            }
        }
    }
    first
}

fn follow_sets(first: &[BTreeSet<Symbol>]) -> Vec<BTreeSet<Symbol>> {
    let mut follow = vec![BTreeSet::new(); Symbol::ALL.len()];
    follow[S::Start.index()].insert(S::End);

    let mut changed = true;
    while changed {
        changed = false;
        for rule in &PRODUCTIONS {
            for (i, &symbol) in rule.rhs.iter().enumerate() {
                if symbol.is_terminal() {
                    continue;
                }
                let additions: Vec<Symbol> = match rule.rhs.get(i + 1) {
                    Some(next) => first[next.index()].iter().copied().collect(),
                    None => follow[rule.lhs.index()].iter().copied().collect(),
                };
                for lookahead in additions {
                    changed |= follow[symbol.index()].insert(lookahead);
                }
            }
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tables_build_without_conflicts() {
        let table = ActionTable::build().expect("grammar should be SLR(1) with precedence");
        assert!(table.state_count() > 1);
    }

    #[test]
    fn test_pop_counts_match_rules() {
        assert_eq!(ProductionId::ALL.len(), PRODUCTION_COUNT);
        for (i, id) in ProductionId::ALL.iter().enumerate() {
            assert_eq!(*id as usize, i);
            assert!(id.pop_count() >= 1, "{id} is empty");
        }
        assert_eq!(ProductionId::Start.lhs(), Symbol::Start);
        assert_eq!(ProductionId::Call.pop_count(), 4);
        assert_eq!(ProductionId::Decimal.pop_count(), 3);
        assert_eq!(
            ProductionId::Add.production().rhs,
            &[Symbol::Expr, Symbol::Plus, Symbol::Expr]
        );
        assert_eq!(
            ProductionId::RowNext.production().rhs,
            &[Symbol::Row, Symbol::Comma, Symbol::Expr]
        );
    }

    #[test]
    fn test_rule_precedence() {
        assert_eq!(ProductionId::Negate.production().precedence(), Some(UNARY_PRECEDENCE));
        assert_eq!(ProductionId::Subtract.production().precedence(), precedence(Symbol::Minus));
        assert_eq!(ProductionId::Paren.production().precedence(), None);
        assert!(precedence(Symbol::Caret) > precedence(Symbol::Star));
        assert!(precedence(Symbol::Amp) > precedence(Symbol::Plus));
    }

    #[test]
    fn test_single_accept_on_end() {
        let table = ActionTable::get();
        let accepting: Vec<u32> = (0..table.state_count() as u32)
            .filter(|&s| table.action(s, Symbol::End) == Some(Action::Accept))
            .collect();
        assert_eq!(accepting.len(), 1);
    }

    #[test]
    fn test_start_state_shifts_operands() {
        let table = ActionTable::get();
        for symbol in [
            Symbol::Number,
            Symbol::Text,
            Symbol::Cell,
            Symbol::Function,
            Symbol::Minus,
            Symbol::LBrace,
            Symbol::Error,
        ] {
            assert!(
                matches!(table.action(0, symbol), Some(Action::Shift(_))),
                "{symbol} should shift from the start state"
            );
        }
        assert_eq!(table.action(0, Symbol::End), None);
        assert_eq!(table.action(0, Symbol::RParen), None);
    }

    #[test]
    fn test_percent_only_follows_numbers() {
        let first = first_sets();
        let follow = follow_sets(&first);
        assert!(follow[Symbol::Num.index()].contains(&Symbol::Percent));
        assert!(!follow[Symbol::Expr.index()].contains(&Symbol::Percent));
        assert!(!follow[Symbol::Expr.index()].contains(&Symbol::Error));
    }

    #[test]
    fn test_display_production() {
        assert_eq!(ProductionId::Power.to_string(), "Expr → Expr '^' Expr");
    }
}
