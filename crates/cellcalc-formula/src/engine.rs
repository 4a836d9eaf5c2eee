//! Shift-reduce engine
//!
//! Walks a token stream against [`ActionTable`] with two parallel stacks:
//! parser states and [`Slot`]s. A reduction pops `pop_count` entries from
//! both, hands the slots to [`reduce::reduce`], and pushes the result with
//! the goto state for the production's left-hand side. Input is finite and
//! every step either consumes a token or shrinks the stacks, so the loop
//! always ends in accept, a recovered error value or a syntax error.

use crate::context::EvaluationContext;
use crate::error::{FormulaError, FormulaResult};
use crate::grammar::{Action, ActionTable};
use crate::lexer::Token;
use crate::reduce::{self, Slot};
use crate::symbol::Symbol;
use cellcalc_core::{ErrorKind, Value};

/// Counters from one run of the engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Tokens consumed, including the end marker when the run accepts
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
}

impl ParseStats {
    pub fn merge(&mut self, other: &ParseStats) {
        self.tokens += other.tokens;
        self.shifts += other.shifts;
        self.reductions += other.reductions;
    }
}

/// Evaluate a token stream
pub fn run(tokens: &[Token], ctx: &mut EvaluationContext) -> FormulaResult<Value> {
    run_with_stats(tokens, ctx, &mut ParseStats::default())
}

/// Evaluate a token stream, accumulating counters into `stats`
///
/// A missing trailing [`Symbol::End`] is implied.
pub fn run_with_stats(
    tokens: &[Token],
    ctx: &mut EvaluationContext,
    stats: &mut ParseStats,
) -> FormulaResult<Value> {
    let table = ActionTable::get();
    let end = end_marker(tokens);

    let mut states: Vec<u32> = vec![0];
    let mut slots: Vec<Slot> = Vec::new();
    let mut next = 0;

    loop {
        let lookahead = tokens.get(next).unwrap_or(&end);
        let state = states.last().copied().unwrap_or(0);

        match table.action(state, lookahead.symbol) {
            Some(Action::Shift(target)) => {
                log::trace!("Shift {} -> state {}", lookahead.symbol, target);
                slots.push(Slot::Token(lookahead.clone()));
                states.push(target);
                next += 1;
                stats.tokens += 1;
                stats.shifts += 1;
            }
            Some(Action::Reduce(production)) => {
                let count = production.pop_count();
                if count > slots.len() || count >= states.len() {
                    return Err(FormulaError::Grammar(format!(
                        "`{production}` pops {count} entries from a stack of {}",
                        slots.len()
                    )));
                }
                let popped = slots.split_off(slots.len() - count);
                states.truncate(states.len() - count);

                let uncovered = states.last().copied().unwrap_or(0);
                let target = table.goto(uncovered, production.lhs()).ok_or_else(|| {
                    FormulaError::Grammar(format!(
                        "no goto from state {uncovered} on {}",
                        production.lhs()
                    ))
                })?;

                log::trace!("Reduce {} -> state {}", production, target);
                slots.push(reduce::reduce(production, popped, ctx)?);
                states.push(target);
                stats.reductions += 1;
            }
            Some(Action::Accept) => {
                log::trace!("Accept");
                stats.tokens += 1;
                return match slots.pop() {
                    Some(Slot::Value(value)) => Ok(value),
                    other => Err(FormulaError::Grammar(format!(
                        "accepted with {other:?} on the stack"
                    ))),
                };
            }
            None if lookahead.symbol == Symbol::Error => {
                // Malformed input the grammar cannot place: the whole
                // formula becomes an error. A run of adjacent error tokens
                // still collapses into its first.
                let first = slots
                    .iter()
                    .rev()
                    .map_while(|slot| match slot {
                        Slot::Token(token) if token.symbol == Symbol::Error => Some(token),
                        _ => None,
                    })
                    .last()
                    .unwrap_or(lookahead);
                log::trace!("Recover on {:?}", first.text);
                return Ok(Value::Error(first.error_kind()));
            }
            None => return Err(syntax_error(lookahead)),
        }
    }
}

/// Check a token stream against the tables without evaluating anything
///
/// Gives the same syntax error [`run`] would, but never reads a cell or
/// calls a function. Input absorbed by the error productions is accepted.
pub fn recognize(tokens: &[Token]) -> FormulaResult<()> {
    let table = ActionTable::get();
    let end = end_marker(tokens);

    let mut states: Vec<u32> = vec![0];
    let mut next = 0;

    loop {
        let lookahead = tokens.get(next).unwrap_or(&end);
        let state = states.last().copied().unwrap_or(0);

        match table.action(state, lookahead.symbol) {
            Some(Action::Shift(target)) => {
                states.push(target);
                next += 1;
            }
            Some(Action::Reduce(production)) => {
                let count = production.pop_count();
                if count >= states.len() {
                    return Err(FormulaError::Grammar(format!(
                        "`{production}` pops {count} states from a stack of {}",
                        states.len()
                    )));
                }
                states.truncate(states.len() - count);
                let uncovered = states.last().copied().unwrap_or(0);
                let target = table.goto(uncovered, production.lhs()).ok_or_else(|| {
                    FormulaError::Grammar(format!(
                        "no goto from state {uncovered} on {}",
                        production.lhs()
                    ))
                })?;
                states.push(target);
            }
            Some(Action::Accept) => return Ok(()),
            None if lookahead.symbol == Symbol::Error => return Ok(()),
            None => return Err(syntax_error(lookahead)),
        }
    }
}

fn end_marker(tokens: &[Token]) -> Token {
    Token::new(
        Symbol::End,
        "",
        tokens.last().map_or(0, |t| t.position + t.text.len()),
    )
}

fn syntax_error(lookahead: &Token) -> FormulaError {
    log::trace!("Syntax error at {} on {}", lookahead.position, lookahead.symbol);
    FormulaError::Syntax {
        position: lookahead.position,
        found: if lookahead.symbol == Symbol::End {
            Symbol::End.name().to_string()
        } else {
            format!("'{}'", lookahead.text)
        },
    }
}

/// Evaluate, mapping a syntax error to the `#ERROR!` value
///
/// [`FormulaError::Unresolved`] and grammar faults still come back as
/// errors since they are not properties of the formula text.
pub fn run_lenient(
    tokens: &[Token],
    ctx: &mut EvaluationContext,
    stats: &mut ParseStats,
) -> FormulaResult<Value> {
    match run_with_stats(tokens, ctx, stats) {
        Err(FormulaError::Syntax { .. }) => Ok(Value::Error(ErrorKind::Generic)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn eval(formula: &str) -> FormulaResult<Value> {
        let mut ctx = EvaluationContext::simple();
        run(&tokenize(formula), &mut ctx)
    }

    #[test]
    fn test_precedence_from_table() {
        assert_eq!(eval("1+2*3"), Ok(Value::Number(7.0)));
        assert_eq!(eval("(1+2)*3"), Ok(Value::Number(9.0)));
        assert_eq!(eval("10-4-3"), Ok(Value::Number(3.0)));
        assert_eq!(eval("2^3^2"), Ok(Value::Number(64.0)));
        assert_eq!(eval("-5^2"), Ok(Value::Number(25.0)));
        assert_eq!(eval("2^-1"), Ok(Value::Number(0.5)));
        assert_eq!(eval("1+2=3"), Ok(Value::Boolean(true)));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(eval("1+"), Err(FormulaError::Syntax { .. })));
        assert!(matches!(eval(""), Err(FormulaError::Syntax { .. })));
        assert!(matches!(eval("(1"), Err(FormulaError::Syntax { .. })));
        assert!(matches!(eval("A1%"), Err(FormulaError::Syntax { .. })));
        assert_eq!(
            eval("1 2"),
            Err(FormulaError::Syntax {
                position: 2,
                found: "'2'".to_string()
            })
        );
    }

    #[test]
    fn test_error_token_recovery() {
        assert_eq!(eval("1 #REF!"), Ok(Value::Error(ErrorKind::Ref)));
        assert_eq!(eval("1+@"), Ok(Value::Error(ErrorKind::Generic)));
        assert_eq!(eval("#N/A #DIV/0!"), Ok(Value::Error(ErrorKind::NotAvailable)));
        assert_eq!(eval("\"open"), Ok(Value::Error(ErrorKind::Generic)));
    }

    #[test]
    fn test_error_run_keeps_first() {
        assert_eq!(
            eval("=#N/A #REF! #DIV/0!"),
            Ok(Value::Error(ErrorKind::NotAvailable))
        );
        assert_eq!(
            eval("#NUM! #NULL! #REF! #N/A"),
            Ok(Value::Error(ErrorKind::Num))
        );
        // Only adjacent errors collapse; a finished operand does not count
        assert_eq!(eval("(#N/A) #REF!"), Ok(Value::Error(ErrorKind::Ref)));
    }

    #[test]
    fn test_recognize_matches_run() {
        for formula in ["1+2*3", "SUM(A1:B2,3)", "{1,2;3,4}", "1 #REF!", "#N/A #REF! #DIV/0!"] {
            assert_eq!(recognize(&tokenize(formula)), Ok(()), "{formula}");
        }
        for formula in ["1+", "", "(1", "A1%", "1 2", "=A1+"] {
            let tokens = tokenize(formula);
            let mut ctx = EvaluationContext::simple();
            assert_eq!(recognize(&tokens), run(&tokens, &mut ctx).map(drop), "{formula}");
        }
    }

    #[test]
    fn test_stats() {
        let mut ctx = EvaluationContext::simple();
        let mut stats = ParseStats::default();
        run_with_stats(&tokenize("1+2"), &mut ctx, &mut stats).unwrap();
        assert_eq!(stats.shifts, 3);
        assert_eq!(stats.tokens, 4);
        // Num x2, Expr x2, Expr + Expr
        assert_eq!(stats.reductions, 5);
    }

    #[test]
    fn test_lenient_maps_syntax_to_generic() {
        let mut ctx = EvaluationContext::simple();
        let mut stats = ParseStats::default();
        let value = run_lenient(&tokenize("=)"), &mut ctx, &mut stats).unwrap();
        assert_eq!(value, Value::Error(ErrorKind::Generic));
    }

    #[test]
    fn test_missing_end_is_implied() {
        let mut tokens = tokenize("4*5");
        tokens.pop();
        let mut ctx = EvaluationContext::simple();
        assert_eq!(run(&tokens, &mut ctx), Ok(Value::Number(20.0)));
    }
}
