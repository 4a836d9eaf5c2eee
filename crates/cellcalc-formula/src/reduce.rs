//! Reduction actions
//!
//! [`reduce`] has one arm per production. Each arm receives the popped
//! stack slots in source order and computes the production's value
//! immediately. Spreadsheet faults (bad coercions, division by zero,
//! unknown names) become [`Value::Error`] here and never escape as Rust
//! errors. The only `Err` results are [`FormulaError::Unresolved`] from a
//! cell read and grammar inconsistencies.

use crate::context::EvaluationContext;
use crate::error::{FormulaError, FormulaResult};
use crate::functions::math;
use crate::grammar::ProductionId;
use crate::lexer::Token;
use cellcalc_core::{coerce, CellAddress, CellRange, ErrorKind, Value};
use std::cmp::Ordering;

/// A value-stack entry
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// A shifted terminal
    Token(Token),
    /// A reduced `Expr` or `Num`
    Value(Value),
    /// A reduced `Args`, `Row` or `Rows` list
    Items(Vec<Value>),
}

/// Evaluate `production` over its popped right-hand side
pub fn reduce(
    production: ProductionId,
    popped: Vec<Slot>,
    ctx: &mut EvaluationContext,
) -> FormulaResult<Slot> {
    use ProductionId as P;

    let mut rhs = Popped {
        production,
        slots: popped.into_iter(),
    };

    let value = match production {
        P::Start | P::ExprNum => rhs.value()?,
        P::ExprText => text_literal(&rhs.token()?.text),
        P::ExprName => name(&rhs.token()?.text),
        P::ExprCell | P::ExprFixedCell => {
            let token = rhs.token()?;
            match CellAddress::parse(&token.text) {
                Ok(addr) => ctx.read_cell(addr)?,
                Err(_) => Value::Error(ErrorKind::Ref),
            }
        }
        P::RangeCellCell | P::RangeCellFixed | P::RangeFixedCell | P::RangeFixedFixed => {
            let from = rhs.token()?;
            rhs.skip()?;
            let to = rhs.token()?;
            match (CellAddress::parse(&from.text), CellAddress::parse(&to.text)) {
                (Ok(from), Ok(to)) => ctx.read_range(CellRange::new(from, to))?,
                _ => Value::Error(ErrorKind::Ref),
            }
        }
        P::Paren => {
            rhs.skip()?;
            rhs.value()?
        }
        P::Concat => rhs.binary(concat)?,
        P::Equal => rhs.binary(|a, b| Value::Boolean(equal(a, b)))?,
        P::NotEqual => rhs.binary(|a, b| Value::Boolean(!equal(a, b)))?,
        P::Less => rhs.binary(|a, b| compare(a, b, Ordering::is_lt))?,
        P::LessEqual => rhs.binary(|a, b| compare(a, b, Ordering::is_le))?,
        P::Greater => rhs.binary(|a, b| compare(a, b, Ordering::is_gt))?,
        P::GreaterEqual => rhs.binary(|a, b| compare(a, b, Ordering::is_ge))?,
        P::Add => rhs.binary(|a, b| arithmetic(a, b, |x, y| Ok(x + y)))?,
        P::Subtract => rhs.binary(|a, b| arithmetic(a, b, |x, y| Ok(x - y)))?,
        P::Multiply => rhs.binary(|a, b| arithmetic(a, b, |x, y| Ok(x * y)))?,
        P::Divide => rhs.binary(|a, b| arithmetic(a, b, divide))?,
        P::Power => rhs.binary(|a, b| arithmetic(a, b, math::power))?,
        P::Negate => {
            rhs.skip()?;
            Value::from(coerce::to_number(&rhs.value()?).map(|n| -n))
        }
        P::UnaryPlus => {
            rhs.skip()?;
            unary_plus(&rhs.value()?)
        }
        P::CallEmpty => {
            let function = rhs.token()?;
            call(&function.text, Vec::new(), ctx)
        }
        P::Call => {
            let function = rhs.token()?;
            rhs.skip()?;
            let args = rhs.items()?;
            call(&function.text, args, ctx)
        }
        P::ArrayLiteral => {
            rhs.skip()?;
            Value::Array(rhs.items()?)
        }
        // Two adjacent errors collapse into the first
        P::ErrorLiteral | P::ErrorPair => Value::Error(rhs.token()?.error_kind()),
        P::Integer => number_literal(&rhs.token()?.text),
        P::Decimal => {
            let whole = rhs.token()?;
            rhs.skip()?;
            let fraction = rhs.token()?;
            number_literal(&format!("{}.{}", whole.text, fraction.text))
        }
        P::Fraction => {
            rhs.skip()?;
            number_literal(&format!(".{}", rhs.token()?.text))
        }
        P::Percent => match rhs.value()? {
            Value::Number(n) => Value::Number(n / 100.0),
            other => other,
        },
        P::ArgsFirst | P::RowFirst => return Ok(Slot::Items(vec![rhs.value()?])),
        P::ArgsComma | P::ArgsSemicolon | P::RowNext => {
            let mut items = rhs.items()?;
            rhs.skip()?;
            items.push(rhs.value()?);
            return Ok(Slot::Items(items));
        }
        P::RowsFirst => return Ok(Slot::Items(vec![Value::Array(rhs.items()?)])),
        P::RowsNext => {
            let mut rows = rhs.items()?;
            rhs.skip()?;
            rows.push(Value::Array(rhs.items()?));
            return Ok(Slot::Items(rows));
        }
    };

    Ok(Slot::Value(value))
}

/// The popped right-hand side of one reduction, consumed left to right
struct Popped {
    production: ProductionId,
    slots: std::vec::IntoIter<Slot>,
}

impl Popped {
    fn value(&mut self) -> FormulaResult<Value> {
        match self.slots.next() {
            Some(Slot::Value(value)) => Ok(value),
            other => Err(self.mismatch("value", other)),
        }
    }

    fn token(&mut self) -> FormulaResult<Token> {
        match self.slots.next() {
            Some(Slot::Token(token)) => Ok(token),
            other => Err(self.mismatch("token", other)),
        }
    }

    fn items(&mut self) -> FormulaResult<Vec<Value>> {
        match self.slots.next() {
            Some(Slot::Items(items)) => Ok(items),
            other => Err(self.mismatch("list", other)),
        }
    }

    /// Drop a punctuation token
    fn skip(&mut self) -> FormulaResult<()> {
        self.token().map(drop)
    }

    fn binary(&mut self, op: impl FnOnce(&Value, &Value) -> Value) -> FormulaResult<Value> {
        let lhs = self.value()?;
        self.skip()?;
        let rhs = self.value()?;
        Ok(op(&lhs, &rhs))
    }

    fn mismatch(&self, expected: &str, found: Option<Slot>) -> FormulaError {
        FormulaError::Grammar(format!(
            "`{}` expected a {} slot, found {:?}",
            self.production, expected, found
        ))
    }
}

fn text_literal(raw: &str) -> Value {
    let inner = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw);
    Value::Text(inner.replace("\"\"", "\""))
}

fn name(text: &str) -> Value {
    if text.eq_ignore_ascii_case("TRUE") {
        Value::Boolean(true)
    } else if text.eq_ignore_ascii_case("FALSE") {
        Value::Boolean(false)
    } else {
        Value::Error(ErrorKind::Name)
    }
}

fn number_literal(text: &str) -> Value {
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(n),
        Ok(_) => Value::Error(ErrorKind::Num),
        Err(_) => Value::Error(ErrorKind::Generic),
    }
}

/// Coerce both operands, left first, and apply `op`
fn arithmetic(
    lhs: &Value,
    rhs: &Value,
    op: impl FnOnce(f64, f64) -> Result<f64, ErrorKind>,
) -> Value {
    let result = coerce::to_number(lhs)
        .and_then(|a| coerce::to_number(rhs).and_then(|b| op(a, b)));
    match result {
        Ok(n) if n.is_finite() => Value::Number(n),
        Ok(_) => Value::Error(ErrorKind::Num),
        Err(e) => Value::Error(e),
    }
}

fn divide(a: f64, b: f64) -> Result<f64, ErrorKind> {
    if b == 0.0 {
        Err(ErrorKind::DivZero)
    } else {
        Ok(a / b)
    }
}

fn unary_plus(value: &Value) -> Value {
    match coerce::to_number(value) {
        Ok(n) => Value::Number(n),
        Err(ErrorKind::Value) if matches!(scalar(value), Value::Text(_)) => Value::Number(0.0),
        Err(e) => Value::Error(e),
    }
}

fn concat(lhs: &Value, rhs: &Value) -> Value {
    Value::from(coerce::to_text(lhs).and_then(|a| coerce::to_text(rhs).map(|b| a + &b)))
}

fn scalar(value: &Value) -> Value {
    match coerce::first_scalar(value) {
        Ok(v) => v.clone(),
        Err(e) => Value::Error(e),
    }
}

/// Strict equality: different kinds are never equal, text is case-sensitive
fn equal(lhs: &Value, rhs: &Value) -> bool {
    match (scalar(lhs), scalar(rhs)) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Boolean(a), Value::Boolean(b)) => a == b,
        (Value::Error(a), Value::Error(b)) => a == b,
        _ => false,
    }
}

/// Numeric when both sides coerce, lexicographic for two texts, else FALSE
fn compare(lhs: &Value, rhs: &Value, test: fn(Ordering) -> bool) -> Value {
    let ordering = match (coerce::to_number(lhs), coerce::to_number(rhs)) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b),
        _ => match (scalar(lhs), scalar(rhs)) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(&b)),
            _ => None,
        },
    };
    Value::Boolean(ordering.map_or(false, test))
}

fn call(name: &str, args: Vec<Value>, ctx: &EvaluationContext) -> Value {
    let Some(def) = ctx.registry().get(name) else {
        log::trace!("unknown function {name}");
        return Value::Error(ErrorKind::Name);
    };
    if args.len() < def.min_args || def.max_args.map_or(false, |max| args.len() > max) {
        return Value::Error(ErrorKind::Value);
    }
    Value::from((def.implementation)(&args, ctx))
}
