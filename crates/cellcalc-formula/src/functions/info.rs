//! Information functions
//!
//! These inspect their argument instead of coercing it, so they are the
//! places an error value can be observed without propagating.

use crate::context::EvaluationContext;
use cellcalc_core::{coerce, ErrorKind, Value};

/// The scalar an IS* function looks at. An exhausted array reads as `#REF!`.
fn inspect(args: &[Value]) -> Value {
    match args.first().map(coerce::first_scalar) {
        Some(Ok(v)) => v.clone(),
        Some(Err(e)) => Value::Error(e),
        None => Value::blank(),
    }
}

/// ISERROR(value)
pub fn fn_iserror(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Boolean(inspect(args).is_error()))
}

/// ISNA(value)
pub fn fn_isna(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Boolean(matches!(
        inspect(args),
        Value::Error(ErrorKind::NotAvailable)
    )))
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Boolean(matches!(inspect(args), Value::Number(_))))
}

/// ISTEXT(value). Blank cells read as empty text, so they count.
pub fn fn_istext(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Boolean(matches!(inspect(args), Value::Text(_))))
}

/// ISLOGICAL(value)
pub fn fn_islogical(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Boolean(matches!(inspect(args), Value::Boolean(_))))
}

/// NA()
pub fn fn_na(_args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Err(ErrorKind::NotAvailable)
}

/// ERROR.TYPE(value)
///
/// The error's numeric code; `#N/A` when the value is not an error or has
/// no code.
pub fn fn_error_type(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    match inspect(args) {
        Value::Error(e) => e
            .code()
            .map(|code| Value::Number(f64::from(code)))
            .ok_or(ErrorKind::NotAvailable),
        _ => Err(ErrorKind::NotAvailable),
    }
}

/// ROW(): 1-based row of the evaluating cell
pub fn fn_row(_args: &[Value], ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let current = ctx.current.ok_or(ErrorKind::Value)?;
    Ok(Value::Number(f64::from(current.row) + 1.0))
}

/// COLUMN(): 1-based column of the evaluating cell
pub fn fn_column(_args: &[Value], ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let current = ctx.current.ok_or(ErrorKind::Value)?;
    Ok(Value::Number(f64::from(current.col) + 1.0))
}
