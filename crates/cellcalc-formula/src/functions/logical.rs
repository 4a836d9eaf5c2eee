//! Logical functions

use crate::context::EvaluationContext;
use cellcalc_core::{coerce, ErrorKind, Value};

/// IF(condition, if_true, [if_false])
///
/// A missing `if_false` gives FALSE. Text conditions are `#VALUE!`.
pub fn fn_if(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let condition = args.first().ok_or(ErrorKind::Value)?;
    if coerce::to_boolean(condition)? {
        args.get(1).cloned().ok_or(ErrorKind::Value)
    } else {
        Ok(args.get(2).cloned().unwrap_or(Value::Boolean(false)))
    }
}

/// Booleans seen by AND and OR.
///
/// Scalars are coerced, so text arguments fail. Inside arrays text and
/// blanks are skipped. Having nothing to test at all is `#VALUE!`.
fn logical_values(args: &[Value]) -> Result<Vec<bool>, ErrorKind> {
    let mut values = Vec::new();
    for arg in args {
        match arg {
            Value::Array(_) => {
                for cell in coerce::flatten(arg) {
                    match cell {
                        Value::Number(n) => values.push(*n != 0.0),
                        Value::Boolean(b) => values.push(*b),
                        Value::Error(e) => return Err(*e),
                        _ => {}
                    }
                }
            }
            scalar => values.push(coerce::to_boolean(scalar)?),
        }
    }
    if values.is_empty() {
        return Err(ErrorKind::Value);
    }
    Ok(values)
}

/// AND function
pub fn fn_and(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Boolean(logical_values(args)?.into_iter().all(|b| b)))
}

/// OR function
pub fn fn_or(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Boolean(logical_values(args)?.into_iter().any(|b| b)))
}

/// NOT function
pub fn fn_not(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let value = args.first().ok_or(ErrorKind::Value)?;
    Ok(Value::Boolean(!coerce::to_boolean(value)?))
}

/// TRUE()
pub fn fn_true(_args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Boolean(true))
}

/// FALSE()
pub fn fn_false(_args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Boolean(false))
}

/// IFERROR(value, value_if_error)
pub fn fn_iferror(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let value = args.first().ok_or(ErrorKind::Value)?;
    let fallback = args.get(1).ok_or(ErrorKind::Value)?;
    match coerce::first_scalar(value) {
        Ok(Value::Error(_)) | Err(_) => Ok(fallback.clone()),
        Ok(_) => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use crate::{evaluate, EvaluationContext};
    use cellcalc_core::{ErrorKind, Value};
    use pretty_assertions::assert_eq;

    fn eval(formula: &str) -> Value {
        evaluate(formula, &mut EvaluationContext::simple()).unwrap()
    }

    #[test]
    fn test_if() {
        assert_eq!(eval("=IF(1>0,\"yes\",\"no\")"), Value::text("yes"));
        assert_eq!(eval("=IF(0,\"yes\",\"no\")"), Value::text("no"));
        assert_eq!(eval("=IF(FALSE,1)"), Value::Boolean(false));
        assert_eq!(eval("=IF(\"x\",1,2)"), Value::Error(ErrorKind::Value));
        assert_eq!(eval("=IF(#N/A,1,2)"), Value::Error(ErrorKind::NotAvailable));
        // Both branches are already evaluated; the unused one does not leak
        assert_eq!(eval("=IF(TRUE,1,1/0)"), Value::Number(1.0));
    }

    #[test]
    fn test_and_or() {
        assert_eq!(eval("=AND(TRUE,1,2)"), Value::Boolean(true));
        assert_eq!(eval("=AND(TRUE,0)"), Value::Boolean(false));
        assert_eq!(eval("=OR(FALSE,0,{0,1})"), Value::Boolean(true));
        assert_eq!(eval("=OR({\"a\",FALSE})"), Value::Boolean(false));
        assert_eq!(eval("=AND({\"a\"})"), Value::Error(ErrorKind::Value));
        assert_eq!(eval("=AND(\"a\")"), Value::Error(ErrorKind::Value));
        assert_eq!(eval("=OR(TRUE,#REF!)"), Value::Error(ErrorKind::Ref));
    }

    #[test]
    fn test_not_and_constants() {
        assert_eq!(eval("=NOT(TRUE)"), Value::Boolean(false));
        assert_eq!(eval("=NOT(0)"), Value::Boolean(true));
        assert_eq!(eval("=TRUE()"), Value::Boolean(true));
        assert_eq!(eval("=false()"), Value::Boolean(false));
    }

    #[test]
    fn test_iferror() {
        assert_eq!(eval("=IFERROR(1/0,\"div\")"), Value::text("div"));
        assert_eq!(eval("=IFERROR(#N/A,0)"), Value::Number(0.0));
        assert_eq!(eval("=IFERROR(5,0)"), Value::Number(5.0));
        assert_eq!(eval("=IFERROR(NOSUCH(),\"?\")"), Value::text("?"));
    }
}
