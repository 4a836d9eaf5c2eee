//! Text functions

use super::{number_arg, text_arg};
use crate::context::EvaluationContext;
use cellcalc_core::{ErrorKind, Value};

fn take_left(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn take_right(s: &str, n: usize) -> String {
    let len = s.chars().count();
    if n >= len {
        return s.to_string();
    }
    s.chars().skip(len - n).collect()
}

/// Character count argument for LEFT and RIGHT. Defaults to 1; negative
/// counts are `#VALUE!`.
fn count_arg(args: &[Value], index: usize) -> Result<usize, ErrorKind> {
    let n = number_arg(args, index, 1.0)?.trunc();
    if n < 0.0 {
        return Err(ErrorKind::Value);
    }
    Ok(n as usize)
}

/// CONCATENATE(text1, ...)
pub fn fn_concatenate(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let mut out = String::new();
    for index in 0..args.len() {
        out.push_str(&text_arg(args, index)?);
    }
    Ok(Value::Text(out))
}

/// LEN(text)
pub fn fn_len(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Number(text_arg(args, 0)?.chars().count() as f64))
}

/// UPPER(text)
pub fn fn_upper(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Text(text_arg(args, 0)?.to_uppercase()))
}

/// LOWER(text)
pub fn fn_lower(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Text(text_arg(args, 0)?.to_lowercase()))
}

/// LEFT(text, [num_chars])
pub fn fn_left(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let text = text_arg(args, 0)?;
    Ok(Value::Text(take_left(&text, count_arg(args, 1)?)))
}

/// RIGHT(text, [num_chars])
pub fn fn_right(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let text = text_arg(args, 0)?;
    Ok(Value::Text(take_right(&text, count_arg(args, 1)?)))
}

/// TRIM(text): strip the ends and collapse inner runs of spaces
pub fn fn_trim(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let text = text_arg(args, 0)?;
    let words: Vec<&str> = text.split(' ').filter(|w| !w.is_empty()).collect();
    Ok(Value::Text(words.join(" ")))
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
    fn test_concatenate() {
        assert_eq!(eval("=CONCATENATE(\"a\",1,TRUE)"), Value::text("a1TRUE"));
        assert_eq!(eval("=CONCATENATE(\"a\",#N/A)"), Value::Error(ErrorKind::NotAvailable));
        assert_eq!(eval("=CONCATENATE(A1,\"x\")"), Value::text("x"));
    }

    #[test]
    fn test_len_and_case() {
        assert_eq!(eval("=LEN(\"héllo\")"), Value::Number(5.0));
        assert_eq!(eval("=LEN(12.5)"), Value::Number(4.0));
        assert_eq!(eval("=UPPER(\"abc\")"), Value::text("ABC"));
        assert_eq!(eval("=LOWER(\"ÀB\")"), Value::text("àb"));
    }

    #[test]
    fn test_left_right() {
        assert_eq!(eval("=LEFT(\"hello\",2)"), Value::text("he"));
        assert_eq!(eval("=LEFT(\"hello\")"), Value::text("h"));
        assert_eq!(eval("=RIGHT(\"hello\",3)"), Value::text("llo"));
        assert_eq!(eval("=RIGHT(\"hi\",10)"), Value::text("hi"));
        assert_eq!(eval("=LEFT(\"hi\",-1)"), Value::Error(ErrorKind::Value));
    }

    #[test]
    fn test_trim() {
        assert_eq!(eval("=TRIM(\"  a   b  \")"), Value::text("a b"));
        assert_eq!(eval("=TRIM(\"   \")"), Value::text(""));
    }
}
