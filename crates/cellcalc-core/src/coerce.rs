//! Total coercions between [`Value`] variants.
//!
//! Operators and functions both go through these, so there is exactly one
//! answer to "what number is this text". Every conversion either succeeds
//! or names the [`ErrorKind`] the caller should produce:
//!
//! | from \ to | number | text | boolean |
//! |-----------|--------|------|---------|
//! | Number    | itself | canonical decimal | non-zero |
//! | Text      | numeric-literal grammar, `""` is 0, else `#VALUE!` | itself | always `#VALUE!` |
//! | Boolean   | 1 / 0  | `TRUE` / `FALSE` | itself |
//! | Error     | itself | itself | itself |
//! | Array     | first element, recursively; empty is `#REF!` | same | same |

use crate::cell::{ErrorKind, Value};
use lazy_regex::regex_captures;

/// Convert to a number
pub fn to_number(value: &Value) -> Result<f64, ErrorKind> {
    match first_scalar(value)? {
        Value::Number(n) => Ok(*n),
        Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Text(s) => {
            if s.trim().is_empty() {
                Ok(0.0)
            } else {
                parse_numeric_text(s).ok_or(ErrorKind::Value)
            }
        }
        Value::Error(e) => Err(*e),
        Value::Array(_) => Err(ErrorKind::Ref),
    }
}

/// Convert to text
pub fn to_text(value: &Value) -> Result<String, ErrorKind> {
    match first_scalar(value)? {
        Value::Number(n) => Ok(format_number(*n)),
        Value::Boolean(true) => Ok("TRUE".to_string()),
        Value::Boolean(false) => Ok("FALSE".to_string()),
        Value::Text(s) => Ok(s.clone()),
        Value::Error(e) => Err(*e),
        Value::Array(_) => Err(ErrorKind::Ref),
    }
}

/// Convert to a boolean. Text never converts.
pub fn to_boolean(value: &Value) -> Result<bool, ErrorKind> {
    match first_scalar(value)? {
        Value::Number(n) => Ok(*n != 0.0),
        Value::Boolean(b) => Ok(*b),
        Value::Text(_) => Err(ErrorKind::Value),
        Value::Error(e) => Err(*e),
        Value::Array(_) => Err(ErrorKind::Ref),
    }
}

/// Unwrap arrays down to their leading scalar.
///
/// Non-array values are returned as-is. An empty array, at any depth, is an
/// exhausted reference.
pub fn first_scalar(value: &Value) -> Result<&Value, ErrorKind> {
    let mut current = value;
    while let Value::Array(items) = current {
        current = items.first().ok_or(ErrorKind::Ref)?;
    }
    Ok(current)
}

/// Every scalar in `value`, row-major, errors included
pub fn flatten(value: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    flatten_into(value, &mut out);
    out
}

fn flatten_into<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Array(items) => {
            for item in items {
                flatten_into(item, out);
            }
        }
        scalar => out.push(scalar),
    }
}

/// Parse text with the spreadsheet numeric-literal grammar.
///
/// Accepts an optional sign, `,` thousands separators in groups of three,
/// a decimal point, an exponent and a trailing `%`. Surrounding whitespace
/// is ignored. Returns `None` for anything else, including empty text.
pub fn parse_numeric_text(text: &str) -> Option<f64> {
    let (_, sign, mantissa, exponent, percent) = regex_captures!(
        r"^([+-]?)((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d*)?|\.\d+)([eE][+-]?\d+)?(%?)$",
        text.trim()
    )?;

    let literal = format!("{}{}", mantissa.replace(',', ""), exponent);
    let mut n: f64 = literal.parse().ok()?;
    if sign == "-" {
        n = -n;
    }
    if !percent.is_empty() {
        n /= 100.0;
    }
    n.is_finite().then_some(n)
}

/// Format a number the way a cell displays it.
///
/// Integers below 1e15 print without a fraction. Everything else keeps 15
/// significant digits with trailing zeros trimmed, switching to `1.5E+20`
/// style outside `1e-5..1e15`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if !n.is_finite() {
        return ErrorKind::Num.as_str().to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }

    let scientific = format!("{:.14e}", n);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();

    if (-5..15).contains(&exponent) {
        let decimals = (14 - exponent) as usize;
        trim_fraction(format!("{:.*}", decimals, n))
    } else {
        format!(
            "{}E{}{:02}",
            trim_fraction(mantissa.to_string()),
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        )
    }
}

fn trim_fraction(mut s: String) -> String {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_text_grammar() {
        assert_eq!(parse_numeric_text("42"), Some(42.0));
        assert_eq!(parse_numeric_text("  -3.5 "), Some(-3.5));
        assert_eq!(parse_numeric_text("+.25"), Some(0.25));
        assert_eq!(parse_numeric_text("1,234,567.5"), Some(1_234_567.5));
        assert_eq!(parse_numeric_text("1.5e3"), Some(1500.0));
        assert_eq!(parse_numeric_text("2E-2"), Some(0.02));
        assert_eq!(parse_numeric_text("50%"), Some(0.5));
        assert_eq!(parse_numeric_text("7."), Some(7.0));

        assert_eq!(parse_numeric_text(""), None);
        assert_eq!(parse_numeric_text("1,23"), None);
        assert_eq!(parse_numeric_text("abc"), None);
        assert_eq!(parse_numeric_text("1e"), None);
        assert_eq!(parse_numeric_text("."), None);
        assert_eq!(parse_numeric_text("--1"), None);
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&Value::Number(2.5)), Ok(2.5));
        assert_eq!(to_number(&Value::Boolean(true)), Ok(1.0));
        assert_eq!(to_number(&Value::Boolean(false)), Ok(0.0));
        assert_eq!(to_number(&Value::text("")), Ok(0.0));
        assert_eq!(to_number(&Value::text("12%")), Ok(0.12));
        assert_eq!(to_number(&Value::text("twelve")), Err(ErrorKind::Value));
        assert_eq!(to_number(&Value::Error(ErrorKind::NotAvailable)), Err(ErrorKind::NotAvailable));
    }

    #[test]
    fn test_array_coercion_takes_first_element() {
        let grid = Value::rows(vec![
            vec![Value::text("3"), Value::Number(9.0)],
            vec![Value::Number(1.0), Value::Number(2.0)],
        ]);
        assert_eq!(to_number(&grid), Ok(3.0));
        assert_eq!(to_text(&grid), Ok("3".to_string()));
        assert_eq!(to_number(&Value::Array(vec![])), Err(ErrorKind::Ref));
        assert_eq!(
            to_number(&Value::Array(vec![Value::Array(vec![])])),
            Err(ErrorKind::Ref)
        );
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&Value::Number(1.0)), Ok("1".to_string()));
        assert_eq!(to_text(&Value::Number(0.1 + 0.2)), Ok("0.3".to_string()));
        assert_eq!(to_text(&Value::Boolean(false)), Ok("FALSE".to_string()));
        assert_eq!(to_text(&Value::Error(ErrorKind::Ref)), Err(ErrorKind::Ref));
    }

    #[test]
    fn test_to_boolean() {
        assert_eq!(to_boolean(&Value::Number(-2.0)), Ok(true));
        assert_eq!(to_boolean(&Value::Number(0.0)), Ok(false));
        assert_eq!(to_boolean(&Value::text("TRUE")), Err(ErrorKind::Value));
        assert_eq!(to_boolean(&Value::text("")), Err(ErrorKind::Value));
        assert_eq!(
            to_boolean(&Value::Array(vec![Value::Boolean(true)])),
            Ok(true)
        );
    }

    #[test]
    fn test_flatten_is_row_major_and_keeps_errors() {
        let grid = Value::rows(vec![
            vec![Value::Number(1.0), Value::Error(ErrorKind::DivZero)],
            vec![Value::text("x"), Value::Number(4.0)],
        ]);
        let flat: Vec<Value> = flatten(&grid).into_iter().cloned().collect();
        assert_eq!(
            flat,
            vec![
                Value::Number(1.0),
                Value::Error(ErrorKind::DivZero),
                Value::text("x"),
                Value::Number(4.0),
            ]
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(3.14), "3.14");
        assert_eq!(format_number(1.0 / 3.0), "0.333333333333333");
        assert_eq!(format_number(0.0005), "0.0005");
        assert_eq!(format_number(1e20), "1E+20");
        assert_eq!(format_number(1.5e-7), "1.5E-07");
    }
}
