//! Runtime values and the spreadsheet error taxonomy

use crate::coerce;
use std::fmt;
use std::str::FromStr;

/// A spreadsheet-visible error.
///
/// These are ordinary values: formulas produce them, cells store them and
/// dependents propagate them. They are never raised as Rust errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// #NULL! - Empty intersection
    Null,
    /// #DIV/0! - Division by zero
    DivZero,
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #REF! - Invalid or circular reference, exhausted array
    Ref,
    /// #NAME? - Unrecognized function or name
    Name,
    /// #NUM! - Invalid numeric result
    Num,
    /// #N/A - Value not available
    NotAvailable,
    /// #ERROR! - Malformed formula
    Generic,
}

impl ErrorKind {
    /// Every kind, in `ERROR.TYPE` order
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::Null,
        ErrorKind::DivZero,
        ErrorKind::Value,
        ErrorKind::Ref,
        ErrorKind::Name,
        ErrorKind::Num,
        ErrorKind::NotAvailable,
        ErrorKind::Generic,
    ];

    /// The canonical display literal
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Null => "#NULL!",
            ErrorKind::DivZero => "#DIV/0!",
            ErrorKind::Value => "#VALUE!",
            ErrorKind::Ref => "#REF!",
            ErrorKind::Name => "#NAME?",
            ErrorKind::Num => "#NUM!",
            ErrorKind::NotAvailable => "#N/A",
            ErrorKind::Generic => "#ERROR!",
        }
    }

    /// Parse an error literal, ignoring ASCII case.
    ///
    /// `#ERROR` without the trailing `!` is accepted as well.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("#ERROR") {
            return Some(ErrorKind::Generic);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }

    /// The number reported by `ERROR.TYPE`. `Generic` has none.
    pub fn code(&self) -> Option<u8> {
        match self {
            ErrorKind::Null => Some(1),
            ErrorKind::DivZero => Some(2),
            ErrorKind::Value => Some(3),
            ErrorKind::Ref => Some(4),
            ErrorKind::Name => Some(5),
            ErrorKind::Num => Some(6),
            ErrorKind::NotAvailable => Some(7),
            ErrorKind::Generic => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s).ok_or_else(|| crate::Error::InvalidErrorLiteral(s.to_string()))
    }
}

/// The runtime value union
///
/// `Array` models both ranges and array literals. Two-dimensional data is
/// an array of row arrays, so flattening is row-major.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(ErrorKind),
    Array(Vec<Value>),
}

impl Value {
    /// The value a blank cell reads as
    pub fn blank() -> Self {
        Value::Text(String::new())
    }

    /// Create a text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        Value::Text(s.into())
    }

    /// Build a two-dimensional array from rows
    pub fn rows(rows: Vec<Vec<Value>>) -> Self {
        Value::Array(rows.into_iter().map(Value::Array).collect())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    /// The error kind, if this is an error value
    pub fn as_error(&self) -> Option<ErrorKind> {
        match self {
            Value::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// Name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Error(_) => "error",
            Value::Array(_) => "array",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::blank()
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<ErrorKind> for Value {
    fn from(e: ErrorKind) -> Self {
        Value::Error(e)
    }
}

impl<T: Into<Value>> From<Result<T, ErrorKind>> for Value {
    fn from(result: Result<T, ErrorKind>) -> Self {
        match result {
            Ok(v) => v.into(),
            Err(e) => Value::Error(e),
        }
    }
}

impl fmt::Display for Value {
    /// Arrays print in literal syntax: `{1,2;3,4}`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&coerce::format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(true) => f.write_str("TRUE"),
            Value::Boolean(false) => f.write_str("FALSE"),
            Value::Error(e) => write!(f, "{}", e),
            Value::Array(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    match item {
                        Value::Array(row) => {
                            if i > 0 {
                                f.write_str(";")?;
                            }
                            for (j, cell) in row.iter().enumerate() {
                                if j > 0 {
                                    f.write_str(",")?;
                                }
                                write!(f, "{}", cell)?;
                            }
                        }
                        other => {
                            if i > 0 {
                                f.write_str(",")?;
                            }
                            write!(f, "{}", other)?;
                        }
                    }
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_literals_are_canonical() {
        let literals: Vec<&str> = ErrorKind::ALL.iter().map(|e| e.as_str()).collect();
        assert_eq!(
            literals,
            vec!["#NULL!", "#DIV/0!", "#VALUE!", "#REF!", "#NAME?", "#NUM!", "#N/A", "#ERROR!"]
        );
    }

    #[test]
    fn test_error_parse() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ErrorKind::parse("#div/0!"), Some(ErrorKind::DivZero));
        assert_eq!(ErrorKind::parse("#ERROR"), Some(ErrorKind::Generic));
        assert_eq!(ErrorKind::parse("#BOGUS!"), None);
        assert!("#N/A".parse::<ErrorKind>().is_ok());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorKind::Null.code(), Some(1));
        assert_eq!(ErrorKind::NotAvailable.code(), Some(7));
        assert_eq!(ErrorKind::Generic.code(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::Boolean(true).to_string(), "TRUE");
        assert_eq!(Value::Error(ErrorKind::Ref).to_string(), "#REF!");
        let grid = Value::rows(vec![
            vec![Value::Number(1.0), Value::Number(2.0)],
            vec![Value::text("x"), Value::Error(ErrorKind::NotAvailable)],
        ]);
        assert_eq!(grid.to_string(), "{1,2;x,#N/A}");
    }

    #[test]
    fn test_from_result() {
        let ok: Result<f64, ErrorKind> = Ok(2.0);
        let err: Result<f64, ErrorKind> = Err(ErrorKind::Num);
        assert_eq!(Value::from(ok), Value::Number(2.0));
        assert_eq!(Value::from(err), Value::Error(ErrorKind::Num));
    }

    #[test]
    fn test_blank() {
        assert!(Value::blank().is_blank());
        assert!(!Value::text("a").is_blank());
        assert_eq!(Value::default(), Value::Text(String::new()));
    }
}
