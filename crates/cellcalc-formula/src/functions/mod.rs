//! Built-in spreadsheet functions

pub mod date;
pub mod info;
pub mod logical;
pub mod math;
pub mod text;

use crate::context::EvaluationContext;
use ahash::AHashMap;
use cellcalc_core::{coerce, ErrorKind, Value};
use once_cell::sync::Lazy;
use std::sync::Arc;

/// Function implementation signature
///
/// `args` is exactly the argument list the grammar grouped, already
/// evaluated. A returned `Err` becomes the matching error value in the cell.
pub type FunctionImpl = fn(&[Value], &EvaluationContext) -> Result<Value, ErrorKind>;

/// Function definition
#[derive(Clone, Copy)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

impl std::fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish()
    }
}

/// Function registry, keyed by uppercase name
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

static BUILTINS: Lazy<Arc<FunctionRegistry>> = Lazy::new(|| Arc::new(FunctionRegistry::new()));

/// The shared registry of built-in functions
pub fn default_registry() -> &'static FunctionRegistry {
    BUILTINS.as_ref()
}

/// A handle on the shared built-in registry
pub fn shared_registry() -> Arc<FunctionRegistry> {
    Arc::clone(&BUILTINS)
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_math_functions();
        registry.register_logical_functions();
        registry.register_text_functions();
        registry.register_info_functions();
        registry.register_date_functions();

        registry
    }

    /// Create a registry with no functions
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// Look up a function by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a function, replacing any previous one with the same name
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn register_math_functions(&mut self) {
        // SUM
        self.register(FunctionDef {
            name: "SUM",
            min_args: 1,
            max_args: None,
            implementation: math::fn_sum,
        });

        // PRODUCT
        self.register(FunctionDef {
            name: "PRODUCT",
            min_args: 1,
            max_args: None,
            implementation: math::fn_product,
        });

        // AVERAGE
        self.register(FunctionDef {
            name: "AVERAGE",
            min_args: 1,
            max_args: None,
            implementation: math::fn_average,
        });

        // MIN
        self.register(FunctionDef {
            name: "MIN",
            min_args: 1,
            max_args: None,
            implementation: math::fn_min,
        });

        // MAX
        self.register(FunctionDef {
            name: "MAX",
            min_args: 1,
            max_args: None,
            implementation: math::fn_max,
        });

        // COUNT
        self.register(FunctionDef {
            name: "COUNT",
            min_args: 1,
            max_args: None,
            implementation: math::fn_count,
        });

        // COUNTA
        self.register(FunctionDef {
            name: "COUNTA",
            min_args: 1,
            max_args: None,
            implementation: math::fn_counta,
        });

        // ABS
        self.register(FunctionDef {
            name: "ABS",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_abs,
        });

        // ROUND
        self.register(FunctionDef {
            name: "ROUND",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_round,
        });

        // INT
        self.register(FunctionDef {
            name: "INT",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_int,
        });

        // MOD
        self.register(FunctionDef {
            name: "MOD",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_mod,
        });

        // POWER
        self.register(FunctionDef {
            name: "POWER",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_power,
        });

        // SQRT
        self.register(FunctionDef {
            name: "SQRT",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_sqrt,
        });

        // PI
        self.register(FunctionDef {
            name: "PI",
            min_args: 0,
            max_args: Some(0),
            implementation: math::fn_pi,
        });
    }

    fn register_logical_functions(&mut self) {
        // IF
        self.register(FunctionDef {
            name: "IF",
            min_args: 2,
            max_args: Some(3),
            implementation: logical::fn_if,
        });

        // AND
        self.register(FunctionDef {
            name: "AND",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_and,
        });

        // OR
        self.register(FunctionDef {
            name: "OR",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_or,
        });

        // NOT
        self.register(FunctionDef {
            name: "NOT",
            min_args: 1,
            max_args: Some(1),
            implementation: logical::fn_not,
        });

        // TRUE
        self.register(FunctionDef {
            name: "TRUE",
            min_args: 0,
            max_args: Some(0),
            implementation: logical::fn_true,
        });

        // FALSE
        self.register(FunctionDef {
            name: "FALSE",
            min_args: 0,
            max_args: Some(0),
            implementation: logical::fn_false,
        });

        // IFERROR
        self.register(FunctionDef {
            name: "IFERROR",
            min_args: 2,
            max_args: Some(2),
            implementation: logical::fn_iferror,
        });
    }

    fn register_text_functions(&mut self) {
        // CONCATENATE
        self.register(FunctionDef {
            name: "CONCATENATE",
            min_args: 1,
            max_args: None,
            implementation: text::fn_concatenate,
        });

        // LEN
        self.register(FunctionDef {
            name: "LEN",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_len,
        });

        // UPPER
        self.register(FunctionDef {
            name: "UPPER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_upper,
        });

        // LOWER
        self.register(FunctionDef {
            name: "LOWER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_lower,
        });

        // LEFT
        self.register(FunctionDef {
            name: "LEFT",
            min_args: 1,
            max_args: Some(2),
            implementation: text::fn_left,
        });

        // RIGHT
        self.register(FunctionDef {
            name: "RIGHT",
            min_args: 1,
            max_args: Some(2),
            implementation: text::fn_right,
        });

        // TRIM
        self.register(FunctionDef {
            name: "TRIM",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_trim,
        });
    }

    fn register_info_functions(&mut self) {
        // ISERROR
        self.register(FunctionDef {
            name: "ISERROR",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_iserror,
        });

        // ISNA
        self.register(FunctionDef {
            name: "ISNA",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_isna,
        });

        // ISNUMBER
        self.register(FunctionDef {
            name: "ISNUMBER",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_isnumber,
        });

        // ISTEXT
        self.register(FunctionDef {
            name: "ISTEXT",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_istext,
        });

        // ISLOGICAL
        self.register(FunctionDef {
            name: "ISLOGICAL",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_islogical,
        });

        // NA
        self.register(FunctionDef {
            name: "NA",
            min_args: 0,
            max_args: Some(0),
            implementation: info::fn_na,
        });

        // ERROR.TYPE
        self.register(FunctionDef {
            name: "ERROR.TYPE",
            min_args: 1,
            max_args: Some(1),
            implementation: info::fn_error_type,
        });

        // ROW (of the evaluating cell)
        self.register(FunctionDef {
            name: "ROW",
            min_args: 0,
            max_args: Some(0),
            implementation: info::fn_row,
        });

        // COLUMN (of the evaluating cell)
        self.register(FunctionDef {
            name: "COLUMN",
            min_args: 0,
            max_args: Some(0),
            implementation: info::fn_column,
        });
    }

    fn register_date_functions(&mut self) {
        // DATE
        self.register(FunctionDef {
            name: "DATE",
            min_args: 3,
            max_args: Some(3),
            implementation: date::fn_date,
        });

        // YEAR
        self.register(FunctionDef {
            name: "YEAR",
            min_args: 1,
            max_args: Some(1),
            implementation: date::fn_year,
        });

        // MONTH
        self.register(FunctionDef {
            name: "MONTH",
            min_args: 1,
            max_args: Some(1),
            implementation: date::fn_month,
        });

        // DAY
        self.register(FunctionDef {
            name: "DAY",
            min_args: 1,
            max_args: Some(1),
            implementation: date::fn_day,
        });
    }
}

/// Numeric argument `index`, or `default` when it was not supplied
pub(crate) fn number_arg(args: &[Value], index: usize, default: f64) -> Result<f64, ErrorKind> {
    args.get(index).map_or(Ok(default), coerce::to_number)
}

/// Text argument `index`; a missing argument reads as blank
pub(crate) fn text_arg(args: &[Value], index: usize) -> Result<String, ErrorKind> {
    args.get(index).map_or(Ok(String::new()), coerce::to_text)
}

/// Wrap a computed number, turning infinities and NaN into `#NUM!`
pub(crate) fn finite(n: f64) -> Result<Value, ErrorKind> {
    if n.is_finite() {
        Ok(Value::Number(n))
    } else {
        Err(ErrorKind::Num)
    }
}

/// Numbers for the aggregate functions.
///
/// A scalar argument is coerced and a failure is returned. Inside arrays
/// (ranges and array literals) only numbers count and text, booleans and
/// blanks are skipped. Errors anywhere are returned, the first one wins.
pub(crate) fn collect_numbers(args: &[Value]) -> Result<Vec<f64>, ErrorKind> {
    let mut numbers = Vec::new();
    for arg in args {
        match arg {
            Value::Array(_) => {
                for cell in coerce::flatten(arg) {
                    match cell {
                        Value::Number(n) => numbers.push(*n),
                        Value::Error(e) => return Err(*e),
                        _ => {}
                    }
                }
            }
            scalar => numbers.push(coerce::to_number(scalar)?),
        }
    }
    Ok(numbers)
}
