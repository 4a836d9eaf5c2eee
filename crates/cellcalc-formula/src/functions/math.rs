//! Math functions

use super::{collect_numbers, finite, number_arg};
use crate::context::EvaluationContext;
use cellcalc_core::{coerce, ErrorKind, Value};
use std::cmp::Ordering;

/// `base ^ exponent` with spreadsheet error rules, shared by `^` and POWER
pub(crate) fn power(base: f64, exponent: f64) -> Result<f64, ErrorKind> {
    if base == 0.0 {
        return match exponent.partial_cmp(&0.0) {
            Some(Ordering::Less) => Err(ErrorKind::DivZero),
            Some(Ordering::Equal) => Err(ErrorKind::Num),
            _ => Ok(0.0),
        };
    }
    let result = base.powf(exponent);
    if result.is_nan() {
        Err(ErrorKind::Num)
    } else {
        Ok(result)
    }
}

/// SUM function
pub fn fn_sum(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    finite(collect_numbers(args)?.into_iter().sum())
}

/// PRODUCT function. No numbers at all gives 0.
pub fn fn_product(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let numbers = collect_numbers(args)?;
    if numbers.is_empty() {
        return Ok(Value::Number(0.0));
    }
    finite(numbers.into_iter().product())
}

/// AVERAGE function
pub fn fn_average(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let numbers = collect_numbers(args)?;
    if numbers.is_empty() {
        return Err(ErrorKind::DivZero);
    }
    finite(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

/// MIN function
pub fn fn_min(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let min = collect_numbers(args)?.into_iter().reduce(f64::min);
    Ok(Value::Number(min.unwrap_or(0.0)))
}

/// MAX function
pub fn fn_max(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let max = collect_numbers(args)?.into_iter().reduce(f64::max);
    Ok(Value::Number(max.unwrap_or(0.0)))
}

/// COUNT function. Counts numbers and never fails on errors.
pub fn fn_count(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let count = args
        .iter()
        .flat_map(coerce::flatten)
        .filter(|v| matches!(v, Value::Number(_)))
        .count();
    Ok(Value::Number(count as f64))
}

/// COUNTA function. Counts everything that is not blank, errors included.
pub fn fn_counta(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let count = args
        .iter()
        .flat_map(coerce::flatten)
        .filter(|v| !v.is_blank())
        .count();
    Ok(Value::Number(count as f64))
}

/// ABS function
pub fn fn_abs(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Number(number_arg(args, 0, 0.0)?.abs()))
}

/// ROUND(number, [num_digits])
///
/// Rounds half away from zero. Negative digits round left of the decimal
/// point.
pub fn fn_round(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let number = number_arg(args, 0, 0.0)?;
    let digits = number_arg(args, 1, 0.0)?.trunc();
    if digits.abs() > 308.0 {
        return Err(ErrorKind::Num);
    }
    let multiplier = 10_f64.powi(digits as i32);
    finite((number * multiplier).round() / multiplier)
}

/// INT function: round down to the nearest integer
pub fn fn_int(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Number(number_arg(args, 0, 0.0)?.floor()))
}

/// MOD(number, divisor)
///
/// `number - divisor * floor(number / divisor)`, so the result takes the
/// divisor's sign.
pub fn fn_mod(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let number = number_arg(args, 0, 0.0)?;
    let divisor = number_arg(args, 1, 0.0)?;
    if divisor == 0.0 {
        return Err(ErrorKind::DivZero);
    }
    finite(number - divisor * (number / divisor).floor())
}

/// POWER(base, exponent)
pub fn fn_power(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let base = number_arg(args, 0, 0.0)?;
    let exponent = number_arg(args, 1, 0.0)?;
    finite(power(base, exponent)?)
}

/// SQRT function
pub fn fn_sqrt(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let n = number_arg(args, 0, 0.0)?;
    if n < 0.0 {
        return Err(ErrorKind::Num);
    }
    Ok(Value::Number(n.sqrt()))
}

/// PI function
pub fn fn_pi(_args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    Ok(Value::Number(std::f64::consts::PI))
}
