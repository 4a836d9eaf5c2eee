//! Date functions
//!
//! Dates are serial numbers in the 1900 date system: 1900-01-01 is serial 1
//! and serial 60 is the non-existent 1900-02-29 that spreadsheets have kept
//! for compatibility. Real dates from 1900-03-01 on are therefore shifted by
//! one day against the calendar.

use super::number_arg;
use crate::context::EvaluationContext;
use cellcalc_core::{ErrorKind, Value};
use chrono::{Datelike, Duration, NaiveDate};

/// 9999-12-31
const MAX_SERIAL: i64 = 2_958_465;

/// Day and month offsets beyond this can only land outside the supported years
const MAX_OFFSET: f64 = 4_000_000.0;

fn epoch() -> Result<NaiveDate, ErrorKind> {
    NaiveDate::from_ymd_opt(1899, 12, 31).ok_or(ErrorKind::Num)
}

fn leap_day_cutover() -> Result<NaiveDate, ErrorKind> {
    NaiveDate::from_ymd_opt(1900, 3, 1).ok_or(ErrorKind::Num)
}

fn serial_from_date(date: NaiveDate) -> Result<i64, ErrorKind> {
    let days = (date - epoch()?).num_days();
    let serial = if date >= leap_day_cutover()? { days + 1 } else { days };
    if !(0..=MAX_SERIAL).contains(&serial) {
        return Err(ErrorKind::Num);
    }
    Ok(serial)
}

/// `(year, month, day)` for a serial. Serial 0 is the spreadsheet's
/// 1900-01-00.
fn ymd_from_serial(serial: f64) -> Result<(i32, u32, u32), ErrorKind> {
    let serial = serial.floor();
    if !(0.0..=MAX_SERIAL as f64).contains(&serial) {
        return Err(ErrorKind::Num);
    }
    let serial = serial as i64;
    match serial {
        0 => Ok((1900, 1, 0)),
        60 => Ok((1900, 2, 29)),
        _ => {
            let days = if serial > 60 { serial - 1 } else { serial };
            let date = epoch()?
                .checked_add_signed(Duration::days(days))
                .ok_or(ErrorKind::Num)?;
            Ok((date.year(), date.month(), date.day()))
        }
    }
}

/// DATE(year, month, day)
///
/// Years below 1900 are offsets from 1900. Month and day overflow roll
/// into the following (or preceding) months.
pub fn fn_date(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let mut year = number_arg(args, 0, 0.0)?.trunc();
    let month = number_arg(args, 1, 0.0)?.trunc();
    let day = number_arg(args, 2, 0.0)?.trunc();

    if (0.0..1900.0).contains(&year) {
        year += 1900.0;
    }
    if !(0.0..=9999.0).contains(&year) || month.abs() > MAX_OFFSET || day.abs() > MAX_OFFSET {
        return Err(ErrorKind::Num);
    }

    let total_months = year as i64 * 12 + (month as i64 - 1);
    let norm_year = i32::try_from(total_months.div_euclid(12)).map_err(|_| ErrorKind::Num)?;
    let norm_month = total_months.rem_euclid(12) as u32 + 1;

    let date = NaiveDate::from_ymd_opt(norm_year, norm_month, 1)
        .and_then(|first| first.checked_add_signed(Duration::days(day as i64 - 1)))
        .ok_or(ErrorKind::Num)?;
    Ok(Value::Number(serial_from_date(date)? as f64))
}

/// YEAR(serial)
pub fn fn_year(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let (year, _, _) = ymd_from_serial(number_arg(args, 0, 0.0)?)?;
    Ok(Value::Number(f64::from(year)))
}

/// MONTH(serial)
pub fn fn_month(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let (_, month, _) = ymd_from_serial(number_arg(args, 0, 0.0)?)?;
    Ok(Value::Number(f64::from(month)))
}

/// DAY(serial)
pub fn fn_day(args: &[Value], _ctx: &EvaluationContext) -> Result<Value, ErrorKind> {
    let (_, _, day) = ymd_from_serial(number_arg(args, 0, 0.0)?)?;
    Ok(Value::Number(f64::from(day)))
}
