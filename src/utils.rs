use crate::error::{Result, StatementError};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Reads a monetary amount from a loosely-typed JSON value.
///
/// `null`, empty strings and non-finite numbers are treated as absent.
/// A string that is not a number is malformed.
pub fn parse_amount(value: &Value) -> Result<Option<f64>> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64().filter(|v| v.is_finite())),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
            cleaned
                .parse::<f64>()
                .map(|v| Some(v).filter(|v| v.is_finite()))
                .map_err(|_| {
                    StatementError::MalformedInput(format!("'{}' is not a numeric amount", s))
                })
        }
        other => Err(StatementError::MalformedInput(format!(
            "expected a numeric amount, found {}",
            other
        ))),
    }
}

/// Reads an explicit year field, given either as a number or a numeric string.
pub fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|y| i32::try_from(y).ok())
            .filter(|y| is_plausible_year(*y)),
        Value::String(s) => year_from_label(s),
        _ => None,
    }
}

/// Extracts the year from a label that starts with a four digit year, such as
/// `2023`, `2023-09-30` or `2023-09-30 00:00:00`.
pub fn year_from_label(label: &str) -> Option<i32> {
    let trimmed = label.trim();
    let digits = trimmed.get(..4)?;
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(next) = trimmed[4..].chars().next() {
        if next.is_ascii_digit() {
            return None;
        }
    }
    digits.parse::<i32>().ok().filter(|y| is_plausible_year(*y))
}

/// Parses a payment date label in the formats providers commonly emit.
pub fn parse_date_label(label: &str) -> Result<NaiveDate> {
    let trimmed = label.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date())
        })
        .or_else(|_| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date())
        })
        .or_else(|_| {
            chrono::DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive())
        })
        .map_err(|_| {
            StatementError::MalformedInput(format!(
                "Invalid date '{}'. Expected YYYY-MM-DD",
                label
            ))
        })
}

pub fn calendar_year(date: NaiveDate) -> i32 {
    date.year()
}

fn is_plausible_year(year: i32) -> bool {
    (1800..=9999).contains(&year)
}
