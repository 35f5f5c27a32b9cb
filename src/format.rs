//! Display formatting for workbook figures.
//!
//! Numbers are rounded to the nearest integer with [`f64::round`], which
//! rounds halves away from zero (`2.5 -> 3`, `-2.5 -> -3`), then grouped by
//! three digits with a single plain space: `1234567.4 -> "1 234 567"`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cell::CellValue;

/// Rendered in place of a figure the workbook cannot provide.
pub const PLACEHOLDER: &str = "-";

/// Unit attached to an input field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Euro,
    Years,
    Percent,
    YesNo,
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Euro => "€",
            Unit::Years => "ans",
            Unit::Percent => "%",
            Unit::YesNo => "OUI/NON",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Formats a cell value for display. Never panics.
///
/// * the placeholder `-` is passed through,
/// * empty cells and empty text render as `0`,
/// * numbers and numeric text are rounded and grouped,
/// * anything else falls back to its plain string form.
pub fn format_number(value: &CellValue) -> String {
    match value {
        CellValue::Text(s) if s == PLACEHOLDER => PLACEHOLDER.to_string(),
        CellValue::Empty => "0".to_string(),
        CellValue::Text(s) if s.is_empty() => "0".to_string(),
        CellValue::Number(n) => format_f64(*n),
        CellValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => format_f64(n),
            _ => s.clone(),
        },
        CellValue::Bool(_) => value.to_string(),
    }
}

/// Rounds and groups a number; non-finite values fall back to `to_string`.
pub fn format_f64(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let rounded = n.round();
    let grouped = group_digits(&format!("{:.0}", rounded.abs()));
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Formats a figure followed by its unit, e.g. `250 000 €` or `20 ans`.
/// Yes/no fields are passed through as-is.
pub fn with_unit(value: &CellValue, unit: Unit) -> String {
    match unit {
        Unit::YesNo => value.to_string(),
        _ => format!("{} {}", format_number(value), unit.suffix()),
    }
}

/// Currency cell of the history file: grouped, no suffix, `0` when unusable.
pub fn format_currency(value: f64) -> String {
    if value.is_finite() {
        format_f64(value)
    } else {
        "0".to_string()
    }
}

fn group_digits(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}
