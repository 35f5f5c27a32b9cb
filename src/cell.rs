use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

lazy_static! {
    static ref ADDRESS_REGEX: Regex = Regex::new(r"^\$?([A-Za-z]{1,3})\$?([0-9]{1,7})$").unwrap();
}

/// A value as answered by the workbook oracle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the value. Text is accepted when it parses as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Numeric view where empty and non-numeric cells count as zero.
    pub fn number_or_zero(&self) -> f64 {
        self.as_f64().unwrap_or(0.0)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// A1-style cell reference, 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    pub const fn new(row: u32, col: u32) -> Self {
        CellAddress { row, col }
    }

    /// Parses `c4`, `B51`, `$F$3`. Letters are case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        let caps = ADDRESS_REGEX.captures(name.trim())?;
        let col = letter_to_col(&caps[1].to_ascii_uppercase());
        let row = caps[2].parse::<u32>().ok()?;
        if row == 0 {
            return None;
        }
        Some(CellAddress { row, col })
    }
}

impl FromStr for CellAddress {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellAddress::parse(s).ok_or_else(|| AppError::InvalidAddress(s.to_string()))
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", col_to_letter(self.col), self.row)
    }
}

pub fn col_to_letter(col: u32) -> String {
    let mut col = col;
    let mut result = String::new();
    while col > 0 {
        col -= 1;
        result.push(((col % 26) as u8 + b'A') as char);
        col /= 26;
    }
    result.chars().rev().collect()
}

pub fn letter_to_col(letters: &str) -> u32 {
    letters
        .chars()
        .fold(0, |acc, c| acc * 26 + (c as u32 - 'A' as u32 + 1))
}
