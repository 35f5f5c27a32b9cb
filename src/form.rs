//! Data-entry form writing simulation parameters back into the workbook.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::cell::{CellAddress, CellValue};
use crate::fields::{INPUT_FIELDS, InputField, find_field};
use crate::format::Unit;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("required fields are missing: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("'{value}' is not a valid answer for '{label}' (OUI or NON)")]
    InvalidChoice { label: &'static str, value: String },
}

/// Raw entries typed by the user, keyed by cell address.
#[derive(Clone, Debug, PartialEq)]
pub struct DataEntryForm {
    entries: BTreeMap<CellAddress, String>,
}

impl Default for DataEntryForm {
    fn default() -> Self {
        let mut form = DataEntryForm {
            entries: BTreeMap::new(),
        };
        form.reset();
        form
    }
}

impl DataEntryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every entry; yes/no fields go back to `NON`.
    pub fn reset(&mut self) {
        self.entries.clear();
        for f in INPUT_FIELDS.iter().filter(|f| f.unit == Unit::YesNo) {
            self.entries.insert(f.address, "NON".to_string());
        }
    }

    /// Sets a field by label or cell address.
    pub fn set(&mut self, key: &str, value: &str) -> Result<&'static InputField, FormError> {
        let field = find_field(key).ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        let value = value.trim();
        if field.unit == Unit::YesNo {
            let upper = value.to_uppercase();
            if upper != "OUI" && upper != "NON" {
                return Err(FormError::InvalidChoice {
                    label: field.label,
                    value: value.to_string(),
                });
            }
            self.entries.insert(field.address, upper);
        } else {
            self.entries.insert(field.address, value.to_string());
        }
        Ok(field)
    }

    pub fn get(&self, address: CellAddress) -> &str {
        self.entries.get(&address).map(String::as_str).unwrap_or("")
    }

    /// Checks required fields and converts entries into cell writes, in
    /// field order. Empty optional fields are left untouched in the workbook.
    pub fn validate(&self) -> Result<Vec<(CellAddress, CellValue)>, FormError> {
        let missing: Vec<&'static str> = INPUT_FIELDS
            .iter()
            .filter(|f| f.required && self.get(f.address).trim().is_empty())
            .map(|f| f.label)
            .collect();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        Ok(INPUT_FIELDS
            .iter()
            .filter_map(|f| {
                let raw = self.get(f.address).trim();
                (!raw.is_empty()).then(|| (f.address, convert_entry(raw)))
            })
            .collect())
    }
}

/// `OUI`/`NON` stay text; anything else is tried as a number written the
/// French way (`250 000`, `3,5`) and kept verbatim when that fails.
pub fn convert_entry(raw: &str) -> CellValue {
    let upper = raw.to_uppercase();
    if upper == "OUI" || upper == "NON" {
        return CellValue::Text(raw.to_string());
    }
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    match normalized.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(raw.to_string()),
    }
}
