//! The workbook oracle.
//!
//! Every figure shown by the application comes out of an external workbook
//! whose formulas are evaluated elsewhere. This module only defines how cells
//! are addressed and answered; it never evaluates anything.

use std::collections::HashMap;

use crate::cell::{CellAddress, CellValue};
use crate::error::{AppError, Result};

/// Cell-level access to an opened workbook.
///
/// Implementations are driven from a single thread only and are not required
/// to be `Sync`.
pub trait WorkbookOracle: Send {
    /// Display name of the workbook, usually its file name.
    fn name(&self) -> &str;

    fn sheet_names(&self) -> Vec<String>;

    /// Evaluated value of a cell. Empty cells answer `CellValue::Empty`.
    fn read(&self, sheet: &str, address: CellAddress) -> Result<CellValue>;

    fn write(&mut self, sheet: &str, address: CellAddress, value: CellValue) -> Result<()>;

    /// Makes `sheet` the active one. Purely cosmetic for headless oracles,
    /// but fails on unknown sheets.
    fn activate(&mut self, sheet: &str) -> Result<()>;

    /// Releases the underlying resources. Further calls may fail.
    fn close(&mut self) {}
}

#[derive(Clone, Debug, Default)]
struct Sheet {
    name: String,
    cells: HashMap<CellAddress, CellValue>,
}

/// A workbook held entirely in memory.
///
/// Sheet lookup is case-insensitive, like the spreadsheet applications the
/// workbooks are authored in.
#[derive(Clone, Debug, Default)]
pub struct MemoryWorkbook {
    name: String,
    sheets: Vec<Sheet>,
    active: usize,
}

impl MemoryWorkbook {
    pub fn new(name: impl Into<String>) -> Self {
        MemoryWorkbook {
            name: name.into(),
            sheets: Vec::new(),
            active: 0,
        }
    }

    /// Adds an empty sheet if none with that name exists yet.
    pub fn add_sheet(&mut self, name: &str) -> &mut Self {
        if self.sheet_index(name).is_none() {
            self.sheets.push(Sheet {
                name: name.to_string(),
                cells: HashMap::new(),
            });
        }
        self
    }

    /// Builder-style setter used by tests and by the file loader.
    /// Creates the sheet on demand.
    pub fn with_cell(mut self, sheet: &str, address: &str, value: impl Into<CellValue>) -> Self {
        self.put(sheet, address, value);
        self
    }

    /// Sets a cell by A1 name, creating the sheet on demand. Malformed
    /// addresses are ignored.
    pub fn put(&mut self, sheet: &str, address: &str, value: impl Into<CellValue>) {
        let Some(address) = CellAddress::parse(address) else {
            log::warn!("ignoring malformed address '{}' on sheet '{}'", address, sheet);
            return;
        };
        self.put_at(sheet, address, value.into());
    }

    pub fn put_at(&mut self, sheet: &str, address: CellAddress, value: CellValue) {
        self.add_sheet(sheet);
        if let Some(idx) = self.sheet_index(sheet) {
            let cells = &mut self.sheets[idx].cells;
            if value.is_empty() {
                cells.remove(&address);
            } else {
                cells.insert(address, value);
            }
        }
    }

    pub fn active_sheet(&self) -> Option<&str> {
        self.sheets.get(self.active).map(|s| s.name.as_str())
    }

    fn sheet_index(&self, name: &str) -> Option<usize> {
        self.sheets
            .iter()
            .position(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheet_index(name)
            .map(|idx| &self.sheets[idx])
            .ok_or_else(|| AppError::SheetNotFound(name.to_string()))
    }
}

impl WorkbookOracle for MemoryWorkbook {
    fn name(&self) -> &str {
        &self.name
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    fn read(&self, sheet: &str, address: CellAddress) -> Result<CellValue> {
        let sheet = self.sheet(sheet)?;
        Ok(sheet.cells.get(&address).cloned().unwrap_or_default())
    }

    fn write(&mut self, sheet: &str, address: CellAddress, value: CellValue) -> Result<()> {
        let idx = self
            .sheet_index(sheet)
            .ok_or_else(|| AppError::SheetNotFound(sheet.to_string()))?;
        let cells = &mut self.sheets[idx].cells;
        if value.is_empty() {
            cells.remove(&address);
        } else {
            cells.insert(address, value);
        }
        Ok(())
    }

    fn activate(&mut self, sheet: &str) -> Result<()> {
        self.active = self
            .sheet_index(sheet)
            .ok_or_else(|| AppError::SheetNotFound(sheet.to_string()))?;
        Ok(())
    }

    fn close(&mut self) {
        self.sheets.clear();
        self.active = 0;
    }
}
