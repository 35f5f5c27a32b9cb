use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;

use crate::cell::{CellAddress, CellValue};
use crate::error::{AppError, Result};
use crate::workbook::{MemoryWorkbook, WorkbookOracle};

/// Extensions accepted by [`load_workbook`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsm", "xlsx", "xls", "xlsb", "ods"];

/// Open a workbook file as an oracle
///
/// The evaluated value of every non-empty cell of every sheet is read once.
/// Formulas are not re-evaluated: cells hold whatever the authoring
/// application computed when the file was last saved.
///
/// # Arguments
/// * `filepath` - Path to a `.xlsm`, `.xlsx`, `.xls`, `.xlsb` or `.ods` file
///
/// # Examples
/// ```no_run
/// use immofisc::loader::load_workbook;
/// use immofisc::workbook::WorkbookOracle;
///
/// match load_workbook("simulation.xlsm") {
///     Ok(wb) => println!("Loaded {} with sheets {:?}", wb.name(), wb.sheet_names()),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn load_workbook(filepath: impl AsRef<Path>) -> Result<MemoryWorkbook> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some(ext) if SUPPORTED_EXTENSIONS.contains(&ext) => from_excel(path),
        _ => Err(AppError::UnsupportedFile(path.to_path_buf())),
    }
}

fn from_excel(path: &Path) -> Result<MemoryWorkbook> {
    let mut source = open_workbook_auto(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut workbook = MemoryWorkbook::new(name);
    for sheet_name in source.sheet_names() {
        workbook.add_sheet(&sheet_name);
        let range = source.worksheet_range(&sheet_name)?;
        let (start_row, start_col) = range.start().unwrap_or_default();

        for (r, c, data) in range.cells() {
            let value = convert_value(data);
            if value.is_empty() {
                continue;
            }
            let address = CellAddress::new(start_row + r as u32 + 1, start_col + c as u32 + 1);
            workbook.put_at(&sheet_name, address, value);
        }
    }

    log::info!(
        "loaded workbook {} ({} sheets)",
        path.display(),
        workbook.sheet_names().len()
    );
    Ok(workbook)
}

fn convert_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_extensions() {
        assert!(matches!(
            load_workbook("notes.txt"),
            Err(AppError::UnsupportedFile(_))
        ));
        assert!(matches!(
            load_workbook("no_extension"),
            Err(AppError::UnsupportedFile(_))
        ));
    }

    #[test]
    fn converts_calamine_values() {
        assert_eq!(convert_value(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(convert_value(&Data::String("NON".into())), CellValue::from("NON"));
        assert_eq!(convert_value(&Data::Empty), CellValue::Empty);
    }
}
