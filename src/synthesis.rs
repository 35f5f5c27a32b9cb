use crate::cell::{CellAddress, CellValue};
use crate::error::Result;
use crate::fields::{INPUT_SHEET, SYNTHESIS_SHEET};
use crate::format::{PLACEHOLDER, format_f64, format_number};
use crate::regime::{RESULTS_SHEET, SOURCE_REGIMES};
use crate::workbook::WorkbookOracle;

pub const SYNTHESIS_COLUMNS: [&str; 8] = [
    "Type de Régime",
    "Coût Moyen Annuel (40 ans)",
    "Coût Moyen Annuel (durée détention)",
    "Coût Global (40 ans)",
    "Coût Global (durée détention)",
    "Fiscalité Plus Value (40 ans)",
    "Fiscalité Plus Value (durée détention)",
    "Coût Global Total",
];

/// First row of the regime block in the synthesis sheet.
const SYNTHESIS_FIRST_ROW: u32 = 4;
const ERROR_CELL: &str = "Erreur";

/// One line of the synthesis sheet, as laid out by the workbook itself.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesisRow {
    pub regime: &'static str,
    pub values: Vec<String>,
}

/// Reads rows 4 to 7, columns B to H, of the synthesis sheet.
///
/// A row that cannot be read shows `Erreur` in every column.
pub fn synthesis_table(workbook: &dyn WorkbookOracle) -> Vec<SynthesisRow> {
    SOURCE_REGIMES
        .iter()
        .enumerate()
        .map(|(i, regime)| {
            let row = SYNTHESIS_FIRST_ROW + i as u32;
            let values = (2..=8)
                .map(|col| workbook.read(SYNTHESIS_SHEET, CellAddress::new(row, col)))
                .collect::<Result<Vec<CellValue>>>();
            let values = match values {
                Ok(cells) => cells
                    .iter()
                    .map(|v| {
                        if v.is_empty() {
                            PLACEHOLDER.to_string()
                        } else {
                            format!("{} €", format_number(v))
                        }
                    })
                    .collect(),
                Err(e) => {
                    log::warn!("failed to read synthesis row for {}: {}", regime.name, e);
                    vec![ERROR_CELL.to_string(); 7]
                }
            };
            SynthesisRow {
                regime: regime.name,
                values,
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct RevenueRow {
    pub regime: &'static str,
    pub global_revenue: f64,
    pub result: f64,
}

impl RevenueRow {
    pub fn formatted(&self) -> [String; 3] {
        [
            self.regime.to_string(),
            format_f64(self.global_revenue),
            format_f64(self.result),
        ]
    }
}

/// Rent collected over the holding period minus each regime's global cost.
pub fn revenue_table(workbook: &dyn WorkbookOracle) -> Result<Vec<RevenueRow>> {
    let monthly_rent = workbook.read(INPUT_SHEET, CellAddress::new(1, 3))?.number_or_zero();
    let holding_years = workbook.read(INPUT_SHEET, CellAddress::new(3, 3))?.number_or_zero();
    let global_revenue = monthly_rent * 12.0 * holding_years;

    SOURCE_REGIMES
        .iter()
        .map(|regime| {
            let cost = workbook
                .read(RESULTS_SHEET, regime.global_cost_address())?
                .number_or_zero();
            Ok(RevenueRow {
                regime: regime.name,
                global_revenue,
                result: global_revenue - cost,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::MemoryWorkbook;

    #[test]
    fn synthesis_formats_present_cells_and_marks_empty_ones() {
        let wb = MemoryWorkbook::new("t")
            .with_cell("synthese", "B4", 1234.4)
            .with_cell("synthese", "H7", -50000.0);
        let table = synthesis_table(&wb);
        assert_eq!(table.len(), 4);
        assert_eq!(table[0].regime, "micro nu + meublé");
        assert_eq!(table[0].values[0], "1 234 €");
        assert_eq!(table[0].values[1], "-");
        assert_eq!(table[3].values[6], "-50 000 €");
    }

    #[test]
    fn missing_synthesis_sheet_shows_errors() {
        let wb = MemoryWorkbook::new("t");
        let table = synthesis_table(&wb);
        assert!(table.iter().all(|r| r.values.iter().all(|v| v == "Erreur")));
    }

    #[test]
    fn revenue_subtracts_global_cost() {
        let wb = MemoryWorkbook::new("t")
            .with_cell("feuil1", "C1", 1000.0)
            .with_cell("feuil1", "C3", 20.0)
            .with_cell("web", "B2", 90_000.0)
            .with_cell("web", "B5", 300_000.0);
        let table = revenue_table(&wb).unwrap();
        assert_eq!(table[0].global_revenue, 240_000.0);
        assert_eq!(table[0].result, 150_000.0);
        assert_eq!(table[1].result, 240_000.0);
        assert_eq!(table[3].formatted()[2], "-60 000");
    }
}
