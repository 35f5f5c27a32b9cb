//! Builds snapshots out of the attached workbook.
//!
//! [`ProjectionService`] is the single owner of the workbook oracle. It must
//! stay on the thread that created it; other threads only ever see the
//! [`SnapshotCache`] it publishes to.

use std::path::Path;
use std::sync::Arc;

use crate::cell::{CellAddress, CellValue};
use crate::error::{AppError, Result};
use crate::fields::{INPUT_FIELDS, INPUT_SHEET, SYNTHESIS_SHEET};
use crate::form::DataEntryForm;
use crate::format::{PLACEHOLDER, Unit, format_f64, with_unit};
use crate::history::{HistoryLog, SimulationData, SimulationHistoryRow};
use crate::loader::load_workbook;
use crate::regime::{RESULTS_SHEET, Regime};
use crate::snapshot::{RegimeRecord, Snapshot, SnapshotCache};
use crate::workbook::WorkbookOracle;

/// Horizon of the first "average annual cost" column.
pub const LONG_HORIZON_YEARS: f64 = 40.0;
/// Holding period assumed by the second column. The holding period typed in
/// the form (C3) is not used here.
// TODO: divide by the C3 holding period once the workbook exposes per-period costs.
pub const ASSUMED_HOLDING_YEARS: f64 = 20.0;

pub struct ProjectionService {
    workbook: Option<Box<dyn WorkbookOracle>>,
    cache: Arc<SnapshotCache>,
}

impl ProjectionService {
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        ProjectionService {
            workbook: None,
            cache,
        }
    }

    pub fn cache(&self) -> Arc<SnapshotCache> {
        self.cache.clone()
    }

    pub fn is_attached(&self) -> bool {
        self.workbook.is_some()
    }

    pub fn workbook_name(&self) -> Option<&str> {
        self.workbook.as_deref().map(|wb| wb.name())
    }

    pub fn workbook(&self) -> Result<&dyn WorkbookOracle> {
        self.workbook.as_deref().ok_or(AppError::NoWorkbookOpen)
    }

    /// Loads a workbook file and attaches it. On failure the previously
    /// attached workbook, if any, stays in place.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<Arc<Snapshot>> {
        let workbook = load_workbook(path)?;
        self.attach(Box::new(workbook))
    }

    /// Replaces the attached workbook and computes a first snapshot.
    pub fn attach(&mut self, workbook: Box<dyn WorkbookOracle>) -> Result<Arc<Snapshot>> {
        self.close();
        log::info!("attaching workbook {}", workbook.name());
        self.workbook = Some(workbook);
        self.cache.set_attached(true);
        self.recompute()
    }

    /// Releases the workbook. The web view reports "no workbook" afterwards.
    pub fn close(&mut self) {
        if let Some(mut workbook) = self.workbook.take() {
            log::info!("closing workbook {}", workbook.name());
            workbook.close();
        }
        self.cache.set_attached(false);
    }

    /// Reads one cell of the attached workbook.
    pub fn read(&self, sheet: &str, address: CellAddress) -> Result<CellValue> {
        self.workbook()?.read(sheet, address)
    }

    /// Rebuilds the snapshot from the workbook and publishes it.
    pub fn recompute(&mut self) -> Result<Arc<Snapshot>> {
        let snapshot = build_snapshot(self.workbook()?);
        let snapshot = self.cache.set(snapshot);
        log::info!("snapshot refreshed");
        Ok(snapshot)
    }

    /// Writes the form into the input sheet, brings the synthesis sheet to
    /// the front and recomputes. Nothing is written if validation fails.
    pub fn submit(&mut self, form: &DataEntryForm) -> Result<Arc<Snapshot>> {
        let writes = form.validate()?;
        let workbook = self
            .workbook
            .as_deref_mut()
            .ok_or(AppError::NoWorkbookOpen)?;
        for (address, value) in writes {
            workbook.write(INPUT_SHEET, address, value)?;
        }
        if let Err(e) = workbook.activate(SYNTHESIS_SHEET) {
            log::warn!("could not activate sheet {}: {}", SYNTHESIS_SHEET, e);
        }
        self.recompute()
    }

    /// Computes the current simulation summary and appends it to `history`.
    pub fn save_simulation(&self, history: &HistoryLog) -> Result<SimulationHistoryRow> {
        let data = SimulationData::from_workbook(self.workbook()?)?;
        history.append(&data)
    }
}

impl Drop for ProjectionService {
    fn drop(&mut self) {
        self.close();
    }
}

/// Reads every input field and regime result. Individual read failures are
/// logged and rendered as placeholders.
pub fn build_snapshot(workbook: &dyn WorkbookOracle) -> Snapshot {
    let input_data = INPUT_FIELDS
        .iter()
        .map(|field| {
            let shown = match workbook.read(INPUT_SHEET, field.address) {
                Ok(value) => with_unit(&value, field.unit),
                Err(e) => {
                    log::warn!("failed to read {} ({}): {}", field.label, field.address, e);
                    match field.unit {
                        Unit::YesNo => PLACEHOLDER.to_string(),
                        unit => with_unit(&CellValue::Empty, unit),
                    }
                }
            };
            (field.label.to_string(), shown)
        })
        .collect();

    let fiscal_data = Regime::ALL
        .iter()
        .map(|regime| regime_record(workbook, *regime))
        .collect();

    Snapshot {
        input_data,
        fiscal_data,
    }
}

fn regime_record(workbook: &dyn WorkbookOracle, regime: Regime) -> RegimeRecord {
    let name = regime.display_name();
    let cost = match workbook.read(RESULTS_SHEET, regime.global_cost_address()) {
        Ok(CellValue::Empty) => 0.0,
        Ok(value) => match value.as_f64() {
            Some(cost) => cost,
            None => {
                log::warn!("global cost of {} is not a number: {:?}", name, value);
                return RegimeRecord::unavailable(name);
            }
        },
        Err(e) => {
            log::warn!("failed to read global cost of {}: {}", name, e);
            return RegimeRecord::unavailable(name);
        }
    };

    let average = |years: f64| {
        if cost > 0.0 {
            euros(cost / years)
        } else {
            PLACEHOLDER.to_string()
        }
    };

    RegimeRecord {
        regime: name.to_string(),
        cost_40y: average(LONG_HORIZON_YEARS),
        cost_holding_period: average(ASSUMED_HOLDING_YEARS),
        global_cost_40y: euros(cost),
        global_cost_holding_period: euros(cost),
        capital_gains_tax_40y: PLACEHOLDER.to_string(),
        capital_gains_tax_holding_period: PLACEHOLDER.to_string(),
        total_cost: euros(cost),
    }
}

fn euros(value: f64) -> String {
    format!("{} €", format_f64(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::MemoryWorkbook;

    #[test]
    fn averages_divide_by_fixed_horizons() {
        let wb = MemoryWorkbook::new("t").with_cell("web", "B3", 1_000_000.0);
        let record = regime_record(&wb, Regime::SciCorporateTax);
        assert_eq!(record.cost_40y, "25 000 €");
        assert_eq!(record.cost_holding_period, "50 000 €");
        assert_eq!(record.total_cost, "1 000 000 €");
        assert_eq!(record.capital_gains_tax_40y, "-");
    }

    #[test]
    fn zero_cost_has_no_average() {
        let mut wb = MemoryWorkbook::new("t");
        wb.add_sheet("web");
        let record = regime_record(&wb, Regime::SciIncomeTax);
        assert_eq!(record.cost_40y, "-");
        assert_eq!(record.global_cost_40y, "0 €");
    }

    #[test]
    fn unreadable_cost_degrades_to_placeholders() {
        let wb = MemoryWorkbook::new("t").with_cell("web", "B4", "#REF!");
        assert_eq!(
            regime_record(&wb, Regime::SciCorporateTaxWithLiquidationLevy),
            RegimeRecord::unavailable("SCI IS PREL BONI")
        );
    }
}
