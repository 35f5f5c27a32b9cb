//! Simulation history kept in a spreadsheet file.
//!
//! The whole table is read, extended by one row and written back on every
//! save. A single writer process is assumed.

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Local, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cell::{CellAddress, CellValue};
use crate::error::{AppError, Result};
use crate::fields::INPUT_SHEET;
use crate::format::format_currency;
use crate::regime::{RESULTS_SHEET, SOURCE_REGIMES};
use crate::workbook::WorkbookOracle;

pub const DEFAULT_HISTORY_FILE: &str = "historique_simulations.xlsx";
/// Hidden sheet holding the last id handed out, in A1.
const COUNTER_SHEET: &str = "compteur";
pub const DATE_FORMAT: &str = "%d/%m/%Y %H:%M";
/// Option reported when no regime cost could be read.
pub const UNDEFINED_OPTION: &str = "Non défini";

pub const HEADERS: [&str; 13] = [
    "ID",
    "Date",
    "Prix acquisition (€)",
    "Travaux (€)",
    "Emprunt (€)",
    "Prix cession (€)",
    "Loyer mensuel (€)",
    "Durée détention (ans)",
    "Coût minimal (€)",
    "Option optimale",
    "Rentabilité brute (%)",
    "ROI estimé (%)",
    "Cash-flow annuel (€)",
];

/// Raw figures a history row is derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationData {
    pub acquisition_price: f64,
    pub works_cost: f64,
    pub loan_amount: f64,
    pub selling_price: f64,
    pub monthly_rent: f64,
    pub holding_years: f64,
    pub min_cost: f64,
    pub optimal_option: String,
}

impl SimulationData {
    /// Reads the inputs and picks the cheapest of the source regimes.
    pub fn from_workbook(workbook: &dyn WorkbookOracle) -> Result<Self> {
        let input = |addr: CellAddress| -> Result<f64> {
            Ok(workbook.read(INPUT_SHEET, addr)?.number_or_zero())
        };

        let mut best: Option<(f64, &'static str)> = None;
        for regime in SOURCE_REGIMES {
            let cost = match workbook.read(RESULTS_SHEET, regime.global_cost_address()) {
                Ok(value) => value.as_f64(),
                Err(e) => {
                    log::warn!("skipping {} in optimum search: {}", regime.name, e);
                    None
                }
            };
            if let Some(cost) = cost {
                if best.is_none_or(|(min, _)| cost < min) {
                    best = Some((cost, regime.name));
                }
            }
        }

        Ok(SimulationData {
            acquisition_price: input(CellAddress::new(4, 3))?,
            works_cost: input(CellAddress::new(51, 2))?,
            loan_amount: input(CellAddress::new(39, 2))?,
            selling_price: input(CellAddress::new(47, 2))?,
            monthly_rent: input(CellAddress::new(1, 3))?,
            holding_years: input(CellAddress::new(3, 3))?,
            min_cost: best.map(|(c, _)| c).unwrap_or(0.0),
            optimal_option: best
                .map(|(_, name)| name.to_string())
                .unwrap_or_else(|| UNDEFINED_OPTION.to_string()),
        })
    }

    pub fn annual_rent(&self) -> f64 {
        self.monthly_rent * 12.0
    }

    /// Yearly rent over acquisition price, in percent.
    pub fn gross_yield(&self) -> f64 {
        if self.acquisition_price > 0.0 {
            round2(self.annual_rent() / self.acquisition_price * 100.0)
        } else {
            0.0
        }
    }

    /// Return over the holding period, net of the minimal cost, in percent
    /// of the total investment.
    pub fn roi(&self) -> f64 {
        let investment = self.acquisition_price + self.works_cost;
        if investment <= 0.0 {
            return 0.0;
        }
        let total_return =
            self.annual_rent() * self.holding_years + self.selling_price - self.min_cost;
        round2((total_return - investment) / investment * 100.0)
    }

    /// Yearly rent minus the minimal cost spread over the holding period.
    pub fn annual_cash_flow(&self) -> f64 {
        let yearly_cost = if self.holding_years > 0.0 {
            self.min_cost / self.holding_years
        } else {
            0.0
        };
        self.annual_rent() - yearly_cost
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// One saved simulation as stored in the history file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationHistoryRow {
    pub id: u64,
    pub date: String,
    pub acquisition_price: String,
    pub works_cost: String,
    pub loan_amount: String,
    pub selling_price: String,
    pub monthly_rent: String,
    pub holding_years: f64,
    pub min_cost: String,
    pub optimal_option: String,
    pub gross_yield: f64,
    pub roi: f64,
    pub annual_cash_flow: String,
}

impl SimulationHistoryRow {
    pub fn new(id: u64, at: NaiveDateTime, data: &SimulationData) -> Self {
        SimulationHistoryRow {
            id,
            date: at.format(DATE_FORMAT).to_string(),
            acquisition_price: format_currency(data.acquisition_price),
            works_cost: format_currency(data.works_cost),
            loan_amount: format_currency(data.loan_amount),
            selling_price: format_currency(data.selling_price),
            monthly_rent: format_currency(data.monthly_rent),
            holding_years: data.holding_years,
            min_cost: format_currency(data.min_cost),
            optimal_option: data.optimal_option.clone(),
            gross_yield: data.gross_yield(),
            roi: data.roi(),
            annual_cash_flow: format_currency(data.annual_cash_flow()),
        }
    }

    /// Cells in [`HEADERS`] order.
    pub fn to_cells(&self) -> [CellValue; 13] {
        [
            CellValue::Number(self.id as f64),
            CellValue::Text(self.date.clone()),
            CellValue::Text(self.acquisition_price.clone()),
            CellValue::Text(self.works_cost.clone()),
            CellValue::Text(self.loan_amount.clone()),
            CellValue::Text(self.selling_price.clone()),
            CellValue::Text(self.monthly_rent.clone()),
            CellValue::Number(self.holding_years),
            CellValue::Text(self.min_cost.clone()),
            CellValue::Text(self.optimal_option.clone()),
            CellValue::Number(self.gross_yield),
            CellValue::Number(self.roi),
            CellValue::Text(self.annual_cash_flow.clone()),
        ]
    }

    /// Rebuilds a row from cells laid out as `headers`. Unknown columns are
    /// ignored and missing ones left at their default.
    fn from_cells(headers: &[String], cells: &[CellValue]) -> Self {
        let mut row = SimulationHistoryRow::default();
        for (header, value) in headers.iter().zip(cells) {
            let text = || value.to_string();
            let number = || value.number_or_zero();
            match header.as_str() {
                "ID" => row.id = number().max(0.0) as u64,
                "Date" => row.date = text(),
                "Prix acquisition (€)" => row.acquisition_price = text(),
                "Travaux (€)" => row.works_cost = text(),
                "Emprunt (€)" => row.loan_amount = text(),
                "Prix cession (€)" => row.selling_price = text(),
                "Loyer mensuel (€)" => row.monthly_rent = text(),
                "Durée détention (ans)" => row.holding_years = number(),
                "Coût minimal (€)" => row.min_cost = text(),
                "Option optimale" => row.optimal_option = text(),
                "Rentabilité brute (%)" => row.gross_yield = number(),
                "ROI estimé (%)" => row.roi = number(),
                "Cash-flow annuel (€)" => row.annual_cash_flow = text(),
                _ => {}
            }
        }
        row
    }
}

/// The history file.
#[derive(Clone, Debug)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        HistoryLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every saved row. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<SimulationHistoryRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut source = open_workbook_auto(&self.path)?;
        let Some(sheet) = source.sheet_names().first().cloned() else {
            return Ok(Vec::new());
        };
        let range = source.worksheet_range(&sheet)?;
        let mut rows = range.rows();

        let Some(header_row) = rows.next() else {
            return Ok(Vec::new());
        };
        let headers: Vec<String> = header_row.iter().map(|d| d.to_string()).collect();

        Ok(rows
            .map(|r| r.iter().map(data_to_cell).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(|c| !c.is_empty()))
            .map(|cells| SimulationHistoryRow::from_cells(&headers, &cells))
            .collect())
    }

    /// Appends a simulation stamped with the current local time.
    pub fn append(&self, data: &SimulationData) -> Result<SimulationHistoryRow> {
        self.append_at(data, Local::now().naive_local())
    }

    /// Appends a simulation and rewrites the file. The new id follows the row
    /// count, the highest id present and the last id recorded in the hidden
    /// counter sheet, so ids are never reused even after rows are deleted.
    pub fn append_at(
        &self,
        data: &SimulationData,
        at: NaiveDateTime,
    ) -> Result<SimulationHistoryRow> {
        let mut rows = match self.load() {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!(
                    "could not read history {}, starting a new one: {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        };
        let max_id = rows.iter().map(|r| r.id).max().unwrap_or(0);
        let last_issued = self.last_issued_id().unwrap_or(0);
        let id = max_id.max(rows.len() as u64).max(last_issued) + 1;

        let row = SimulationHistoryRow::new(id, at, data);
        rows.push(row.clone());
        write_xlsx(&rows, &self.path, Some(id))?;
        log::info!("simulation #{} saved to {}", id, self.path.display());
        Ok(row)
    }

    fn last_issued_id(&self) -> Option<u64> {
        let mut source = open_workbook_auto(&self.path).ok()?;
        let range = source.worksheet_range(COUNTER_SHEET).ok()?;
        let value = data_to_cell(range.get_value((0, 0))?);
        value.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64)
    }

    /// Copies the history to `target`, as CSV or XLSX depending on the
    /// extension.
    pub fn export(&self, target: impl AsRef<Path>) -> Result<PathBuf> {
        let target = target.as_ref();
        let rows = self.load()?;
        let extension = target
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());
        match extension.as_deref() {
            Some("xlsx") => write_xlsx(&rows, target, None)?,
            Some("csv") => write_csv(&rows, target)?,
            _ => return Err(AppError::UnsupportedFile(target.to_path_buf())),
        }
        Ok(target.to_path_buf())
    }
}

fn data_to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}

fn write_xlsx(rows: &[SimulationHistoryRow], path: &Path, last_id: Option<u64>) -> Result<()> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    let header = Format::new().set_bold();

    for (c, title) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, *title, &header)?;
        worksheet.set_column_width(c as u16, (title.chars().count() + 4) as f64)?;
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.to_cells().iter().enumerate() {
            let (r, c) = ((r + 1) as u32, c as u16);
            match cell {
                CellValue::Number(n) => {
                    worksheet.write_number(r, c, *n)?;
                }
                CellValue::Empty => {}
                other => {
                    worksheet.write_string(r, c, other.to_string())?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);
    if let Some(id) = last_id {
        let mut counter = Worksheet::new();
        counter.set_name(COUNTER_SHEET)?;
        counter.write_number(0, 0, id as f64)?;
        counter.set_hidden(true);
        workbook.push_worksheet(counter);
    }
    workbook.save(path)?;
    Ok(())
}

/// UTF-8 with a byte order mark so spreadsheet applications pick the right
/// encoding for the accented headers.
fn write_csv(rows: &[SimulationHistoryRow], path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all("\u{feff}".as_bytes())?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);
    wtr.write_record(HEADERS)?;
    for row in rows {
        wtr.write_record(row.to_cells().iter().map(|c| c.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}
