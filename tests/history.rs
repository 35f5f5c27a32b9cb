mod common;

use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

use immofisc::history::{HEADERS, HistoryLog, SimulationData, UNDEFINED_OPTION};
use immofisc::{AppError, MemoryWorkbook, ProjectionService, SnapshotCache};

fn data() -> SimulationData {
    SimulationData {
        acquisition_price: 200_000.0,
        works_cost: 20_000.0,
        loan_amount: 180_000.0,
        selling_price: 260_000.0,
        monthly_rent: 1_000.0,
        holding_years: 20.0,
        min_cost: 40_000.0,
        optimal_option: "SCI IS PREL BONI".to_string(),
    }
}

fn noon() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap()
}

#[test]
fn missing_file_is_an_empty_history() {
    let dir = tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("historique.xlsx"));
    assert!(log.load().unwrap().is_empty());
}

#[test]
fn appends_number_rows_from_one() {
    let dir = tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("historique.xlsx"));

    for expected in 1..=3 {
        let row = log.append_at(&data(), noon()).unwrap();
        assert_eq!(row.id, expected);
    }

    let rows = log.load().unwrap();
    let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let first = &rows[0];
    assert_eq!(first.date, "05/03/2024 12:30");
    assert_eq!(first.acquisition_price, "200 000");
    assert_eq!(first.min_cost, "40 000");
    assert_eq!(first.optimal_option, "SCI IS PREL BONI");
    assert_eq!(first.holding_years, 20.0);
    assert_eq!(first.gross_yield, 6.0);
    assert_eq!(first.roi, 109.09);
    assert_eq!(first.annual_cash_flow, "10 000");
}

#[test]
fn ids_are_not_reused_after_gaps() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("historique.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (c, title) in HEADERS.iter().enumerate() {
        sheet.write_string(0, c as u16, *title).unwrap();
    }
    sheet.write_number(1, 0, 1.0).unwrap();
    sheet.write_number(2, 0, 7.0).unwrap();
    workbook.save(&path).unwrap();

    let log = HistoryLog::new(&path);
    assert_eq!(log.load().unwrap().len(), 2);
    assert_eq!(log.append_at(&data(), noon()).unwrap().id, 8);
}

#[test]
fn unreadable_file_is_replaced_by_a_new_history() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("historique.xlsx");
    fs::write(&path, b"definitely not a zip archive").unwrap();

    let log = HistoryLog::new(&path);
    assert!(log.load().is_err());
    assert_eq!(log.append_at(&data(), noon()).unwrap().id, 1);
    assert_eq!(log.load().unwrap().len(), 1);
}

#[test]
fn exports_csv_with_bom_and_headers() {
    let dir = tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("historique.xlsx"));
    log.append_at(&data(), noon()).unwrap();

    let target = log.export(dir.path().join("export.csv")).unwrap();
    let text = fs::read_to_string(target).unwrap();
    assert!(text.starts_with('\u{feff}'));

    let mut lines = text.trim_start_matches('\u{feff}').lines();
    assert_eq!(lines.next().unwrap(), HEADERS.join(","));
    let row = lines.next().unwrap();
    assert!(row.starts_with("1,05/03/2024 12:30,200 000,"));
    assert!(row.contains("SCI IS PREL BONI"));
    assert!(lines.next().is_none());
}

#[test]
fn exports_xlsx_readable_as_history() {
    let dir = tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("historique.xlsx"));
    log.append_at(&data(), noon()).unwrap();
    log.append_at(&data(), noon()).unwrap();

    let copy = log.export(dir.path().join("copie.xlsx")).unwrap();
    assert_eq!(HistoryLog::new(copy).load().unwrap(), log.load().unwrap());
}

#[test]
fn export_rejects_other_formats() {
    let dir = tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("historique.xlsx"));
    assert!(matches!(
        log.export(dir.path().join("export.pdf")),
        Err(AppError::UnsupportedFile(_))
    ));
}

#[test]
fn optimum_is_the_cheapest_source_regime() {
    let wb = common::simulation_workbook();
    let data = SimulationData::from_workbook(&wb).unwrap();
    assert_eq!(data.min_cost, 40_000.0);
    assert_eq!(data.optimal_option, "SCI IS PREL BONI");
    assert_eq!(data.acquisition_price, 200_000.0);
    assert_eq!(data.holding_years, 20.0);
}

#[test]
fn optimum_is_undefined_without_numeric_costs() {
    let wb = MemoryWorkbook::new("t")
        .with_cell("feuil1", "C4", 100_000.0)
        .with_cell("web", "B2", "n/a");
    let data = SimulationData::from_workbook(&wb).unwrap();
    assert_eq!(data.min_cost, 0.0);
    assert_eq!(data.optimal_option, UNDEFINED_OPTION);
}

#[test]
fn service_saves_the_attached_simulation() {
    let dir = tempdir().unwrap();
    let log = HistoryLog::new(dir.path().join("historique.xlsx"));

    let mut service = ProjectionService::new(Arc::new(SnapshotCache::new()));
    assert!(matches!(service.save_simulation(&log), Err(AppError::NoWorkbookOpen)));

    service.attach(Box::new(common::simulation_workbook())).unwrap();
    let row = service.save_simulation(&log).unwrap();
    assert_eq!(row.id, 1);
    assert_eq!(row.optimal_option, "SCI IS PREL BONI");
    assert_eq!(log.load().unwrap().len(), 1);
}
