mod common;

use std::sync::Arc;

use immofisc::form::{DataEntryForm, FormError};
use immofisc::projection::build_snapshot;
use immofisc::{AppError, CellAddress, CellValue, MemoryWorkbook, ProjectionService, SnapshotCache};

use common::simulation_workbook;

fn attached() -> ProjectionService {
    let mut service = ProjectionService::new(Arc::new(SnapshotCache::new()));
    service.attach(Box::new(simulation_workbook())).unwrap();
    service
}

#[test]
fn sci_is_averages_use_fixed_horizons() {
    let service = attached();
    let snapshot = service.cache().get().unwrap();
    let sci_is = snapshot.regime("SCI IS").unwrap();
    assert_eq!(sci_is.cost_40y, "25 000 €");
    assert_eq!(sci_is.cost_holding_period, "50 000 €");
    assert_eq!(sci_is.global_cost_40y, "1 000 000 €");
    assert_eq!(sci_is.total_cost, "1 000 000 €");
}

#[test]
fn one_record_per_regime_in_display_order() {
    let snapshot = build_snapshot(&simulation_workbook());
    let names: Vec<&str> = snapshot.fiscal_data.iter().map(|r| r.regime.as_str()).collect();
    assert_eq!(
        names,
        [
            "micro nu",
            "micro meublé",
            "micro classé",
            "SCI IS",
            "SCI IS PREL BONI",
            "SCI IR",
            "LMNP",
            "LMNP CGA"
        ]
    );
    // LMNP is approximated by the micro row
    assert_eq!(snapshot.regime("LMNP").unwrap().total_cost, "90 000 €");
    assert_eq!(snapshot.regime("SCI IR").unwrap().total_cost, "120 000 €");
}

#[test]
fn inputs_are_formatted_by_unit() {
    let snapshot = build_snapshot(&simulation_workbook());
    assert_eq!(snapshot.input_data.len(), 13);
    assert_eq!(snapshot.input_data[0].0, "Prix d'acquisition");
    assert_eq!(snapshot.input("Prix d'acquisition"), Some("200 000 €"));
    assert_eq!(snapshot.input("Durée emprunt"), Some("20 ans"));
    assert_eq!(snapshot.input("Taux emprunt"), Some("4 %"));
    assert_eq!(snapshot.input("CGA"), Some("OUI"));
}

#[test]
fn missing_sheets_degrade_instead_of_failing() {
    let wb = MemoryWorkbook::new("empty.xlsx");
    let snapshot = build_snapshot(&wb);
    assert_eq!(snapshot.fiscal_data.len(), 8);
    assert!(snapshot.fiscal_data.iter().all(|r| r.total_cost == "-"));
    assert_eq!(snapshot.input("Travaux"), Some("0 €"));
    assert_eq!(snapshot.input("CGA"), Some("-"));
}

#[test]
fn a_bad_regime_cell_only_affects_that_regime() {
    let wb = simulation_workbook().with_cell("web", "B5", "#DIV/0!");
    let snapshot = build_snapshot(&wb);
    assert_eq!(snapshot.regime("SCI IR").unwrap().cost_40y, "-");
    assert_eq!(snapshot.regime("SCI IS").unwrap().cost_40y, "25 000 €");
}

#[test]
fn recompute_without_workbook_is_reported() {
    let mut service = ProjectionService::new(Arc::new(SnapshotCache::new()));
    assert!(matches!(service.recompute(), Err(AppError::NoWorkbookOpen)));
    assert!(matches!(
        service.read("feuil1", CellAddress::new(4, 3)),
        Err(AppError::NoWorkbookOpen)
    ));
    assert!(service.cache().get().is_none());
}

#[test]
fn missing_acquisition_price_blocks_write_back() {
    let mut service = attached();
    let mut form = DataEntryForm::new();
    form.set("Loyer mensuel", "1500").unwrap();
    form.set("Durée détention", "15").unwrap();

    let err = service.submit(&form).unwrap_err();
    match err {
        AppError::Form(FormError::MissingFields(fields)) => {
            assert_eq!(fields, vec!["Prix d'acquisition"])
        }
        other => panic!("unexpected error {other:?}"),
    }
    // nothing was written
    assert_eq!(
        service.read("feuil1", CellAddress::new(1, 3)).unwrap(),
        CellValue::Number(1_000.0)
    );
}

#[test]
fn submit_writes_the_form_and_refreshes_the_cache() {
    let mut service = attached();
    let mut form = DataEntryForm::new();
    form.set("c4", "310 000").unwrap();
    form.set("c1", "1 450,5").unwrap();
    form.set("c3", "12").unwrap();
    form.set("CGA", "oui").unwrap();
    form.set("Travaux", "à définir").unwrap();

    let snapshot = service.submit(&form).unwrap();
    assert_eq!(snapshot.input("Prix d'acquisition"), Some("310 000 €"));
    assert_eq!(snapshot.input("Loyer mensuel"), Some("1 451 €"));
    assert_eq!(snapshot.input("Travaux"), Some("à définir €"));
    assert_eq!(snapshot.input("CGA"), Some("OUI"));
    assert_eq!(service.cache().get().unwrap(), snapshot);

    // untouched optional fields keep their workbook value
    assert_eq!(
        service.read("feuil1", CellAddress::new(39, 2)).unwrap(),
        CellValue::Number(180_000.0)
    );
}

#[test]
fn close_detaches_and_clears_the_cache() {
    let mut service = attached();
    let cache = service.cache();
    assert!(cache.is_attached());
    service.close();
    assert!(!cache.is_attached());
    assert!(cache.get().is_none());
    assert!(service.workbook_name().is_none());
}

#[test]
fn failed_open_keeps_the_previous_workbook() {
    let mut service = attached();
    assert!(service.open("/nonexistent/simulation.xlsm").is_err());
    assert_eq!(service.workbook_name(), Some("simulation.xlsm"));
    assert!(service.cache().get().is_some());
}
