#![allow(dead_code)]

use immofisc::MemoryWorkbook;

/// A workbook laid out like the simulation workbook: inputs on `feuil1`,
/// regime results on `web`, the summary block on `synthese`.
pub fn simulation_workbook() -> MemoryWorkbook {
    MemoryWorkbook::new("simulation.xlsm")
        .with_cell("feuil1", "C4", 200_000.0)
        .with_cell("feuil1", "B51", 20_000.0)
        .with_cell("feuil1", "B25", 1_500.0)
        .with_cell("feuil1", "B26", 300.0)
        .with_cell("feuil1", "C1", 1_000.0)
        .with_cell("feuil1", "B39", 180_000.0)
        .with_cell("feuil1", "B40", 20.0)
        .with_cell("feuil1", "B43", 3.5)
        .with_cell("feuil1", "C6", 30.0)
        .with_cell("feuil1", "B47", 260_000.0)
        .with_cell("feuil1", "C3", 20.0)
        .with_cell("feuil1", "C2", "NON")
        .with_cell("feuil1", "F3", "OUI")
        .with_cell("web", "B2", 90_000.0)
        .with_cell("web", "B3", 1_000_000.0)
        .with_cell("web", "B4", 40_000.0)
        .with_cell("web", "B5", 120_000.0)
        .with_cell("synthese", "B4", 2_250.0)
}
