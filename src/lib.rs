/*!
# Real-estate Tax Regime Comparator

Opens a real-estate investment workbook, lets the user enter the simulation
parameters, and compares the French ownership and taxation regimes whose
results the workbook computes.

## Overview

All tax modelling lives in the workbook. This crate reads and writes cells
through an oracle interface, formats the figures, caches the comparison for a
local web view and keeps a history of saved simulations in a second
spreadsheet.

## Architecture

### Foreground
- **Worker** - Owns the workbook and handles every user action in order
- **Console** - Text tables and commands (open, refresh, form, save, ...)
- **Data-entry form** - Validates parameters and writes them back

### Projection
- **Cell reader** - Evaluated cell values from the attached workbook
- **Regime resolver** - Regime to results-row mapping (`web` sheet, column B)
- **Formatter** - `1 234 567 €` style display strings
- **Snapshot cache** - Last comparison, shared with the web view

### Web view
- `GET /` - Landing page
- `GET /api/data` - Current snapshot as JSON (400 without workbook, 404 before
  the first projection)
- `POST /api/refresh` - Recompute, performed by the foreground worker

### Persistence
- Simulation history in `historique_simulations.xlsx`, rewritten on each save
- Export to CSV or XLSX

## Modules

- **cell**: cell values and A1 addresses
- **workbook**: oracle trait and in-memory workbook
- **loader**: workbook files read through calamine
- **format**: number and unit formatting
- **regime**: regimes and their result rows
- **fields**: input fields and form layout
- **form**: data-entry validation
- **snapshot**: snapshot model and cache
- **projection**: snapshot computation
- **synthesis**: synthesis sheet and revenue tables
- **history**: simulation history file
- **console**: text rendering and commands
- **worker**: foreground event loop
- **app**: web view (feature `web`)
- **config**: command line and environment
*/

#[cfg(feature = "web")]
pub mod app;
pub mod cell;
pub mod config;
pub mod console;
pub mod error;
pub mod fields;
pub mod form;
pub mod format;
pub mod history;
pub mod loader;
pub mod projection;
pub mod regime;
pub mod snapshot;
pub mod synthesis;
pub mod workbook;
pub mod worker;

pub use cell::{CellAddress, CellValue};
pub use error::{AppError, Result};
pub use format::format_number;
pub use projection::ProjectionService;
pub use regime::{Regime, resolve_row};
pub use snapshot::{RegimeRecord, Snapshot, SnapshotCache};
pub use workbook::{MemoryWorkbook, WorkbookOracle};
