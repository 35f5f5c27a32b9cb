use std::path::PathBuf;
use thiserror::Error;

use crate::form::FormError;

/// Errors raised while driving the workbook, the history file or the web view.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no workbook is open")]
    NoWorkbookOpen,

    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("invalid cell address '{0}'")]
    InvalidAddress(String),

    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFile(PathBuf),

    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("failed to write spreadsheet: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("the foreground worker is not running")]
    ForegroundUnavailable,

    #[error("this build has no web view")]
    WebUnavailable,
}

pub type Result<T> = std::result::Result<T, AppError>;
