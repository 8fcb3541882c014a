use crate::error::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Failed to open workbook '{0}'")]
    Open(PathBuf, #[source] calamine::Error),

    #[error("Failed to read sheet '{sheet}'")]
    Sheet {
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Sheet '{sheet}' has no header row at index {row}")]
    MissingHeaderRow { sheet: String, row: usize },

    #[error("Sheet '{sheet}' has no '{column}' column")]
    MissingColumn { sheet: String, column: &'static str },

    #[error("Cell {column}{row} holds '{value}', expected a number")]
    InvalidCell {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Failed to write '{0}'")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV output")]
    Csv(#[from] csv::Error),

    #[error("Failed to write JSON output")]
    Json(#[from] serde_json::Error),
}

impl SheetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SheetError::Open(..)
            | SheetError::Sheet { .. }
            | SheetError::MissingHeaderRow { .. }
            | SheetError::MissingColumn { .. }
            | SheetError::InvalidCell { .. } => ErrorKind::Spreadsheet,
            SheetError::Write(..) | SheetError::Csv(_) | SheetError::Json(_) => ErrorKind::Output,
        }
    }
}
