use pdf_fieldmap::{ColumnSet, DataRow};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedFormat(String),
    #[error("Workbook has no sheets")]
    NoSheets,
}

pub type Result<T> = std::result::Result<T, SheetError>;

/// Rows of the first sheet of a spreadsheet
#[derive(Debug, Clone, Default)]
pub struct SheetData {
    /// Data rows in file order, header excluded
    pub rows: Vec<DataRow>,
    /// Keys of the first data row, in header order
    pub columns: ColumnSet,
    /// File name without extension; the default filename base
    pub source_stem: String,
}

impl SheetData {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How a file's bytes are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    /// xlsx, xlsm, xlsb, xls or ods; detected from content
    Workbook,
}

impl SheetFormat {
    /// Pick a format from a file extension
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            other => Err(SheetError::UnsupportedFormat(other.to_string())),
        }
    }
}
