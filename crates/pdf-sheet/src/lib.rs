//! Spreadsheet loading: CSV and workbook files to rows of field values

pub mod delimited;
mod table;
mod types;
pub mod workbook;

pub use table::{EMPTY_HEADER, normalize_headers};
pub use types::*;

use log::info;
use std::path::Path;

/// Decode spreadsheet bytes of a known format
pub fn parse_sheet(bytes: Vec<u8>, format: SheetFormat, source_stem: &str) -> Result<SheetData> {
    let (rows, columns) = match format {
        SheetFormat::Csv => delimited::parse_csv(&bytes)?,
        SheetFormat::Workbook => workbook::parse_workbook(bytes)?,
    };

    Ok(SheetData {
        rows,
        columns,
        source_stem: source_stem.to_string(),
    })
}

/// Load the first sheet of a spreadsheet file, choosing the format by extension
pub async fn load_rows(path: impl AsRef<Path>) -> Result<SheetData> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let format = SheetFormat::from_extension(extension)?;
    let stem = pdf_fieldmap::default_base(path);

    let bytes = tokio::fs::read(path).await?;

    let data = tokio::task::spawn_blocking(move || parse_sheet(bytes, format, &stem)).await??;

    info!(
        "Loaded {} rows with {} columns from {}",
        data.row_count(),
        data.columns.len(),
        path.display()
    );
    Ok(data)
}
