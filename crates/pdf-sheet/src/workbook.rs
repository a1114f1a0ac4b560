//! Workbook decoding (xlsx, xlsm, xlsb, xls, ods): first sheet only

use crate::table::{TableBuilder, normalize_headers};
use crate::types::{Result, SheetError};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::debug;
use pdf_fieldmap::{ColumnSet, DataRow, Scalar};
use std::io::Cursor;

/// Convert one cell; `None` for empty cells
pub fn cell_value(cell: &Data) -> Option<Scalar> {
    match cell {
        Data::Empty => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(Scalar::Text(s.clone())),
        Data::Int(i) => Some(Scalar::Number(*i as f64)),
        Data::Float(f) => Some(Scalar::Number(*f)),
        Data::Bool(b) => Some(Scalar::Bool(*b)),
        other => Some(Scalar::Text(other.to_string())),
    }
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Parse workbook bytes; the format is detected from content
pub fn parse_workbook(bytes: Vec<u8>) -> Result<(Vec<DataRow>, ColumnSet)> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let sheet_names = workbook.sheet_names();
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoSheets)??;

    debug!(
        "Reading sheet {:?} of {} ({} x {})",
        sheet_names.first(),
        sheet_names.len(),
        range.height(),
        range.width()
    );

    let mut cells = range.rows();
    let headers = match cells.next() {
        Some(header_row) => normalize_headers(header_row.iter().map(header_text)),
        None => return Ok((Vec::new(), ColumnSet::default())),
    };

    let mut table = TableBuilder::new(headers);
    for row in cells {
        table.push_row(row.iter().map(cell_value));
    }

    Ok(table.finish())
}
