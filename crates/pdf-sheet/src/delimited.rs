//! CSV decoding; every cell is kept as text

use crate::table::{TableBuilder, normalize_headers};
use crate::types::Result;
use log::debug;
use pdf_fieldmap::{ColumnSet, DataRow, Scalar};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse CSV bytes; the first record is the header row
pub fn parse_csv(bytes: &[u8]) -> Result<(Vec<DataRow>, ColumnSet)> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut records = reader.records();
    let headers = match records.next() {
        Some(record) => normalize_headers(record?.iter().map(str::to_string)),
        None => return Ok((Vec::new(), ColumnSet::default())),
    };

    let mut table = TableBuilder::new(headers);
    for record in records {
        let record = record?;
        table.push_row(record.iter().map(|cell| {
            if cell.is_empty() {
                None
            } else {
                Some(Scalar::Text(cell.to_string()))
            }
        }));
    }

    let (rows, columns) = table.finish();
    debug!("Parsed {} CSV rows, {} columns", rows.len(), columns.len());
    Ok((rows, columns))
}
