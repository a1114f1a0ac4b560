//! Header row handling shared by every format

use pdf_fieldmap::{ColumnSet, DataRow, Scalar};
use std::collections::HashMap;

/// Name given to header cells with no text
pub const EMPTY_HEADER: &str = "__EMPTY";

/// Make header names unique: blank headers become `__EMPTY`, `__EMPTY_1`, ...
/// and repeats of a name get `_1`, `_2`, ... appended.
pub fn normalize_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut used: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();

    for header in raw {
        let base = if header.trim().is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            header
        };

        let mut name = base.clone();
        if let Some(count) = used.get(&base).copied() {
            let mut n = count;
            loop {
                name = format!("{}_{}", base, n);
                if !used.contains_key(&name) {
                    break;
                }
                n += 1;
            }
            used.insert(base.clone(), n + 1);
        } else {
            used.insert(base.clone(), 1);
        }
        used.entry(name.clone()).or_insert(1);
        headers.push(name);
    }

    headers
}

/// Collects rows keyed by header, dropping empty cells and blank rows
#[derive(Debug, Default)]
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<DataRow>,
    column_order: Option<Vec<String>>,
}

impl TableBuilder {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            ..Default::default()
        }
    }

    /// Add one data row; `cells` are positional and `None` means empty
    pub fn push_row<I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = Option<Scalar>>,
    {
        let mut row = DataRow::new();
        let mut keys = Vec::new();

        for (header, cell) in self.headers.iter().zip(cells) {
            if let Some(value) = cell {
                row.insert(header.clone(), value);
                keys.push(header.clone());
            }
        }

        if row.is_empty() {
            return;
        }
        if self.column_order.is_none() {
            self.column_order = Some(keys);
        }
        self.rows.push(row);
    }

    pub fn finish(self) -> (Vec<DataRow>, ColumnSet) {
        let columns = ColumnSet::new(self.column_order.unwrap_or_default());
        (self.rows, columns)
    }
}
