//! Output filename composition

use crate::constants::{FILENAME_SEPARATOR, OUTPUT_EXTENSION};
use crate::rows::{ColumnSet, RowSource};
use crate::types::{FieldMapError, Result};
use std::path::Path;

/// Compose `base-v1-v2.pdf`; empty values are dropped, `base.pdf` when none remain
pub fn compose<S: AsRef<str>>(base: &str, values: &[S]) -> String {
    let parts: Vec<&str> = values
        .iter()
        .map(|v| v.as_ref())
        .filter(|v| !v.is_empty())
        .collect();

    if parts.is_empty() {
        format!("{}{}", base, OUTPUT_EXTENSION)
    } else {
        format!(
            "{}{}{}{}",
            base,
            FILENAME_SEPARATOR,
            parts.join(FILENAME_SEPARATOR),
            OUTPUT_EXTENSION
        )
    }
}

/// Default base name: the spreadsheet file name without its extension
pub fn default_base(source: impl AsRef<Path>) -> String {
    source
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Base name plus the ordered columns whose values suffix each filename
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilenameSpec {
    pub base: String,
    pub fields: Vec<String>,
}

impl FilenameSpec {
    pub fn new(base: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            base: base.into(),
            fields,
        }
    }

    /// Every entry must be set and name a known column
    pub fn validate(&self, columns: &ColumnSet) -> Result<()> {
        if self.base.is_empty() {
            return Err(FieldMapError::Config("Filename base is empty".to_string()));
        }

        for (i, field) in self.fields.iter().enumerate() {
            if field.is_empty() {
                return Err(FieldMapError::Config(format!(
                    "Filename field #{} is not set",
                    i + 1
                )));
            }
            if !columns.contains(field) {
                return Err(FieldMapError::Config(format!(
                    "Filename field '{}' is not a column of the spreadsheet",
                    field
                )));
            }
        }

        Ok(())
    }

    /// Filename for one row
    pub fn filename_for(&self, row: &impl RowSource) -> String {
        let values: Vec<String> = self.fields.iter().map(|f| row.text(f)).collect();
        compose(&self.base, values.as_slice())
    }
}
