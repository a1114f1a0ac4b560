//! Field mappings and the mapping registry

use crate::rows::ColumnSet;
use crate::types::{FieldMapError, Result, StaleMapping};
use std::str::FromStr;

/// Where one spreadsheet column is stamped
///
/// `x`/`y` are document units with a top-left origin, as clicked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldMapping {
    /// 1-based page number
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub field: String,
}

impl FieldMapping {
    pub fn new(page: u32, x: f32, y: f32, field: impl Into<String>) -> Self {
        Self {
            page,
            x,
            y,
            field: field.into(),
        }
    }
}

/// Parses `page:x:y:field`. The field may itself contain ':'.
impl FromStr for FieldMapping {
    type Err = FieldMapError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(4, ':');
        let (Some(page), Some(x), Some(y), Some(field)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(FieldMapError::MappingSyntax(s.to_string()));
        };

        let page: u32 = page
            .trim()
            .parse()
            .map_err(|_| FieldMapError::MappingSyntax(s.to_string()))?;
        let x: f32 = x
            .trim()
            .parse()
            .map_err(|_| FieldMapError::MappingSyntax(s.to_string()))?;
        let y: f32 = y
            .trim()
            .parse()
            .map_err(|_| FieldMapError::MappingSyntax(s.to_string()))?;

        if page == 0 || field.is_empty() || !x.is_finite() || !y.is_finite() {
            return Err(FieldMapError::MappingSyntax(s.to_string()));
        }

        Ok(Self::new(page, x, y, field))
    }
}

/// Ordered collection of mappings with append / undo-last semantics
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MappingSet {
    mappings: Vec<FieldMapping>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mapping. Callers validate field and page beforehand.
    pub fn add(&mut self, mapping: FieldMapping) {
        self.mappings.push(mapping);
    }

    /// Remove the most recently added mapping, if any
    pub fn remove_last(&mut self) -> Option<FieldMapping> {
        self.mappings.pop()
    }

    /// Mappings placed on `page` with their index in the set, in insertion
    /// order
    pub fn for_page(&self, page: u32) -> impl Iterator<Item = (usize, &FieldMapping)> + '_ {
        self.mappings
            .iter()
            .enumerate()
            .filter(move |(_, m)| m.page == page)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> + '_ {
        self.mappings.iter()
    }

    pub fn as_slice(&self) -> &[FieldMapping] {
        &self.mappings
    }

    pub fn clear(&mut self) {
        self.mappings.clear();
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Mappings whose field is not part of `columns`
    pub fn stale_against(&self, columns: &ColumnSet) -> Vec<StaleMapping> {
        self.mappings
            .iter()
            .enumerate()
            .filter(|(_, m)| !columns.contains(&m.field))
            .map(|(index, m)| StaleMapping {
                index,
                page: m.page,
                field: m.field.clone(),
            })
            .collect()
    }
}

impl From<Vec<FieldMapping>> for MappingSet {
    fn from(mappings: Vec<FieldMapping>) -> Self {
        Self { mappings }
    }
}

impl FromIterator<FieldMapping> for MappingSet {
    fn from_iter<T: IntoIterator<Item = FieldMapping>>(iter: T) -> Self {
        Self {
            mappings: iter.into_iter().collect(),
        }
    }
}
