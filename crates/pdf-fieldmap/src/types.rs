use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldMapError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Template could not be decoded: {0}")]
    Template(String),
    #[error("Font could not be fetched: {0}")]
    FontFetch(String),
    #[error("Font could not be parsed: {0}")]
    FontParse(String),
    #[error("Font embedding failed: {0}")]
    FontEmbed(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Page {page} does not exist (template has {page_count} pages)")]
    InvalidPage { page: u32, page_count: usize },
    #[error("Invalid mapping '{0}': expected page:x:y:field")]
    MappingSyntax(String),
}

pub type Result<T> = std::result::Result<T, FieldMapError>;

/// A finished output document, owned by the pipeline until a sink takes it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    /// Serialized PDF
    pub bytes: Vec<u8>,
    /// Output filename from the filename composer
    pub filename: String,
    /// 0-based index of the source row
    pub row: usize,
}

/// Why a single mapping was not stamped as requested
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StampWarningKind {
    /// Mapping points at a page the template does not have; skipped
    MissingPage { page: u32, page_count: usize },
    /// Characters without a glyph in the embedded font; drawn as .notdef
    MissingGlyphs { chars: String },
}

/// Non-fatal, field-level problem recorded while generating one row
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StampWarning {
    pub row: usize,
    pub mapping_index: usize,
    pub field: String,
    pub kind: StampWarningKind,
}

impl std::fmt::Display for StampWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            StampWarningKind::MissingPage { page, page_count } => write!(
                f,
                "row {}: mapping #{} ({}) skipped, page {} of {}",
                self.row + 1,
                self.mapping_index + 1,
                self.field,
                page,
                page_count
            ),
            StampWarningKind::MissingGlyphs { chars } => write!(
                f,
                "row {}: mapping #{} ({}) has characters missing from the font: {}",
                self.row + 1,
                self.mapping_index + 1,
                self.field,
                chars
            ),
        }
    }
}

/// A row that produced no document
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowFailure {
    pub row: usize,
    pub message: String,
}

/// A mapping whose field is not part of the active column set
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaleMapping {
    /// Position in the mapping set
    pub index: usize,
    pub page: u32,
    pub field: String,
}

/// Summary of one generation run
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchReport {
    /// Number of input rows
    pub rows_total: usize,
    /// Number of documents produced
    pub documents: usize,
    pub warnings: Vec<StampWarning>,
    pub row_failures: Vec<RowFailure>,
    pub stale_mappings: Vec<StaleMapping>,
    /// Run was stopped between rows
    pub cancelled: bool,
}

impl BatchReport {
    /// True when every row produced a document with every field stamped
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
            && self.row_failures.is_empty()
            && self.stale_mappings.is_empty()
            && !self.cancelled
    }

    /// Number of field-level warnings for a mapping, across all rows
    pub fn warnings_for_mapping(&self, mapping_index: usize) -> usize {
        self.warnings
            .iter()
            .filter(|w| w.mapping_index == mapping_index)
            .count()
    }

    /// Save the report as JSON
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| FieldMapError::Config(format!("Failed to serialize report: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

/// Outputs and report of a generation run
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    /// Documents in source row order
    pub documents: Vec<GeneratedDocument>,
    pub report: BatchReport,
}

/// Progress notification sent after each row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
}
