use std::path::PathBuf;

// Re-export types from library crates
pub use pdf_fieldmap::{
    BatchReport, CancelFlag, ColumnSet, DataRow, FilenameSpec, FontLocation, GenerationOptions,
    MappingSet, PageSize,
};
pub use pdf_sheet::SheetData;

mod worker;

pub use worker::worker_task;

/// Everything needed to stamp a loaded template once per row
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub mappings: MappingSet,
    pub rows: Vec<DataRow>,
    pub columns: ColumnSet,
    pub filename: FilenameSpec,
    pub font: FontLocation,
    pub options: GenerationOptions,
    pub output_dir: PathBuf,
}

/// Commands sent from UI to worker
#[derive(Debug)]
pub enum PdfCommand {
    LoadTemplate {
        path: PathBuf,
    },
    LoadSpreadsheet {
        path: PathBuf,
    },
    Generate {
        doc_id: DocumentId,
        request: Box<GenerateRequest>,
        /// Checked between rows and between emitted documents
        cancel: Option<CancelFlag>,
    },
    CloseTemplate {
        doc_id: DocumentId,
    },
}

/// Updates sent from worker to UI
#[derive(Debug, Clone)]
pub enum PdfUpdate {
    TemplateLoaded {
        doc_id: DocumentId,
        path: PathBuf,
        page_sizes: Vec<PageSize>,
    },
    SpreadsheetLoaded {
        path: PathBuf,
        data: SheetData,
    },
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    DocumentSaved {
        path: PathBuf,
        row: usize,
    },
    GenerateComplete {
        output_dir: PathBuf,
        saved: usize,
        report: BatchReport,
    },
    Error {
        message: String,
    },
    TemplateClosed {
        doc_id: DocumentId,
    },
}

/// Handle to a loaded template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);
