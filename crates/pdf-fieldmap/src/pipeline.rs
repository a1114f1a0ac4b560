//! Batch generation: one stamped copy of the template per data row

use crate::filename::FilenameSpec;
use crate::font::{FontProgram, FontSource, embed_subset};
use crate::mapping::{FieldMapping, MappingSet};
use crate::options::GenerationOptions;
use crate::rows::{ColumnSet, RowSource};
use crate::stamp::{PlacedText, anchor_x, flip_to_pdf, stamp_page};
use crate::template::Template;
use crate::types::*;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;

// =============================================================================
// Run Control
// =============================================================================

/// Shared flag that stops a run between rows
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Optional cancellation and progress reporting for a run
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    pub cancel: Option<CancelFlag>,
    pub progress: Option<UnboundedSender<BatchProgress>>,
}

impl RunControl {
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }

    fn report_progress(&self, current: usize, total: usize) {
        if let Some(tx) = &self.progress {
            // A dropped receiver only means nobody is watching
            let _ = tx.send(BatchProgress { current, total });
        }
    }
}

// =============================================================================
// Batch
// =============================================================================

/// Everything a run reads, borrowed from the caller
pub struct BatchJob<'a, R: RowSource> {
    pub template: Arc<Template>,
    pub mappings: &'a MappingSet,
    pub rows: &'a [R],
    pub columns: &'a ColumnSet,
    pub filename: &'a FilenameSpec,
}

/// Generate one document per row, in row order.
///
/// Configuration errors and font fetch/parse failures abort before any row is
/// processed. Failures while building a single row are recorded in the
/// report and the run moves on to the next row.
pub async fn generate_documents<R, F>(
    job: BatchJob<'_, R>,
    font_source: &F,
    options: &GenerationOptions,
    control: &RunControl,
) -> Result<BatchOutput>
where
    R: RowSource,
    F: FontSource,
{
    options.validate()?;
    job.filename.validate(job.columns)?;

    let font_bytes = font_source.fetch_font_bytes().await?;
    let font = Arc::new(tokio::task::spawn_blocking(move || FontProgram::from_bytes(font_bytes)).await??);
    debug!(
        "Using font {} ({} glyphs)",
        font.postscript_name(),
        font.glyph_count()
    );

    let total = job.rows.len();
    let mut report = BatchReport {
        rows_total: total,
        ..Default::default()
    };

    report.stale_mappings = job.mappings.stale_against(job.columns);
    for stale in &report.stale_mappings {
        warn!(
            "Mapping #{} on page {} refers to unknown column '{}'; it will stamp empty text",
            stale.index + 1,
            stale.page,
            stale.field
        );
    }

    info!(
        "Generating {} documents from a {}-page template with {} mappings",
        total,
        job.template.page_count(),
        job.mappings.len()
    );

    let mappings: Arc<Vec<FieldMapping>> = Arc::new(job.mappings.as_slice().to_vec());
    let mut documents = Vec::with_capacity(total);

    for (index, row) in job.rows.iter().enumerate() {
        if control.is_cancelled() {
            info!("Generation cancelled after {} of {} rows", index, total);
            report.cancelled = true;
            break;
        }

        let values: Vec<String> = mappings.iter().map(|m| row.text(&m.field)).collect();
        let filename = job.filename.filename_for(row);

        let template = Arc::clone(&job.template);
        let font = Arc::clone(&font);
        let row_mappings = Arc::clone(&mappings);
        let row_options = options.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            render_row(&template, &font, &row_mappings, &values, &row_options, index)
        })
        .await?;

        match outcome {
            Ok(rendered) => {
                for warning in &rendered.warnings {
                    warn!("{}", warning);
                }
                report.warnings.extend(rendered.warnings);
                debug!("Row {}: {} ({} bytes)", index + 1, filename, rendered.bytes.len());
                documents.push(GeneratedDocument {
                    bytes: rendered.bytes,
                    filename,
                    row: index,
                });
            }
            Err(e) => {
                warn!("Row {} produced no document: {}", index + 1, e);
                report.row_failures.push(RowFailure {
                    row: index,
                    message: e.to_string(),
                });
            }
        }

        control.report_progress(index + 1, total);
    }

    report.documents = documents.len();
    info!(
        "Generated {} of {} documents ({} warnings, {} failed rows)",
        report.documents,
        total,
        report.warnings.len(),
        report.row_failures.len()
    );

    Ok(BatchOutput { documents, report })
}

// =============================================================================
// Single Row
// =============================================================================

struct RenderedRow {
    bytes: Vec<u8>,
    warnings: Vec<StampWarning>,
}

/// Stamped text with characters that have no place in a single text line removed
fn printable(value: &str) -> String {
    value.chars().filter(|c| !c.is_control()).collect()
}

fn render_row(
    template: &Template,
    font: &FontProgram,
    mappings: &[FieldMapping],
    values: &[String],
    options: &GenerationOptions,
    row: usize,
) -> Result<RenderedRow> {
    let mut doc = template.fresh_copy()?;
    let page_ids = doc.get_pages();
    let page_count = template.page_count();

    let mut warnings = Vec::new();
    let mut used: BTreeMap<u16, char> = BTreeMap::new();
    let mut placed: BTreeMap<u32, Vec<PlacedText>> = BTreeMap::new();

    for (mapping_index, (mapping, value)) in mappings.iter().zip(values).enumerate() {
        let page_size = match template.page_size(mapping.page) {
            Some(size) => size,
            None => {
                warnings.push(StampWarning {
                    row,
                    mapping_index,
                    field: mapping.field.clone(),
                    kind: StampWarningKind::MissingPage {
                        page: mapping.page,
                        page_count,
                    },
                });
                continue;
            }
        };

        let text = printable(value);
        let run = font.layout(&text)?;
        if !run.missing.is_empty() {
            warnings.push(StampWarning {
                row,
                mapping_index,
                field: mapping.field.clone(),
                kind: StampWarningKind::MissingGlyphs {
                    chars: run.missing.iter().collect(),
                },
            });
        }
        if run.glyphs.is_empty() {
            continue;
        }

        for (&gid, ch) in run.glyphs.iter().zip(text.chars()) {
            used.entry(gid).or_insert(ch);
        }

        let width = font.units_to_points(run.advance_units, options.font_size_pt);
        placed.entry(mapping.page).or_default().push(PlacedText {
            x: anchor_x(mapping.x, width, options.align),
            y: flip_to_pdf(mapping.y, page_size.height, options.vertical_offset_pt),
            glyphs: run.glyphs,
        });
    }

    if !placed.is_empty() {
        let embedded = embed_subset(&mut doc, font, &used)?;
        for (page, texts) in placed {
            let page_id = *page_ids.get(&page).ok_or(FieldMapError::InvalidPage {
                page,
                page_count,
            })?;
            let texts: Vec<PlacedText> = texts
                .into_iter()
                .map(|text| PlacedText {
                    glyphs: embedded.codes(&text.glyphs),
                    ..text
                })
                .collect();
            stamp_page(&mut doc, page_id, embedded.font_id, options.font_size_pt, &texts)?;
        }
    }

    if options.compress {
        doc.compress();
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;

    Ok(RenderedRow { bytes, warnings })
}
