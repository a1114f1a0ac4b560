//! Destinations for generated documents

use crate::pipeline::CancelFlag;
use crate::types::*;
use log::{debug, warn};
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Receives finished documents in order
pub trait OutputSink {
    fn deliver(&mut self, document: GeneratedDocument) -> impl Future<Output = Result<()>> + Send;
}

/// Writes each document as a file in one directory
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl DirectorySink {
    /// Use `dir` as the output directory, creating it if needed
    pub async fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_owned();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            written: Vec::new(),
            seen: HashSet::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in delivery order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        let safe: String = filename
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(safe)
    }
}

impl OutputSink for DirectorySink {
    async fn deliver(&mut self, document: GeneratedDocument) -> Result<()> {
        let path = self.path_for(&document.filename);
        if !self.seen.insert(path.clone()) {
            warn!(
                "Row {} overwrites {} written earlier in this run",
                document.row + 1,
                path.display()
            );
        }

        tokio::fs::write(&path, &document.bytes).await?;
        debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Keeps documents in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub documents: Vec<GeneratedDocument>,
}

impl OutputSink for MemorySink {
    async fn deliver(&mut self, document: GeneratedDocument) -> Result<()> {
        self.documents.push(document);
        Ok(())
    }
}

/// Deliver documents in order, waiting `pacing` between two deliveries.
///
/// Stops early when `cancel` is set; returns the number delivered.
pub async fn emit_paced<S: OutputSink>(
    documents: Vec<GeneratedDocument>,
    sink: &mut S,
    pacing: Duration,
    cancel: Option<&CancelFlag>,
) -> Result<usize> {
    let mut delivered = 0;

    for (i, document) in documents.into_iter().enumerate() {
        if i > 0 && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
        if cancel.is_some_and(CancelFlag::is_cancelled) {
            break;
        }
        sink.deliver(document).await?;
        delivered += 1;
    }

    Ok(delivered)
}
