use crate::{DocumentId, GenerateRequest, PdfCommand, PdfUpdate};
use pdf_fieldmap::{
    BatchJob, CancelFlag, DirectorySink, GeneratedDocument, OutputSink, RunControl, Template,
    emit_paced, generate_documents,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Loaded templates, shared read-only with generation runs
#[derive(Default)]
struct TemplateStore {
    templates: HashMap<DocumentId, Arc<Template>>,
    next_id: u64,
}

impl TemplateStore {
    fn insert(&mut self, template: Template) -> DocumentId {
        self.next_id += 1;
        let doc_id = DocumentId(self.next_id);
        self.templates.insert(doc_id, Arc::new(template));
        doc_id
    }

    fn get(&self, doc_id: DocumentId) -> Option<Arc<Template>> {
        self.templates.get(&doc_id).cloned()
    }

    fn remove(&mut self, doc_id: DocumentId) -> bool {
        self.templates.remove(&doc_id).is_some()
    }
}

/// Directory sink that reports every file it writes
struct NotifyingSink<'a> {
    inner: DirectorySink,
    update_tx: &'a mpsc::UnboundedSender<PdfUpdate>,
}

impl OutputSink for NotifyingSink<'_> {
    async fn deliver(&mut self, document: GeneratedDocument) -> pdf_fieldmap::Result<()> {
        let row = document.row;
        self.inner.deliver(document).await?;
        if let Some(path) = self.inner.written().last() {
            let _ = self.update_tx.send(PdfUpdate::DocumentSaved {
                path: path.clone(),
                row,
            });
        }
        Ok(())
    }
}

/// Async worker task that processes PDF commands and sends updates
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<PdfCommand>,
    update_tx: mpsc::UnboundedSender<PdfUpdate>,
) {
    let mut store = TemplateStore::default();

    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut store, &update_tx).await;
    }
    log::debug!("Command channel closed, worker exiting");
}

async fn process_command(
    cmd: PdfCommand,
    store: &mut TemplateStore,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    match cmd {
        PdfCommand::LoadTemplate { path } => handle_load_template(path, store, update_tx).await,
        PdfCommand::LoadSpreadsheet { path } => handle_load_spreadsheet(path, update_tx).await,
        PdfCommand::Generate {
            doc_id,
            request,
            cancel,
        } => match store.get(doc_id) {
            Some(template) => handle_generate(template, *request, cancel, update_tx).await,
            None => send_error(update_tx, format!("Unknown template {:?}", doc_id)),
        },
        PdfCommand::CloseTemplate { doc_id } => {
            if store.remove(doc_id) {
                let _ = update_tx.send(PdfUpdate::TemplateClosed { doc_id });
            } else {
                send_error(update_tx, format!("Unknown template {:?}", doc_id));
            }
        }
    }
}

fn send_error(update_tx: &mpsc::UnboundedSender<PdfUpdate>, message: String) {
    log::error!("{}", message);
    let _ = update_tx.send(PdfUpdate::Error { message });
}

async fn handle_load_template(
    path: PathBuf,
    store: &mut TemplateStore,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    match Template::load(&path).await {
        Ok(template) => {
            let page_sizes = template.page_sizes().to_vec();
            let doc_id = store.insert(template);
            let _ = update_tx.send(PdfUpdate::TemplateLoaded {
                doc_id,
                path,
                page_sizes,
            });
        }
        Err(e) => send_error(update_tx, format!("Failed to load template: {e}")),
    }
}

async fn handle_load_spreadsheet(path: PathBuf, update_tx: &mpsc::UnboundedSender<PdfUpdate>) {
    match pdf_sheet::load_rows(&path).await {
        Ok(data) => {
            let _ = update_tx.send(PdfUpdate::SpreadsheetLoaded { path, data });
        }
        Err(e) => send_error(update_tx, format!("Failed to load spreadsheet: {e}")),
    }
}

async fn handle_generate(
    template: Arc<Template>,
    request: GenerateRequest,
    cancel: Option<CancelFlag>,
    update_tx: &mpsc::UnboundedSender<PdfUpdate>,
) {
    // Forward pipeline progress as protocol updates
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<pdf_fieldmap::BatchProgress>();
    let forward_tx = update_tx.clone();
    let forwarder = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            let _ = forward_tx.send(PdfUpdate::Progress {
                operation: "Generating documents".to_string(),
                current: progress.current,
                total: progress.total,
            });
        }
    });

    let control = RunControl {
        cancel: cancel.clone(),
        progress: Some(progress_tx),
    };
    let job = BatchJob {
        template,
        mappings: &request.mappings,
        rows: &request.rows,
        columns: &request.columns,
        filename: &request.filename,
    };
    let result = generate_documents(job, &request.font, &request.options, &control).await;

    // Closing the progress channel lets the forwarder finish
    drop(control);
    let _ = forwarder.await;

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            send_error(update_tx, format!("Failed to generate documents: {e}"));
            return;
        }
    };

    let inner = match DirectorySink::create(&request.output_dir).await {
        Ok(sink) => sink,
        Err(e) => {
            send_error(update_tx, format!("Failed to create output directory: {e}"));
            return;
        }
    };
    let mut sink = NotifyingSink { inner, update_tx };

    match emit_paced(
        output.documents,
        &mut sink,
        request.options.pacing(),
        cancel.as_ref(),
    )
    .await
    {
        Ok(saved) => {
            let _ = update_tx.send(PdfUpdate::GenerateComplete {
                output_dir: request.output_dir,
                saved,
                report: output.report,
            });
        }
        Err(e) => send_error(update_tx, format!("Failed to save documents: {e}")),
    }
}
