use pdf_fieldmap::*;
use std::time::Duration;
use tempfile::TempDir;

fn document(filename: &str, row: usize) -> GeneratedDocument {
    GeneratedDocument {
        bytes: format!("%PDF-1.7 row {}", row).into_bytes(),
        filename: filename.to_string(),
        row,
    }
}

#[tokio::test(start_paused = true)]
async fn test_emit_paced_waits_between_documents() {
    let mut sink = MemorySink::default();
    let documents = vec![
        document("a.pdf", 0),
        document("b.pdf", 1),
        document("c.pdf", 2),
    ];

    let start = tokio::time::Instant::now();
    let delivered = emit_paced(documents, &mut sink, Duration::from_millis(500), None)
        .await
        .unwrap();

    assert_eq!(delivered, 3);
    // Two gaps for three documents, none before the first
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(1500));
    let names: Vec<&str> = sink.documents.iter().map(|d| d.filename.as_str()).collect();
    assert_eq!(names, vec!["a.pdf", "b.pdf", "c.pdf"]);
}

#[tokio::test(start_paused = true)]
async fn test_emit_paced_single_document_is_immediate() {
    let mut sink = MemorySink::default();
    let start = tokio::time::Instant::now();
    emit_paced(
        vec![document("only.pdf", 0)],
        &mut sink,
        Duration::from_millis(500),
        None,
    )
    .await
    .unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test]
async fn test_directory_sink_writes_files() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("generated");
    let mut sink = DirectorySink::create(&out).await.unwrap();

    let delivered = emit_paced(
        vec![document("invoice-Ann.pdf", 0), document("invoice-Bob.pdf", 1)],
        &mut sink,
        Duration::ZERO,
        None,
    )
    .await
    .unwrap();

    assert_eq!(delivered, 2);
    assert_eq!(sink.written().len(), 2);
    let written = std::fs::read(out.join("invoice-Bob.pdf")).unwrap();
    assert_eq!(written, b"%PDF-1.7 row 1".to_vec());
}

#[tokio::test]
async fn test_directory_sink_colliding_names_overwrite() {
    let dir = TempDir::new().unwrap();
    let mut sink = DirectorySink::create(dir.path()).await.unwrap();

    sink.deliver(document("same.pdf", 0)).await.unwrap();
    sink.deliver(document("same.pdf", 1)).await.unwrap();

    assert_eq!(sink.written().len(), 2);
    let written = std::fs::read(dir.path().join("same.pdf")).unwrap();
    assert_eq!(written, b"%PDF-1.7 row 1".to_vec());
}

#[tokio::test]
async fn test_directory_sink_keeps_files_inside_dir() {
    let dir = TempDir::new().unwrap();
    let mut sink = DirectorySink::create(dir.path()).await.unwrap();

    sink.deliver(document("../escape.pdf", 0)).await.unwrap();

    assert!(dir.path().join(".._escape.pdf").exists());
    assert!(sink.written()[0].starts_with(dir.path()));
}
