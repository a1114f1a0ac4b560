use pdf_fieldmap::{RowSource, Scalar};
use pdf_sheet::*;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

#[tokio::test]
async fn test_load_csv() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invoices.csv");
    std::fs::write(&path, "Name,Amount\nSomchai,500\nAnn,42\n").unwrap();

    let data = load_rows(&path).await.unwrap();
    assert_eq!(data.row_count(), 2);
    assert_eq!(data.source_stem, "invoices");
    assert_eq!(data.rows[0].text("Name"), "Somchai");
    assert_eq!(data.rows[1].text("Amount"), "42");
}

#[tokio::test]
async fn test_load_xlsx() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Roster.xlsx");

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Name").unwrap();
    sheet.write_string(0, 1, "Amount").unwrap();
    sheet.write_string(0, 2, "Name").unwrap();
    sheet.write_string(1, 0, "Somchai").unwrap();
    sheet.write_number(1, 1, 500).unwrap();
    sheet.write_string(1, 2, "Second").unwrap();
    sheet.write_string(3, 0, "Ann").unwrap();
    sheet.write_boolean(3, 1, true).unwrap();
    workbook.save(&path).unwrap();

    let data = load_rows(&path).await.unwrap();
    assert_eq!(data.source_stem, "Roster");
    // Blank row 3 is skipped
    assert_eq!(data.row_count(), 2);
    assert_eq!(
        data.columns.names(),
        &["Name".to_string(), "Amount".to_string(), "Name_1".to_string()][..]
    );
    assert_eq!(data.rows[0].get("Amount"), Some(&Scalar::Number(500.0)));
    assert_eq!(data.rows[0].text("Amount"), "500");
    assert_eq!(data.rows[0].text("Name_1"), "Second");
    assert_eq!(data.rows[1].get("Amount"), Some(&Scalar::Bool(true)));
    assert!(!data.rows[1].contains("Name_1"));
}

#[tokio::test]
async fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "Name\nAnn\n").unwrap();

    let result = load_rows(&path).await;
    assert!(matches!(result, Err(SheetError::UnsupportedFormat(ext)) if ext == "txt"));
}

#[tokio::test]
async fn test_missing_file() {
    let result = load_rows("/nonexistent/rows.csv").await;
    assert!(matches!(result, Err(SheetError::Io(_))));
}

#[tokio::test]
async fn test_corrupt_workbook() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"definitely not a zip").unwrap();

    let result = load_rows(&path).await;
    assert!(matches!(result, Err(SheetError::Spreadsheet(_))));
}

#[test]
fn test_extension_is_case_insensitive() {
    assert_eq!(SheetFormat::from_extension("CSV").unwrap(), SheetFormat::Csv);
    assert_eq!(SheetFormat::from_extension("Xlsx").unwrap(), SheetFormat::Workbook);
    assert_eq!(SheetFormat::from_extension("ods").unwrap(), SheetFormat::Workbook);
}
