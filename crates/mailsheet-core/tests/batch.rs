//! Integration tests for batch building.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use mailsheet_core::{
    AttachmentExtractor, AttachmentSource, BatchOptions, BoxError, CoreError, ExtractRequest,
    MessageTemplates, RecipientSource, build_batch, resolve_headers,
};
use mailsheet_model::{
    BodyFormat, FailurePolicy, HeaderBand, SendInterval, SheetData, SymbolTable, XLSX_MIME_TYPE,
};

fn sheet(rows: &[&[&str]]) -> SheetData {
    SheetData::new(
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect(),
    )
}

fn templates() -> MessageTemplates {
    MessageTemplates {
        subject: "Report for {course}".to_string(),
        body: "<p>Dear student,</p>\n{data}<p>Bye</p>".to_string(),
        sender: "office@school.org".to_string(),
        recipient: RecipientSource::Column(1),
        format: BodyFormat::Html,
        formatter: None,
    }
}

fn roster() -> SheetData {
    sheet(&[
        &["Student", "", "Grade"],
        &["Name", "Email", ""],
        &["Ann", "ann@x.com", "A"],
        &["Bob", "bob@x.com", "B"],
        &["Cid", "cid@x.com; cid.parent@x.com", "C"],
        &["Dee", "dee@x.com", "B"],
        &["Eve", "eve@x.com", "A"],
    ])
}

struct RecordingExtractor {
    dir: PathBuf,
    requests: RefCell<Vec<(usize, usize, String)>>,
    fail_on_offset: Option<usize>,
}

impl RecordingExtractor {
    fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            requests: RefCell::new(Vec::new()),
            fail_on_offset: None,
        }
    }
}

impl AttachmentExtractor for RecordingExtractor {
    fn extract_single_row(&self, request: &ExtractRequest<'_>) -> Result<PathBuf, BoxError> {
        if self.fail_on_offset == Some(request.data_row_offset) {
            return Err("sheet missing".into());
        }
        self.requests.borrow_mut().push((
            request.header_end_row,
            request.data_row_offset,
            request.file_name.to_string(),
        ));
        let path = self.dir.join(request.file_name);
        fs::write(&path, format!("row {}", request.data_row()))?;
        Ok(path)
    }
}

#[test]
fn renders_every_row_in_order() {
    let data = roster();
    let mapping = resolve_headers(&data, HeaderBand::new(0, 1).unwrap()).unwrap();
    assert_eq!(
        mapping.names().collect::<Vec<_>>(),
        vec!["Student Name", "Email", "Grade"]
    );

    let symbols = SymbolTable::new().with("{course}", "Rust 101");
    let batch = build_batch(
        data.rows_from(2),
        &mapping,
        &templates(),
        &symbols,
        None,
        &BatchOptions::default(),
    )
    .unwrap();

    assert_eq!(batch.len(), 5);
    assert!(batch.skipped.is_empty());
    let first = &batch.messages[0];
    assert_eq!(first.subject, "Report for Rust 101");
    assert_eq!(first.sender, "office@school.org");
    assert_eq!(first.to, vec!["ann@x.com"]);
    insta::assert_snapshot!(first.body, @r"
    <p>Dear student,</p>
    Student Name: Ann<br/>
    Email: ann@x.com<br/>
    Grade: A<br/>
    <p>Bye</p>
    ");
    assert_eq!(
        batch.messages[2].to,
        vec!["cid@x.com", "cid.parent@x.com"]
    );
}

#[test]
fn post_processing_applies_in_order() {
    let data = roster();
    let mapping = resolve_headers(&data, HeaderBand::new(0, 1).unwrap()).unwrap();
    let options = BatchOptions {
        force_to: Some("qa@x.com".to_string()),
        cc: vec!["office@x.com".to_string()],
        interval: SendInterval::new(Some(1), Some(3)),
        row_failure: FailurePolicy::FailFast,
    };
    let batch = build_batch(
        data.rows_from(2),
        &mapping,
        &templates(),
        &SymbolTable::new(),
        None,
        &options,
    )
    .unwrap();

    let rows: Vec<_> = batch.messages.iter().map(|message| message.row).collect();
    assert_eq!(rows, vec![1, 2]);
    for message in &batch.messages {
        assert_eq!(message.to, vec!["qa@x.com"]);
        assert_eq!(message.cc, vec!["office@x.com"]);
    }
}

#[test]
fn short_row_aborts_by_default() {
    let data = sheet(&[&["Name", "Email"], &["Ann", "ann@x.com"], &["Bob"]]);
    let mapping = resolve_headers(&data, HeaderBand::single(0)).unwrap();
    let err = build_batch(
        data.rows_from(1),
        &mapping,
        &templates(),
        &SymbolTable::new(),
        None,
        &BatchOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::RowWidth { row: 1, column: 1, width: 1 }));
}

#[test]
fn short_row_is_skipped_in_best_effort() {
    let data = sheet(&[
        &["Name", "Email"],
        &["Ann", "ann@x.com"],
        &["Bob"],
        &["Cid", "cid@x.com"],
    ]);
    let mapping = resolve_headers(&data, HeaderBand::single(0)).unwrap();
    let options = BatchOptions {
        row_failure: FailurePolicy::BestEffort,
        interval: SendInterval::new(Some(1), None),
        ..BatchOptions::default()
    };
    let batch = build_batch(
        data.rows_from(1),
        &mapping,
        &templates(),
        &SymbolTable::new(),
        None,
        &options,
    )
    .unwrap();

    assert_eq!(batch.skipped.len(), 1);
    assert_eq!(batch.skipped[0].row, 1);
    // The interval counts rendered messages, so position 1 is Cid.
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.messages[0].to, vec!["cid@x.com"]);
}

#[test]
fn attachments_are_extracted_per_row() {
    let dir = tempfile::tempdir().unwrap();
    let extractor = RecordingExtractor::new(dir.path());
    let source_path = dir.path().join("roster.xlsx");
    let source = AttachmentSource {
        path: &source_path,
        sheet_name: "Grades",
        header_end_row: 2,
        extractor: &extractor,
    };
    let data = roster();
    let mapping = resolve_headers(&data, HeaderBand::new(0, 1).unwrap()).unwrap();
    let batch = build_batch(
        &data.rows_from(2)[..2],
        &mapping,
        &templates(),
        &SymbolTable::new(),
        Some(&source),
        &BatchOptions::default(),
    )
    .unwrap();

    let requests = extractor.requests.borrow();
    assert_eq!(
        *requests,
        vec![
            (2, 0, "ann_0000.xlsx".to_string()),
            (2, 1, "bob_0001.xlsx".to_string()),
        ]
    );
    let attachment = batch.messages[1].attachment.as_ref().unwrap();
    assert_eq!(attachment.file_name, "bob_0001.xlsx");
    assert_eq!(attachment.mime_type, XLSX_MIME_TYPE);
    assert_eq!(attachment.content, b"row 4");
}

#[test]
fn attachment_failure_propagates() {
    let dir = tempfile::tempdir().unwrap();
    let mut extractor = RecordingExtractor::new(dir.path());
    extractor.fail_on_offset = Some(1);
    let source_path = dir.path().join("roster.xlsx");
    let source = AttachmentSource {
        path: &source_path,
        sheet_name: "Grades",
        header_end_row: 2,
        extractor: &extractor,
    };
    let data = roster();
    let mapping = resolve_headers(&data, HeaderBand::new(0, 1).unwrap()).unwrap();
    let err = build_batch(
        data.rows_from(2),
        &mapping,
        &templates(),
        &SymbolTable::new(),
        Some(&source),
        &BatchOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CoreError::AttachmentExtraction { row: 1, .. }));
    assert!(err.to_string().contains("sheet missing"));
}
