//! Integration tests for the run stages.

use std::path::{Path, PathBuf};

use insta::assert_snapshot;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

use mailsheet_cli::pipeline::{
    PrepareOptions, RecipientChoice, SheetRequest, load_sheet, prepare_batch,
};
use mailsheet_core::BatchOptions;
use mailsheet_ingest::{SheetRange, SheetSource, read_local};
use mailsheet_mail::MailCredentials;
use mailsheet_model::{BodyFormat, FailurePolicy, SendInterval};

/// Writes `rows` into a sheet named "Term 1", leaving blank cells unset.
fn workbook(path: &Path, rows: &[[&str; 3]]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Term 1").unwrap();
    for (row, cells) in rows.iter().enumerate() {
        for (column, value) in cells.iter().enumerate() {
            if !value.is_empty() {
                sheet
                    .write_string(row as u32, column as u16, *value)
                    .unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

/// A title row, a two-line header and three students.
fn grades(dir: &Path) -> PathBuf {
    let path = dir.join("grades.xlsx");
    workbook(
        &path,
        &[
            ["Algebra", "", ""],
            ["Student", "Contact", "Final"],
            ["Name", "Email", "Grade"],
            ["Ann", "ann@x.com", "A"],
            ["Bob", "bob@x.com; bob@home.com", "B"],
            ["Cy", "", "C"],
        ],
    );
    path
}

fn credentials(format: &str) -> MailCredentials {
    credentials_with(format, r"Hello\n{data}")
}

fn credentials_with(format: &str, message: &str) -> MailCredentials {
    MailCredentials::from_json(&format!(
        r#"{{"provider":"gmail","username":"t@school.org","app_password":"pw",
            "subject":"{{course}}: grades for {{term}}","message":"{message}",
            "body_format":"{format}","symbols":{{"{{course}}":"Algebra","{{term}}":"Term 1"}}}}"#
    ))
    .unwrap()
}

fn options(recipient: RecipientChoice, attach_row: bool) -> PrepareOptions {
    PrepareOptions {
        recipient,
        attach_row,
        batch: BatchOptions::default(),
    }
}

#[test]
fn headers_span_two_lines() {
    let dir = TempDir::new().unwrap();
    let path = grades(dir.path());
    let source = SheetSource::from_identifier(path.to_str().unwrap(), None).unwrap();
    let request = SheetRequest::parse("Term 1", "A2:C6", "1-2", None).unwrap();

    let loaded = load_sheet(&source, &request).unwrap();
    let names: Vec<&str> = loaded.mapping.names().collect();
    assert_eq!(names, vec!["Student Name", "Contact Email", "Final Grade"]);
    assert_eq!(loaded.data_rows(&request).len(), 3);
}

#[test]
fn renders_one_message_per_row() {
    let dir = TempDir::new().unwrap();
    let path = grades(dir.path());
    let source = SheetSource::from_identifier(path.to_str().unwrap(), None).unwrap();
    let request = SheetRequest::parse("Term 1", "A2:C6", "1-2", None).unwrap();
    let loaded = load_sheet(&source, &request).unwrap();
    let work = TempDir::new().unwrap();

    let batch = prepare_batch(
        &source,
        &request,
        &loaded,
        &credentials("plain"),
        &options(
            RecipientChoice::MailColumn("Contact Email".to_string()),
            false,
        ),
        work.path(),
    )
    .unwrap();

    assert_eq!(batch.len(), 3);
    let ann = &batch.messages[0];
    assert_eq!(ann.format, BodyFormat::Plain);
    assert_snapshot!(ann.subject, @"Algebra: grades for Term 1");
    assert_eq!(
        ann.body,
        "Hello\nStudent Name: Ann\nContact Email: ann@x.com\nFinal Grade: A\n"
    );
    assert_eq!(ann.sender, "t@school.org");
    assert_eq!(batch.messages[1].to, vec!["bob@x.com", "bob@home.com"]);
    assert!(!batch.messages[2].has_recipients());
}

#[test]
fn text_bodies_are_converted_to_html() {
    let dir = TempDir::new().unwrap();
    let path = grades(dir.path());
    let source = SheetSource::from_identifier(path.to_str().unwrap(), None).unwrap();
    let request = SheetRequest::parse("Term 1", "A3:C6", "1", None).unwrap();
    let loaded = load_sheet(&source, &request).unwrap();
    let work = TempDir::new().unwrap();

    let batch = prepare_batch(
        &source,
        &request,
        &loaded,
        &credentials("text"),
        &options(RecipientChoice::MailColumn("Email".to_string()), false),
        work.path(),
    )
    .unwrap();
    assert_eq!(batch.messages[0].format, BodyFormat::Html);
    assert_eq!(
        batch.messages[0].body,
        "Hello<br/>\nName: Ann<br/>\nEmail: ann@x.com<br/>\nGrade: A<br/>\n"
    );
}

#[test]
fn html_templates_are_sent_as_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roster.xlsx");
    workbook(
        &path,
        &[
            ["Name", "Email", "Note"],
            ["<b>Ann</b>", "ann@x.com", "Tom & Jerry"],
        ],
    );
    let source = SheetSource::from_identifier(path.to_str().unwrap(), None).unwrap();
    let request = SheetRequest::parse("Term 1", "A1:C2", "1", None).unwrap();
    let loaded = load_sheet(&source, &request).unwrap();
    let work = TempDir::new().unwrap();

    let batch = prepare_batch(
        &source,
        &request,
        &loaded,
        &credentials_with("html", "<p>Hello</p>{data}"),
        &options(RecipientChoice::MailColumn("Email".to_string()), false),
        work.path(),
    )
    .unwrap();
    let ann = &batch.messages[0];
    assert_eq!(ann.format, BodyFormat::Html);
    assert_snapshot!(ann.body, @r"
    <p>Hello</p>Name: &lt;b&gt;Ann&lt;/b&gt;<br/>
    Email: ann@x.com<br/>
    Note: Tom &amp; Jerry<br/>
    ");
}

#[test]
fn overrides_and_interval_apply_after_rendering() {
    let dir = TempDir::new().unwrap();
    let path = grades(dir.path());
    let source = SheetSource::from_identifier(path.to_str().unwrap(), None).unwrap();
    let request = SheetRequest::parse("Term 1", "A3:C6", "1", None).unwrap();
    let loaded = load_sheet(&source, &request).unwrap();
    let work = TempDir::new().unwrap();

    let mut options = options(RecipientChoice::MailColumn("Email".to_string()), false);
    options.batch = BatchOptions {
        force_to: Some("me@school.org".to_string()),
        cc: vec!["office@school.org".to_string()],
        interval: SendInterval::new(Some(1), None),
        row_failure: FailurePolicy::FailFast,
    };
    let batch = prepare_batch(
        &source,
        &request,
        &loaded,
        &credentials("plain"),
        &options,
        work.path(),
    )
    .unwrap();

    let rows: Vec<usize> = batch.messages.iter().map(|message| message.row).collect();
    assert_eq!(rows, vec![1, 2]);
    for message in &batch.messages {
        assert_eq!(message.to, vec!["me@school.org"]);
        assert_eq!(message.cc, vec!["office@school.org"]);
    }
}

#[test]
fn unknown_mail_column_lists_headers() {
    let dir = TempDir::new().unwrap();
    let path = grades(dir.path());
    let source = SheetSource::from_identifier(path.to_str().unwrap(), None).unwrap();
    let request = SheetRequest::parse("Term 1", "A3:C6", "1", None).unwrap();
    let loaded = load_sheet(&source, &request).unwrap();
    let work = TempDir::new().unwrap();

    let err = prepare_batch(
        &source,
        &request,
        &loaded,
        &credentials("plain"),
        &options(RecipientChoice::MailColumn("Phone".to_string()), false),
        work.path(),
    )
    .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("available columns: Name, Email, Grade"), "{message}");
}

#[test]
fn attachments_hold_header_rows_and_own_row() {
    let dir = TempDir::new().unwrap();
    let path = grades(dir.path());
    let source = SheetSource::from_identifier(path.to_str().unwrap(), None).unwrap();
    let request = SheetRequest::parse("Term 1", "A2:C6", "1-2", None).unwrap();
    let loaded = load_sheet(&source, &request).unwrap();
    let work = TempDir::new().unwrap();

    let batch = prepare_batch(
        &source,
        &request,
        &loaded,
        &credentials("plain"),
        &options(RecipientChoice::Template("{course}@school.org".to_string()), true),
        work.path(),
    )
    .unwrap();

    let bob = &batch.messages[1];
    assert_eq!(bob.to, vec!["Algebra@school.org"]);
    let attachment = bob.attachment.as_ref().unwrap();
    assert_eq!(attachment.file_name, "Algebra_0001.xlsx");
    assert!(attachment.size() > 0);

    let written = work.path().join("attachments").join("Algebra_0001.xlsx");
    let data = read_local(&written, "Term 1", SheetRange::parse("A:C").unwrap()).unwrap();
    let first_cells: Vec<&str> = data.rows().iter().map(|row| row[0].as_str()).collect();
    assert_eq!(first_cells, vec!["Algebra", "Student", "Name", "Bob"]);
}
