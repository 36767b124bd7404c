use std::fs;

use insta::assert_snapshot;
use tempfile::TempDir;

use mailsheet_core::{MessageTemplates, RecipientSource, render_row};
use mailsheet_mail::{MailCredentials, MailError, Provider, build_message};
use mailsheet_model::{ColumnMapping, SymbolTable};

#[test]
fn loads_credentials_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mail.json");
    fs::write(
        &path,
        r#"{"provider":"outlook","username":"t@school.org","app_password":"pw",
            "subject":"{course} results","message":"Hello\n{data}"}"#,
    )
    .unwrap();

    let credentials = MailCredentials::load(&path).unwrap();
    assert_eq!(credentials.provider, Provider::Outlook);
    assert_snapshot!(credentials.smtp.host, @"smtp.office365.com");
    assert_eq!(credentials.subject, "{course} results");
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let err = MailCredentials::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, MailError::ReadCredentials { .. }));
}

#[test]
fn credentials_drive_a_rendered_message() {
    let credentials = MailCredentials::from_json(
        r#"{"provider":"gmail","username":"t@school.org","app_password":"pw",
            "subject":"{course} results","message":"Hi <team>\n{data}",
            "body_format":"text","symbols":{"{course}":"Algebra"}}"#,
    )
    .unwrap();
    let mapping: ColumnMapping = vec![(0, "Name".to_string()), (1, "Email".to_string())]
        .into_iter()
        .collect();
    let templates = MessageTemplates {
        subject: credentials.subject.clone(),
        body: credentials.message.clone(),
        sender: credentials.sender.clone(),
        recipient: RecipientSource::Column(1),
        format: credentials.markup.body_format(),
        formatter: credentials.markup.formatter(),
    };
    let row = vec!["Ann".to_string(), "ann@x.com".to_string()];
    let symbols: SymbolTable = credentials.symbols.clone();

    let message = render_row(&mapping, 0, &row, &templates, &symbols, None).unwrap();
    assert_snapshot!(message.subject, @"Algebra results");
    assert_eq!(
        message.body,
        "Hi &lt;team&gt;<br/>\nName: Ann<br/>\nEmail: ann@x.com<br/>\n"
    );

    let email = build_message(&message).unwrap();
    assert_eq!(
        email.envelope().from().map(ToString::to_string).as_deref(),
        Some("t@school.org")
    );
}
