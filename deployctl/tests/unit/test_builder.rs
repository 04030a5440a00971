//! Request builder tests

use std::collections::HashSet;

use deployctl::errors::ClientError;
use deployctl::form::builder::build;
use deployctl::form::fields::FormFields;
use deployctl::utils::NONCE_PREFIX;

use crate::common::sample_fields;

#[test]
fn test_build_copies_fields() {
    let fields = sample_fields(true);
    let request = build(&fields).unwrap();

    assert_eq!(request.email, "student@example.com");
    assert_eq!(request.secret, "mysharedsecret");
    assert_eq!(request.task, "demo-task");
    assert_eq!(request.round, Some(1));
    assert_eq!(request.brief, "Create a single page showing Hello");
    assert_eq!(request.evaluation_url, "http://127.0.0.1:9000/eval");
    assert!(request.wait_for_result);

    assert_eq!(request.checks.len(), 2);
    assert_eq!(request.checks[0], serde_json::json!("page has a title"));
    assert_eq!(
        request.attachments,
        vec![serde_json::json!({
            "name": "sample.csv",
            "url": "data:text/csv;base64,YSxiCg==",
        })]
    );
    assert!(request.nonce.starts_with(NONCE_PREFIX));
}

#[test]
fn test_every_build_gets_a_new_nonce() {
    let fields = sample_fields(false);
    let nonces: HashSet<String> = (0..200).map(|_| build(&fields).unwrap().nonce).collect();
    assert_eq!(nonces.len(), 200);
}

#[test]
fn test_blank_lists_are_empty() {
    let mut fields = sample_fields(false);
    fields.checks = String::new();
    fields.attachments = "   ".to_string();

    let request = build(&fields).unwrap();
    assert!(request.checks.is_empty());
    assert!(request.attachments.is_empty());
}

#[test]
fn test_malformed_checks_fail() {
    let mut fields = sample_fields(false);
    fields.checks = r#"["first", "second""#.to_string();

    match build(&fields) {
        Err(ClientError::ParseError { field, .. }) => assert_eq!(field, "checks"),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_attachments_keep_every_key() {
    let mut fields = sample_fields(false);
    fields.attachments =
        r#"[{"name": "a.csv", "url": "data:,x", "mime": "text/csv"}, {"name": "b.png"}]"#
            .to_string();

    let request = build(&fields).unwrap();
    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(
        body["attachments"],
        serde_json::json!([
            {"name": "a.csv", "url": "data:,x", "mime": "text/csv"},
            {"name": "b.png"},
        ])
    );
}

#[test]
fn test_malformed_attachments_fail() {
    let mut fields = sample_fields(false);
    fields.attachments = r#"[{"name": "a.csv", "url": "https://x/a.csv"}, {"name": }]"#.to_string();

    let err = build(&fields).unwrap_err();
    assert!(err.is_parse_error());
    assert!(err.to_string().starts_with("Invalid attachments"));
}

#[test]
fn test_non_numeric_round_is_sent_as_null() {
    let mut fields = sample_fields(false);
    fields.round = "second".to_string();

    let request = build(&fields).unwrap();
    assert_eq!(request.round, None);
    let body = serde_json::to_value(&request).unwrap();
    assert!(body["round"].is_null());
}

#[test]
fn test_integral_round_text_is_a_number() {
    let mut fields = sample_fields(false);
    fields.round = "2.0".to_string();

    let body = serde_json::to_value(build(&fields).unwrap()).unwrap();
    assert_eq!(body["round"], serde_json::json!(2));
}

#[test]
fn test_empty_form_builds() {
    let request = build(&FormFields::default()).unwrap();
    assert_eq!(request.round, Some(0));
    assert!(!request.wait_for_result);
    assert!(request.checks.is_empty());
}
