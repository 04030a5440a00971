//! One-shot and interactive run mode tests

use std::sync::Arc;
use std::time::Duration;

use deployctl::app::options::AppOptions;
use deployctl::app::run::{run_interactive, run_once};
use deployctl::controller::fsm::AttemptState;
use deployctl::controller::submission::STATUS_ACCEPTED;
use deployctl::form::fields::FormFields;

use crate::common::{finished, sample_fields, RecordingPresenter, ScriptedApi, PAGES_URL, REPO_URL};

#[tokio::test(start_paused = true)]
async fn test_run_once_polls_to_completion() {
    let api = Arc::new(ScriptedApi::new().with_polls(vec![Ok(finished(REPO_URL, Some(PAGES_URL)))]));
    let presenter = Arc::new(RecordingPresenter::default());

    let state = run_once(
        api.clone(),
        presenter.clone(),
        &AppOptions::default(),
        &sample_fields(false),
        std::future::pending(),
    )
    .await
    .unwrap();

    assert_eq!(state, AttemptState::Complete);
    assert_eq!(api.submits().len(), 1);
    assert_eq!(api.poll_count(), 1);
    assert_eq!(
        presenter.statuses(),
        vec![
            "Submitting...".to_string(),
            STATUS_ACCEPTED.to_string(),
            format!("Build complete - {}", REPO_URL),
        ]
    );
    assert_eq!(presenter.previews(), vec![PAGES_URL.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_run_once_rejects_malformed_checks() {
    let api = Arc::new(ScriptedApi::new());
    let presenter = Arc::new(RecordingPresenter::default());

    let mut fields = sample_fields(false);
    fields.checks = "[not json".to_string();

    let result = run_once(
        api.clone(),
        presenter.clone(),
        &AppOptions::default(),
        &fields,
        std::future::pending(),
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.is_parse_error());
    assert!(api.submits().is_empty());
    let status = presenter.last_status().unwrap();
    assert!(status.starts_with("Error: Invalid checks"), "{status}");
}

#[tokio::test(start_paused = true)]
async fn test_run_once_returns_on_shutdown() {
    // Polls never finish
    let api = Arc::new(ScriptedApi::new());
    let presenter = Arc::new(RecordingPresenter::default());

    let state = run_once(
        api.clone(),
        presenter,
        &AppOptions::default(),
        &sample_fields(false),
        tokio::time::sleep(Duration::from_secs(10)),
    )
    .await
    .unwrap();

    assert_eq!(state, AttemptState::Polling);
    assert_eq!(api.poll_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_interactive_submits_typed_form() {
    let api = Arc::new(ScriptedApi::new().with_polls(vec![Ok(finished(REPO_URL, None))]));
    let presenter = Arc::new(RecordingPresenter::default());

    let script: &[u8] = b"set email student@example.com\n\
        set task demo-task\n\
        set round 2\n\
        set brief Build a page that says hello\n\
        show\n\
        submit\n";

    let state = run_interactive(
        api.clone(),
        presenter.clone(),
        &AppOptions::default(),
        FormFields::default(),
        script,
        std::future::pending(),
    )
    .await
    .unwrap();

    assert_eq!(state, AttemptState::Complete);

    let submits = api.submits();
    assert_eq!(submits.len(), 1);
    assert_eq!(submits[0].email, "student@example.com");
    assert_eq!(submits[0].round, Some(2));
    assert_eq!(submits[0].brief, "Build a page that says hello");
    assert!(submits[0].checks.is_empty());
    assert!(submits[0].nonce.starts_with("n-"));
    assert!(presenter.previews().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_interactive_parse_error_keeps_going() {
    let api = Arc::new(ScriptedApi::new());
    let presenter = Arc::new(RecordingPresenter::default());

    let script: &[u8] = b"set attachments {broken\n\
        submit\n\
        bogus command\n\
        quit\n\
        submit\n";

    let state = run_interactive(
        api.clone(),
        presenter.clone(),
        &AppOptions::default(),
        sample_fields(false),
        script,
        std::future::pending(),
    )
    .await
    .unwrap();

    assert_eq!(state, AttemptState::Idle);
    assert!(api.submits().is_empty());
    let status = presenter.last_status().unwrap();
    assert!(status.starts_with("Error: Invalid attachments"), "{status}");
}
