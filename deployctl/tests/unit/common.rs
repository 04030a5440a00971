//! Shared test doubles

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use deployctl::errors::ClientError;
use deployctl::form::fields::FormFields;
use deployctl::http::deployments::DeployApi;
use deployctl::models::deployment::{AttemptKey, DeployRequest, DeployResult};
use deployctl::present::Presenter;

pub const REPO_URL: &str = "https://github.com/octo/demo-task";
pub const PAGES_URL: &str = "https://octo.github.io/demo-task/";

pub fn accepted() -> DeployResult {
    DeployResult {
        status: Some("accepted".to_string()),
        ..Default::default()
    }
}

pub fn pending() -> DeployResult {
    DeployResult {
        status: Some("pending".to_string()),
        ..Default::default()
    }
}

pub fn finished(repo_url: &str, pages_url: Option<&str>) -> DeployResult {
    DeployResult {
        repo_url: Some(repo_url.to_string()),
        pages_url: pages_url.map(str::to_string),
        commit_sha: Some("0a1b2c3".to_string()),
        message: Some("App built and deployed successfully".to_string()),
        ..Default::default()
    }
}

pub fn transport_error() -> ClientError {
    ClientError::TransportError("503 Service Unavailable: ".to_string())
}

pub fn sample_fields(wait_for_result: bool) -> FormFields {
    FormFields {
        email: "student@example.com".to_string(),
        secret: "mysharedsecret".to_string(),
        task: "demo-task".to_string(),
        round: "1".to_string(),
        brief: "Create a single page showing Hello".to_string(),
        checks: r#"["page has a title", {"js": "document.title.length > 0"}]"#.to_string(),
        evaluation_url: "http://127.0.0.1:9000/eval".to_string(),
        attachments: r#"[{"name": "sample.csv", "url": "data:text/csv;base64,YSxiCg=="}]"#
            .to_string(),
        wait_for_result,
    }
}

/// A deploy service that answers from scripts and records every call.
///
/// Once a script runs dry, submissions are acknowledged and result queries
/// report pending.
#[derive(Default)]
pub struct ScriptedApi {
    submit_script: Mutex<VecDeque<(Duration, Result<DeployResult, ClientError>)>>,
    poll_script: Mutex<VecDeque<Result<DeployResult, ClientError>>>,
    submits: Mutex<Vec<DeployRequest>>,
    polls: Mutex<Vec<(AttemptKey, Instant)>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submit(self, response: Result<DeployResult, ClientError>) -> Self {
        self.with_delayed_submit(Duration::ZERO, response)
    }

    pub fn with_delayed_submit(
        self,
        delay: Duration,
        response: Result<DeployResult, ClientError>,
    ) -> Self {
        self.submit_script.lock().unwrap().push_back((delay, response));
        self
    }

    pub fn with_polls(self, responses: Vec<Result<DeployResult, ClientError>>) -> Self {
        self.poll_script.lock().unwrap().extend(responses);
        self
    }

    pub fn submits(&self) -> Vec<DeployRequest> {
        self.submits.lock().unwrap().clone()
    }

    pub fn polls(&self) -> Vec<(AttemptKey, Instant)> {
        self.polls.lock().unwrap().clone()
    }

    pub fn poll_count(&self) -> usize {
        self.polls.lock().unwrap().len()
    }
}

#[async_trait]
impl DeployApi for ScriptedApi {
    async fn submit_deploy(&self, request: &DeployRequest) -> Result<DeployResult, ClientError> {
        self.submits.lock().unwrap().push(request.clone());
        let scripted = self.submit_script.lock().unwrap().pop_front();
        match scripted {
            Some((delay, response)) => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                response
            }
            None => Ok(accepted()),
        }
    }

    async fn fetch_result(&self, key: &AttemptKey) -> Result<DeployResult, ClientError> {
        self.polls.lock().unwrap().push((key.clone(), Instant::now()));
        let scripted = self.poll_script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(pending()))
    }
}

/// Records everything shown to the user
#[derive(Default)]
pub struct RecordingPresenter {
    statuses: Mutex<Vec<String>>,
    previews: Mutex<Vec<String>>,
}

impl RecordingPresenter {
    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<String> {
        self.statuses.lock().unwrap().last().cloned()
    }

    pub fn previews(&self) -> Vec<String> {
        self.previews.lock().unwrap().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn set_status(&self, message: &str) {
        self.statuses.lock().unwrap().push(message.to_string());
    }

    fn show_preview(&self, url: &str) {
        self.previews.lock().unwrap().push(url.to_string());
    }
}
