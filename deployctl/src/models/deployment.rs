//! Deployment models

use serde::{Deserialize, Serialize};

/// A deploy request sent to the submit endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployRequest {
    pub email: String,

    /// Shared secret, forwarded as entered
    pub secret: String,

    pub task: String,

    /// Build round; `None` when the field was not numeric (sent as `null`)
    pub round: Option<i64>,

    /// Attempt-scoped token correlating this request with its result queries
    pub nonce: String,

    pub brief: String,

    /// Checks the evaluator will run, passed through untyped
    pub checks: Vec<serde_json::Value>,

    pub evaluation_url: String,

    /// Files attached to the brief, passed through untyped
    pub attachments: Vec<serde_json::Value>,

    /// Ask the service to build synchronously and answer with the result
    pub wait_for_result: bool,
}

impl DeployRequest {
    /// The identity used to query this attempt's result
    pub fn attempt_key(&self) -> AttemptKey {
        AttemptKey {
            email: self.email.clone(),
            task: self.task.clone(),
            nonce: self.nonce.clone(),
        }
    }
}

/// Identity of one deploy attempt; also the result endpoint's query string
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptKey {
    pub email: String,
    pub task: String,
    pub nonce: String,
}

impl std::fmt::Display for AttemptKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.email, self.task, self.nonce)
    }
}

/// Response of the submit and result endpoints.
///
/// An acknowledgement (`{"status": "accepted"}`) or a pending marker
/// (`{"status": "pending"}`) decodes with every URL absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeployResult {
    #[serde(default)]
    pub repo_url: Option<String>,

    #[serde(default)]
    pub pages_url: Option<String>,

    #[serde(default)]
    pub commit_sha: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub task: Option<String>,

    #[serde(default)]
    pub round: Option<serde_json::Value>,
}

impl DeployResult {
    /// Repository URL, if present and non-empty
    pub fn repo_url(&self) -> Option<&str> {
        self.repo_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Live preview URL, if present and non-empty
    pub fn pages_url(&self) -> Option<&str> {
        self.pages_url.as_deref().filter(|url| !url.is_empty())
    }

    /// A result with a repository URL ends the attempt
    pub fn is_terminal(&self) -> bool {
        self.repo_url().is_some()
    }
}
