//! Deploy service API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ClientError;
use crate::http::client::HttpClient;
use crate::models::deployment::{AttemptKey, DeployRequest, DeployResult};

/// Deploy service operations used by the submission controller
#[async_trait]
pub trait DeployApi: Send + Sync {
    /// Submit a deploy request
    async fn submit_deploy(&self, request: &DeployRequest) -> Result<DeployResult, ClientError>;

    /// Query the stored result of one attempt
    async fn fetch_result(&self, key: &AttemptKey) -> Result<DeployResult, ClientError>;
}

/// Health endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token_valid: Option<bool>,
}

impl HttpClient {
    /// Check that the deploy service is up
    pub async fn check_health(&self) -> Result<HealthStatus, ClientError> {
        self.get(&self.routes().health, &[] as &[(&str, &str)]).await
    }
}

#[async_trait]
impl DeployApi for HttpClient {
    async fn submit_deploy(&self, request: &DeployRequest) -> Result<DeployResult, ClientError> {
        self.post(&self.routes().submit, request).await
    }

    async fn fetch_result(&self, key: &AttemptKey) -> Result<DeployResult, ClientError> {
        // A `null` body means nothing is stored yet
        let result: Option<DeployResult> = self.get(&self.routes().result, key).await?;
        Ok(result.unwrap_or_default())
    }
}
