//! HTTP client implementation

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::errors::ClientError;

/// Endpoint paths of the deploy service
#[derive(Debug, Clone)]
pub struct Routes {
    pub submit: String,
    pub result: String,
    pub health: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            submit: "/api-endpoint".to_string(),
            result: "/result".to_string(),
            health: "/health".to_string(),
        }
    }
}

/// HTTP client for deploy service communication
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    routes: Routes,
    request_timeout: Duration,
    submit_timeout: Option<Duration>,
}

impl HttpClient {
    /// Create a new HTTP client.
    ///
    /// `request_timeout` bounds GET requests. POST requests are unbounded
    /// unless [`HttpClient::with_submit_timeout`] sets a limit, since a
    /// synchronous deploy builds inside the request.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ClientError> {
        // Reject malformed base URLs up front rather than on first request
        Url::parse(base_url)?;

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            routes: Routes::default(),
            request_timeout,
            submit_timeout: None,
        })
    }

    /// Use non-default endpoint paths
    pub fn with_routes(mut self, routes: Routes) -> Self {
        self.routes = routes;
        self
    }

    /// Bound POST requests; `None` waits for as long as the service takes
    pub fn with_submit_timeout(mut self, submit_timeout: Option<Duration>) -> Self {
        self.submit_timeout = submit_timeout;
        self
    }

    /// Timeout applied to GET requests
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Timeout applied to POST requests, if any
    pub fn submit_timeout(&self) -> Option<Duration> {
        self.submit_timeout
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the endpoint paths
    pub fn routes(&self) -> &Routes {
        &self.routes
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    /// Make a GET request with query parameters
    pub async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ClientError> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(self.request_timeout)
            .send()
            .await?;
        let response = check_status("GET", response).await?;
        Ok(response.json().await?)
    }

    /// Make a POST request with a JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let mut request = self.client.post(url).json(body);
        if let Some(timeout) = self.submit_timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await?;
        let response = check_status("POST", response).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(method: &str, response: Response) -> Result<Response, ClientError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error!("HTTP {} failed: {} - {}", method, status, body);
    Err(ClientError::TransportError(format!("{}: {}", status, body)))
}
