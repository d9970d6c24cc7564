//! Orchestra HTTP Client
//!
//! A small, type-safe HTTP client for the Orchestra public pipelines API.
//!
//! The client wraps the remote operations used by the CLI: schema validation,
//! pipeline import/create/update and run start/status. Every endpoint is
//! addressed through a single [`ApiUrl`] template, and every failure is
//! reported as a [`ClientError`] whose variant tells the caller what went
//! wrong (missing token, unknown alias, conflict, transient failure, ...).
//!
//! # Example
//!
//! ```no_run
//! use orchestra_client::{ApiUrl, OrchestraClient};
//! use orchestra_core::domain::pipeline::PipelineAlias;
//! use orchestra_core::dto::run::StartRun;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OrchestraClient::new(ApiUrl::default(), Some("api-key".to_string()))?;
//!
//!     let alias = PipelineAlias::parse("nightly-etl").map_err(anyhow::Error::msg)?;
//!     let handle = client.start_run(&alias, &StartRun::default()).await?;
//!
//!     println!("Started run: {}", handle);
//!     Ok(())
//! }
//! ```

pub mod error;
mod pipelines;
mod runs;
mod schema;
#[cfg(test)]
mod testing;
mod url;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use url::{ApiUrl, DEFAULT_API_URL};

use async_trait::async_trait;
use orchestra_core::domain::pipeline::PipelineAlias;
use orchestra_core::domain::run::{RunHandle, RunStatus};
use orchestra_core::domain::validation::ValidationResult;
use orchestra_core::dto::pipeline::{ImportPipeline, PipelineCreated, UpsertPipeline};
use orchestra_core::dto::run::StartRun;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

/// Default timeout applied to every request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Operations the CLI performs against the Orchestra API
///
/// Implemented by [`OrchestraClient`]; tests drive the run controller and
/// commands with scripted implementations.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Validate a parsed pipeline document against the hosted schema
    async fn validate_schema(&self, document: &JsonValue) -> Result<ValidationResult>;

    /// Register a pipeline stored in a git repository
    async fn import_pipeline(&self, req: &ImportPipeline) -> Result<PipelineCreated>;

    /// Create an Orchestra-hosted pipeline
    async fn create_pipeline(&self, req: &UpsertPipeline) -> Result<PipelineCreated>;

    /// Update an Orchestra-hosted pipeline
    async fn update_pipeline(
        &self,
        alias: &PipelineAlias,
        req: &UpsertPipeline,
    ) -> Result<PipelineCreated>;

    /// Start a run of the pipeline registered under `alias`
    async fn start_run(&self, alias: &PipelineAlias, req: &StartRun) -> Result<RunHandle>;

    /// Fetch the current status of a run
    async fn get_run_status(&self, handle: &RunHandle) -> Result<RunStatus>;
}

/// HTTP client for the Orchestra public pipelines API
#[derive(Debug, Clone)]
pub struct OrchestraClient {
    /// Endpoint template (e.g., "https://host/api/engine/public/pipelines/{}")
    api_url: ApiUrl,
    /// Bearer token for authenticated endpoints
    api_key: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl OrchestraClient {
    /// Create a new client with the default request timeout
    ///
    /// # Arguments
    /// * `api_url` - Endpoint template
    /// * `api_key` - Bearer token; only required by authenticated endpoints
    pub fn new(api_url: ApiUrl, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(api_url, api_key, client))
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(api_url: ApiUrl, api_key: Option<String>, client: Client) -> Self {
        Self {
            api_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
        }
    }

    /// Get the endpoint template
    pub fn api_url(&self) -> &ApiUrl {
        &self.api_url
    }

    /// Attach the bearer token, failing before any request is sent when
    /// no key is configured
    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let key = self.api_key.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(builder.bearer_auth(key))
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "API response");

        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response whose body may be empty
    ///
    /// An empty success body yields `T::default()`.
    async fn handle_optional_response<T: DeserializeOwned + Default>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "API response");

        if !status.is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Convert an error response into the matching [`ClientError`]
    async fn error_from_response(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        ClientError::from_status(status.as_u16(), error_message(status, &error_text))
    }
}

/// Human-readable message from an error response body
///
/// Prefers a string `detail`, `error` or `message` field, then the JSON body
/// pretty-printed, then the raw text.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<JsonValue>(body) {
        for key in ["detail", "error", "message"] {
            if let Some(JsonValue::String(message)) = json.get(key) {
                return message.clone();
            }
        }
        if !json.is_null() {
            return serde_json::to_string_pretty(&json).unwrap_or_else(|_| body.to_string());
        }
    }

    let body = body.trim();
    if body.is_empty() {
        status.canonical_reason().unwrap_or("Unknown error").to_string()
    } else {
        body.to_string()
    }
}

#[async_trait]
impl PipelineApi for OrchestraClient {
    async fn validate_schema(&self, document: &JsonValue) -> Result<ValidationResult> {
        OrchestraClient::validate_schema(self, document).await
    }

    async fn import_pipeline(&self, req: &ImportPipeline) -> Result<PipelineCreated> {
        OrchestraClient::import_pipeline(self, req).await
    }

    async fn create_pipeline(&self, req: &UpsertPipeline) -> Result<PipelineCreated> {
        OrchestraClient::create_pipeline(self, req).await
    }

    async fn update_pipeline(
        &self,
        alias: &PipelineAlias,
        req: &UpsertPipeline,
    ) -> Result<PipelineCreated> {
        OrchestraClient::update_pipeline(self, alias, req).await
    }

    async fn start_run(&self, alias: &PipelineAlias, req: &StartRun) -> Result<RunHandle> {
        OrchestraClient::start_run(self, alias, req).await
    }

    async fn get_run_status(&self, handle: &RunHandle) -> Result<RunStatus> {
        OrchestraClient::get_run_status(self, handle).await
    }
}
