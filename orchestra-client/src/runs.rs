//! Run-related API endpoints

use orchestra_core::domain::pipeline::PipelineAlias;
use orchestra_core::domain::run::{RunHandle, RunStatus};
use orchestra_core::dto::run::{RunStarted, RunStatusResponse, StartRun};
use tracing::debug;

use crate::OrchestraClient;
use crate::error::{ClientError, Result};

impl OrchestraClient {
    // =============================================================================
    // Run Lifecycle
    // =============================================================================

    /// Start a run of the pipeline registered under `alias`
    ///
    /// A body is only sent when a branch or commit override is given.
    ///
    /// # Returns
    /// The handle of the started run
    ///
    /// # Errors
    /// `NotFound` for an unknown alias, `ParseError` when the response
    /// carries no run id.
    pub async fn start_run(&self, alias: &PipelineAlias, req: &StartRun) -> Result<RunHandle> {
        let url = self.api_url.endpoint(&format!("{}/start", alias));
        debug!(url = %url, "Starting run");

        let mut request = self.authorized(self.client.post(&url))?;
        if !req.is_empty() {
            request = request.json(req);
        }
        let response = request.send().await?;

        let started: RunStarted = self.handle_optional_response(response).await?;
        started.handle().ok_or_else(|| {
            ClientError::ParseError("start response did not include a run id".to_string())
        })
    }

    /// Get the current status of a run
    ///
    /// # Arguments
    /// * `handle` - The handle returned by [`OrchestraClient::start_run`]
    pub async fn get_run_status(&self, handle: &RunHandle) -> Result<RunStatus> {
        let url = self.api_url.endpoint_segment("runs", handle.as_str())?;
        debug!(url = %url, "Fetching run status");

        let response = self.authorized(self.client.get(&url))?.send().await?;

        let body: RunStatusResponse = self.handle_response(response).await?;
        Ok(body.status)
    }
}
