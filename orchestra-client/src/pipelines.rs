//! Pipeline-related API endpoints

use orchestra_core::domain::pipeline::PipelineAlias;
use orchestra_core::dto::pipeline::{ImportPipeline, PipelineCreated, UpsertPipeline};
use tracing::debug;

use crate::OrchestraClient;
use crate::error::Result;

impl OrchestraClient {
    // =============================================================================
    // Pipeline Registration
    // =============================================================================

    /// Register a pipeline whose YAML lives in a git repository
    ///
    /// # Arguments
    /// * `req` - Alias, repository coordinates and YAML path
    ///
    /// # Returns
    /// The response body; the pipeline id is optional
    ///
    /// # Errors
    /// `MissingToken` without an API key, `Conflict` when the alias is taken.
    pub async fn import_pipeline(&self, req: &ImportPipeline) -> Result<PipelineCreated> {
        let url = self.api_url.endpoint("import");
        debug!(url = %url, alias = %req.alias, "Importing pipeline");

        let request = self.authorized(self.client.post(&url))?;
        let response = request.json(req).send().await?;

        self.handle_optional_response(response).await
    }

    /// Create an Orchestra-hosted pipeline
    ///
    /// # Example
    /// ```no_run
    /// # use orchestra_client::{ApiUrl, OrchestraClient};
    /// # use orchestra_core::domain::pipeline::PipelineAlias;
    /// # use orchestra_core::dto::pipeline::UpsertPipeline;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = OrchestraClient::new(ApiUrl::default(), Some("api-key".to_string()))?;
    /// let alias = PipelineAlias::parse("demo").map_err(anyhow::Error::msg)?;
    /// let created = client
    ///     .create_pipeline(&UpsertPipeline::new(serde_json::json!({"name": "demo"}), false, Some(alias)))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_pipeline(&self, req: &UpsertPipeline) -> Result<PipelineCreated> {
        let url = self.api_url.endpoint("");
        debug!(url = %url, "Creating pipeline");

        let request = self.authorized(self.client.post(&url))?;
        let response = request.json(req).send().await?;

        self.handle_optional_response(response).await
    }

    /// Update an Orchestra-hosted pipeline addressed by alias
    pub async fn update_pipeline(
        &self,
        alias: &PipelineAlias,
        req: &UpsertPipeline,
    ) -> Result<PipelineCreated> {
        let url = self.api_url.endpoint(alias.as_str());
        debug!(url = %url, "Updating pipeline");

        let request = self.authorized(self.client.put(&url))?;
        let response = request.json(req).send().await?;

        self.handle_optional_response(response).await
    }
}
