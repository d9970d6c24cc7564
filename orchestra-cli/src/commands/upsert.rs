//! Create/update command handlers for Orchestra-hosted pipelines

use clap::Args;
use colored::*;
use orchestra_client::PipelineApi;
use orchestra_core::domain::pipeline::PipelineAlias;
use orchestra_core::dto::pipeline::UpsertPipeline;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::commands::validate::load_validated_document;
use crate::config::Config;
use crate::error::CommandError;

/// Arguments shared by `create-pipeline` and `update-pipeline`
#[derive(Debug, Args)]
pub struct UpsertArgs {
    /// Pipeline alias
    #[arg(short, long)]
    pub alias: PipelineAlias,

    /// Path to the pipeline YAML
    #[arg(short, long)]
    pub path: PathBuf,

    /// Publish the pipeline so it can be triggered
    #[arg(long, overrides_with = "no_publish")]
    pub publish: bool,

    /// Keep the pipeline unpublished (default)
    #[arg(long, overrides_with = "publish")]
    pub no_publish: bool,
}

impl UpsertArgs {
    fn published(&self) -> bool {
        self.publish && !self.no_publish
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Create,
    Update,
}

impl fmt::Display for UpsertAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertAction::Create => write!(f, "created"),
            UpsertAction::Update => write!(f, "updated"),
        }
    }
}

pub async fn handle_upsert(
    config: &Config,
    action: UpsertAction,
    args: UpsertArgs,
) -> Result<(), CommandError> {
    let client = config.client()?;

    let pipeline_id = upsert_pipeline(
        &client,
        config,
        action,
        &args.alias,
        &args.path,
        args.published(),
    )
    .await?;

    println!(
        "{}",
        format!(
            "✅ Pipeline '{}' {} successfully: {}",
            args.alias, action, pipeline_id
        )
        .green()
    );
    let edit_url = config.api_url.edit_url(&pipeline_id)?;
    println!("{}", format!("Edit URL: {}", edit_url).yellow());

    Ok(())
}

/// Validate the document and create or update the pipeline
///
/// Returns the pipeline id reported by the API. The alias travels in the
/// body on create and in the URL on update.
pub async fn upsert_pipeline<A: PipelineApi + ?Sized>(
    api: &A,
    config: &Config,
    action: UpsertAction,
    alias: &PipelineAlias,
    path: &Path,
    published: bool,
) -> Result<String, CommandError> {
    config.require_api_key()?;

    let data = load_validated_document(api, path).await?;

    let created = match action {
        UpsertAction::Create => {
            let req = UpsertPipeline::new(data, published, Some(alias.clone()));
            api.create_pipeline(&req).await?
        }
        UpsertAction::Update => {
            let req = UpsertPipeline::new(data, published, None);
            api.update_pipeline(alias, &req).await?
        }
    };

    let pipeline_id = created.pipeline_id().map(str::to_string).ok_or_else(|| {
        CommandError::UnexpectedResponse("success response did not include pipeline id".to_string())
    })?;

    info!(%alias, %action, %pipeline_id, "Pipeline saved");
    Ok(pipeline_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeApi;
    use orchestra_client::{ApiUrl, ClientError};
    use orchestra_core::dto::pipeline::PipelineCreated;
    use serde_json::json;
    use std::fs;

    fn config() -> Config {
        Config::new(ApiUrl::default(), Some("key".to_string()))
    }

    fn alias() -> PipelineAlias {
        PipelineAlias::parse("demo").unwrap()
    }

    fn pipeline_file(dir: &tempfile::TempDir) -> PathBuf {
        let file = dir.path().join("pipeline.yaml");
        fs::write(&file, "version: v1\nname: demo\n").unwrap();
        file
    }

    #[tokio::test]
    async fn test_create_sends_alias_in_body() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::new();

        let id = upsert_pipeline(
            &api,
            &config(),
            UpsertAction::Create,
            &alias(),
            &pipeline_file(&dir),
            true,
        )
        .await
        .unwrap();

        assert_eq!(id, "p-1");
        assert_eq!(api.calls(), vec!["validate_schema", "create_pipeline"]);
        let sent = &api.upserted()[0];
        assert_eq!(sent.alias, Some(alias()));
        assert!(sent.published);
        assert_eq!(sent.data, json!({ "version": "v1", "name": "demo" }));
    }

    #[tokio::test]
    async fn test_update_keeps_alias_out_of_body() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::new();

        upsert_pipeline(
            &api,
            &config(),
            UpsertAction::Update,
            &alias(),
            &pipeline_file(&dir),
            false,
        )
        .await
        .unwrap();

        assert_eq!(api.calls(), vec!["validate_schema", "update_pipeline"]);
        let sent = &api.upserted()[0];
        assert_eq!(sent.alias, None);
        assert!(!sent.published);
    }

    #[tokio::test]
    async fn test_missing_id_is_unexpected() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::new().with_upsert(Ok(PipelineCreated::default()));

        let err = upsert_pipeline(
            &api,
            &config(),
            UpsertAction::Create,
            &alias(),
            &pipeline_file(&dir),
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CommandError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_update_unknown_alias() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::new().with_upsert(Err(ClientError::from_status(404, "no such alias")));

        let err = upsert_pipeline(
            &api,
            &config(),
            UpsertAction::Update,
            &alias(),
            &pipeline_file(&dir),
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CommandError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_token_makes_no_calls() {
        let dir = tempfile::tempdir().unwrap();
        let api = FakeApi::new();
        let config = Config::new(ApiUrl::default(), None);

        let err = upsert_pipeline(
            &api,
            &config,
            UpsertAction::Create,
            &alias(),
            &pipeline_file(&dir),
            false,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CommandError::Auth(_)));
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(UpsertAction::Create.to_string(), "created");
        assert_eq!(UpsertAction::Update.to_string(), "updated");
    }
}
