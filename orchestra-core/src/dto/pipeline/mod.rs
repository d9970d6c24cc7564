//! Pipeline DTOs

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::pipeline::{PipelineAlias, StorageProvider};
use crate::domain::repo::RepoMetadata;

/// Request to register a pipeline stored in a git repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportPipeline {
    pub storage_provider: StorageProvider,
    pub repository: String,
    pub default_branch: String,
    /// Path of the pipeline YAML relative to the repository root
    pub yaml_path: String,
    pub alias: PipelineAlias,
}

impl ImportPipeline {
    pub fn new(alias: PipelineAlias, yaml_path: impl Into<String>, repo: &RepoMetadata) -> Self {
        Self {
            storage_provider: repo.storage_provider,
            repository: repo.repository.clone(),
            default_branch: repo.default_branch.clone(),
            yaml_path: yaml_path.into(),
            alias,
        }
    }
}

/// Request to create or update an Orchestra-hosted pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertPipeline {
    /// Parsed pipeline document
    pub data: JsonValue,
    pub published: bool,
    pub storage_provider: StorageProvider,
    /// Only sent on create; updates address the pipeline by URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<PipelineAlias>,
}

impl UpsertPipeline {
    pub fn new(data: JsonValue, published: bool, alias: Option<PipelineAlias>) -> Self {
        Self {
            data,
            published,
            storage_provider: StorageProvider::Orchestra,
            alias,
        }
    }
}

/// Response body of the import, create and update endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineCreated {
    #[serde(default, deserialize_with = "super::optional_id")]
    pub pipeline_id: Option<String>,
    #[serde(default, deserialize_with = "super::optional_id")]
    pub id: Option<String>,
}

impl PipelineCreated {
    /// Pipeline id, preferring `pipeline_id` over `id`
    pub fn pipeline_id(&self) -> Option<&str> {
        [&self.pipeline_id, &self.id]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|id| !id.is_empty())
    }
}
