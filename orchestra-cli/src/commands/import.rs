//! Import command handler
//!
//! Registers a pipeline YAML that lives in a git repository. The document is
//! validated first, then the repository metadata is derived from local git
//! state and sent along with the alias.

use colored::*;
use orchestra_client::PipelineApi;
use orchestra_core::domain::pipeline::PipelineAlias;
use orchestra_core::dto::pipeline::ImportPipeline;
use std::path::Path;
use tracing::info;

use crate::commands::validate::load_validated_document;
use crate::config::Config;
use crate::error::CommandError;
use crate::git::{CommandExecutor, GitIntrospector, relative_yaml_path};

/// Everything needed to submit an import
#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub request: ImportPipeline,
    /// Repository state warnings, in display order
    pub warnings: Vec<String>,
}

pub async fn handle_import(
    config: &Config,
    alias: PipelineAlias,
    path: &Path,
) -> Result<(), CommandError> {
    let client = config.client()?;
    let git = GitIntrospector::system();

    let plan = prepare_import(&client, &git, config, alias, path).await?;

    for warning in &plan.warnings {
        eprintln!("{}", format!("⚠ {}", warning).yellow());
    }

    match submit_import(&client, &plan).await? {
        // bare id so scripts can capture it
        Some(id) => println!("{}", id),
        None => println!("{}", "✅ Pipeline imported successfully".green()),
    }

    Ok(())
}

/// Validate the document and build the import request
///
/// Fails before any network call when no API key is configured.
pub async fn prepare_import<A, E>(
    api: &A,
    git: &GitIntrospector<E>,
    config: &Config,
    alias: PipelineAlias,
    path: &Path,
) -> Result<ImportPlan, CommandError>
where
    A: PipelineApi + ?Sized,
    E: CommandExecutor,
{
    config.require_api_key()?;

    load_validated_document(api, path).await?;

    let file = path
        .canonicalize()
        .map_err(|_| CommandError::Input(format!("File not found: {}", path.display())))?;
    let parent = file.parent().unwrap_or(Path::new("/"));

    let repo_root = git.detect_repo_root(parent)?;
    let metadata = git.repo_metadata(&repo_root)?;
    let yaml_path = relative_yaml_path(&repo_root, &file)?;
    let warnings = git.collect_warnings(&repo_root);

    Ok(ImportPlan {
        request: ImportPipeline::new(alias, yaml_path, &metadata),
        warnings,
    })
}

/// Send the import request, returning the new pipeline id when reported
pub async fn submit_import<A: PipelineApi + ?Sized>(
    api: &A,
    plan: &ImportPlan,
) -> Result<Option<String>, CommandError> {
    let created = api.import_pipeline(&plan.request).await?;
    let id = created.pipeline_id().map(str::to_string);

    info!(alias = %plan.request.alias, pipeline_id = ?id, "Pipeline imported");
    Ok(id)
}
