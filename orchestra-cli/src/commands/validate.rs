//! Validate command handler

use colored::*;
use orchestra_client::PipelineApi;
use orchestra_core::domain::validation::ValidationResult;
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::debug;

use crate::config::Config;
use crate::document::load_document;
use crate::error::CommandError;

pub async fn handle_validate(config: &Config, file: &Path) -> Result<(), CommandError> {
    let client = config.client()?;

    load_validated_document(&client, file).await?;

    println!("{}", "✅ Validation passed".green());
    Ok(())
}

/// Check a parsed document against the hosted schema
///
/// A rejected document becomes [`CommandError::ValidationFailure`] carrying
/// the reported issues.
pub async fn validate_document<A: PipelineApi + ?Sized>(
    api: &A,
    document: &JsonValue,
) -> Result<ValidationResult, CommandError> {
    let result = api.validate_schema(document).await?;
    debug!(valid = result.is_valid, issues = result.errors.len(), "Schema validation finished");

    if !result.is_valid {
        return Err(CommandError::ValidationFailure(result));
    }

    Ok(result)
}

/// Load `path` and validate it, returning the parsed document
///
/// YAML problems are reported before any network call.
pub async fn load_validated_document<A: PipelineApi + ?Sized>(
    api: &A,
    path: &Path,
) -> Result<JsonValue, CommandError> {
    let document = load_document(path)?;
    validate_document(api, &document).await?;
    Ok(document)
}
