//! Schema validation endpoint

use orchestra_core::domain::validation::ValidationResult;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

use crate::OrchestraClient;
use crate::error::{ClientError, Result};

/// Schema validation is a quick call; fail faster than the default timeout
const SCHEMA_TIMEOUT: Duration = Duration::from_secs(15);

impl OrchestraClient {
    /// Validate a pipeline document against the hosted schema
    ///
    /// No authentication is required.
    ///
    /// A 200 response is parsed for an error list (none means valid); a string
    /// `detail` there is only a message. A 400 or 422 response carrying errors
    /// means the document is invalid. Any
    /// other failure means the validation request itself failed.
    pub async fn validate_schema(&self, document: &JsonValue) -> Result<ValidationResult> {
        let url = self.api_url.endpoint("schema");
        debug!(url = %url, "Validating pipeline document");

        let response = self
            .client
            .post(&url)
            .timeout(SCHEMA_TIMEOUT)
            .json(document)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success()
            && status != StatusCode::BAD_REQUEST
            && status != StatusCode::UNPROCESSABLE_ENTITY
        {
            return Err(Self::error_from_response(response).await);
        }

        let text = response.text().await?;
        let body: JsonValue = serde_json::from_str(&text).unwrap_or(JsonValue::Null);

        if status.is_success() {
            return Ok(match ValidationResult::issue_list_from_body(&body) {
                Some(issues) => ValidationResult::from_issues(issues),
                None => ValidationResult::valid(),
            });
        }

        match ValidationResult::issues_from_body(&body) {
            Some(issues) if !issues.is_empty() => Ok(ValidationResult::from_issues(issues)),
            _ => Err(ClientError::from_status(
                status.as_u16(),
                crate::error_message(status, &text),
            )),
        }
    }
}
