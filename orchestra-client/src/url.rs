//! API URL template

use reqwest::Url;

use crate::error::{ClientError, Result};

/// Production endpoint template
pub const DEFAULT_API_URL: &str = "https://app.getorchestra.io/api/engine/public/pipelines/{}";

/// Placeholder substituted with the endpoint-specific suffix
const PLACEHOLDER: &str = "{}";

/// Base URL with a single `{}` substitution point for the endpoint suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiUrl {
    template: String,
}

impl ApiUrl {
    /// Parse a URL template
    ///
    /// The template must use http(s) and contain exactly one `{}`.
    ///
    /// # Example
    /// ```
    /// use orchestra_client::ApiUrl;
    ///
    /// let url = ApiUrl::parse("http://localhost:8000/pipelines/{}").unwrap();
    /// assert_eq!(url.endpoint("schema"), "http://localhost:8000/pipelines/schema");
    /// ```
    pub fn parse(template: impl Into<String>) -> Result<Self> {
        let template = template.into().trim().to_string();

        let placeholders = template.matches(PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(ClientError::InvalidUrl(format!(
                "`{}` must contain exactly one `{{}}` placeholder, found {}",
                template, placeholders
            )));
        }

        if !template.starts_with("http://") && !template.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "`{}` must start with http:// or https://",
                template
            )));
        }

        Url::parse(&template.replace(PLACEHOLDER, "endpoint"))
            .map_err(|e| ClientError::InvalidUrl(format!("`{}`: {}", template, e)))?;

        Ok(Self { template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Full URL for an endpoint suffix
    ///
    /// An empty suffix addresses the collection root, without a trailing slash.
    pub fn endpoint(&self, suffix: &str) -> String {
        let url = self.template.replacen(PLACEHOLDER, suffix, 1);
        if suffix.is_empty() {
            url.trim_end_matches('/').to_string()
        } else {
            url
        }
    }

    /// Full URL for `prefix` followed by one percent-encoded path segment
    ///
    /// Use this for server-issued identifiers, which may contain `/`, `?` or `#`.
    pub fn endpoint_segment(&self, prefix: &str, segment: &str) -> Result<String> {
        let mut url = Url::parse(&self.endpoint(prefix))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(format!("`{}` cannot take a path", self.template)))?
            .pop_if_empty()
            .push(segment);

        Ok(url.into())
    }

    /// Web app URL for editing a pipeline, on the same origin as the API
    pub fn edit_url(&self, pipeline_id: &str) -> Result<String> {
        let url = Url::parse(&self.endpoint(""))
            .map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        Ok(format!(
            "{}/pipelines/{}/edit",
            url.origin().ascii_serialization(),
            pipeline_id
        ))
    }
}

impl Default for ApiUrl {
    fn default() -> Self {
        Self {
            template: DEFAULT_API_URL.to_string(),
        }
    }
}
