//! Pipeline domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-chosen name identifying a registered pipeline
///
/// The alias is substituted into request URLs, so it must be a single
/// non-empty path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineAlias(String);

impl PipelineAlias {
    /// Parse and validate an alias
    pub fn parse(input: &str) -> Result<Self, String> {
        let alias = input.trim();

        if alias.is_empty() {
            return Err("pipeline alias cannot be empty".to_string());
        }

        if let Some(c) = alias
            .chars()
            .find(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%'))
        {
            return Err(format!(
                "pipeline alias `{}` contains invalid character {:?}",
                alias, c
            ));
        }

        Ok(Self(alias.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PipelineAlias {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PipelineAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the pipeline definition is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageProvider {
    Github,
    Gitlab,
    AzureDevops,
    Bitbucket,
    /// Hosted by Orchestra itself (no git repository)
    Orchestra,
}

impl StorageProvider {
    /// Detect the storage provider from a raw git remote URL
    ///
    /// Unknown hosts and a missing remote map to [`StorageProvider::Orchestra`].
    pub fn from_remote_url(remote_url: Option<&str>) -> Self {
        let Some(url) = remote_url else {
            return Self::Orchestra;
        };
        let url = url.to_lowercase();

        if url.contains("github.com") {
            Self::Github
        } else if url.contains("gitlab.com") {
            Self::Gitlab
        } else if url.contains("dev.azure.com")
            || url.contains("azure.com")
            || url.contains("visualstudio.com")
        {
            Self::AzureDevops
        } else if url.contains("bitbucket.org") {
            Self::Bitbucket
        } else {
            Self::Orchestra
        }
    }
}

impl fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageProvider::Github => write!(f, "GITHUB"),
            StorageProvider::Gitlab => write!(f, "GITLAB"),
            StorageProvider::AzureDevops => write!(f, "AZURE_DEVOPS"),
            StorageProvider::Bitbucket => write!(f, "BITBUCKET"),
            StorageProvider::Orchestra => write!(f, "ORCHESTRA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_parse_trims_and_accepts() {
        let alias = PipelineAlias::parse("  nightly-etl ").unwrap();
        assert_eq!(alias.as_str(), "nightly-etl");
        assert_eq!(alias.to_string(), "nightly-etl");
    }

    #[test]
    fn test_alias_parse_rejects_invalid() {
        assert!(PipelineAlias::parse("").is_err());
        assert!(PipelineAlias::parse("   ").is_err());
        assert!(PipelineAlias::parse("a/b").is_err());
        assert!(PipelineAlias::parse("two words").is_err());
        assert!(PipelineAlias::parse("q?x=1").is_err());
    }

    #[test]
    fn test_storage_provider_detection() {
        let cases = [
            (Some("git@github.com:org/repo.git"), StorageProvider::Github),
            (Some("https://gitlab.com/org/repo.git"), StorageProvider::Gitlab),
            (
                Some("https://org@dev.azure.com/org/project/_git/repo"),
                StorageProvider::AzureDevops,
            ),
            (
                Some("https://org.visualstudio.com/project/_git/repo"),
                StorageProvider::AzureDevops,
            ),
            (Some("git@bitbucket.org:team/repo.git"), StorageProvider::Bitbucket),
            (Some("https://git.internal.example/repo.git"), StorageProvider::Orchestra),
            (None, StorageProvider::Orchestra),
        ];

        for (url, expected) in cases {
            assert_eq!(StorageProvider::from_remote_url(url), expected, "{:?}", url);
        }
    }

    #[test]
    fn test_storage_provider_wire_format() {
        let json = serde_json::to_string(&StorageProvider::AzureDevops).unwrap();
        assert_eq!(json, "\"AZURE_DEVOPS\"");
        assert_eq!(StorageProvider::AzureDevops.to_string(), "AZURE_DEVOPS");
    }
}
