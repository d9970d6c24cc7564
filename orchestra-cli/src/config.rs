//! Configuration module
//!
//! Settings resolved once from flags and environment in `main`, then passed
//! to the API client and run controller.

use orchestra_client::{ApiUrl, OrchestraClient};
use std::time::Duration;

use crate::error::CommandError;

/// Fixed delay between run status queries
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Endpoint template for the Orchestra API
    pub api_url: ApiUrl,
    /// Bearer token, required by import, create, update and run
    pub api_key: Option<String>,
    /// Delay between status queries while waiting on a run
    pub poll_interval: Duration,
}

impl Config {
    pub fn new(api_url: ApiUrl, api_key: Option<String>) -> Self {
        Self {
            api_url,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Build the configuration from raw flag/env values
    pub fn from_args(base_url: &str, api_key: Option<String>) -> Result<Self, CommandError> {
        let api_url = ApiUrl::parse(base_url)?;
        let config = Self::new(api_url, api_key);
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), CommandError> {
        if self.poll_interval.is_zero() {
            return Err(CommandError::Config(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The API key, or an auth error when none is configured
    ///
    /// Commands call this before doing anything that touches the network.
    pub fn require_api_key(&self) -> Result<&str, CommandError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| CommandError::Auth("ORCHESTRA_API_KEY is not set".to_string()))
    }

    /// API client for this configuration
    pub fn client(&self) -> Result<OrchestraClient, CommandError> {
        Ok(OrchestraClient::new(
            self.api_url.clone(),
            self.api_key.clone(),
        )?)
    }
}
