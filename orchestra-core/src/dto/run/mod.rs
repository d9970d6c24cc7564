//! Run DTOs

use serde::{Deserialize, Serialize};

use crate::domain::run::{RunHandle, RunStatus};

/// Optional overrides sent when starting a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
}

impl StartRun {
    pub fn is_empty(&self) -> bool {
        self.branch.is_none() && self.commit.is_none()
    }
}

/// Response body of the start endpoint
///
/// The run identifier is reported under one of several field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStarted {
    #[serde(default, deserialize_with = "super::optional_id")]
    pub execution_id: Option<String>,
    #[serde(default, deserialize_with = "super::optional_id")]
    pub run_id: Option<String>,
    #[serde(default, deserialize_with = "super::optional_id")]
    pub id: Option<String>,
}

impl RunStarted {
    /// Run handle, checking `execution_id`, then `run_id`, then `id`
    pub fn handle(&self) -> Option<RunHandle> {
        [&self.execution_id, &self.run_id, &self.id]
            .into_iter()
            .flatten()
            .find(|id| !id.is_empty())
            .map(|id| RunHandle::new(id.as_str()))
    }
}

/// Response body of the run status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatusResponse {
    pub status: RunStatus,
}
