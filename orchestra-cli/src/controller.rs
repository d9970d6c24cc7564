//! Run controller
//!
//! Starts a pipeline run and, when asked to wait, polls its status until a
//! terminal state:
//!
//! ```text
//! NOT_STARTED -> STARTED -> (POLLING)* -> TERMINAL
//! ```
//!
//! The start call is made exactly once. Any status query error ends the loop
//! immediately. The cancellation token is raced against every API call and
//! every sleep, so an interrupt is honoured at any point.

use orchestra_client::{ClientError, PipelineApi};
use orchestra_core::domain::pipeline::PipelineAlias;
use orchestra_core::domain::run::{RunHandle, RunStatus};
use orchestra_core::dto::run::StartRun;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What to run and whether to wait for it
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub alias: PipelineAlias,
    pub wait: bool,
    /// Branch/commit overrides sent with the start call
    pub overrides: StartRun,
}

/// Final state of one controller invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Started without waiting
    Started(RunHandle),
    /// Reached a terminal status
    Finished { handle: RunHandle, status: RunStatus },
    /// Interrupted locally; the remote run is left untouched
    CancelledLocally { handle: Option<RunHandle> },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            RunOutcome::Started(_) => true,
            RunOutcome::Finished { status, .. } => status.is_success(),
            RunOutcome::CancelledLocally { .. } => false,
        }
    }
}

/// Drives one run through start and polling
pub struct RunController<'a, A: PipelineApi + ?Sized> {
    api: &'a A,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl<'a, A: PipelineApi + ?Sized> RunController<'a, A> {
    pub fn new(api: &'a A, poll_interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            api,
            poll_interval,
            shutdown,
        }
    }

    /// Start the run and, if requested, wait for it to finish
    ///
    /// `on_status` is called with every status observed while polling.
    pub async fn execute(
        &self,
        request: &RunRequest,
        mut on_status: impl FnMut(&RunHandle, RunStatus),
    ) -> Result<RunOutcome, ClientError> {
        let handle = tokio::select! {
            biased;

            _ = self.shutdown.cancelled() => {
                info!(alias = %request.alias, "Cancelled before the run was started");
                return Ok(RunOutcome::CancelledLocally { handle: None });
            }

            result = self.api.start_run(&request.alias, &request.overrides) => result?,
        };

        info!(alias = %request.alias, run = %handle, "Run started");

        if !request.wait {
            return Ok(RunOutcome::Started(handle));
        }

        self.poll(handle, &mut on_status).await
    }

    async fn poll(
        &self,
        handle: RunHandle,
        on_status: &mut impl FnMut(&RunHandle, RunStatus),
    ) -> Result<RunOutcome, ClientError> {
        let mut polls: u64 = 0;

        loop {
            let status = tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    info!(run = %handle, polls, "Cancelled while querying status");
                    return Ok(RunOutcome::CancelledLocally { handle: Some(handle) });
                }

                result = self.api.get_run_status(&handle) => match result {
                    Ok(status) => status,
                    Err(e) => {
                        warn!(run = %handle, polls, error = %e, "Status query failed, giving up");
                        return Err(e);
                    }
                },
            };

            polls += 1;
            debug!(run = %handle, %status, polls, "Polled run status");
            on_status(&handle, status);

            if status.is_terminal() {
                info!(run = %handle, %status, polls, "Run reached terminal status");
                return Ok(RunOutcome::Finished { handle, status });
            }

            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    info!(run = %handle, polls, "Cancelled while waiting to poll");
                    return Ok(RunOutcome::CancelledLocally { handle: Some(handle) });
                }

                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::POLL_INTERVAL;
    use crate::testing::FakeApi;
    use tokio::time::Instant;

    fn request(wait: bool) -> RunRequest {
        RunRequest {
            alias: PipelineAlias::parse("demo").unwrap(),
            wait,
            overrides: StartRun::default(),
        }
    }

    #[tokio::test]
    async fn test_no_wait_never_polls() {
        let api = FakeApi::new().with_start(Ok(RunHandle::new("run-123")));
        let controller = RunController::new(&api, POLL_INTERVAL, CancellationToken::new());

        let outcome = controller.execute(&request(false), |_, _| {}).await.unwrap();

        assert_eq!(outcome, RunOutcome::Started(RunHandle::new("run-123")));
        assert_eq!(api.calls(), vec!["start_run"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_success() {
        let api = FakeApi::new().with_statuses(vec![
            Ok(RunStatus::Pending),
            Ok(RunStatus::Running),
            Ok(RunStatus::Running),
            Ok(RunStatus::Succeeded),
        ]);
        let controller = RunController::new(&api, POLL_INTERVAL, CancellationToken::new());
        let mut seen = Vec::new();
        let started = Instant::now();

        let outcome = controller
            .execute(&request(true), |_, status| seen.push(status))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Finished {
                handle: RunHandle::new("run-1"),
                status: RunStatus::Succeeded,
            }
        );
        assert!(outcome.is_success());
        assert_eq!(api.count("start_run"), 1);
        assert_eq!(api.count("get_run_status"), 4);
        assert_eq!(seen.len(), 4);
        // three sleeps between four queries
        assert_eq!(started.elapsed(), POLL_INTERVAL * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_failure() {
        let api = FakeApi::new().with_statuses(vec![
            Ok(RunStatus::Running),
            Ok(RunStatus::Failed),
        ]);
        let controller = RunController::new(&api, POLL_INTERVAL, CancellationToken::new());

        let outcome = controller.execute(&request(true), |_, _| {}).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Finished {
                handle: RunHandle::new("run-1"),
                status: RunStatus::Failed,
            }
        );
        assert!(!outcome.is_success());
        assert_eq!(api.count("get_run_status"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_remote_cancel_is_terminal() {
        let api = FakeApi::new().with_statuses(vec![Ok(RunStatus::Cancelled)]);
        let controller = RunController::new(&api, POLL_INTERVAL, CancellationToken::new());

        let outcome = controller.execute(&request(true), |_, _| {}).await.unwrap();

        assert!(matches!(
            outcome,
            RunOutcome::Finished {
                status: RunStatus::Cancelled,
                ..
            }
        ));
        assert_eq!(api.count("get_run_status"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_error_is_fatal() {
        let api = FakeApi::new().with_statuses(vec![
            Ok(RunStatus::Running),
            Err(ClientError::from_status(503, "unavailable")),
            Ok(RunStatus::Succeeded),
        ]);
        let controller = RunController::new(&api, POLL_INTERVAL, CancellationToken::new());

        let err = controller.execute(&request(true), |_, _| {}).await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(api.count("get_run_status"), 2);
    }

    #[tokio::test]
    async fn test_start_error_is_not_retried() {
        let api = FakeApi::new().with_start(Err(ClientError::from_status(404, "unknown alias")));
        let controller = RunController::new(&api, POLL_INTERVAL, CancellationToken::new());

        let err = controller.execute(&request(true), |_, _| {}).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(api.calls(), vec!["start_run"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_sleep() {
        let api = FakeApi::new().with_statuses(vec![
            Ok(RunStatus::Pending),
            Ok(RunStatus::Running),
            Ok(RunStatus::Running),
        ]);
        let shutdown = CancellationToken::new();
        let canceller = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(7)).await;
            canceller.cancel();
        });
        let controller = RunController::new(&api, POLL_INTERVAL, shutdown);

        let outcome = controller.execute(&request(true), |_, _| {}).await.unwrap();

        assert_eq!(
            outcome,
            RunOutcome::CancelledLocally {
                handle: Some(RunHandle::new("run-1")),
            }
        );
        assert!(!outcome.is_success());
        assert_eq!(api.count("get_run_status"), 2);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let api = FakeApi::new();
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        let controller = RunController::new(&api, POLL_INTERVAL, shutdown);

        let outcome = controller.execute(&request(true), |_, _| {}).await.unwrap();

        assert_eq!(outcome, RunOutcome::CancelledLocally { handle: None });
        assert!(api.calls().is_empty());
    }
}
