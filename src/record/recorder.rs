//! Recording loop that turns a flaky live stream into numbered segment files.
//!
//! The [`Recorder`] drives a [`SegmentSource`] one attempt at a time. After
//! every attempt it decides whether the segment index advances (a complete or
//! partial file was kept) and whether to wait and try again or stop.
//!
//! # Example
//!
//! ```no_run
//! use streamrecorder_core::RecorderOptions;
//! use streamrecorder_core::record::{Recorder, StreamClient};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RecorderOptions::default().resolve()?;
//! let client = StreamClient::new()?;
//! let recorder = Recorder::new(config);
//! let summary = recorder
//!     .run(&client, "http://radio.example/live", &CancellationToken::new())
//!     .await;
//! println!("saved {} segments in {} attempts", summary.segments(), summary.attempts());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{Dispatch, error, info, warn};

use super::outcome::{AttemptOutcome, SegmentFile, SegmentSource};
use super::retry::{RetryDecision, RetryPolicy};
use crate::config::RecorderConfig;

/// Why the recording loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The attempt budget was used up.
    AttemptsExhausted,
    /// The cancellation token fired.
    Cancelled,
}

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSummary {
    attempts: u64,
    files: Vec<SegmentFile>,
    stop_reason: StopReason,
}

impl RecordingSummary {
    /// Number of attempts made.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Number of segment files kept.
    #[must_use]
    pub fn segments(&self) -> usize {
        self.files.len()
    }

    /// Kept segment files, in index order.
    #[must_use]
    pub fn files(&self) -> &[SegmentFile] {
        &self.files
    }

    /// Paths of the kept segment files, in index order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|file| file.path.clone()).collect()
    }

    /// Why the run stopped.
    #[must_use]
    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }
}

/// Orchestrates attempts, segment numbering, retry delay and the attempt budget.
///
/// # Logging
///
/// Log events go to the dispatcher given to [`Recorder::with_dispatch`] for
/// the duration of [`Recorder::run`], or to the ambient default otherwise.
#[derive(Debug, Clone)]
pub struct Recorder {
    config: RecorderConfig,
    policy: RetryPolicy,
    dispatch: Option<Dispatch>,
}

impl Recorder {
    /// Creates a recorder for a resolved configuration.
    #[must_use]
    pub fn new(config: RecorderConfig) -> Self {
        let policy = config.retry_policy();
        Self {
            config,
            policy,
            dispatch: None,
        }
    }

    /// Routes this recorder's log events to `dispatch` while it runs.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Returns the configuration this recorder runs with.
    #[must_use]
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Records `url` until the attempt budget is exhausted or `cancel` fires.
    ///
    /// Never fails: every attempt error is logged and retried.
    pub async fn run(
        &self,
        source: &dyn SegmentSource,
        url: &str,
        cancel: &CancellationToken,
    ) -> RecordingSummary {
        match &self.dispatch {
            Some(dispatch) => {
                self.run_loop(source, url, cancel)
                    .with_subscriber(dispatch.clone())
                    .await
            }
            None => self.run_loop(source, url, cancel).await,
        }
    }

    async fn run_loop(
        &self,
        source: &dyn SegmentSource,
        url: &str,
        cancel: &CancellationToken,
    ) -> RecordingSummary {
        let max_attempts = self.policy.max_attempts();
        let mut attempts: u64 = 0;
        let mut segment: u64 = 0;
        let mut files = Vec::new();

        info!(url, max_attempts = %max_attempts, "starting recording");

        let stop_reason = loop {
            if attempts > 0 {
                info!("attempt {attempts} of {max_attempts}");
            }

            let path = self.config.segment_path(segment);
            let outcome = source.record_segment(url, &path, cancel).await;

            match &outcome {
                AttemptOutcome::Completed(file) => {
                    info!(path = %file.path.display(), bytes = file.bytes, "stream was recorded");
                }
                AttemptOutcome::Interrupted { segment: file, error } => {
                    warn!(
                        path = %file.path.display(),
                        bytes = file.bytes,
                        error = %error,
                        "stream was partially recorded"
                    );
                }
                AttemptOutcome::Failed(error) => {
                    warn!(segment, error = %error, "attempt produced no segment");
                }
            }

            if let Some(file) = outcome.into_segment() {
                files.push(file);
                segment += 1;
            }
            attempts += 1;

            if cancel.is_cancelled() {
                info!(attempts, "recording cancelled");
                break StopReason::Cancelled;
            }

            match self.policy.should_retry(attempts) {
                RetryDecision::DoNotRetry { reason } => {
                    error!(attempts, %reason, "stream recovery failed after {attempts} attempts, stopping");
                    break StopReason::AttemptsExhausted;
                }
                RetryDecision::Retry { delay, .. } => {
                    warn!(delay = ?delay, "stream recovery failed, retrying in {delay:?}");
                    let cancelled = tokio::select! {
                        () = cancel.cancelled() => true,
                        () = tokio::time::sleep(delay) => false,
                    };
                    if cancelled {
                        info!(attempts, "recording cancelled while waiting");
                        break StopReason::Cancelled;
                    }
                }
            }
        };

        info!(segments = files.len(), attempts, "stream was recorded to {} files", files.len());

        RecordingSummary {
            attempts,
            files,
            stop_reason,
        }
    }
}
