//! Attempt outcomes and the segment source seam.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::SegmentError;

/// A segment file left on disk by one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentFile {
    /// Path of the segment file.
    pub path: PathBuf,
    /// Bytes written and synced before the attempt ended.
    pub bytes: u64,
}

/// Result of a single recording attempt.
///
/// `Completed` and `Interrupted` both leave a segment on disk that the
/// orchestrator keeps; only `Failed` leaves the segment index untouched.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The response body was copied until a clean end of stream.
    Completed(SegmentFile),

    /// Streaming stopped early (read, write, sync error or cancellation).
    ///
    /// Bytes already written are kept as a partial segment.
    Interrupted {
        /// The partial segment.
        segment: SegmentFile,
        /// Why streaming stopped.
        error: SegmentError,
    },

    /// No segment file was produced.
    ///
    /// The error is one of connect, non-200 status, file creation or cancellation.
    Failed(SegmentError),
}

impl AttemptOutcome {
    /// Returns true if the attempt left a segment file worth keeping.
    #[must_use]
    pub fn produced_segment(&self) -> bool {
        self.segment().is_some()
    }

    /// Returns the kept segment, if any.
    #[must_use]
    pub fn segment(&self) -> Option<&SegmentFile> {
        match self {
            Self::Completed(segment) | Self::Interrupted { segment, .. } => Some(segment),
            Self::Failed(_) => None,
        }
    }

    /// Returns the error that ended the attempt, if any.
    #[must_use]
    pub fn error(&self) -> Option<&SegmentError> {
        match self {
            Self::Completed(_) => None,
            Self::Interrupted { error, .. } | Self::Failed(error) => Some(error),
        }
    }

    /// Consumes the outcome, returning the kept segment, if any.
    #[must_use]
    pub fn into_segment(self) -> Option<SegmentFile> {
        match self {
            Self::Completed(segment) | Self::Interrupted { segment, .. } => Some(segment),
            Self::Failed(_) => None,
        }
    }
}

/// Something that can record one segment of a stream into a file.
///
/// [`StreamClient`](super::StreamClient) is the HTTP implementation; the
/// orchestrator only sees this trait.
#[async_trait]
pub trait SegmentSource: Send + Sync {
    /// Performs one attempt: a single request whose body is copied into `path`.
    ///
    /// Implementations report every failure through the returned outcome and
    /// release all resources (connection, file handle) before returning.
    async fn record_segment(
        &self,
        url: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> AttemptOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(bytes: u64) -> SegmentFile {
        SegmentFile {
            path: PathBuf::from("stream_0.mp3"),
            bytes,
        }
    }

    #[test]
    fn test_completed_produces_segment() {
        let outcome = AttemptOutcome::Completed(segment(10));
        assert!(outcome.produced_segment());
        assert!(outcome.error().is_none());
        assert_eq!(outcome.into_segment(), Some(segment(10)));
    }

    #[test]
    fn test_interrupted_keeps_partial_segment() {
        let outcome = AttemptOutcome::Interrupted {
            segment: segment(4),
            error: SegmentError::Cancelled,
        };
        assert!(outcome.produced_segment());
        assert!(outcome.error().is_some_and(SegmentError::is_cancelled));
        assert_eq!(outcome.segment().map(|s| s.bytes), Some(4));
    }

    #[test]
    fn test_failed_produces_nothing() {
        let outcome = AttemptOutcome::Failed(SegmentError::http_status("http://x", 404));
        assert!(!outcome.produced_segment());
        assert!(matches!(
            outcome.error(),
            Some(SegmentError::HttpStatus { status: 404, .. })
        ));
        assert!(outcome.into_segment().is_none());
    }
}
