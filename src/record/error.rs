//! Error types for the record module.
//!
//! Segment errors never escape the recording loop as `Err`; they travel inside
//! an [`AttemptOutcome`](super::AttemptOutcome) so the orchestrator can decide
//! whether the attempt still produced a segment worth keeping.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while recording one segment.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// The connection could not be established (DNS, TCP, TLS, connect timeout).
    #[error("error connecting to stream {url}: {source}")]
    Connect {
        /// The stream URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with something other than `200 OK`.
    #[error("received non-200 status code {status} from {url}")]
    HttpStatus {
        /// The stream URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The segment file could not be created.
    #[error("error creating file {path}: {source}")]
    CreateFile {
        /// The segment file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The connection dropped (or stalled past the read timeout) mid-stream.
    #[error("error reading from stream {url}: {source}")]
    Read {
        /// The stream URL.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Writing a chunk to the segment file failed.
    #[error("error writing to file {path}: {source}")]
    Write {
        /// The segment file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Forcing written bytes to durable storage failed.
    #[error("error flushing file {path}: {source}")]
    Sync {
        /// The segment file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The recording was cancelled while this attempt was in flight.
    #[error("recording cancelled")]
    Cancelled,
}

impl SegmentError {
    /// Creates a connection error.
    pub fn connect(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Connect {
            url: url.into(),
            source,
        }
    }

    /// Creates a non-success status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a file creation error.
    pub fn create_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateFile {
            path: path.into(),
            source,
        }
    }

    /// Creates a mid-stream read error.
    pub fn read(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Read {
            url: url.into(),
            source,
        }
    }

    /// Creates a write error.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Creates a sync (durable flush) error.
    pub fn sync(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Sync {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the error was caused by cancellation rather than a fault.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

// No `From<reqwest::Error>`/`From<std::io::Error>`: every variant needs the url
// or path the source error lacks, so callers go through the helpers above.
