//! HTTP client that records one stream segment per call.
//!
//! This module provides the [`StreamClient`] struct, the production
//! [`SegmentSource`]. Each call performs exactly one GET and copies the
//! response body into a fresh file, syncing after every chunk so a killed
//! process loses at most one chunk of audio.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use super::constants::{CHUNK_SIZE, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::SegmentError;
use super::outcome::{AttemptOutcome, SegmentFile, SegmentSource};

/// HTTP client for recording stream segments.
///
/// Create once and reuse for every attempt of a run.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use streamrecorder_core::record::StreamClient;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = StreamClient::new()?;
/// let outcome = client
///     .record_to_file(
///         "http://radio.example/live",
///         Path::new("stream_0.mp3"),
///         &CancellationToken::new(),
///     )
///     .await;
/// println!("kept segment: {}", outcome.produced_segment());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StreamClient {
    client: Client,
}

impl StreamClient {
    /// Creates a client with default timeouts.
    ///
    /// - Connect timeout: 30 seconds
    /// - Read (idle) timeout: 30 seconds
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeouts(
            Duration::from_secs(CONNECT_TIMEOUT_SECS),
            Duration::from_secs(READ_TIMEOUT_SECS),
        )
    }

    /// Creates a client with explicit connect and per-read timeouts.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised.
    pub fn with_timeouts(
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Records one segment: a single GET whose body is copied into `path`.
    ///
    /// Never returns an error; every failure is classified into the outcome.
    /// The file is created only after a `200 OK` response, and is truncated if
    /// it already exists.
    #[instrument(skip(self, cancel), fields(url = %url, path = %path.display()))]
    pub async fn record_to_file(
        &self,
        url: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> AttemptOutcome {
        debug!("sending request");

        let sent = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                return AttemptOutcome::Failed(SegmentError::Cancelled);
            }
            sent = self.client.get(url).send() => sent,
        };

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                let error = SegmentError::connect(url, e);
                error!(error = %error, "error connecting to stream");
                return AttemptOutcome::Failed(error);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            // Dropping the response releases the connection without reading the body.
            drop(response);
            let error = SegmentError::http_status(url, status.as_u16());
            error!(status = status.as_u16(), "received non-200 status code");
            return AttemptOutcome::Failed(error);
        }

        let mut file = match File::create(path).await {
            Ok(file) => file,
            Err(e) => {
                let error = SegmentError::create_file(path, e);
                error!(error = %error, "error creating file");
                return AttemptOutcome::Failed(error);
            }
        };

        info!("recording stream");

        let mut bytes_written: u64 = 0;
        let streamed =
            stream_to_file(&mut file, response, url, path, cancel, &mut bytes_written).await;
        drop(file);

        let segment = SegmentFile {
            path: path.to_path_buf(),
            bytes: bytes_written,
        };

        match streamed {
            Ok(()) => {
                debug!(bytes = bytes_written, "end of stream");
                AttemptOutcome::Completed(segment)
            }
            Err(error) => {
                error!(error = %error, bytes = bytes_written, "recording interrupted");
                AttemptOutcome::Interrupted { segment, error }
            }
        }
    }
}

#[async_trait]
impl SegmentSource for StreamClient {
    async fn record_segment(
        &self,
        url: &str,
        path: &Path,
        cancel: &CancellationToken,
    ) -> AttemptOutcome {
        self.record_to_file(url, path, cancel).await
    }
}

/// Copies the response body into `file` in slices of at most [`CHUNK_SIZE`]
/// bytes, syncing file data after each slice.
///
/// `bytes_written` counts the synced bytes, and stays valid when an error is
/// returned.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    path: &Path,
    cancel: &CancellationToken,
    bytes_written: &mut u64,
) -> Result<(), SegmentError> {
    let mut stream = response.bytes_stream();

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(SegmentError::Cancelled),
            next = stream.next() => next,
        };

        let Some(chunk) = next else {
            return Ok(());
        };
        let chunk = chunk.map_err(|e| SegmentError::read(url, e))?;

        for slice in chunk.chunks(CHUNK_SIZE) {
            file.write_all(slice)
                .await
                .map_err(|e| SegmentError::write(path, e))?;
            file.flush()
                .await
                .map_err(|e| SegmentError::write(path, e))?;
            file.sync_data()
                .await
                .map_err(|e| SegmentError::sync(path, e))?;
            *bytes_written += slice.len() as u64;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_stream(status: u16, body: &[u8]) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/live"))
            .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_record_to_file_completes_and_preserves_body() {
        // Larger than several chunks so the slice loop runs more than once.
        let body: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let server = mock_stream(200, &body).await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("stream_0.mp3");

        let client = StreamClient::new().unwrap();
        let outcome = client
            .record_to_file(
                &format!("{}/live", server.uri()),
                &target,
                &CancellationToken::new(),
            )
            .await;

        match outcome {
            AttemptOutcome::Completed(segment) => {
                assert_eq!(segment.path, target);
                assert_eq!(segment.bytes, body.len() as u64);
            }
            other => panic!("Expected Completed, got: {other:?}"),
        }
        assert_eq!(std::fs::read(&target).unwrap(), body);
    }

    #[tokio::test]
    async fn test_record_to_file_empty_body_creates_empty_segment() {
        let server = mock_stream(200, b"").await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("stream_0.mp3");

        let client = StreamClient::new().unwrap();
        let outcome = client
            .record_to_file(
                &format!("{}/live", server.uri()),
                &target,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(outcome, AttemptOutcome::Completed(ref s) if s.bytes == 0));
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_record_to_file_non_200_creates_no_file() {
        let server = mock_stream(503, b"try later").await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("stream_0.mp3");

        let client = StreamClient::new().unwrap();
        let outcome = client
            .record_to_file(
                &format!("{}/live", server.uri()),
                &target,
                &CancellationToken::new(),
            )
            .await;

        assert!(
            matches!(
                outcome,
                AttemptOutcome::Failed(SegmentError::HttpStatus { status: 503, .. })
            ),
            "Expected HttpStatus(503), got: {outcome:?}"
        );
        assert!(!target.exists(), "no file should be created on non-200");
    }

    #[tokio::test]
    async fn test_record_to_file_other_2xx_is_not_success() {
        let server = mock_stream(204, b"").await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("stream_0.mp3");

        let client = StreamClient::new().unwrap();
        let outcome = client
            .record_to_file(
                &format!("{}/live", server.uri()),
                &target,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            outcome,
            AttemptOutcome::Failed(SegmentError::HttpStatus { status: 204, .. })
        ));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_record_to_file_connection_refused() {
        // Bind then drop to get a port nobody listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("stream_0.mp3");

        let client = StreamClient::new().unwrap();
        let outcome = client
            .record_to_file(
                &format!("http://127.0.0.1:{port}/live"),
                &target,
                &CancellationToken::new(),
            )
            .await;

        assert!(
            matches!(outcome, AttemptOutcome::Failed(SegmentError::Connect { .. })),
            "Expected Connect, got: {outcome:?}"
        );
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_record_to_file_create_failure() {
        let server = mock_stream(200, b"audio").await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("missing-dir").join("stream_0.mp3");

        let client = StreamClient::new().unwrap();
        let outcome = client
            .record_to_file(
                &format!("{}/live", server.uri()),
                &target,
                &CancellationToken::new(),
            )
            .await;

        assert!(
            matches!(
                outcome,
                AttemptOutcome::Failed(SegmentError::CreateFile { .. })
            ),
            "Expected CreateFile, got: {outcome:?}"
        );
    }

    #[tokio::test]
    async fn test_record_to_file_already_cancelled_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"audio".to_vec()))
            .expect(0)
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("stream_0.mp3");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let client = StreamClient::new().unwrap();
        let outcome = client
            .record_to_file(&format!("{}/live", server.uri()), &target, &cancel)
            .await;

        assert!(matches!(
            outcome,
            AttemptOutcome::Failed(SegmentError::Cancelled)
        ));
        assert!(!target.exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_record_to_file_write_failure_keeps_partial_segment() {
        // Every write to /dev/full fails with ENOSPC.
        let server = mock_stream(200, b"audio frames").await;
        let target = Path::new("/dev/full");

        let client = StreamClient::new().unwrap();
        let outcome = client
            .record_to_file(
                &format!("{}/live", server.uri()),
                target,
                &CancellationToken::new(),
            )
            .await;

        match outcome {
            AttemptOutcome::Interrupted { segment, error } => {
                assert_eq!(segment.path, target);
                assert_eq!(segment.bytes, 0);
                assert!(
                    matches!(error, SegmentError::Write { .. }),
                    "Expected Write error, got: {error:?}"
                );
            }
            other => panic!("Expected Interrupted, got: {other:?}"),
        }
    }

    #[test]
    fn test_with_timeouts_builds() {
        assert!(StreamClient::with_timeouts(Duration::from_secs(1), Duration::from_secs(1)).is_ok());
    }
}
