//! Live stream recording: one HTTP attempt per segment, retried until the
//! attempt budget runs out.
//!
//! # Features
//!
//! - Streaming copy of the response body, synced to disk every 4 KiB
//! - Partial segments kept when the connection drops mid-stream
//! - Numbered output files (`<prefix>_<n><suffix>`)
//! - Fixed delay between attempts, bounded or unlimited attempt budget
//! - Cooperative cancellation of both the wait and the in-flight request
//!
//! # Example
//!
//! ```no_run
//! use streamrecorder_core::RecorderOptions;
//! use streamrecorder_core::record::{Recorder, StreamClient};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = RecorderOptions::default().with_attempt_count(-1)?;
//! let recorder = Recorder::new(options.resolve()?);
//! let client = StreamClient::new()?;
//! let summary = recorder
//!     .run(&client, "http://radio.example/live.mp3", &CancellationToken::new())
//!     .await;
//! println!("recorded to {} files", summary.segments());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod filename;
mod outcome;
mod recorder;
mod retry;

pub use client::StreamClient;
pub use constants::{CHUNK_SIZE, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use error::SegmentError;
pub use filename::{is_plain_component, segment_filename, segment_path};
pub use outcome::{AttemptOutcome, SegmentFile, SegmentSource};
pub use recorder::{Recorder, RecordingSummary, StopReason};
pub use retry::{AttemptLimit, RetryDecision, RetryPolicy, UNLIMITED_ATTEMPTS_SENTINEL};
