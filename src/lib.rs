//! Stream Recorder Core Library
//!
//! This library records a live HTTP audio stream into a sequence of numbered
//! segment files, reconnecting after network failures until an attempt budget
//! is exhausted.
//!
//! # Architecture
//!
//! - [`config`] - Recording options, defaults and validation
//! - [`record`] - Segment downloader, retry policy and the recording loop

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod record;

// Re-export commonly used types
pub use config::{ConfigError, RecorderConfig, RecorderOptions, validate_stream_url};
pub use record::{
    AttemptLimit, AttemptOutcome, Recorder, RecordingSummary, SegmentError, SegmentSource,
    StopReason, StreamClient,
};
