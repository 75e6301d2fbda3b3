//! Recording configuration.
//!
//! Callers fill a [`RecorderOptions`] where `None` means "use the default",
//! then [`RecorderOptions::resolve`] validates it into the immutable
//! [`RecorderConfig`] the recorder runs with. A caller-supplied zero is a real
//! value here, never a stand-in for "unset".

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::record::{AttemptLimit, RetryPolicy, is_plain_component, segment_path};

/// Default file name stem of recorded segments.
pub const DEFAULT_PREFIX: &str = "stream";

/// Default file name extension of recorded segments.
pub const DEFAULT_SUFFIX: &str = ".mp3";

/// Default delay between attempts after a failure (5 seconds).
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Default attempt budget.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;

/// Errors raised while resolving configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The stream URL is not an absolute http(s) URL.
    #[error("invalid stream URL: {url}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// The file name prefix is empty.
    #[error("file name prefix must not be empty")]
    EmptyPrefix,

    /// A prefix or suffix contains a path separator.
    #[error("file name {field} must not contain path separators: {value}")]
    PathSeparator {
        /// Which field was rejected (`prefix` or `suffix`).
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The attempt count is neither positive nor the unlimited sentinel.
    #[error("invalid attempt count {count}: use a positive number, or -1 to disable the limit")]
    InvalidAttempts {
        /// The rejected count.
        count: i64,
    },
}

/// User-facing recording options; `None` selects the documented default.
#[derive(Debug, Clone, Default)]
pub struct RecorderOptions {
    /// File name stem (default `stream`).
    pub prefix: Option<String>,
    /// File name extension including the separator (default `.mp3`).
    pub suffix: Option<String>,
    /// Delay between attempts (default 5 seconds).
    pub retry_delay: Option<Duration>,
    /// Attempt budget (default 60).
    pub max_attempts: Option<AttemptLimit>,
    /// Directory receiving segment files (default: current directory).
    pub output_dir: Option<PathBuf>,
}

impl RecorderOptions {
    /// Sets the attempt budget from a user-facing count (`-1` disables the limit).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAttempts`] for zero or negative counts
    /// other than `-1`.
    pub fn with_attempt_count(mut self, count: i64) -> Result<Self, ConfigError> {
        let limit = AttemptLimit::from_count(count).ok_or(ConfigError::InvalidAttempts { count })?;
        self.max_attempts = Some(limit);
        Ok(self)
    }

    /// Validates the options and fills in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the prefix is empty or either file name
    /// component contains a path separator.
    pub fn resolve(self) -> Result<RecorderConfig, ConfigError> {
        let prefix = self.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if !is_plain_component(&prefix) {
            return Err(ConfigError::PathSeparator {
                field: "prefix",
                value: prefix,
            });
        }

        // An explicitly empty suffix is allowed: segments simply have no extension.
        let suffix = self.suffix.unwrap_or_else(|| DEFAULT_SUFFIX.to_string());
        if !is_plain_component(&suffix) {
            return Err(ConfigError::PathSeparator {
                field: "suffix",
                value: suffix,
            });
        }

        let max_attempts = self
            .max_attempts
            .unwrap_or(AttemptLimit::Limited(default_max_attempts()));

        Ok(RecorderConfig {
            prefix,
            suffix,
            retry_delay: self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY),
            max_attempts,
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}

fn default_max_attempts() -> NonZeroU32 {
    NonZeroU32::new(DEFAULT_MAX_ATTEMPTS).unwrap_or(NonZeroU32::MIN)
}

/// Fully resolved, immutable configuration for one recording run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    prefix: String,
    suffix: String,
    retry_delay: Duration,
    max_attempts: AttemptLimit,
    output_dir: PathBuf,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
            retry_delay: DEFAULT_RETRY_DELAY,
            max_attempts: AttemptLimit::Limited(default_max_attempts()),
            output_dir: PathBuf::from("."),
        }
    }
}

impl RecorderConfig {
    /// File name stem.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// File name extension.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Delay between attempts.
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> AttemptLimit {
        self.max_attempts
    }

    /// Directory receiving segment files.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of segment `index`.
    #[must_use]
    pub fn segment_path(&self, index: u64) -> PathBuf {
        segment_path(&self.output_dir, &self.prefix, index, &self.suffix)
    }

    /// Retry policy derived from the budget and delay.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_delay)
    }
}

/// Validates a stream URL: absolute, with an http or https scheme.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidUrl`] otherwise.
pub fn validate_stream_url(url: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        url: url.to_string(),
    };
    let parsed = Url::parse(url).map_err(|_| invalid())?;
    if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() {
        Ok(parsed)
    } else {
        Err(invalid())
    }
}
