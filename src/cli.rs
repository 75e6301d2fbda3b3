//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use streamrecorder_core::record::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};

/// Record a live HTTP audio stream to numbered files.
///
/// When the connection drops, the recorder waits and reconnects into the next
/// file (`<prefix>_0<suffix>`, `<prefix>_1<suffix>`, ...) until the attempt
/// budget runs out. Press Ctrl-C to stop.
#[derive(Parser, Debug)]
#[command(name = "streamrecorder")]
#[command(author, version, about)]
pub struct Args {
    /// Stream URL (http or https)
    pub url: String,

    /// Prefix for the file names of the recorded stream [default: stream]
    #[arg(long)]
    pub prefix: Option<String>,

    /// Suffix (extension) for the file names of the recorded stream [default: .mp3]
    #[arg(long)]
    pub suffix: Option<String>,

    /// Seconds to wait before reconnecting after a network issue [default: 5]
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of attempts to recover the stream; -1 disables the limit [default: 60]
    #[arg(short = 'a', long, allow_negative_numbers = true)]
    pub attempts: Option<i64>,

    /// Directory to write segment files to [default: current directory]
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// HTTP connect timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = CONNECT_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub connect_timeout: u64,

    /// Maximum silence between two reads of the stream, in seconds
    #[arg(long, value_name = "SECS", default_value_t = READ_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub read_timeout: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
