//! CLI entry point for the stream recorder.

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use streamrecorder_core::{Recorder, RecorderOptions, StreamClient, validate_stream_url};
use tokio_util::sync::CancellationToken;
use tracing::{Dispatch, debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // One dispatcher for this run, handed to the recorder explicitly. The
    // runtime is single-threaded, so the thread-local default covers the rest.
    let dispatch = Dispatch::new(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stdout)
            .with_ansi(std::io::stdout().is_terminal())
            .finish(),
    );
    let _default_guard = tracing::dispatcher::set_default(&dispatch);

    debug!(?args, "CLI arguments parsed");

    validate_stream_url(&args.url)?;

    let mut options = RecorderOptions {
        prefix: args.prefix,
        suffix: args.suffix,
        retry_delay: args.timeout.map(Duration::from_secs),
        max_attempts: None,
        output_dir: args.output_dir,
    };
    if let Some(count) = args.attempts {
        options = options.with_attempt_count(count)?;
    }
    let config = options.resolve()?;

    let client = StreamClient::with_timeouts(
        Duration::from_secs(args.connect_timeout),
        Duration::from_secs(args.read_timeout),
    )
    .context("failed to build HTTP client")?;

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping recording");
                cancel.cancel();
            }
        }
    });

    let recorder = Recorder::new(config).with_dispatch(dispatch.clone());
    let summary = recorder.run(&client, &args.url, &cancel).await;

    info!(
        segments = summary.segments(),
        attempts = summary.attempts(),
        stop_reason = ?summary.stop_reason(),
        "Recording finished"
    );

    Ok(())
}
