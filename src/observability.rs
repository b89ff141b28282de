//! Structured logging setup.
//!
//! Configures `tracing-subscriber` with:
//! - Output format from config (pretty for development, JSON elsewhere)
//! - Level filtering from `RUST_LOG`, falling back to the configured level
//! - Span close events for request timing
//! - stderr output, or a dated file in the configured log directory

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LogFormat;

/// Build the level filter. `RUST_LOG` wins over `default_level`.
pub fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// `<dir>/app-YYYY-MM-DD.log` for today.
pub fn log_file_path(dir: &Path) -> PathBuf {
    dir.join(format!("app-{}.log", chrono::Utc::now().format("%Y-%m-%d")))
}

/// Create the directory if needed and open today's log file for appending.
pub fn open_log_file(dir: &Path) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path(dir))
}

/// Writer for log output. Falls back to stderr when the file cannot be opened.
fn log_writer(dir: Option<&Path>) -> BoxMakeWriter {
    let Some(dir) = dir else {
        return BoxMakeWriter::new(io::stderr);
    };

    match open_log_file(dir) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(e) => {
            eprintln!(
                "failed to open log file in {}, logging to stderr: {}",
                dir.display(),
                e
            );
            BoxMakeWriter::new(io::stderr)
        }
    }
}

/// Install the global subscriber.
///
/// Calling this twice fails the second time; `try_init` keeps that from panicking
/// when tests or embedding hosts already installed one.
pub fn init_tracing(format: LogFormat, default_level: &str, log_dir: Option<&Path>) {
    let subscriber = tracing_subscriber::registry().with(env_filter(default_level));
    let writer = log_writer(log_dir);
    // ANSI escapes only make sense on a terminal.
    let ansi = log_dir.is_none();

    let result = match format {
        LogFormat::Pretty => subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_ansi(ansi)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(writer),
            )
            .try_init(),
        LogFormat::Json => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(writer),
            )
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
    }
}
