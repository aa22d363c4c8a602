//! Tracing subscriber setup.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` overrides `config.level`. A log file that cannot be opened
/// falls back to stderr with a warning. Calling this twice is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let (writer, to_file, open_error) = match config.file.as_deref().map(open_log_file) {
        Some(Ok(writer)) => (writer, true, None),
        Some(Err(failure)) => (BoxMakeWriter::new(io::stderr), false, Some(failure)),
        None => (BoxMakeWriter::new(io::stderr), false, None),
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(true);
    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.with_ansi(!to_file).finish())
    };
    if installed.is_err() {
        return;
    }

    if let Some((path, e)) = open_error {
        tracing::warn!(path = %path.display(), error = %e, "Failed to open log file");
    }
}

fn open_log_file(path: &Path) -> Result<BoxMakeWriter, (PathBuf, io::Error)> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|file| BoxMakeWriter::new(Mutex::new(file)))
        .map_err(|e| (path.to_path_buf(), e))
}
