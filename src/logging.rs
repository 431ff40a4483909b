use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter, prelude::*};

const DEFAULT_FILTER: &str = "pipedeck=info";

/// Where log events are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogTarget {
    /// Appends plain-text events to a file. Used while the TUI owns the terminal.
    File(PathBuf),
    Stderr,
    Disabled,
}

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(target: LogTarget) -> Result<()> {
    let (writer, ansi) = match &target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), true),
        LogTarget::Disabled => (BoxMakeWriter::new(std::io::sink), false),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true),
        )
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(?target, "tracing initialized");
    Ok(())
}
