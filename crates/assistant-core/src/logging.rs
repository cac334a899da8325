//! Tracing subscriber setup.
//!
//! The TUI owns the terminal, so it logs to a file under the app's config
//! directory. One-shot commands log to stderr.

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

pub const DEFAULT_FILTER: &str = "assistant_core=info,assistant_tui=info";

const LOG_FILE: &str = "assistant.log";

/// `RUST_LOG` wins, then the configured filter, then [`DEFAULT_FILTER`].
pub fn env_filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .log_filter
            .as_deref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
    })
}

/// Send logs to `<config dir>/business-assistant/assistant.log`.
pub fn init_file_logging(config: &Config) -> Result<PathBuf> {
    let dir = Config::app_dir()?;
    fs::create_dir_all(&dir)?;
    let path = dir.join(LOG_FILE);
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(path)
}

pub fn init_stderr_logging(config: &Config) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
