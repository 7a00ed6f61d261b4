//! Tracing setup, per-run log files, and log retention.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// `<dir>/<app>_<YYYY-MM-DD>.log`; one file per scheduled day.
pub(crate) fn run_log_path(dir: &Path, app_name: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{app_name}_{}.log", date.format("%Y-%m-%d")))
}

/// `<dir>/<app>_schedule_<YYYY-MM-DD_HHMMSS>.log`, keyed by scheduler start.
pub(crate) fn schedule_log_path(dir: &Path, app_name: &str, started: NaiveDateTime) -> PathBuf {
    dir.join(format!(
        "{app_name}_schedule_{}.log",
        started.format("%Y-%m-%d_%H%M%S")
    ))
}

/// Creates the run's log file, refusing to reuse an existing one.
///
/// An existing file means the job already ran for this day, so the caller
/// should stop before touching any ticket.
pub(crate) fn open_run_log(path: &Path) -> anyhow::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => anyhow::bail!(
            "log file {} already exists; this job has already run today",
            path.display()
        ),
        Err(e) => {
            Err(e).with_context(|| format!("failed to create log file {}", path.display()))
        }
    }
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides `log_level`. With no file the stderr layer is always
/// installed.
pub(crate) fn init(log_level: &str, file: Option<File>, console: bool) -> anyhow::Result<()> {
    let filter = || {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))
    };

    let file_layer = match file {
        Some(file) => Some(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(filter()?),
        ),
        None => None,
    };
    let console_layer = if console || file_layer.is_none() {
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(filter()?),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

/// Deletes `.log` files in `dir` last modified more than `retention_days` ago.
///
/// Files that cannot be inspected or removed are logged and skipped. Returns
/// the removed paths.
///
/// # Errors
///
/// Returns the I/O error if `dir` itself cannot be read.
pub(crate) fn purge_logs(
    dir: &Path,
    retention_days: u64,
    now: SystemTime,
) -> io::Result<Vec<PathBuf>> {
    let retention = Duration::from_secs(retention_days.saturating_mul(SECS_PER_DAY));
    let mut removed = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable log directory entry");
                continue;
            }
        };
        if path.extension().and_then(|e| e.to_str()) != Some("log") {
            continue;
        }

        let modified = match fs::metadata(&path).and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read log file age");
                continue;
            }
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age <= retention {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed old log file");
                removed.push(path);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove old log file");
            }
        }
    }

    Ok(removed)
}
