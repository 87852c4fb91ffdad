//! Tracing subscriber setup.
//!
//! CLI commands log to stderr (`RUST_LOG`, default `info`). The TUI owns the
//! terminal, so it only logs when `RENTALS_LOG_FILE` names a file to write to.

use std::ffi::OsStr;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_ENV: &str = "RENTALS_LOG_FILE";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Colored stderr logging for one-shot commands.
pub fn init_cli() {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed (e.g. in tests); that's fine.
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(stderr_layer)
        .try_init();
}

/// File logging for the TUI. The returned guard must be held until exit so
/// buffered lines are flushed.
pub fn init_tui() -> Option<WorkerGuard> {
    dotenvy::dotenv().ok();
    let log_file_path = std::env::var(LOG_FILE_ENV).ok()?;

    let path = Path::new(&log_file_path);
    let log_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_file_name = path.file_name().unwrap_or(OsStr::new("rentals.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking_file);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .try_init()
        .ok()?;
    Some(guard)
}
