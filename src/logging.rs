use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "reconvapt.log";
pub const LOG_ENV: &str = "RECONVAPT_LOG";

/// File logging under `logs_dir`. Console output stays on colored status lines,
/// so the subscriber only writes to the file. The guard must be held until exit.
pub fn init_logging(logs_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| format!("{}=info", env!("CARGO_CRATE_NAME")));

    let file_appender = RollingFileAppender::new(Rotation::NEVER, logs_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("unable to set global subscriber: {}", e))?;

    Ok(guard)
}
