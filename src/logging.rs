use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::project_dirs;

const DEFAULT_FILTER: &str = "tubehub=info";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

pub fn log_dir() -> PathBuf {
  project_dirs().map(|d| d.data_dir().join("logs")).unwrap_or_else(|| PathBuf::from(".tubehub").join("logs"))
}

/// Log to `<data dir>/logs/tubehub.log`. The terminal belongs to the TUI.
///
/// Falls back to stderr when the log directory can't be created.
pub fn init_tracing() {
  let filter =
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

  let dir = log_dir();
  if let Err(err) = std::fs::create_dir_all(&dir) {
    eprintln!("Failed to create log directory {}: {}", dir.display(), err);
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    return;
  }

  let file_appender = tracing_appender::rolling::never(&dir, "tubehub.log");
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
  let _ = LOG_GUARD.set(guard);

  let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(non_blocking).with_ansi(false).try_init();
}
