//! Tracing setup for the viewprobe binary and embedding callers.
//!
//! Human-readable events always go to stderr, so stdout stays free for
//! reports. When stderr is not a terminal (cron, CI), a daily rolling file
//! under [`log_dir`] receives the same events without ANSI colours.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "VIEWPROBE_LOG";

/// What to install as the global subscriber.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Directory for rolling log files; `None` disables file output
    pub file_dir: Option<PathBuf>,
    /// Explicit filter directives, overriding the environment
    pub filter: Option<String>,
    /// Colourize stderr output
    pub ansi: bool,
}

impl LogConfig {
    /// Stderr with colours on a terminal; stderr plus files under `log_dir` otherwise.
    pub fn new(log_dir: PathBuf) -> Self {
        let interactive = atty::is(atty::Stream::Stderr);
        Self { file_dir: (!interactive).then_some(log_dir), filter: None, ansi: interactive }
    }

    /// Use `filter` instead of `VIEWPROBE_LOG`/`RUST_LOG`.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Keeps the file writer's worker thread alive; drop it last to flush.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// Whether events are also written to a log file.
    pub fn has_file_output(&self) -> bool {
        self._file.is_some()
    }
}

/// Install the global subscriber described by `config`.
///
/// Never fails: an unusable log directory degrades to stderr only, and an
/// already-installed subscriber is left in place.
pub fn init_logging(config: LogConfig) -> LoggingGuard {
    let filter = EnvFilter::try_new(filter_directives(config.filter.as_deref(), |key| {
        std::env::var(key).ok()
    }))
    .unwrap_or_else(|_| EnvFilter::new(default_log_filter()));

    let (file, file_error) = match config.file_dir.as_deref().map(file_writer) {
        Some(Ok((writer, guard))) => (Some((writer, guard)), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };
    let (file_layer, worker) = match file {
        Some((writer, guard)) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false).with_target(true)),
            Some(guard),
        ),
        None => (None, None),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if let Some(e) = file_error {
        tracing::warn!(error = %e, "File logging unavailable, writing to stderr only");
    }

    LoggingGuard { _file: worker }
}

/// Pick the filter directives: explicit, then `VIEWPROBE_LOG`, then `RUST_LOG`, then the default.
fn filter_directives(explicit: Option<&str>, env: impl Fn(&str) -> Option<String>) -> String {
    explicit
        .map(String::from)
        .or_else(|| env(LOG_ENV_VAR))
        .or_else(|| env("RUST_LOG"))
        .filter(|directives| !directives.trim().is_empty())
        .unwrap_or_else(|| default_log_filter().to_string())
}

/// Open a non-blocking daily rolling writer in `dir`.
fn file_writer(
    dir: &Path,
) -> Result<(NonBlocking, WorkerGuard), Box<dyn std::error::Error + Send + Sync>> {
    std::fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("viewprobe")
        .filename_suffix("log")
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Default directives for the current build type.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "info,viewprobe=debug,viewprobe_core=debug,tokio_postgres=warn"
    } else {
        "warn,viewprobe=info,viewprobe_core=info,tokio_postgres=warn"
    }
}

/// Where rolling log files go.
pub fn log_dir() -> PathBuf {
    let local = || PathBuf::from("./viewprobe_data/logs");
    if cfg!(debug_assertions) {
        return local();
    }
    dirs::data_local_dir().map(|d| d.join("viewprobe").join("logs")).unwrap_or_else(local)
}
