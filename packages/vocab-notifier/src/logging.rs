use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "vocab-notifier.log";

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub filter: String,
    /// Directory for the daily rolling log file. `None` logs to stdout only.
    pub file_dir: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let filter = lookup("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let file_enabled = crate::config::parse_bool(lookup("ENABLE_FILE_LOGS"), false);
        let file_dir = file_enabled
            .then(|| PathBuf::from(lookup("LOG_DIR").unwrap_or_else(|| "./logs".to_string())));
        Self { filter, file_dir }
    }
}

pub struct FileLogGuard {
    _guard: WorkerGuard,
}

/// Installs the global subscriber. Keep the returned guard alive so buffered
/// file output is flushed on exit.
pub fn init_tracing(settings: &LogSettings) -> Option<FileLogGuard> {
    let env_filter =
        EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(true);

    let Some(dir) = settings.file_dir.as_ref() else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .init();
        return None;
    };

    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("failed to create log directory {}: {err}", dir.display());
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stdout_layer)
            .init();
        return None;
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Some(FileLogGuard { _guard: guard })
}
