use std::path::PathBuf;
use std::time::Duration;

use crate::config::parse_u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbMode {
    Postgres,
    Sqlite,
}

impl DbMode {
    pub fn detect(url: Option<&str>) -> Self {
        match url {
            Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {
                DbMode::Postgres
            }
            _ => DbMode::Sqlite,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub mode: DbMode,
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl DbConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let mode = DbMode::detect(raw_url.as_deref());
        let url = raw_url.unwrap_or_else(default_sqlite_url);

        let max_connections = parse_u64(lookup("DB_MAX_CONNECTIONS"), 5).max(1) as u32;
        let acquire_timeout_ms = parse_u64(lookup("DB_ACQUIRE_TIMEOUT_MS"), 5000);
        let busy_timeout_ms = parse_u64(lookup("SQLITE_BUSY_TIMEOUT_MS"), 30000);

        Self {
            mode,
            url,
            max_connections,
            acquire_timeout: Duration::from_millis(acquire_timeout_ms),
            busy_timeout: Duration::from_millis(busy_timeout_ms),
        }
    }

    /// SQLite config pointing at a file, used by tools and tests.
    pub fn sqlite_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            mode: DbMode::Sqlite,
            url: format!("sqlite:{}?mode=rwc", path.display()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(30),
        }
    }
}

pub fn default_sqlite_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vocab-notifier")
        .join("words.db")
}

fn default_sqlite_url() -> String {
    format!("sqlite:{}?mode=rwc", default_sqlite_path().display())
}
