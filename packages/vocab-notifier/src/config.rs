use std::str::FromStr;
use std::time::Duration;

use chrono::FixedOffset;
use thiserror::Error;

use crate::db::config::DbConfig;
use crate::logging::LogSettings;

const DEFAULT_WORDS_PER_DAY: u32 = 10;
pub const MAX_WORDS_PER_DAY: u32 = 1000;
const DEFAULT_SCHEDULE: &str = "0 0 8 * * *";
const DEFAULT_USERNAME: &str = "EngLrn";
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub log: LogSettings,
    pub job: JobConfig,
    pub webhook: WebhookConfig,
    pub db: DbConfig,
    /// Six-field cron expression, evaluated in UTC.
    pub schedule: String,
    pub run_once: bool,
}

/// Settings the daily vocabulary job itself needs.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub words_per_day: u32,
    pub skip_empty_batch: bool,
    /// Offset used to render the header time. `None` means the host's local offset.
    pub display_offset: Option<FixedOffset>,
    pub translate_source: String,
    pub translate_target: String,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            words_per_day: DEFAULT_WORDS_PER_DAY,
            skip_empty_batch: false,
            display_offset: None,
            translate_source: "en".to_string(),
            translate_target: "vi".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: reqwest::Url,
    pub username: String,
    pub avatar_url: Option<String>,
    pub timeout: Duration,
}

impl WebhookConfig {
    pub fn new(url: reqwest::Url) -> Self {
        Self {
            url,
            username: DEFAULT_USERNAME.to_string(),
            avatar_url: None,
            timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var {key}")]
    Missing { key: &'static str },
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let job = JobConfig {
            words_per_day: parse_words_per_day(lookup("WORD_PER_DAY"))?,
            skip_empty_batch: parse_bool(lookup("SKIP_EMPTY_BATCH"), false),
            display_offset: match non_empty(lookup("DISPLAY_UTC_OFFSET")) {
                Some(raw) => Some(FixedOffset::from_str(&raw).map_err(|e| {
                    ConfigError::Invalid {
                        key: "DISPLAY_UTC_OFFSET",
                        reason: e.to_string(),
                    }
                })?),
                None => None,
            },
            translate_source: non_empty(lookup("TRANSLATE_SOURCE_LANG"))
                .unwrap_or_else(|| "en".to_string()),
            translate_target: non_empty(lookup("TRANSLATE_TARGET_LANG"))
                .unwrap_or_else(|| "vi".to_string()),
        };

        let raw_url = non_empty(lookup("DISCORD_HOOK_URL")).ok_or(ConfigError::Missing {
            key: "DISCORD_HOOK_URL",
        })?;
        let url = reqwest::Url::parse(&raw_url).map_err(|e| ConfigError::Invalid {
            key: "DISCORD_HOOK_URL",
            reason: e.to_string(),
        })?;

        let webhook = WebhookConfig {
            url,
            username: non_empty(lookup("WEBHOOK_USERNAME"))
                .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
            avatar_url: non_empty(lookup("ENG_LRN_AVATAR_URL")),
            timeout: Duration::from_secs(parse_u64(
                lookup("WEBHOOK_TIMEOUT_SECS"),
                DEFAULT_WEBHOOK_TIMEOUT_SECS,
            )),
        };

        let schedule =
            non_empty(lookup("SEND_SCHEDULE")).unwrap_or_else(|| DEFAULT_SCHEDULE.to_string());
        cron::Schedule::from_str(&schedule).map_err(|e| ConfigError::Invalid {
            key: "SEND_SCHEDULE",
            reason: e.to_string(),
        })?;

        Ok(Self {
            log: LogSettings::from_lookup(&lookup),
            job,
            webhook,
            db: DbConfig::from_lookup(&lookup),
            schedule,
            run_once: parse_bool(lookup("RUN_ONCE"), false),
        })
    }
}

fn parse_words_per_day(raw: Option<String>) -> Result<u32, ConfigError> {
    let Some(raw) = non_empty(raw) else {
        return Ok(DEFAULT_WORDS_PER_DAY);
    };
    match raw.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: "WORD_PER_DAY",
            reason: "must be at least 1".to_string(),
        }),
        Ok(n) if n > MAX_WORDS_PER_DAY => Err(ConfigError::Invalid {
            key: "WORD_PER_DAY",
            reason: format!("must be at most {MAX_WORDS_PER_DAY}"),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            key: "WORD_PER_DAY",
            reason: e.to_string(),
        }),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_bool(value: Option<String>, default: bool) -> bool {
    match value.as_deref() {
        Some("true") | Some("1") => true,
        Some("false") | Some("0") => false,
        _ => default,
    }
}

pub(crate) fn parse_u64(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}
