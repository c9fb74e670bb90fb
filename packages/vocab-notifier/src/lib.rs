pub mod config;
pub mod db;
pub mod logging;
pub mod services;
pub mod workers;

pub use config::{Config, ConfigError, JobConfig, WebhookConfig};
pub use db::{StoreError, Word, WordDb, WordStore};
pub use workers::{DailyVocabJob, JobError, RunReport, WorkerManager};
