use std::time::Instant;

use chrono::Local;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::config::{Config, JobConfig};
use crate::db::{StoreError, WordStore};
use crate::services::{
    Clock, DiscordWebhook, MessageFormatter, Notifier, NotifyOutcome, SystemClock,
};

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// What a single run did. `delivery` is `None` only when the run was skipped.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub fetched: usize,
    pub used_so_far: u64,
    pub delivery: Option<NotifyOutcome>,
    pub marked: u64,
    pub skipped: bool,
}

/// Fetch → count → format → notify → mark used, once per call to [`run`](Self::run).
pub struct DailyVocabJob<S, N, C = SystemClock> {
    store: S,
    notifier: N,
    clock: C,
    formatter: MessageFormatter,
    config: JobConfig,
}

impl<S: WordStore> DailyVocabJob<S, DiscordWebhook, SystemClock> {
    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(
            store,
            DiscordWebhook::new(config.webhook.clone()),
            SystemClock,
            config.job.clone(),
        )
    }
}

impl<S, N, C> DailyVocabJob<S, N, C>
where
    S: WordStore,
    N: Notifier,
    C: Clock,
{
    pub fn new(store: S, notifier: N, clock: C, config: JobConfig) -> Self {
        Self {
            formatter: MessageFormatter::from_config(&config),
            store,
            notifier,
            clock,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub async fn run(&self) -> Result<RunReport, JobError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("daily_vocab", run_id = %run_id);
        self.run_inner(run_id).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid) -> Result<RunReport, JobError> {
        let start = Instant::now();
        info!(limit = self.config.words_per_day, "Starting daily vocabulary run");

        let batch = self
            .store
            .fetch_unused_words(self.config.words_per_day)
            .await?;

        if batch.is_empty() {
            if self.config.skip_empty_batch {
                info!("No unused words left, skipping run");
                return Ok(RunReport {
                    run_id,
                    fetched: 0,
                    used_so_far: self.store.count_used_words().await?,
                    delivery: None,
                    marked: 0,
                    skipped: true,
                });
            }
            warn!("No unused words left, sending message without vocabulary");
        }

        // Counts the batch as used before it is marked.
        let used_so_far = self.store.count_used_words().await? + batch.len() as u64;

        let now = self.clock.now();
        let offset = self
            .config
            .display_offset
            .unwrap_or_else(|| *now.with_timezone(&Local).offset());
        let message = self
            .formatter
            .format(&batch, used_so_far, &now.with_timezone(&offset));

        let delivery = self.notifier.notify(&message).await;
        if let NotifyOutcome::Failed(failure) = &delivery {
            warn!(error = %failure, "Notification not delivered, marking batch used anyway");
        }

        let ids: Vec<String> = batch.iter().map(|w| w.id.clone()).collect();
        let marked = self.store.mark_used(&ids, self.clock.now()).await?;
        if marked != ids.len() as u64 {
            warn!(
                requested = ids.len(),
                marked = marked,
                "Some words were already marked used by another run"
            );
        }

        info!(
            fetched = batch.len(),
            used_so_far = used_so_far,
            delivered = delivery.is_delivered(),
            marked = marked,
            duration_secs = format!("{:.2}", start.elapsed().as_secs_f64()),
            "Daily vocabulary run completed"
        );

        Ok(RunReport {
            run_id,
            fetched: batch.len(),
            used_so_far,
            delivery: Some(delivery),
            marked,
            skipped: false,
        })
    }
}
