pub mod daily_vocab;

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::db::WordStore;
use crate::services::{Clock, Notifier};

pub use daily_vocab::{DailyVocabJob, JobError, RunReport};

pub struct WorkerManager {
    scheduler: Mutex<JobScheduler>,
    shutdown_tx: broadcast::Sender<()>,
    schedule: String,
}

impl WorkerManager {
    pub async fn new(schedule: impl Into<String>) -> Result<Self, WorkerError> {
        let scheduler = JobScheduler::new().await.map_err(WorkerError::Scheduler)?;
        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            scheduler: Mutex::new(scheduler),
            shutdown_tx,
            schedule: schedule.into(),
        })
    }

    /// Registers the daily vocabulary job and starts the scheduler. A trigger that
    /// fires while the previous run is still going is skipped.
    pub async fn start<S, N, C>(&self, job: Arc<DailyVocabJob<S, N, C>>) -> Result<(), WorkerError>
    where
        S: WordStore + 'static,
        N: Notifier + 'static,
        C: Clock + 'static,
    {
        let scheduler = self.scheduler.lock().await;

        let in_flight = Arc::new(Mutex::new(()));
        let shutdown_rx = self.shutdown_tx.subscribe();
        let cron_job = Job::new_async(self.schedule.as_str(), move |_uuid, _lock| {
            let job = Arc::clone(&job);
            let in_flight = Arc::clone(&in_flight);
            let mut rx = shutdown_rx.resubscribe();
            Box::pin(async move {
                let Ok(_guard) = in_flight.try_lock_owned() else {
                    warn!("Previous daily vocabulary run still in progress, skipping trigger");
                    return;
                };
                tokio::select! {
                    _ = rx.recv() => {},
                    result = job.run() => {
                        if let Err(e) = result {
                            error!(error = %e, "Daily vocabulary worker error");
                        }
                    }
                }
            })
        })
        .map_err(WorkerError::Scheduler)?;
        scheduler.add(cron_job).await.map_err(WorkerError::Scheduler)?;
        info!(schedule = %self.schedule, "Daily vocabulary worker scheduled");

        scheduler.start().await.map_err(WorkerError::Scheduler)?;
        info!("Scheduler started");

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping workers...");
        let _ = self.shutdown_tx.send(());

        let mut scheduler = self.scheduler.lock().await;
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Error shutting down scheduler");
        }

        info!("Workers stopped");
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}
