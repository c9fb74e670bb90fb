use std::process::ExitCode;
use std::sync::Arc;

use vocab_notifier::config::Config;
use vocab_notifier::db::WordDb;
use vocab_notifier::logging::init_tracing;
use vocab_notifier::workers::{DailyVocabJob, WorkerManager};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_tracing(&config.log);

    let store = match WordDb::connect(&config.db).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "failed to connect word store");
            return ExitCode::FAILURE;
        }
    };

    let job = Arc::new(DailyVocabJob::from_config(store.clone(), &config));

    let code = if config.run_once {
        match job.run().await {
            Ok(report) => {
                tracing::info!(
                    run_id = %report.run_id,
                    fetched = report.fetched,
                    marked = report.marked,
                    "single run finished"
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "daily vocabulary run failed");
                ExitCode::FAILURE
            }
        }
    } else {
        run_scheduled(&config, job).await
    };

    store.close().await;
    code
}

async fn run_scheduled(
    config: &Config,
    job: Arc<DailyVocabJob<WordDb, vocab_notifier::services::DiscordWebhook>>,
) -> ExitCode {
    let manager = match WorkerManager::new(config.schedule.clone()).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "worker manager not initialized");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = manager.start(job).await {
        tracing::error!(error = %e, "failed to start workers");
        return ExitCode::FAILURE;
    }

    tracing::info!(schedule = %config.schedule, "vocab-notifier running, waiting for shutdown signal");
    shutdown_signal().await;

    manager.stop().await;
    tracing::info!("Graceful shutdown complete");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
