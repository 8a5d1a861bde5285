use crate::commands::{auth, App, AppReconciler};
use crate::output::Output;
use color_eyre::eyre::{eyre, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};
use traktflix_sources::Notifier;

/// Upper bound for a single cycle.
const RUN_TIMEOUT: Duration = Duration::from_secs(5 * 60);

pub async fn run_daemon(
    app: &App,
    schedule_override: Option<String>,
    no_startup_run: bool,
    output: &Output,
) -> Result<()> {
    let mut trakt = app.trakt_client()?;
    if !trakt.is_authenticated() {
        auth::authenticate(&mut trakt, output).await?;
    }

    let reconciler = Arc::new(Mutex::new(app.reconciler(trakt)?));
    let schedule = schedule_override.unwrap_or_else(|| app.config.scheduler.schedule.clone());
    let run_on_startup = !no_startup_run && app.config.scheduler.run_on_startup;

    info!(schedule = %schedule, run_on_startup, "Trakt info: starting");

    if run_on_startup {
        run_cycle(reconciler.clone()).await;
    }

    let mut scheduler = JobScheduler::new().await?;
    let job_reconciler = reconciler.clone();
    let job = Job::new_async(schedule.as_str(), move |_uuid, _scheduler| {
        let reconciler = job_reconciler.clone();
        Box::pin(async move {
            run_cycle(reconciler).await;
        })
    })
    .map_err(|e| eyre!("setup cron '{}': {}", schedule, e))?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    output.info(format!("Daemon running on schedule '{}', press Ctrl-C to stop", schedule));

    tokio::signal::ctrl_c().await?;
    info!("Trakt info: stopping");
    scheduler.shutdown().await?;

    // Let a cycle in flight finish writing the history
    let _guard = reconciler.lock().await;
    Ok(())
}

/// One cycle. Errors are logged and reported, never returned.
async fn run_cycle(reconciler: Arc<Mutex<AppReconciler>>) {
    // Ticks that fire during a long cycle wait here
    let mut reconciler = reconciler.lock().await;

    let message = match tokio::time::timeout(RUN_TIMEOUT, reconciler.run()).await {
        Ok(Ok(report)) => {
            info!(
                queued = report.queued,
                matched = report.matched,
                not_found = report.not_found,
                submitted = report.submitted,
                "Scheduled run completed"
            );
            return;
        }
        Ok(Err(e)) => format!("{:#}", e),
        Err(_) => format!("run timed out after {} seconds", RUN_TIMEOUT.as_secs()),
    };

    error!(error = %message, "An error occurred during a run");
    reconciler
        .notifier()
        .send_message(&format!("Trakt error: {}", message))
        .await;
}
