use crate::commands::{auth, App};
use crate::output::Output;
use color_eyre::eyre::{eyre, Result};

pub async fn run_once(app: &App, output: &Output) -> Result<()> {
    let mut trakt = app.trakt_client()?;
    if !trakt.is_authenticated() {
        auth::authenticate(&mut trakt, output).await?;
    }

    let mut reconciler = app.reconciler(trakt)?;
    let report = reconciler.run().await.map_err(|e| eyre!("{:#}", e))?;

    if report.queued == 0 {
        output.info("Nothing new on Netflix");
        return Ok(());
    }
    if report.not_found > 0 {
        output.warn(format!("{} title(s) not found on Trakt, add them manually", report.not_found));
    }
    if report.submitted {
        output.success(format!(
            "Marked {} movie(s) and {} episode(s) as watched",
            report.added_movies, report.added_episodes
        ));
    } else if report.matched > 0 {
        output.error("Trakt rejected the batch, it will be retried on the next run");
    }
    Ok(())
}
