use crate::batch::MatchBatch;
use crate::history::{History, HistoryStore};
use crate::matcher::{select_candidate, Selection};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use traktflix_models::{SearchType, WatchActivity};
use traktflix_sources::{ActivitySource, Catalog, Notifier};

/// Pause between two catalog searches.
pub const SEARCH_DELAY: Duration = Duration::from_millis(100);

/// What one [`Reconciler::run`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Activities waiting to be recorded when the run started matching.
    pub queued: usize,
    pub matched: usize,
    pub not_found: usize,
    /// Whether a batch was accepted by the catalog.
    pub submitted: bool,
    pub added_movies: u32,
    pub added_episodes: u32,
}

/// Records new viewing activity from `source` into `catalog`.
pub struct Reconciler<S, C, N> {
    source: S,
    catalog: C,
    notifier: N,
    history: History,
    store: HistoryStore,
    search_delay: Duration,
}

impl<S, C, N> Reconciler<S, C, N>
where
    S: ActivitySource,
    C: Catalog,
    N: Notifier,
{
    /// Build a reconciler, loading the history kept by `store`.
    pub fn new(source: S, catalog: C, notifier: N, store: HistoryStore) -> Result<Self> {
        let history = store.load().context("load history")?;
        Ok(Self {
            source,
            catalog,
            notifier,
            history,
            store,
            search_delay: SEARCH_DELAY,
        })
    }

    pub fn with_search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// One cycle: fetch, parse, match, submit, persist.
    ///
    /// Only a failed fetch or a failed history write is an error. Items that can't
    /// be matched, and a rejected batch, are reported to the notifier instead.
    #[instrument(skip(self), fields(source = self.source.source_name(), catalog = self.catalog.catalog_name()))]
    pub async fn run(&mut self) -> Result<RunReport> {
        self.update_history().await?;
        let report = self.mark_as_watched().await;
        self.store.save(&self.history).context("write history")?;
        info!(?report, "Run finished");
        Ok(report)
    }

    async fn update_history(&mut self) -> Result<()> {
        let titles = self
            .source
            .fetch_titles()
            .await
            .map_err(|e| anyhow!(e))
            .context("update history")?;

        for title in &titles {
            if let Some(warning) = self.history.push(title) {
                self.notifier.send_message(&warning).await;
            }
        }
        debug!(fetched = titles.len(), queued = self.history.to_process().len(), "History updated");
        Ok(())
    }

    async fn mark_as_watched(&mut self) -> RunReport {
        let queued: Vec<WatchActivity> = self.history.to_process().to_vec();
        let mut report = RunReport {
            queued: queued.len(),
            ..RunReport::default()
        };
        if queued.is_empty() {
            debug!("Nothing new to record");
            return report;
        }

        let mut batch = MatchBatch::new();
        for (index, activity) in queued.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.search_delay).await;
            }

            match self.find(activity).await {
                Ok(selection) => {
                    report.matched += 1;
                    batch.add(selection, Utc::now());
                    self.notifier
                        .send_message(&format!("Adding to current watchlist batch: {}", activity))
                        .await;
                }
                Err(e) => {
                    report.not_found += 1;
                    error!(is_show = activity.is_show, media = %activity, error = %format!("{:#}", e), "media search failed");
                    self.notifier
                        .send_message(&format!(
                            "Trakt: Couldn't find: {}\nError: {:#}\nPlease add manually.",
                            activity, e
                        ))
                        .await;
                }
            }
        }

        if batch.is_empty() {
            // Everything was reported for manual handling
            self.history.clear_to_process();
            return report;
        }

        let size = batch.len();
        info!(movies = batch.movie_count(), episodes = batch.episode_count(), "Submitting batch");
        match self.catalog.mark_as_watched(&batch.into_request()).await {
            Ok(response) => {
                report.submitted = true;
                report.added_movies = response.added.movies;
                report.added_episodes = response.added.episodes;
                self.notifier.send_message("Batch processed successfully").await;
                self.history.clear_to_process();
            }
            Err(e) => {
                error!(error = %e, items = size, "failed to watch");
                self.notifier
                    .send_message(&format!("Trakt: Couldn't mark the batch as watched. Error: {}", e))
                    .await;
            }
        }

        report
    }

    async fn find(&mut self, activity: &WatchActivity) -> Result<Selection> {
        let kind = if activity.is_show { SearchType::Episode } else { SearchType::Movie };
        let query = activity.search_query();

        let candidates = self
            .catalog
            .search(kind, &query)
            .await
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("searching for {}", query))?;

        Ok(select_candidate(activity, &candidates)?)
    }
}
