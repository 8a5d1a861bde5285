use crate::matcher::Selection;
use chrono::{DateTime, SecondsFormat, Utc};
use traktflix_models::{SyncHistoryRequest, TraktIds, WatchedItem};

/// Confirmed items waiting for a single `mark as watched` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchBatch {
    movies: Vec<WatchedItem>,
    episodes: Vec<WatchedItem>,
}

impl MatchBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_movie(&mut self, ids: TraktIds, watched_at: DateTime<Utc>) {
        self.movies.push(watched_item(ids, watched_at));
    }

    pub fn add_episode(&mut self, ids: TraktIds, watched_at: DateTime<Utc>) {
        self.episodes.push(watched_item(ids, watched_at));
    }

    pub fn add(&mut self, selection: Selection, watched_at: DateTime<Utc>) {
        match selection {
            Selection::Movie(ids) => self.add_movie(ids, watched_at),
            Selection::Episode(ids) => self.add_episode(ids, watched_at),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty() && self.episodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.movies.len() + self.episodes.len()
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn episode_count(&self) -> usize {
        self.episodes.len()
    }

    pub fn into_request(self) -> SyncHistoryRequest {
        SyncHistoryRequest {
            movies: self.movies,
            episodes: self.episodes,
        }
    }

    pub fn clear(&mut self) {
        self.movies.clear();
        self.episodes.clear();
    }
}

fn watched_item(ids: TraktIds, watched_at: DateTime<Utc>) -> WatchedItem {
    WatchedItem {
        watched_at: watched_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ids(trakt: u64) -> TraktIds {
        TraktIds { trakt, ..TraktIds::default() }
    }

    #[test]
    fn test_batch_accumulates_and_clears() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let mut batch = MatchBatch::new();
        assert!(batch.is_empty());

        batch.add_movie(ids(1), at);
        batch.add(Selection::Episode(ids(2)), at);
        batch.add(Selection::Episode(ids(3)), at);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.movie_count(), 1);
        assert_eq!(batch.episode_count(), 2);

        let mut copy = batch.clone();
        copy.clear();
        assert!(copy.is_empty());

        let request = batch.into_request();
        assert_eq!(request.movies[0].ids.trakt, 1);
        assert_eq!(request.movies[0].watched_at, "2024-05-01T10:00:00Z");
        assert_eq!(request.episodes.len(), 2);
    }
}
