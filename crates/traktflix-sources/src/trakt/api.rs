use crate::error::TraktError;
use crate::http::Method;
use crate::traits::Catalog;
use crate::trakt::client::{RequestOptions, TraktClient};
use async_trait::async_trait;
use tracing::{debug, info};
use traktflix_models::{SearchCandidate, SearchType, SyncHistoryRequest, SyncHistoryResponse};

impl TraktClient {
    /// `GET /search/{type}`. Results of other types are dropped.
    pub async fn search(&mut self, kind: SearchType, query: &str) -> Result<Vec<SearchCandidate>, TraktError> {
        let path = format!("/search/{}?query={}", kind, urlencoding::encode(query));
        let response = self.request(Method::Get, &path, None, RequestOptions::no_auth()).await?;
        if response.status != 200 {
            return Err(TraktError::Status { status: response.status, body: response.text().into_owned() });
        }

        let results: Vec<SearchCandidate> = serde_json::from_slice(&response.body)?;
        let results: Vec<SearchCandidate> = results
            .into_iter()
            .filter(|r| !matches!(r, SearchCandidate::Other))
            .collect();
        debug!(kind = %kind, query, count = results.len(), "Trakt search");
        Ok(results)
    }

    /// `POST /sync/history`.
    pub async fn mark_as_watched(&mut self, request: &SyncHistoryRequest) -> Result<SyncHistoryResponse, TraktError> {
        let body = serde_json::to_vec(request)?;
        let response = self
            .request(Method::Post, "/sync/history", Some(body.as_slice()), RequestOptions::authenticated())
            .await?;
        if response.status != 201 {
            return Err(TraktError::Status { status: response.status, body: response.text().into_owned() });
        }

        let result: SyncHistoryResponse = serde_json::from_slice(&response.body)?;
        info!(
            movies = result.added.movies,
            episodes = result.added.episodes,
            not_found_movies = result.not_found.movies.len(),
            not_found_episodes = result.not_found.episodes.len(),
            "Trakt history updated"
        );
        Ok(result)
    }
}

#[async_trait]
impl Catalog for TraktClient {
    type Error = TraktError;

    fn catalog_name(&self) -> &str {
        "trakt"
    }

    async fn search(&mut self, kind: SearchType, query: &str) -> Result<Vec<SearchCandidate>, Self::Error> {
        TraktClient::search(self, kind, query).await
    }

    async fn mark_as_watched(&mut self, request: &SyncHistoryRequest) -> Result<SyncHistoryResponse, Self::Error> {
        TraktClient::mark_as_watched(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trakt::client::tests::{stored_credential, test_client};
    use traktflix_models::{TraktIds, WatchedItem};

    #[tokio::test]
    async fn test_search_escapes_query_without_auth() {
        let (mut client, transport, _dir) = test_client(Some(stored_credential("access", "refresh")));
        transport.respond(
            200,
            r#"[
                {"type": "episode", "score": 10.0, "show": {"title": "Alice in Borderland", "ids": {"trakt": 1}}, "episode": {"season": 2, "number": 8, "title": "Episode 8", "ids": {"trakt": 99}}},
                {"type": "show", "show": {"title": "Alice in Borderland", "ids": {"trakt": 1}}}
            ]"#,
        );

        let results = client.search(SearchType::Episode, "Alice in Borderland Episode 8").await.unwrap();
        assert_eq!(results.len(), 1);

        let requests = transport.requests();
        assert_eq!(
            requests[0].url,
            "https://api.trakt.tv/search/episode?query=Alice%20in%20Borderland%20Episode%208"
        );
        assert_eq!(requests[0].header_value("authorization"), None);
    }

    #[tokio::test]
    async fn test_search_requires_200() {
        let (mut client, transport, _dir) = test_client(None);
        transport.respond(204, "");
        let err = client.search(SearchType::Movie, "Pain Hustlers").await.unwrap_err();
        assert_eq!(err.status(), Some(204));
    }

    #[tokio::test]
    async fn test_mark_as_watched_requires_201() {
        let (mut client, transport, _dir) = test_client(Some(stored_credential("access", "refresh")));
        transport.respond(201, r#"{"added": {"movies": 1, "episodes": 0}, "not_found": {"movies": [], "episodes": []}}"#);
        transport.respond(200, "{}");

        let request = SyncHistoryRequest {
            movies: vec![WatchedItem {
                watched_at: "2024-05-01T10:00:00+00:00".to_string(),
                ids: TraktIds { trakt: 812, ..TraktIds::default() },
            }],
            episodes: Vec::new(),
        };

        let response = client.mark_as_watched(&request).await.unwrap();
        assert_eq!(response.added.movies, 1);

        let err = client.mark_as_watched(&request).await.unwrap_err();
        assert_eq!(err.status(), Some(200));

        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://api.trakt.tv/sync/history");
        assert_eq!(requests[0].header_value("authorization"), Some("Bearer access"));
        assert_eq!(requests[0].body_json().unwrap()["movies"][0]["ids"]["trakt"], 812);
    }
}
