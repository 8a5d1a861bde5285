use crate::TraktIds;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedItem {
    /// RFC3339 timestamp.
    pub watched_at: String,
    pub ids: TraktIds,
}

/// Body of `POST /sync/history`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncHistoryRequest {
    pub movies: Vec<WatchedItem>,
    pub episodes: Vec<WatchedItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AddedCounts {
    #[serde(default)]
    pub movies: u32,
    #[serde(default)]
    pub episodes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NotFoundItem {
    pub ids: TraktIds,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NotFound {
    #[serde(default)]
    pub movies: Vec<NotFoundItem>,
    #[serde(default)]
    pub episodes: Vec<NotFoundItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SyncHistoryResponse {
    #[serde(default)]
    pub added: AddedCounts,
    #[serde(default)]
    pub not_found: NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_both_lists() {
        let request = SyncHistoryRequest {
            movies: vec![WatchedItem {
                watched_at: "2024-05-01T10:00:00+00:00".to_string(),
                ids: TraktIds { trakt: 42, ..TraktIds::default() },
            }],
            episodes: Vec::new(),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["movies"][0]["ids"], serde_json::json!({"trakt": 42}));
        assert_eq!(json["episodes"], serde_json::json!([]));
    }

    #[test]
    fn test_response_with_not_found() {
        let body = r#"{"added": {"movies": 1, "episodes": 0}, "not_found": {"movies": [], "episodes": [{"ids": {"trakt": 7}}]}}"#;
        let response: SyncHistoryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.added.movies, 1);
        assert_eq!(response.not_found.episodes[0].ids.trakt, 7);
    }
}
