use async_trait::async_trait;
use traktflix_models::{SearchCandidate, SearchType, SyncHistoryRequest, SyncHistoryResponse};

/// Where watched titles come from.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn source_name(&self) -> &str;

    /// Raw titles of the recent viewing activity, oldest first.
    async fn fetch_titles(&self) -> Result<Vec<String>, Self::Error>;
}

/// Where watched titles get recorded.
///
/// Methods take `&mut self` because a call may renew and replace the credential.
#[async_trait]
pub trait Catalog: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn catalog_name(&self) -> &str;

    async fn search(&mut self, kind: SearchType, query: &str) -> Result<Vec<SearchCandidate>, Self::Error>;

    async fn mark_as_watched(&mut self, request: &SyncHistoryRequest) -> Result<SyncHistoryResponse, Self::Error>;
}
