pub mod catalog;
pub mod credential;
pub mod sync_history;
pub mod watch_activity;

pub use catalog::{Episode, Media, SearchCandidate, SearchType, TraktIds};
pub use credential::Credential;
pub use sync_history::{SyncHistoryRequest, SyncHistoryResponse, WatchedItem};
pub use watch_activity::WatchActivity;
