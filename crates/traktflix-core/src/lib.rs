pub mod batch;
pub mod history;
pub mod matcher;
pub mod reconcile;

pub use batch::MatchBatch;
pub use history::{History, HistoryStore, HISTORY_SIZE};
pub use matcher::{matches, select_candidate, titles_match, MatchError, Selection};
pub use reconcile::{Reconciler, RunReport};
