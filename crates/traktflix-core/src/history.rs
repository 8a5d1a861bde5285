use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use traktflix_models::WatchActivity;
use traktflix_sources::netflix::parse_title;

/// Number of raw titles remembered.
pub const HISTORY_SIZE: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Seen {}

/// The last [`HISTORY_SIZE`] raw titles seen, plus the activities parsed from the
/// new ones that still need to be recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    search: BTreeMap<String, Seen>,
    #[serde(default)]
    items: Vec<String>,
    #[serde(skip)]
    to_process: Vec<WatchActivity>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, raw: &str) -> bool {
        self.search.contains_key(raw)
    }

    /// Remember `raw` and queue its parsed activity. Titles already seen are ignored.
    ///
    /// Returns the parser warning, if any.
    pub fn push(&mut self, raw: &str) -> Option<String> {
        if self.contains(raw) {
            return None;
        }

        if self.items.len() >= HISTORY_SIZE {
            let oldest = self.items.remove(0);
            self.search.remove(&oldest);
        }

        self.items.push(raw.to_string());
        self.search.insert(raw.to_string(), Seen {});

        let parsed = parse_title(raw);
        debug!(title = raw, activity = %parsed.activity, "New activity");
        self.to_process.push(parsed.activity);
        parsed.warning
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn to_process(&self) -> &[WatchActivity] {
        &self.to_process
    }

    pub fn clear_to_process(&mut self) {
        self.to_process.clear();
    }
}

/// JSON file holding the [`History`] between runs.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<History> {
        if !self.path.exists() {
            return Ok(History::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read history file {}", self.path.display()))?;
        let history = serde_json::from_str(&content)
            .with_context(|| format!("decode history file {}", self.path.display()))?;
        Ok(history)
    }

    pub fn save(&self, history: &History) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create directory {}", parent.display()))?;
        }

        let content = serde_json::to_string(history).context("encode history")?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, content)
            .with_context(|| format!("write history file {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("replace history file {}", self.path.display()))?;

        debug!(path = %self.path.display(), items = history.items.len(), "History saved");
        Ok(())
    }
}
