use serde::{Deserialize, Serialize};
use std::fmt;

/// One entry of the Netflix viewing activity, classified as a movie or an episode.
///
/// For movies `episode_name` is empty and `season` is 0. A `season` of 0 on a show
/// means the season could not be determined from the title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchActivity {
    pub title: String,
    pub episode_name: String,
    pub season: u32,
    pub is_show: bool,
}

impl WatchActivity {
    pub fn movie(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            episode_name: String::new(),
            season: 0,
            is_show: false,
        }
    }

    pub fn episode(title: impl Into<String>, episode_name: impl Into<String>, season: u32) -> Self {
        Self {
            title: title.into(),
            episode_name: episode_name.into(),
            season,
            is_show: true,
        }
    }

    /// Text used to query the catalog. Not URL-escaped.
    pub fn search_query(&self) -> String {
        if self.is_show {
            format!("{} {}", self.title, self.episode_name)
        } else {
            self.title.clone()
        }
    }
}

impl fmt::Display for WatchActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_show {
            write!(f, "{}: {}", self.title, self.episode_name)
        } else {
            write!(f, "{}", self.title)
        }
    }
}
