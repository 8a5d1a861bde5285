use anyhow::Result;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config directory (useful in containers).
pub const CONFIG_DIR_ENV: &str = "TRAKTFLIX_CONFIG_DIR";

pub struct PathManager {
    config_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(Self::with_base(PathBuf::from(dir)));
        }

        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("traktflix");

        Ok(Self::with_base(base_dir))
    }

    pub fn with_base(base_dir: PathBuf) -> Self {
        Self {
            log_dir: base_dir.join("logs"),
            config_dir: base_dir,
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Location of the Trakt credential file, relative paths resolve against the config dir.
    pub fn credentials_file(&self, rel_path: &str) -> PathBuf {
        self.config_dir.join(rel_path)
    }

    pub fn history_file(&self) -> PathBuf {
        self.config_dir.join("history")
    }

    pub fn daemon_log_file(&self) -> PathBuf {
        self.log_dir.join("traktflix.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_base(PathBuf::from(".traktflix")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_rooted_in_base() {
        let paths = PathManager::with_base(PathBuf::from("/srv/traktflix"));
        assert_eq!(paths.config_file(), PathBuf::from("/srv/traktflix/config.toml"));
        assert_eq!(paths.history_file(), PathBuf::from("/srv/traktflix/history"));
        assert_eq!(
            paths.credentials_file("trakt_auth.json"),
            PathBuf::from("/srv/traktflix/trakt_auth.json")
        );
        assert_eq!(paths.daemon_log_file(), PathBuf::from("/srv/traktflix/logs/traktflix.log"));
    }
}
