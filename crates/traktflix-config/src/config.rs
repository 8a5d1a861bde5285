use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::Path;

pub const DEFAULT_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
pub const DEFAULT_AUTH_FILE: &str = "trakt_auth.json";
pub const DEFAULT_NETFLIX_URL: &str = "https://www.netflix.com/viewingactivity";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub trakt: TraktConfig,
    #[serde(default)]
    pub netflix: NetflixConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default = "default_scheduler_config")]
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Deserialize)]
pub struct TraktConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub client_secret: SecretString,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Credential file, relative to the config directory.
    #[serde(default = "default_auth_file")]
    pub auth_file: String,
}

#[derive(Debug, Deserialize)]
pub struct NetflixConfig {
    #[serde(default)]
    pub account_id: String,
    /// Value of the `NetflixId` cookie.
    #[serde(default = "empty_secret", deserialize_with = "deserialize_secret")]
    pub cookie: SecretString,
    #[serde(default = "default_netflix_url")]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub webhooks: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SchedulerConfig {
    /// Six-field cron expression (seconds first).
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: empty_secret(),
            redirect_uri: default_redirect_uri(),
            auth_file: default_auth_file(),
        }
    }
}

impl Default for NetflixConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            cookie: empty_secret(),
            url: default_netflix_url(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        default_scheduler_config()
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn empty_secret() -> SecretString {
    SecretString::from("")
}

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

fn default_auth_file() -> String {
    DEFAULT_AUTH_FILE.to_string()
}

fn default_netflix_url() -> String {
    DEFAULT_NETFLIX_URL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 0 * * * *".to_string() // Hourly
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        schedule: default_schedule(),
        run_on_startup: default_true(),
    }
}

impl Config {
    /// Load `config.toml` if it exists, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Override fields from variables named like `TRAKT_CLIENT_ID` or `NETFLIX_COOKIE`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty("TRAKT_CLIENT_ID") {
            self.trakt.client_id = v;
        }
        if let Some(v) = non_empty("TRAKT_CLIENT_SECRET") {
            self.trakt.client_secret = SecretString::from(v);
        }
        if let Some(v) = non_empty("TRAKT_REDIRECT_URI") {
            self.trakt.redirect_uri = v;
        }
        if let Some(v) = non_empty("TRAKT_AUTH_FILE_REL_PATH") {
            self.trakt.auth_file = v;
        }
        if let Some(v) = non_empty("NETFLIX_ACCOUNT_ID") {
            self.netflix.account_id = v;
        }
        if let Some(v) = non_empty("NETFLIX_COOKIE") {
            self.netflix.cookie = SecretString::from(v);
        }
        if let Some(v) = non_empty("NETFLIX_URL") {
            self.netflix.url = v;
        }
        if let Some(v) = non_empty("SLACK_WEBHOOKS") {
            self.slack.webhooks = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = non_empty("CRON_SPECS") {
            self.scheduler.schedule = v;
        }
    }

    /// Fields needed to talk to Trakt (enough for `auth`).
    pub fn validate_trakt(&self) -> Result<()> {
        if self.trakt.client_id.trim().is_empty() {
            return Err(anyhow::anyhow!("trakt.client_id (TRAKT_CLIENT_ID) is required"));
        }
        if self.trakt.redirect_uri.trim().is_empty() {
            return Err(anyhow::anyhow!("trakt.redirect_uri (TRAKT_REDIRECT_URI) cannot be empty"));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_trakt()?;
        if self.netflix.cookie.expose_secret().trim().is_empty() {
            return Err(anyhow::anyhow!("netflix.cookie (NETFLIX_COOKIE) is required"));
        }
        if self.netflix.url.trim().is_empty() {
            return Err(anyhow::anyhow!("netflix.url (NETFLIX_URL) cannot be empty"));
        }
        if self.scheduler.schedule.trim().is_empty() {
            return Err(anyhow::anyhow!("scheduler.schedule (CRON_SPECS) cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[trakt]
client_id = "abc"
client_secret = "shh"

[netflix]
account_id = "PROFILE1"
cookie = "cookie-value"

[slack]
webhooks = ["https://hooks.slack.com/services/T/B/X"]
"#
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.trakt.client_id, "abc");
        assert_eq!(config.trakt.client_secret.expose_secret(), "shh");
        assert_eq!(config.trakt.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(config.trakt.auth_file, DEFAULT_AUTH_FILE);
        assert_eq!(config.netflix.account_id, "PROFILE1");
        assert_eq!(config.netflix.url, DEFAULT_NETFLIX_URL);
        assert_eq!(config.slack.webhooks.len(), 1);
        assert_eq!(config.scheduler.schedule, "0 0 * * * *");
        assert!(config.scheduler.run_on_startup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TRAKT_CLIENT_ID", "from-env"),
            ("NETFLIX_COOKIE", "env-cookie"),
            ("SLACK_WEBHOOKS", "https://a.example, https://b.example,"),
            ("CRON_SPECS", "0 */30 * * * *"),
            ("NETFLIX_URL", "  "),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.trakt.client_id, "from-env");
        assert_eq!(config.netflix.cookie.expose_secret(), "env-cookie");
        assert_eq!(config.slack.webhooks, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.scheduler.schedule, "0 */30 * * * *");
        // Blank values don't clobber defaults
        assert_eq!(config.netflix.url, DEFAULT_NETFLIX_URL);
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate_trakt().is_err());

        config.trakt.client_id = "id".to_string();
        assert!(config.validate_trakt().is_ok());
        assert!(config.validate().is_err());

        config.netflix.cookie = SecretString::from("cookie");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut config = Config::default();
        config.trakt.client_secret = SecretString::from("super-secret");
        config.netflix.cookie = SecretString::from("netflix-cookie");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("netflix-cookie"));
    }
}
