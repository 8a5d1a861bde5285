pub mod auth;
pub mod daemon;
pub mod run;

use color_eyre::eyre::{eyre, Result};
use std::sync::Arc;
use tracing::{debug, info};
use traktflix_config::{Config, CredentialStore, PathManager};
use traktflix_core::{HistoryStore, Reconciler};
use traktflix_sources::{HttpTransport, LogNotifier, NetflixClient, Notifier, ReqwestTransport, SlackNotifier, TraktClient};

pub type AppReconciler = Reconciler<NetflixClient, TraktClient, Box<dyn Notifier>>;

/// Loaded configuration plus the shared HTTP transport.
pub struct App {
    pub config: Config,
    pub paths: PathManager,
    transport: Arc<dyn HttpTransport>,
}

impl App {
    pub fn load(paths: PathManager) -> Result<Self> {
        paths.ensure_directories().map_err(|e| eyre!("{:#}", e))?;

        let config_file = paths.config_file();
        let config = Config::load(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {:#}", config_file.display(), e))?;
        debug!(config_file = %config_file.display(), "Configuration loaded");

        let transport = ReqwestTransport::new().map_err(|e| eyre!("create HTTP client: {}", e))?;

        Ok(Self {
            config,
            paths,
            transport: Arc::new(transport),
        })
    }

    pub fn trakt_client(&self) -> Result<TraktClient> {
        self.config.validate_trakt().map_err(|e| eyre!("Invalid configuration: {}", e))?;

        let store = CredentialStore::new(self.paths.credentials_file(&self.config.trakt.auth_file));
        TraktClient::new(&self.config.trakt, store, self.transport.clone())
            .map_err(|e| eyre!("create trakt client: {:#}", e))
    }

    pub fn notifier(&self) -> Box<dyn Notifier> {
        let webhooks = &self.config.slack.webhooks;
        if webhooks.is_empty() {
            info!("No Slack webhook configured, notifications are only logged");
            Box::new(LogNotifier)
        } else {
            let notifier = SlackNotifier::new(self.transport.clone(), webhooks.clone());
            info!(webhooks = notifier.webhook_count(), "Slack notifications enabled");
            Box::new(notifier)
        }
    }

    pub fn reconciler(&self, trakt: TraktClient) -> Result<AppReconciler> {
        self.config.validate().map_err(|e| eyre!("Invalid configuration: {}", e))?;

        let netflix = NetflixClient::new(&self.config.netflix, self.transport.clone());
        let store = HistoryStore::new(self.paths.history_file());
        Reconciler::new(netflix, trakt, self.notifier(), store).map_err(|e| eyre!("{:#}", e))
    }
}
