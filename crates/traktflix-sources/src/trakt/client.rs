use crate::error::TraktError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport, Method};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, warn};
use traktflix_config::{CredentialStore, TraktConfig};
use traktflix_models::Credential;

pub const DEFAULT_BASE_URL: &str = "https://api.trakt.tv/";

/// Per-call behaviour of [`TraktClient::request`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Don't send the bearer token, and never try to refresh it.
    pub no_auth: bool,
    /// A 401 is final instead of triggering one refresh and retry.
    pub no_retry_on_auth_failure: bool,
}

impl RequestOptions {
    pub fn authenticated() -> Self {
        Self::default()
    }

    pub fn no_auth() -> Self {
        Self { no_auth: true, ..Self::default() }
    }

    pub fn without_retry(self) -> Self {
        Self { no_retry_on_auth_failure: true, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    NoCredential,
    Valid,
    Refreshing,
}

/// Trakt API client owning the user credential.
///
/// Any authenticated call answered with a 401 renews the credential with the
/// refresh token, writes it to the [`CredentialStore`] and is sent again, once.
pub struct TraktClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    pub(crate) client_id: String,
    pub(crate) client_secret: SecretString,
    pub(crate) redirect_uri: String,
    credential: Credential,
    store: CredentialStore,
    state: AuthState,
}

impl TraktClient {
    /// Build a client, loading the stored credential if there is one.
    pub fn new(config: &TraktConfig, store: CredentialStore, transport: Arc<dyn HttpTransport>) -> anyhow::Result<Self> {
        let credential = store.load()?;
        let state = initial_state(&credential);
        debug!(state = ?state, path = %store.path().display(), "Trakt credential loaded");

        Ok(Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: config.client_id.clone(),
            client_secret: SecretString::from(config.client_secret.expose_secret()),
            redirect_uri: config.redirect_uri.clone(),
            credential,
            store,
            state,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        !self.credential.is_empty()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Swap in a new credential and persist it.
    pub(crate) fn replace_credential(&mut self, credential: Credential) -> Result<(), TraktError> {
        self.credential = credential;
        self.state = initial_state(&self.credential);
        self.store.save(&self.credential).map_err(TraktError::Persist)
    }

    fn url(&self, path: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, path.trim_start_matches('/'))
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    /// One attempt, whatever the status.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
        options: RequestOptions,
    ) -> Result<HttpResponse, TraktError> {
        let mut request = HttpRequest {
            method,
            url: self.url(path),
            headers: Vec::new(),
            body: body.map(<[u8]>::to_vec),
        }
        .header("Content-Type", "application/json")
        .header("trakt-api-version", "2")
        .header("trakt-api-key", self.client_id.as_str());

        if !options.no_auth {
            request = request.header(
                "Authorization",
                format!("Bearer {}", self.credential.access_token.expose_secret()),
            );
        }

        debug!(method = ?method, path, no_auth = options.no_auth, "Trakt request");
        self.transport.send(request).await.map_err(TraktError::Transport)
    }

    /// Send a call, renewing the credential once on a 401. Non-2xx statuses are errors.
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        body: Option<&[u8]>,
        options: RequestOptions,
    ) -> Result<HttpResponse, TraktError> {
        let mut options = options;
        loop {
            let response = self.send(method, path, body, options).await?;

            if response.status == 401 && !options.no_auth {
                if options.no_retry_on_auth_failure {
                    return Err(TraktError::Unauthorized);
                }
                if !self.credential.has_refresh_token() {
                    warn!("Trakt rejected the access token and no refresh token is stored");
                    return Err(TraktError::Unauthorized);
                }

                warn!("Trakt rejected the access token, refreshing it");
                self.state = AuthState::Refreshing;
                if let Err(e) = self.refresh_token().await {
                    self.state = initial_state(&self.credential);
                    return Err(TraktError::Refresh(Box::new(e)));
                }
                options = options.without_retry();
                continue;
            }

            return check_status(response);
        }
    }
}

fn initial_state(credential: &Credential) -> AuthState {
    if credential.is_empty() {
        AuthState::NoCredential
    } else {
        AuthState::Valid
    }
}

pub(crate) fn check_status(response: HttpResponse) -> Result<HttpResponse, TraktError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(TraktError::Status {
            status: response.status,
            body: response.text().into_owned(),
        })
    }
}
