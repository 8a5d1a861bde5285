use crate::error::TraktError;
use crate::http::Method;
use crate::trakt::client::{check_status, RequestOptions, TraktClient};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;
use traktflix_models::Credential;

/// Answer of `POST /oauth/device/code`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    /// Seconds the user has to approve the code.
    pub expires_in: u64,
    /// Seconds to wait between two token polls.
    pub interval: u64,
}

impl DeviceCode {
    /// Verification page with the user code already filled in.
    pub fn verification_link(&self) -> String {
        format!("{}/{}", self.verification_url.trim_end_matches('/'), self.user_code)
    }
}

#[derive(Serialize)]
struct DeviceCodeRequest<'a> {
    client_id: &'a str,
}

#[derive(Serialize)]
struct DeviceTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct RefreshTokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
    redirect_uri: &'a str,
    grant_type: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: String,
    #[serde(default)]
    expires_in: i64,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    created_at: i64,
}

impl From<TokenResponse> for Credential {
    fn from(token: TokenResponse) -> Self {
        Credential {
            access_token: SecretString::from(token.access_token),
            refresh_token: SecretString::from(token.refresh_token),
            token_type: token.token_type,
            expires_in: token.expires_in,
            scope: token.scope,
            created_at: token.created_at,
        }
    }
}

impl TraktClient {
    /// Start the device authorization flow.
    pub async fn generate_auth_code(&mut self) -> Result<DeviceCode, TraktError> {
        let body = serde_json::to_vec(&DeviceCodeRequest { client_id: &self.client_id })?;
        let response = self
            .request(Method::Post, "/oauth/device/code", Some(body.as_slice()), RequestOptions::no_auth())
            .await?;
        if response.status != 200 {
            return Err(TraktError::Status { status: response.status, body: response.text().into_owned() });
        }
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Poll once for the token of an approved device code.
    ///
    /// Returns [`TraktError::PendingAuthorization`] until the user approves the code.
    /// On success the new credential is stored.
    pub async fn get_access_token(&mut self, device_code: &str) -> Result<(), TraktError> {
        let body = serde_json::to_vec(&DeviceTokenRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            code: device_code,
        })?;

        let response = match self
            .request(Method::Post, "/oauth/device/token", Some(body.as_slice()), RequestOptions::no_auth())
            .await
        {
            Err(e) if e.status() == Some(400) => return Err(TraktError::PendingAuthorization),
            other => other?,
        };
        if response.status != 200 {
            return Err(TraktError::Status { status: response.status, body: response.text().into_owned() });
        }

        let token: TokenResponse = serde_json::from_slice(&response.body)?;
        self.replace_credential(token.into())?;
        info!("Trakt authorization granted");
        Ok(())
    }

    /// Trade the stored refresh token for a new credential, and store it.
    pub async fn refresh_token(&mut self) -> Result<(), TraktError> {
        if !self.credential().has_refresh_token() {
            return Err(TraktError::Unauthorized);
        }

        let body = serde_json::to_vec(&RefreshTokenRequest {
            client_id: &self.client_id,
            client_secret: self.client_secret.expose_secret(),
            refresh_token: self.credential().refresh_token.expose_secret(),
            redirect_uri: &self.redirect_uri,
            grant_type: "refresh_token",
        })?;

        // Sent directly: a rejected refresh must not trigger another refresh
        let options = RequestOptions::no_auth().without_retry();
        let response = check_status(self.send(Method::Post, "/oauth/token", Some(body.as_slice()), options).await?)?;
        if response.status != 200 {
            return Err(TraktError::Status { status: response.status, body: response.text().into_owned() });
        }

        let token: TokenResponse = serde_json::from_slice(&response.body)?;
        self.replace_credential(token.into())?;
        info!("Trakt access token refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trakt::client::tests::{stored_credential, test_client, TOKEN_BODY};
    use traktflix_config::CredentialStore;

    const DEVICE_CODE_BODY: &str = r#"{"device_code": "dev-123", "user_code": "5055CC52", "verification_url": "https://trakt.tv/activate", "expires_in": 600, "interval": 5}"#;

    #[tokio::test]
    async fn test_generate_auth_code() {
        let (mut client, transport, _dir) = test_client(None);
        transport.respond(200, DEVICE_CODE_BODY);

        let code = client.generate_auth_code().await.unwrap();
        assert_eq!(code.device_code, "dev-123");
        assert_eq!(code.expires_in, 600);
        assert_eq!(code.interval, 5);
        assert_eq!(code.verification_link(), "https://trakt.tv/activate/5055CC52");

        let requests = transport.requests();
        assert_eq!(requests[0].url, "https://api.trakt.tv/oauth/device/code");
        assert_eq!(requests[0].body_json().unwrap(), serde_json::json!({"client_id": "client-id"}));
        assert_eq!(requests[0].header_value("authorization"), None);
    }

    #[tokio::test]
    async fn test_generate_auth_code_unexpected_status() {
        let (mut client, transport, _dir) = test_client(None);
        transport.respond(201, "{}");
        let err = client.generate_auth_code().await.unwrap_err();
        assert_eq!(err.status(), Some(201));
    }

    #[tokio::test]
    async fn test_get_access_token_pending() {
        let (mut client, transport, _dir) = test_client(None);
        transport.respond(400, "");

        let err = client.get_access_token("dev-123").await.unwrap_err();
        assert!(matches!(err, TraktError::PendingAuthorization));
        assert!(!client.is_authenticated());

        let body = transport.requests()[0].body_json().unwrap();
        assert_eq!(
            body,
            serde_json::json!({"client_id": "client-id", "client_secret": "client-secret", "code": "dev-123"})
        );
    }

    #[tokio::test]
    async fn test_get_access_token_other_errors_are_fatal() {
        let (mut client, transport, _dir) = test_client(None);
        transport.respond(418, "");
        let err = client.get_access_token("dev-123").await.unwrap_err();
        assert_eq!(err.status(), Some(418));
    }

    #[tokio::test]
    async fn test_get_access_token_persists_credential() {
        let (mut client, transport, dir) = test_client(None);
        transport.respond(200, TOKEN_BODY);

        client.get_access_token("dev-123").await.unwrap();
        assert!(client.is_authenticated());

        let saved = CredentialStore::new(dir.path().join("trakt_auth.json")).load().unwrap();
        assert_eq!(saved.access_token.expose_secret(), "new-access");
        assert_eq!(saved.expires_in, 7776000);
    }

    #[tokio::test]
    async fn test_refresh_token_body() {
        let (mut client, transport, _dir) = test_client(Some(stored_credential("old-access", "old-refresh")));
        transport.respond(200, TOKEN_BODY);

        client.refresh_token().await.unwrap();

        let body = transport.requests()[0].body_json().unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "client_id": "client-id",
                "client_secret": "client-secret",
                "refresh_token": "old-refresh",
                "redirect_uri": "urn:ietf:wg:oauth:2.0:oob",
                "grant_type": "refresh_token"
            })
        );
        assert_eq!(client.credential().access_token.expose_secret(), "new-access");
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let (mut client, transport, _dir) = test_client(None);
        let err = client.refresh_token().await.unwrap_err();
        assert!(matches!(err, TraktError::Unauthorized));
        assert!(transport.requests().is_empty());
    }
}
