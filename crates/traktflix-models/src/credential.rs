use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Bearer credential issued by Trakt (device grant or refresh).
///
/// Tokens are wrapped in [`SecretString`]; `Debug` prints them redacted and the raw
/// value is only reachable through [`ExposeSecret`].
#[derive(Debug)]
pub struct Credential {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub token_type: String,
    pub expires_in: i64,
    pub scope: String,
    pub created_at: i64,
}

impl Credential {
    pub fn empty() -> Self {
        Self {
            access_token: SecretString::from(""),
            refresh_token: SecretString::from(""),
            token_type: String::new(),
            expires_in: 0,
            scope: String::new(),
            created_at: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.expose_secret().is_empty()
    }

    pub fn has_refresh_token(&self) -> bool {
        !self.refresh_token.expose_secret().is_empty()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.created_at.saturating_add(self.expires_in), 0)
            .single()
    }
}

impl Default for Credential {
    fn default() -> Self {
        Self::empty()
    }
}
