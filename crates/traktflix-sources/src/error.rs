use crate::http::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraktError {
    /// The credential was rejected and could not be renewed.
    #[error("unauthorized: the Trakt credential was rejected, run `traktflix auth` again")]
    Unauthorized,

    /// The user has not approved the device code yet.
    #[error("pending authorization")]
    PendingAuthorization,

    #[error("http {status}. See https://trakt.docs.apiary.io/#introduction/status-codes")]
    Status { status: u16, body: String },

    #[error("send HTTP request: {0}")]
    Transport(#[source] TransportError),

    #[error("json: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("write auth file on disk: {0:#}")]
    Persist(anyhow::Error),

    #[error("refresh token: {0}")]
    Refresh(#[source] Box<TraktError>),
}

impl TraktError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TraktError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DeviceAuthError {
    #[error("authentication timed out. Please try again")]
    Expired,

    #[error("get access token: {0}")]
    Trakt(#[from] TraktError),
}

#[derive(Debug, Error)]
pub enum NetflixError {
    #[error("http {0}")]
    Status(u16),

    #[error("make http request: {0}")]
    Transport(#[source] TransportError),

    #[error("parsing HTML: {0}")]
    Html(String),
}
