use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use traktflix_models::Credential;
use tracing::debug;

/// On-disk shape of the Trakt credential. Tokens are stored as plain strings.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
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

impl From<CredentialFile> for Credential {
    fn from(file: CredentialFile) -> Self {
        Credential {
            access_token: SecretString::from(file.access_token),
            refresh_token: SecretString::from(file.refresh_token),
            token_type: file.token_type,
            expires_in: file.expires_in,
            scope: file.scope,
            created_at: file.created_at,
        }
    }
}

impl From<&Credential> for CredentialFile {
    fn from(credential: &Credential) -> Self {
        CredentialFile {
            access_token: credential.access_token.expose_secret().to_string(),
            token_type: credential.token_type.clone(),
            expires_in: credential.expires_in,
            refresh_token: credential.refresh_token.expose_secret().to_string(),
            scope: credential.scope.clone(),
            created_at: credential.created_at,
        }
    }
}

/// JSON file holding the single Trakt credential of this installation.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored credential. A missing file yields an empty credential.
    pub fn load(&self) -> Result<Credential> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No credential file, starting unauthenticated");
            return Ok(Credential::empty());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read auth file {}", self.path.display()))?;
        let file: CredentialFile = serde_json::from_str(&content)
            .with_context(|| format!("decode auth file {}", self.path.display()))?;
        Ok(file.into())
    }

    /// Replace the stored credential (whole-file write via temp file + rename).
    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec(&CredentialFile::from(credential)).context("marshal auth data")?;
        let temp_path = self.path.with_extension("tmp");
        write_private(&temp_path, &data)?;
        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("replace auth file {}", self.path.display()))?;

        debug!(path = %self.path.display(), "Saved Trakt credential");
        Ok(())
    }
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
        .with_context(|| format!("open {}", path.display()))?;
    // mode() only applies to newly created files
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("restrict permissions of {}", path.display()))?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, data).with_context(|| format!("write {}", path.display()))
}
