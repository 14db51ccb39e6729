use crate::error::{LauncherError, Result};
use crate::vault::{Secret, SecretStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const SECRETS_FILE_ENV: &str = "RC_VAULT_SECRETS_FILE";

/// Secrets read from a local JSON document:
/// `{"sso_account": {"email": "...", "password": "...", "mfa_secret_key": "..."}}`
pub struct FileSecrets {
    path: PathBuf,
}

impl FileSecrets {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `configured` if set, else `RC_VAULT_SECRETS_FILE`.
    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        if let Some(path) = configured {
            return Ok(Self::new(path));
        }
        match std::env::var_os(SECRETS_FILE_ENV).filter(|p| !p.is_empty()) {
            Some(path) => Ok(Self::new(path)),
            None => Err(LauncherError::Secret(format!(
                "No secrets file configured (set vault.secrets_file or {})",
                SECRETS_FILE_ENV
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SecretStore for FileSecrets {
    async fn get_secret(&self, name: &str) -> Result<Secret> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            LauncherError::Secret(format!("Failed to read secrets file {:?}: {}", self.path, e))
        })?;

        let mut document: HashMap<String, HashMap<String, serde_json::Value>> =
            serde_json::from_str(&content).map_err(|e| {
                LauncherError::Secret(format!("Secrets file {:?} is not valid: {}", self.path, e))
            })?;

        let entry = document
            .remove(name)
            .ok_or_else(|| LauncherError::Secret(format!("Secret {} not found", name)))?;

        let values = entry
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect();

        tracing::debug!("Loaded secret {} from {:?}", name, self.path);
        Ok(Secret::new(name, values))
    }
}
