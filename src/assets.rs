//! Control Room asset storage (text assets only).

use crate::error::{LauncherError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const API_URL_ENV: &str = "RC_API_URL_V1";
pub const API_TOKEN_ENV: &str = "RC_API_TOKEN_V1";
pub const WORKSPACE_ENV: &str = "RC_WORKSPACE_ID";

/// Text lookup by asset name.
///
/// `Ok(None)` means the store answered and has no such asset; `Err` means the
/// store could not be asked.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn get_text(&self, name: &str) -> Result<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct AssetDetails {
    payload: AssetPayload,
}

#[derive(Debug, Deserialize)]
struct AssetPayload {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
    #[serde(default)]
    url: Option<String>,
}

/// HTTP client for the Control Room asset API
pub struct ControlRoomAssets {
    client: Client,
    api_url: String,
    token: String,
    workspace_id: String,
}

impl ControlRoomAssets {
    pub fn new(api_url: &str, token: String, workspace_id: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LauncherError::Asset(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, api_url, token, workspace_id))
    }

    pub fn with_client(client: Client, api_url: &str, token: String, workspace_id: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            workspace_id,
        }
    }

    /// Build from `RC_API_URL_V1`, `RC_API_TOKEN_V1` and `RC_WORKSPACE_ID`.
    /// Returns `None` when any of them is missing, i.e. outside Control Room.
    pub fn from_env() -> Option<Self> {
        let api_url = non_empty_var(API_URL_ENV)?;
        let token = non_empty_var(API_TOKEN_ENV)?;
        let workspace_id = non_empty_var(WORKSPACE_ENV)?;

        match Self::new(&api_url, token, workspace_id) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!("Asset storage disabled: {}", e);
                None
            }
        }
    }

    fn asset_url(&self, name: &str) -> String {
        format!(
            "{}/workspaces/{}/assets/name:{}",
            self.api_url, self.workspace_id, name
        )
    }
}

#[async_trait]
impl AssetStore for ControlRoomAssets {
    async fn get_text(&self, name: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(self.asset_url(name))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| LauncherError::Asset(format!("Request for asset {} failed: {}", name, e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(LauncherError::Asset(format!(
                "Asset {} lookup returned HTTP {}",
                name,
                response.status()
            )));
        }

        let details: AssetDetails = response
            .json()
            .await
            .map_err(|e| LauncherError::Asset(format!("Invalid asset response for {}: {}", name, e)))?;

        if details.payload.kind != "text" {
            tracing::debug!("Asset {} has payload type {}, ignoring", name, details.payload.kind);
            return Ok(None);
        }

        if let Some(value) = details.payload.value {
            return Ok(value.as_str().map(str::to_string));
        }

        let Some(url) = details.payload.url else {
            return Ok(None);
        };

        let content = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| LauncherError::Asset(format!("Download of asset {} failed: {}", name, e)))?
            .text()
            .await
            .map_err(|e| LauncherError::Asset(format!("Download of asset {} failed: {}", name, e)))?;

        Ok(Some(content))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
