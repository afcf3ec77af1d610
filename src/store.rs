use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::errors::AppError;

/// Capability handed to the token cache: a shared key-value store holding the
/// cached bearer token. `write` takes `existed` because the backing admin API
/// distinguishes create from update; callers decide based on a prior read.
///
/// There is deliberately no locking or compare-and-swap across handlers:
/// last writer wins, and any valid token is equally usable.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;
    async fn write(&self, key: &str, value: &str, existed: bool) -> Result<(), AppError>;
}

// ── Vercel Edge Config implementation ─────────────────────────────────────────

const EDGE_CONFIG_READ_BASE: &str = "https://edge-config.vercel.com";
const VERCEL_API_BASE: &str = "https://api.vercel.com";

/// Token store backed by a Vercel Edge Config: reads go through the fast
/// read endpoint, writes through the administrative items API.
pub struct EdgeConfigStore {
    client: reqwest::Client,
    read_base: String,
    admin_base: String,
    config_id: String,
    read_token: String,
    api_token: String,
    team_id: Option<String>,
}

impl EdgeConfigStore {
    pub fn new(
        config_id: String,
        read_token: String,
        api_token: String,
        team_id: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            read_base: EDGE_CONFIG_READ_BASE.to_string(),
            admin_base: VERCEL_API_BASE.to_string(),
            config_id,
            read_token,
            api_token,
            team_id,
        }
    }

    /// Overrides both base URLs (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.read_base = url.to_string();
        self.admin_base = url.to_string();
        self
    }
}

#[async_trait]
impl TokenStore for EdgeConfigStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let url = format!(
            "{}/{}/item/{}?token={}",
            self.read_base, self.config_id, key, self.read_token
        );
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ConfigRead {
                message: format!("read of '{key}' returned {status}: {body}"),
            });
        }

        // Item values come back as their JSON encoding; ours is a string.
        let value: String = response.json().await?;
        debug!(key, "token store hit");
        Ok(Some(value))
    }

    async fn write(&self, key: &str, value: &str, existed: bool) -> Result<(), AppError> {
        let operation = if existed { "update" } else { "create" };
        let mut url = format!("{}/v1/edge-config/{}/items", self.admin_base, self.config_id);
        if let Some(team_id) = &self.team_id {
            url.push_str(&format!("?teamId={team_id}"));
        }

        let body = serde_json::json!({
            "items": [ { "operation": operation, "key": key, "value": value } ]
        });

        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ConfigWrite {
                message: format!("{operation} of '{key}' returned {status}: {body}"),
            });
        }

        debug!(key, operation, "token store write acknowledged");
        Ok(())
    }
}

// ── In-memory implementation ──────────────────────────────────────────────────

/// Process-local fallback used when the edge-config environment is not
/// configured. Tokens cached here do not survive restarts or span instances.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str, _existed: bool) -> Result<(), AppError> {
        self.entries.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ── Test support ──────────────────────────────────────────────────────────────
