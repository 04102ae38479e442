//! HTTP client replaying outbox entries against the backend's sync REST API.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use liftlog_core::sync::{
    entity_table_name, OutboxEntry, SyncApplyError, SyncBackendClient, SyncOperation,
};

use crate::error::{RemoteSyncError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

#[derive(Debug, Clone)]
pub struct RemoteSyncConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl RemoteSyncConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    /// Reads `SYNC_API_URL` / `SYNC_API_TOKEN`. `None` when no backend is
    /// configured.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("SYNC_API_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())?;
        let mut config = Self::new(base_url);
        config.api_token = std::env::var("SYNC_API_TOKEN")
            .ok()
            .filter(|value| !value.trim().is_empty());
        Some(config)
    }
}

/// Client for the backend sync API. Each outbox entry becomes one call:
/// create/update map to an idempotent PUT of the payload, delete to a
/// DELETE. Anything other than 2xx counts as failure.
#[derive(Debug, Clone)]
pub struct RemoteSyncClient {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl RemoteSyncClient {
    pub fn new(config: RemoteSyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token,
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.api_token {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    fn mutation_url(&self, entry: &OutboxEntry) -> String {
        format!(
            "{}/v1/sync/{}/{}",
            self.base_url,
            entity_table_name(&entry.entity),
            urlencoding::encode(&entry.entity_id)
        )
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        log::warn!("API error response ({}): {}", status, preview);
    }

    pub async fn push_mutation(&self, entry: &OutboxEntry) -> Result<()> {
        let url = self.mutation_url(entry);
        debug!(
            "Pushing outbox entry {} ({:?} {:?}) to {url}",
            entry.id, entry.op, entry.entity
        );

        let request = match entry.op {
            SyncOperation::Create | SyncOperation::Update => self
                .client
                .put(&url)
                .headers(self.headers())
                .body(entry.payload.clone()),
            SyncOperation::Delete => self.client.delete(&url).headers(self.headers()),
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Self::log_response(status, &body);

        if status.is_success() {
            return Ok(());
        }
        let preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        Err(RemoteSyncError::api(status.as_u16(), preview))
    }
}

#[async_trait]
impl SyncBackendClient for RemoteSyncClient {
    async fn apply_mutation(
        &self,
        entry: &OutboxEntry,
    ) -> std::result::Result<(), SyncApplyError> {
        self.push_mutation(entry)
            .await
            .map_err(|err| SyncApplyError::new(err.to_string(), err.retry_class()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog_core::sync::SyncEntity;

    fn entry(entity: SyncEntity, entity_id: &str, op: SyncOperation) -> OutboxEntry {
        OutboxEntry {
            id: 1,
            entity,
            entity_id: entity_id.to_string(),
            op,
            payload: "{\"id\":\"x\"}".to_string(),
            created_at: "2026-08-05T09:00:00+00:00".to_string(),
            attempts: 0,
            last_error: None,
        }
    }

    #[test]
    fn mutation_urls_target_the_entity_table() {
        let client = RemoteSyncClient::new(RemoteSyncConfig::new("https://api.example.com/"))
            .expect("client");
        assert_eq!(
            client.mutation_url(&entry(SyncEntity::Gym, "gym-1", SyncOperation::Create)),
            "https://api.example.com/v1/sync/gyms/gym-1"
        );
        assert_eq!(
            client.mutation_url(&entry(
                SyncEntity::TrainingPathProgress,
                "u1:path-1",
                SyncOperation::Update
            )),
            "https://api.example.com/v1/sync/training_path_progress/u1%3Apath-1"
        );
    }

    #[test]
    fn bearer_token_is_attached_when_configured() {
        let client = RemoteSyncClient::new(
            RemoteSyncConfig::new("https://api.example.com").with_token("secret"),
        )
        .expect("client");
        let headers = client.headers();
        assert_eq!(
            headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer secret")
        );

        let anonymous = RemoteSyncClient::new(RemoteSyncConfig::new("https://api.example.com"))
            .expect("client");
        assert!(anonymous.headers().get(AUTHORIZATION).is_none());
    }
}
