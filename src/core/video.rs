//! Video room provider - Maps room tokens to join URLs.
//!
//! The marketplace only needs two things from a video backend: make sure a room
//! with a given name exists, and tell us where to join it. Provisioning is
//! idempotent; asking for a room that already exists is a success.

use crate::{
    config::{VideoConfig, VideoProviderKind},
    errors::{Error, Result},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tracing::debug;

/// Environment variable holding the Daily API key.
pub const DAILY_API_KEY_ENV: &str = "DAILY_API_KEY";

/// Something that can provision a named room and return its join URL.
#[async_trait]
pub trait VideoRoomProvider: Send + Sync {
    /// Ensures `room_id` exists and returns the URL participants open to join it.
    async fn ensure_room(&self, room_id: &str) -> Result<String>;
}

fn join_url(domain: &str, room_id: &str) -> String {
    format!("https://{}/{room_id}", domain.trim_end_matches('/'))
}

/// Provider that never calls out; rooms are assumed to be created on first join.
#[derive(Debug, Clone)]
pub struct StaticRoomProvider {
    domain: String,
}

impl StaticRoomProvider {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }
}

#[async_trait]
impl VideoRoomProvider for StaticRoomProvider {
    async fn ensure_room(&self, room_id: &str) -> Result<String> {
        Ok(join_url(&self.domain, room_id))
    }
}

#[derive(Debug, Serialize)]
struct CreateRoomRequest<'a> {
    name: &'a str,
    privacy: &'a str,
}

#[derive(Debug, Deserialize)]
struct RoomResponse {
    url: Option<String>,
}

/// Daily REST API provider.
pub struct DailyRoomProvider {
    client: Client,
    api_base: String,
    api_key: String,
    domain: String,
}

impl DailyRoomProvider {
    /// Builds a provider with an explicit request timeout.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        domain: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            domain: domain.into(),
        })
    }
}

/// Daily answers 400 with "already exists" when a room name is taken.
fn is_already_exists(status: StatusCode, body: &str) -> bool {
    status == StatusCode::BAD_REQUEST && body.contains("already exists")
}

#[async_trait]
impl VideoRoomProvider for DailyRoomProvider {
    async fn ensure_room(&self, room_id: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/rooms", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&CreateRoomRequest {
                name: room_id,
                privacy: "public",
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let room: RoomResponse = serde_json::from_str(&body).map_err(|e| Error::VideoProvider {
                message: format!("unexpected room payload from video provider: {e}"),
            })?;
            debug!(room_id, "video room created");
            return Ok(room.url.unwrap_or_else(|| join_url(&self.domain, room_id)));
        }

        if is_already_exists(status, &body) {
            debug!(room_id, "video room already exists");
            return Ok(join_url(&self.domain, room_id));
        }

        Err(Error::VideoProvider {
            message: format!("video provider refused room {room_id}: {status} {body}"),
        })
    }
}

/// Builds the provider selected in configuration.
pub fn provider_from_config(config: &VideoConfig) -> Result<Arc<dyn VideoRoomProvider>> {
    match config.provider {
        VideoProviderKind::Static => Ok(Arc::new(StaticRoomProvider::new(config.domain.clone()))),
        VideoProviderKind::Daily => {
            let api_key = std::env::var(DAILY_API_KEY_ENV)?;
            let provider = DailyRoomProvider::new(
                config.api_base.clone(),
                api_key,
                config.domain.clone(),
                Duration::from_secs(config.timeout_seconds),
            )?;
            Ok(Arc::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_builds_join_url() -> Result<()> {
        let provider = StaticRoomProvider::new("firm.daily.co/");
        let url = provider.ensure_room("consult-1-deadbeef").await?;
        assert_eq!(url, "https://firm.daily.co/consult-1-deadbeef");

        // Asking again is fine
        assert_eq!(provider.ensure_room("consult-1-deadbeef").await?, url);
        Ok(())
    }

    #[test]
    fn test_already_exists_is_recognised() {
        let body = r#"{"error":"invalid-request-error","info":"a room named consult-1-ab already exists"}"#;
        assert!(is_already_exists(StatusCode::BAD_REQUEST, body));
        assert!(!is_already_exists(StatusCode::BAD_REQUEST, r#"{"info":"bad name"}"#));
        assert!(!is_already_exists(StatusCode::UNAUTHORIZED, body));
    }

    #[test]
    fn test_static_provider_selected_by_default() -> Result<()> {
        let provider = provider_from_config(&VideoConfig::default());
        assert!(provider.is_ok());
        Ok(())
    }
}
