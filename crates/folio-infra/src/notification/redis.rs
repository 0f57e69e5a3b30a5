//! Redis notification sink. Events are published as JSON on one channel.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use folio_core::ports::{NotificationError, NotificationEvent, NotificationSink};

pub const DEFAULT_CHANNEL: &str = "folio:notifications";

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    pub channel: String,
    pub connect_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            channel: std::env::var("NOTIFY_CHANNEL")
                .unwrap_or_else(|_| DEFAULT_CHANNEL.to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}

/// Redis-backed notification sink.
pub struct RedisNotificationSink {
    conn: ConnectionManager,
    channel: String,
}

impl RedisNotificationSink {
    pub async fn new(config: RedisConfig) -> Result<Self, NotificationError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| NotificationError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| NotificationError::Connection("Connection timed out".to_string()))?
            .map_err(|e| NotificationError::Connection(e.to_string()))?;

        tracing::info!(
            url = %config.url,
            channel = %config.channel,
            "Connected to Redis notifications"
        );

        Ok(Self {
            conn,
            channel: config.channel,
        })
    }
}

#[async_trait]
impl NotificationSink for RedisNotificationSink {
    async fn notify(&self, event: NotificationEvent) -> Result<(), NotificationError> {
        let payload = serde_json::to_string(&event)
            .map_err(|e| NotificationError::Serialization(e.to_string()))?;

        let mut conn = self.conn.clone();
        let receivers: i64 = conn
            .publish(&self.channel, payload)
            .await
            .map_err(|e| NotificationError::Delivery(e.to_string()))?;

        tracing::debug!(
            channel = %self.channel,
            receivers,
            event = event.kind(),
            "Notification published"
        );
        Ok(())
    }
}
