//! Sink that only writes the event to the log.

use async_trait::async_trait;

use folio_core::ports::{NotificationError, NotificationEvent, NotificationSink};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, event: NotificationEvent) -> Result<(), NotificationError> {
        let payload = serde_json::to_string(&event)
            .map_err(|e| NotificationError::Serialization(e.to_string()))?;

        tracing::info!(event = event.kind(), post_id = %event.post_id(), %payload, "Notification");
        Ok(())
    }
}
