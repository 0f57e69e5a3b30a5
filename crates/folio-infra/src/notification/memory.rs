//! In-memory notification sink.
//!
//! Keeps every delivered event and fans them out to in-process subscribers.
//! Used when no Redis is configured and by tests.

use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use folio_core::ports::{NotificationError, NotificationEvent, NotificationSink};

pub struct InMemoryNotificationSink {
    delivered: Mutex<Vec<NotificationEvent>>,
    sender: broadcast::Sender<NotificationEvent>,
}

impl InMemoryNotificationSink {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            sender: broadcast::channel(buffer_size).0,
        }
    }

    /// Receive events delivered after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }

    /// Snapshot of everything delivered so far.
    pub fn delivered(&self) -> Vec<NotificationEvent> {
        match self.delivered.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Default for InMemoryNotificationSink {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn notify(&self, event: NotificationEvent) -> Result<(), NotificationError> {
        tracing::debug!(event = event.kind(), post_id = %event.post_id(), "Notification recorded");

        self.delivered
            .lock()
            .map_err(|e| NotificationError::Delivery(e.to_string()))?
            .push(event.clone());

        // No subscribers is not an error
        let _ = self.sender.send(event);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::{Post, PostStatus};
    use uuid::Uuid;

    fn event() -> NotificationEvent {
        let post = Post::new(
            Uuid::new_v4(),
            "Hello".into(),
            "hello".into(),
            "Body".into(),
            PostStatus::Published,
        );
        NotificationEvent::post_published(&post)
    }

    #[tokio::test]
    async fn test_records_and_broadcasts() {
        let sink = InMemoryNotificationSink::default();
        let mut rx = sink.subscribe();
        let event = event();

        sink.notify(event.clone()).await.unwrap();

        assert_eq!(sink.delivered(), vec![event.clone()]);
        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_notify_without_subscribers() {
        let sink = InMemoryNotificationSink::new(4);

        assert!(sink.notify(event()).await.is_ok());
        assert_eq!(sink.delivered().len(), 1);
    }
}
