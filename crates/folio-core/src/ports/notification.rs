//! Notification port - where lifecycle events are delivered.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Post;

/// Events produced by the publication lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum NotificationEvent {
    PostPublished {
        post_id: Uuid,
        slug: String,
        title: String,
        author_id: Uuid,
        published_at: DateTime<Utc>,
    },
}

impl NotificationEvent {
    pub fn post_published(post: &Post) -> Self {
        Self::PostPublished {
            post_id: post.id,
            slug: post.slug.clone(),
            title: post.title.clone(),
            author_id: post.author_id,
            published_at: post.updated_at,
        }
    }

    /// Wire name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PostPublished { .. } => "postPublished",
        }
    }

    pub fn post_id(&self) -> Uuid {
        match self {
            Self::PostPublished { post_id, .. } => *post_id,
        }
    }
}

/// Destination for notification events. Implemented by infrastructure.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Failed to deliver notification: {0}")]
    Delivery(String),

    #[error("Failed to serialize notification: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostStatus;

    #[test]
    fn test_event_wire_format() {
        let post = Post::new(
            Uuid::new_v4(),
            "Launch".into(),
            "launch".into(),
            "Body".into(),
            PostStatus::Published,
        );
        let event = NotificationEvent::post_published(&post);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "postPublished");
        assert_eq!(json["slug"], "launch");
        assert_eq!(event.kind(), "postPublished");
        assert_eq!(event.post_id(), post.id);
    }
}
