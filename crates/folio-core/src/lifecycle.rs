//! Publication lifecycle.
//!
//! A post is either `draft` or `published`. The only transition with a side
//! effect is `draft -> published` observed on an update, which emits one
//! `postPublished` event to the configured [`NotificationSink`]. Delivery runs
//! on its own task; the caller never waits for it and never sees its errors.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::domain::{Post, PostStatus};
use crate::ports::{NotificationEvent, NotificationSink};

/// True iff a previously persisted draft became published.
///
/// `previous` is `None` when the post was just created, so creating a post
/// directly as published is not a transition.
pub fn is_publish_transition(previous: Option<PostStatus>, new: PostStatus) -> bool {
    matches!(
        (previous, new),
        (Some(PostStatus::Draft), PostStatus::Published)
    )
}

/// Post-save hook that turns status transitions into notifications.
#[derive(Clone)]
pub struct PublicationLifecycle {
    sink: Arc<dyn NotificationSink>,
}

impl PublicationLifecycle {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Called by the persistence path right after a successful write.
    ///
    /// Returns the handle of the dispatch task when a notification was
    /// fired. Callers are free to drop it.
    pub fn on_post_saved(
        &self,
        previous: Option<PostStatus>,
        new: PostStatus,
        post: &Post,
    ) -> Option<JoinHandle<()>> {
        if !is_publish_transition(previous, new) {
            return None;
        }

        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!(post_id = %post.id, "No async runtime, publish notification dropped");
            return None;
        };

        let sink = self.sink.clone();
        let event = NotificationEvent::post_published(post);
        let post_id = post.id;

        tracing::info!(post_id = %post_id, slug = %post.slug, "Post published");

        Some(runtime.spawn(async move {
            if let Err(e) = sink.notify(event).await {
                tracing::warn!(post_id = %post_id, error = %e, "Publish notification failed");
            }
        }))
    }
}
