use uuid::Uuid;

use crate::domain::Comment;
use crate::error::DomainError;
use crate::policy::{Mutation, Requester, authorize};

use super::BlogService;

impl BlogService {
    /// Comment on a post the requester can see.
    pub async fn add_comment(
        &self,
        requester: &Requester,
        post_slug: &str,
        content: &str,
    ) -> Result<Comment, DomainError> {
        let post = self.post_by_slug(post_slug).await?;
        authorize(Mutation::CreateComment(&post), requester)?;

        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("Comment cannot be empty."));
        }

        let comment = self
            .comments
            .save(Comment::new(post.id, requester.user_id, content.to_string()))
            .await?;
        tracing::debug!(comment_id = %comment.id, post_id = %post.id, "Comment added");
        Ok(comment)
    }

    /// Delete a comment. Returns the removed comment.
    pub async fn delete_comment(
        &self,
        requester: &Requester,
        comment_id: Uuid,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;
        authorize(Mutation::DeleteComment(&comment), requester)?;

        self.comments.delete(comment.id).await?;
        tracing::debug!(comment_id = %comment.id, user_id = %requester.user_id, "Comment deleted");
        Ok(comment)
    }

    /// Approve or hide comments in bulk. Staff only.
    pub async fn moderate_comments(
        &self,
        requester: &Requester,
        ids: &[Uuid],
        approved: bool,
    ) -> Result<u64, DomainError> {
        authorize(Mutation::ModerateComments, requester)?;

        let updated = self.comments.set_approval(ids, approved).await?;
        tracing::info!(count = updated, approved, "Comments moderated");
        Ok(updated)
    }
}
