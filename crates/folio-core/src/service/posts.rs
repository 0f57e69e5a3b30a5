use chrono::Utc;

use crate::domain::{Category, Page, Post, Tag, slugify};
use crate::error::{DomainError, RepoError};
use crate::policy::{Mutation, Requester, authorize, can_view};

use super::{
    BlogService, MAX_QUERY_LENGTH, MAX_TITLE_LENGTH, PostDetail, PostInput, SLUG_ATTEMPTS,
};

impl BlogService {
    pub async fn list_published(&self, page: u64) -> Result<Page<Post>, DomainError> {
        Ok(self.posts.list_published(self.page(page)).await?)
    }

    /// A single post with its approved comments.
    ///
    /// A draft the requester may not see is reported as `Denied`, which
    /// callers render as a notice rather than a failure.
    pub async fn post_detail(
        &self,
        slug: &str,
        requester: Option<&Requester>,
    ) -> Result<PostDetail, DomainError> {
        let post = self.post_by_slug(slug).await?;

        if !can_view(&post, requester) {
            tracing::debug!(post_id = %post.id, "Post hidden from requester");
            return Err(DomainError::denied("This post is not available."));
        }

        let comments = self.comments.list_approved_for_post(post.id).await?;
        Ok(PostDetail { post, comments })
    }

    pub async fn posts_in_category(
        &self,
        slug: &str,
        page: u64,
    ) -> Result<(Category, Page<Post>), DomainError> {
        let category = self
            .categories
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("category", slug))?;
        let posts = self
            .posts
            .list_published_in_category(category.id, self.page(page))
            .await?;
        Ok((category, posts))
    }

    pub async fn posts_with_tag(
        &self,
        slug: &str,
        page: u64,
    ) -> Result<(Tag, Page<Post>), DomainError> {
        let tag = self
            .tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("tag", slug))?;
        let posts = self
            .posts
            .list_published_with_tag(tag.id, self.page(page))
            .await?;
        Ok((tag, posts))
    }

    /// Substring search over published posts. A blank query matches nothing.
    pub async fn search(&self, query: &str, page: u64) -> Result<Page<Post>, DomainError> {
        let query = query.trim();
        if query.chars().count() > MAX_QUERY_LENGTH {
            return Err(DomainError::validation(format!(
                "Search query must be at most {MAX_QUERY_LENGTH} characters."
            )));
        }
        if query.is_empty() {
            return Ok(Page::empty(self.page(page)));
        }

        Ok(self.posts.search_published(query, self.page(page)).await?)
    }

    /// The requester's own posts in every status.
    pub async fn dashboard(&self, requester: &Requester) -> Result<Vec<Post>, DomainError> {
        if !requester.is_author() {
            return Err(DomainError::denied(
                "You need author privileges to access the dashboard.",
            ));
        }
        Ok(self.posts.list_by_author(requester.user_id).await?)
    }

    pub async fn create_post(
        &self,
        requester: &Requester,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        authorize(Mutation::CreatePost, requester)?;
        let input = self.validate_post_input(input).await?;

        let mut post = Post::new(
            requester.user_id,
            input.title,
            String::new(),
            input.content,
            input.status,
        );
        post.featured_image = input.featured_image;
        post.category_id = input.category_id;
        post.tag_ids = input.tag_ids;

        let post = self.save_with_unique_slug(post).await?;
        tracing::info!(post_id = %post.id, slug = %post.slug, status = %post.status, "Post created");

        self.lifecycle.on_post_saved(None, post.status, &post);
        Ok(post)
    }

    /// Edit a post. Author and slug are never changed.
    pub async fn update_post(
        &self,
        requester: &Requester,
        slug: &str,
        input: PostInput,
    ) -> Result<Post, DomainError> {
        let existing = self.post_by_slug(slug).await?;
        authorize(Mutation::UpdatePost(&existing), requester)?;
        let input = self.validate_post_input(input).await?;

        let updated = Post {
            title: input.title,
            content: input.content,
            featured_image: input.featured_image,
            status: input.status,
            category_id: input.category_id,
            tag_ids: input.tag_ids,
            updated_at: Utc::now(),
            ..existing
        };

        let saved = self.posts.update_tracking_status(updated).await?;
        tracing::info!(
            post_id = %saved.post.id,
            from = %saved.previous_status,
            to = %saved.post.status,
            "Post updated"
        );

        self.lifecycle
            .on_post_saved(Some(saved.previous_status), saved.post.status, &saved.post);
        Ok(saved.post)
    }

    /// Delete a post together with its comments and tag links.
    pub async fn delete_post(&self, requester: &Requester, slug: &str) -> Result<(), DomainError> {
        let post = self.post_by_slug(slug).await?;
        authorize(Mutation::DeletePost(&post), requester)?;

        self.posts.delete(post.id).await?;
        tracing::info!(post_id = %post.id, user_id = %requester.user_id, "Post deleted");
        Ok(())
    }

    pub(super) async fn post_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        self.posts
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::not_found("post", slug))
    }

    async fn validate_post_input(&self, mut input: PostInput) -> Result<PostInput, DomainError> {
        input.title = input.title.trim().to_string();
        if input.title.is_empty() {
            return Err(DomainError::validation("Title is required."));
        }
        if input.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(format!(
                "Title must be at most {MAX_TITLE_LENGTH} characters."
            )));
        }
        if input.content.trim().is_empty() {
            return Err(DomainError::validation("Content is required."));
        }
        input.featured_image = input.featured_image.filter(|f| !f.trim().is_empty());

        if let Some(category_id) = input.category_id {
            if self.categories.find_by_id(category_id).await?.is_none() {
                return Err(DomainError::validation("Select a valid category."));
            }
        }

        input.tag_ids.sort_unstable();
        input.tag_ids.dedup();
        for tag_id in &input.tag_ids {
            if self.tags.find_by_id(*tag_id).await?.is_none() {
                return Err(DomainError::validation(format!(
                    "Tag {tag_id} does not exist."
                )));
            }
        }

        Ok(input)
    }

    /// Insert a new post under a free slug. Another create may claim the
    /// chosen slug between the check and the insert; the next suffix is then
    /// tried.
    async fn save_with_unique_slug(&self, mut post: Post) -> Result<Post, DomainError> {
        for _ in 0..SLUG_ATTEMPTS {
            post.slug = self.unique_post_slug(&post.title).await?;
            match self.posts.save(post.clone()).await {
                Ok(saved) => return Ok(saved),
                Err(RepoError::Constraint(reason)) => {
                    if !self.posts.slug_exists(&post.slug).await? {
                        return Err(RepoError::Constraint(reason).into());
                    }
                    tracing::debug!(slug = %post.slug, "Slug claimed concurrently, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(DomainError::validation(
            "Could not allocate a unique slug. Please try again.",
        ))
    }

    /// Slug derived from the title, suffixed with `-2`, `-3`, ... until free.
    async fn unique_post_slug(&self, title: &str) -> Result<String, DomainError> {
        let base = slugify(title);
        if base.is_empty() {
            return Err(DomainError::validation(
                "Title must contain at least one letter or digit.",
            ));
        }

        let mut candidate = base.clone();
        let mut suffix = 2u32;
        while self.posts.slug_exists(&candidate).await? {
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
        Ok(candidate)
    }
}
