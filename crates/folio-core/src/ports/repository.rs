use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, Page, PageRequest, Post, PostStatus, Profile, Tag, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository. Users and profiles are only ever created together.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError>;

    /// Insert a user and its profile atomically.
    async fn create_with_profile(
        &self,
        user: User,
        profile: Profile,
    ) -> Result<(User, Profile), RepoError>;

    /// Update an existing profile. Never creates one.
    async fn update_profile(&self, profile: Profile) -> Result<Profile, RepoError>;
}

/// Outcome of a post update: the stored row and the status it replaced.
#[derive(Debug, Clone)]
pub struct SavedPost {
    pub previous_status: PostStatus,
    pub post: Post,
}

/// Post repository.
///
/// `save` inserts; updates go through [`PostRepository::update_tracking_status`]
/// so the previous status is read under the same lock as the write.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError>;

    /// Overwrite the mutable fields of an existing post and return the
    /// status persisted before the write. `author_id`, `slug` and
    /// `created_at` of the stored row are kept.
    async fn update_tracking_status(&self, post: Post) -> Result<SavedPost, RepoError>;

    /// Published posts, newest first.
    async fn list_published(&self, page: PageRequest) -> Result<Page<Post>, RepoError>;

    async fn list_published_in_category(
        &self,
        category_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    async fn list_published_with_tag(
        &self,
        tag_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Case-insensitive substring search over title and content.
    async fn search_published(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError>;

    /// Every post by an author regardless of status, newest first.
    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;
}

#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError>;

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Approved comments on a post, oldest first.
    async fn list_approved_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// Set `is_approved` on the given comments. Returns the number updated.
    async fn set_approval(&self, ids: &[Uuid], approved: bool) -> Result<u64, RepoError>;
}
