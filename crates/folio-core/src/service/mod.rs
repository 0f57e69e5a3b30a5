//! Use cases. Every read path consults the visibility policy and every
//! write path the ownership policy before touching storage.

mod accounts;
mod comments;
mod posts;
mod taxonomy;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Comment, PageRequest, Post, PostStatus, Role};
use crate::lifecycle::PublicationLifecycle;
use crate::ports::{
    CategoryRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};

/// The storage collaborators the service needs.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl Repositories {
    /// Use one backend for every entity.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + PostRepository
            + CategoryRepository
            + TagRepository
            + CommentRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            posts: store.clone(),
            categories: store.clone(),
            tags: store.clone(),
            comments: store,
        }
    }
}

/// Registration input. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub bio: String,
    pub avatar: Option<String>,
    pub website: Option<String>,
}

/// Fields an author controls when creating or editing a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// A post with the comments readers may see.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// Longest accepted search query.
pub const MAX_QUERY_LENGTH: usize = 200;

const MAX_TITLE_LENGTH: usize = 200;
/// Attempts at claiming a post slug when concurrent creates collide.
const SLUG_ATTEMPTS: usize = 10;
const MAX_NAME_LENGTH: usize = 100;

/// Application service over the content aggregate.
#[derive(Clone)]
pub struct BlogService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
    comments: Arc<dyn CommentRepository>,
    lifecycle: PublicationLifecycle,
    page_size: u64,
}

impl BlogService {
    pub fn new(repos: Repositories, lifecycle: PublicationLifecycle, page_size: u64) -> Self {
        Self {
            users: repos.users,
            posts: repos.posts,
            categories: repos.categories,
            tags: repos.tags,
            comments: repos.comments,
            lifecycle,
            page_size: page_size.max(1),
        }
    }

    fn page(&self, page: u64) -> PageRequest {
        PageRequest::new(page, self.page_size)
    }
}
