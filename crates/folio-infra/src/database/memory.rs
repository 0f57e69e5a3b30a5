//! In-memory store - used when no database is configured, and by tests.
//!
//! All tables sit behind one async `RwLock`, so every write (including the
//! cascades and the status-tracking post update) is atomic with respect to
//! other requests. Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use folio_core::domain::{Category, Comment, Page, PageRequest, Post, Profile, Tag, User};
use folio_core::error::RepoError;
use folio_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostRepository, SavedPost,
    TagRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    posts: HashMap<Uuid, Post>,
    categories: HashMap<Uuid, Category>,
    tags: HashMap<Uuid, Tag>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    fn check_post_references(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.contains_key(&post.author_id) {
            return Err(RepoError::Constraint("post author does not exist".into()));
        }
        if let Some(category_id) = post.category_id {
            if !self.categories.contains_key(&category_id) {
                return Err(RepoError::Constraint("category does not exist".into()));
            }
        }
        if let Some(missing) = post.tag_ids.iter().find(|id| !self.tags.contains_key(*id)) {
            return Err(RepoError::Constraint(format!("tag {missing} does not exist")));
        }
        if self
            .posts
            .values()
            .any(|p| p.slug == post.slug && p.id != post.id)
        {
            return Err(RepoError::Constraint("post slug already exists".into()));
        }
        Ok(())
    }

    /// Published posts matching `filter`, newest first.
    fn published_page(&self, page: PageRequest, filter: impl Fn(&Post) -> bool) -> Page<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .values()
            .filter(|p| p.is_published() && filter(p))
            .cloned()
            .collect();
        sort_newest_first(&mut posts);
        Page::from_vec(posts, page)
    }

    fn remove_post(&mut self, id: Uuid) -> Option<Post> {
        let post = self.posts.remove(&id)?;
        self.comments.retain(|_, c| c.post_id != id);
        Some(post)
    }
}

fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

/// Every repository port backed by process memory.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(RepoError::Constraint("username already exists".into()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Removes the user with everything they authored.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;
        tables.profiles.remove(&id);

        let authored: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            tables.remove_post(post_id);
        }
        tables.comments.retain(|_, c| c.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn create_with_profile(
        &self,
        user: User,
        profile: Profile,
    ) -> Result<(User, Profile), RepoError> {
        if profile.user_id != user.id {
            return Err(RepoError::Constraint("profile belongs to another user".into()));
        }

        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&user.id) {
            return Err(RepoError::Constraint("user already exists".into()));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint("username already exists".into()));
        }

        tables.users.insert(user.id, user.clone());
        tables.profiles.insert(profile.user_id, profile.clone());
        Ok((user, profile))
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .profiles
            .get_mut(&profile.user_id)
            .ok_or(RepoError::NotFound)?;
        *stored = profile.clone();
        Ok(profile)
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        tables.check_post_references(&post)?;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.remove_post(id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.values().any(|p| p.slug == slug))
    }

    async fn update_tracking_status(&self, post: Post) -> Result<SavedPost, RepoError> {
        let mut tables = self.tables.write().await;
        let stored = tables.posts.get(&post.id).ok_or(RepoError::NotFound)?;

        let previous_status = stored.status;
        let updated = Post {
            author_id: stored.author_id,
            slug: stored.slug.clone(),
            created_at: stored.created_at,
            ..post
        };
        tables.check_post_references(&updated)?;
        tables.posts.insert(updated.id, updated.clone());

        Ok(SavedPost {
            previous_status,
            post: updated,
        })
    }

    async fn list_published(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        Ok(self.tables.read().await.published_page(page, |_| true))
    }

    async fn list_published_in_category(
        &self,
        category_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.published_page(page, |p| p.category_id == Some(category_id)))
    }

    async fn list_published_with_tag(
        &self,
        tag_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.published_page(page, |p| p.tag_ids.contains(&tag_id)))
    }

    async fn search_published(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let needle = query.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.published_page(page, |p| p.matches(&needle)))
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        sort_newest_first(&mut posts);
        Ok(posts)
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn save(&self, category: Category) -> Result<Category, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.categories.values().any(|c| {
            c.id != category.id && (c.name == category.name || c.slug == category.slug)
        }) {
            return Err(RepoError::Constraint("category already exists".into()));
        }
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    /// Detaches the category from its posts.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.categories.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.name == name).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.get(&id).cloned())
    }

    async fn save(&self, tag: Tag) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .tags
            .values()
            .any(|t| t.id != tag.id && (t.name == tag.name || t.slug == tag.slug))
        {
            return Err(RepoError::Constraint("tag already exists".into()));
        }
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    /// Removes the tag from every post that carried it.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.tags.remove(&id).ok_or(RepoError::NotFound)?;
        for post in tables.posts.values_mut() {
            post.tag_ids.retain(|t| *t != id);
        }
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.name == name).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        let mut tags: Vec<Tag> = tables.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("post does not exist".into()));
        }
        if !tables.users.contains_key(&comment.user_id) {
            return Err(RepoError::Constraint("comment author does not exist".into()));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn list_approved_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id && c.is_approved)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn set_approval(&self, ids: &[Uuid], approved: bool) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let mut updated = 0;
        for id in ids {
            if let Some(comment) = tables.comments.get_mut(id) {
                comment.is_approved = approved;
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::domain::{PostStatus, Role};

    async fn author(store: &InMemoryStore, name: &str) -> User {
        let user = User::new(name.into(), format!("{name}@example.com"), "hash".into());
        let profile = Profile::new(user.id, Role::Author);
        store.create_with_profile(user, profile).await.unwrap().0
    }

    fn post(author: &User, slug: &str, status: PostStatus) -> Post {
        Post::new(author.id, slug.into(), slug.into(), "body".into(), status)
    }

    async fn save_post(store: &InMemoryStore, post: Post) -> Post {
        BaseRepository::<Post, Uuid>::save(store, post).await.unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_post_slug_rejected() {
        let store = InMemoryStore::new();
        let john = author(&store, "john").await;

        save_post(&store, post(&john, "hello", PostStatus::Draft)).await;
        let duplicate = post(&john, "hello", PostStatus::Draft);
        let err = BaseRepository::<Post, Uuid>::save(&store, duplicate)
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_update_reports_previous_status_and_keeps_author() {
        let store = InMemoryStore::new();
        let john = author(&store, "john").await;
        let jane = author(&store, "jane").await;
        let original = save_post(&store, post(&john, "p", PostStatus::Draft)).await;

        let changed = Post {
            status: PostStatus::Published,
            author_id: jane.id,
            slug: "other".into(),
            ..original.clone()
        };
        let saved = store.update_tracking_status(changed).await.unwrap();

        assert_eq!(saved.previous_status, PostStatus::Draft);
        assert_eq!(saved.post.status, PostStatus::Published);
        assert_eq!(saved.post.author_id, john.id);
        assert_eq!(saved.post.slug, "p");
    }

    #[tokio::test]
    async fn test_deleting_post_cascades_comments() {
        let store = InMemoryStore::new();
        let john = author(&store, "john").await;
        let p = save_post(&store, post(&john, "p", PostStatus::Published)).await;
        let comment = BaseRepository::<Comment, Uuid>::save(
            &store,
            Comment::new(p.id, john.id, "first".into()),
        )
        .await
        .unwrap();

        BaseRepository::<Post, Uuid>::delete(&store, p.id).await.unwrap();

        let found = BaseRepository::<Comment, Uuid>::find_by_id(&store, comment.id)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_deleting_taxonomy_detaches_posts() {
        let store = InMemoryStore::new();
        let john = author(&store, "john").await;
        let tech = Category::new("Tech".into(), None);
        let tech = BaseRepository::<Category, Uuid>::save(&store, tech)
            .await
            .unwrap();
        let rust = BaseRepository::<Tag, Uuid>::save(&store, Tag::new("Rust".into()))
            .await
            .unwrap();

        let mut p = post(&john, "p", PostStatus::Published);
        p.category_id = Some(tech.id);
        p.tag_ids = vec![rust.id];
        let p = save_post(&store, p).await;

        BaseRepository::<Category, Uuid>::delete(&store, tech.id).await.unwrap();
        BaseRepository::<Tag, Uuid>::delete(&store, rust.id).await.unwrap();

        let p = PostRepository::find_by_slug(&store, &p.slug)
            .await
            .unwrap()
            .expect("post survives");
        assert_eq!(p.category_id, None);
        assert!(p.tag_ids.is_empty());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_published_only() {
        let store = InMemoryStore::new();
        let john = author(&store, "john").await;
        let mut visible = post(&john, "visible", PostStatus::Published);
        visible.content = "All about Rust ownership".into();
        let mut hidden = post(&john, "hidden", PostStatus::Draft);
        hidden.content = "Rust drafts".into();
        save_post(&store, visible).await;
        save_post(&store, hidden).await;

        let page = store
            .search_published("rust", PageRequest::default())
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].slug, "visible");
    }
}
