//! PostgreSQL repository implementations.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbConn, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};
use uuid::Uuid;

use folio_core::domain::{
    Category, Comment, Page, PageRequest, Post, PostStatus, Profile, Tag, User,
};
use folio_core::error::RepoError;
use folio_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, PostRepository, SavedPost,
    TagRepository, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::profile::{self, Entity as ProfileEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, RepoError> {
        ProfileEntity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?
            .map(Profile::try_from)
            .transpose()
    }

    async fn create_with_profile(
        &self,
        user: User,
        profile: Profile,
    ) -> Result<(User, Profile), RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let user_model = user::ActiveModel::from(user)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        let profile_model = profile::ActiveModel::from(profile)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        Ok((user_model.into(), Profile::try_from(profile_model)?))
    }

    async fn update_profile(&self, profile: Profile) -> Result<Profile, RepoError> {
        let model = profile::ActiveModel::from(profile)
            .update(self.db.as_ref())
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => RepoError::NotFound,
                other => map_db_err(other),
            })?;

        Profile::try_from(model)
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_approved_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::IsApproved.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn set_approval(&self, ids: &[Uuid], approved: bool) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = CommentEntity::update_many()
            .col_expr(comment::Column::IsApproved, Expr::value(approved))
            .filter(comment::Column::Id.is_in(ids.iter().copied()))
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(result.rows_affected)
    }
}

/// PostgreSQL post repository. Not built on the generic base because a
/// post spans the `posts` row and its `post_tags` links.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }

    /// Attach tag ids to post rows with a single link-table query.
    async fn hydrate(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let links = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(ids))
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        let mut tags_by_post: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in links {
            tags_by_post.entry(link.post_id).or_default().push(link.tag_id);
        }

        models
            .into_iter()
            .map(|m| {
                let tag_ids = tags_by_post.remove(&m.id).unwrap_or_default();
                m.into_post(tag_ids)
            })
            .collect()
    }

    async fn fetch_page(
        &self,
        select: Select<PostEntity>,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let paginator = select
            .filter(post::Column::Status.eq(PostStatus::Published.as_str()))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(self.db.as_ref(), page.per_page);

        let total = paginator.num_items().await.map_err(map_db_err)?;
        let models = paginator
            .fetch_page(page.page.saturating_sub(1))
            .await
            .map_err(map_db_err)?;

        Ok(Page::new(self.hydrate(models).await?, page, total))
    }
}

/// Replace a post's tag links inside the caller's transaction.
async fn replace_tags<C>(conn: &C, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    PostTagEntity::delete_many()
        .filter(post_tag::Column::PostId.eq(post_id))
        .exec(conn)
        .await?;

    if !tag_ids.is_empty() {
        let links = tag_ids.iter().map(|tag_id| post_tag::ActiveModel {
            post_id: sea_orm::Set(post_id),
            tag_id: sea_orm::Set(*tag_id),
        });
        PostTagEntity::insert_many(links).exec(conn).await?;
    }

    Ok(())
}

/// Escape `%`, `_` and `\` for a LIKE pattern.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(self.hydrate(model.into_iter().collect()).await?.pop())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let active_model = post::ActiveModel::from(&post);
        let model = match active_model.clone().update(&txn).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => active_model.insert(&txn).await.map_err(map_db_err)?,
            Err(e) => return Err(map_db_err(e)),
        };
        replace_tags(&txn, post.id, &post.tag_ids)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;
        model.into_post(post.tag_ids)
    }

    /// Comments and tag links go with the row through `ON DELETE CASCADE`.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(self.hydrate(model.into_iter().collect()).await?.pop())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        let count = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .count(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    /// Reads the stored status under `SELECT ... FOR UPDATE` in the same
    /// transaction as the write, so concurrent updates serialize.
    async fn update_tracking_status(&self, post: Post) -> Result<SavedPost, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let stored = PostEntity::find_by_id(post.id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;
        let previous_status: PostStatus = stored
            .status
            .parse()
            .map_err(|_| RepoError::Query(format!("invalid stored status '{}'", stored.status)))?;

        let mut active_model = post::ActiveModel::from(&post);
        active_model.author_id = sea_orm::Set(stored.author_id);
        active_model.slug = sea_orm::Set(stored.slug);
        active_model.created_at = sea_orm::Set(stored.created_at);

        let model = active_model.update(&txn).await.map_err(map_db_err)?;
        replace_tags(&txn, post.id, &post.tag_ids)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        Ok(SavedPost {
            previous_status,
            post: model.into_post(post.tag_ids)?,
        })
    }

    async fn list_published(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        self.fetch_page(PostEntity::find(), page).await
    }

    async fn list_published_in_category(
        &self,
        category_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let select = PostEntity::find().filter(post::Column::CategoryId.eq(category_id));
        self.fetch_page(select, page).await
    }

    async fn list_published_with_tag(
        &self,
        tag_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let tagged = Query::select()
            .column(post_tag::Column::PostId)
            .from(PostTagEntity)
            .and_where(Expr::col(post_tag::Column::TagId).eq(tag_id))
            .to_owned();
        let select = PostEntity::find().filter(post::Column::Id.in_subquery(tagged));
        self.fetch_page(select, page).await
    }

    async fn search_published(
        &self,
        query: &str,
        page: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let pattern = format!("%{}%", escape_like(&query.to_lowercase()));
        let matches = |column: post::Column| {
            Expr::expr(Func::lower(Expr::col((PostEntity, column))))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };

        let select = PostEntity::find().filter(
            Condition::any()
                .add(matches(post::Column::Title))
                .add(matches(post::Column::Content)),
        );
        self.fetch_page(select, page).await
    }

    async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(map_db_err)?;

        self.hydrate(models).await
    }
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("rust"), "rust");
    }
}
