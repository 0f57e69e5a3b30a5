//! Post entity for SeaORM. Tags live in the `post_tags` link table.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::domain::Post;
use folio_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[sea_orm(unique)]
    pub slug: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub featured_image: Option<String>,
    pub status: String,
    pub category_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain type, attaching tag ids loaded separately.
    pub fn into_post(self, tag_ids: Vec<Uuid>) -> Result<Post, RepoError> {
        let status = self
            .status
            .parse()
            .map_err(|_| RepoError::Query(format!("invalid stored status '{}'", self.status)))?;

        Ok(Post {
            id: self.id,
            author_id: self.author_id,
            title: self.title,
            slug: self.slug,
            content: self.content,
            featured_image: self.featured_image,
            status,
            category_id: self.category_id,
            tag_ids,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        })
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel. Tags are not part of
/// the row.
impl From<&Post> for ActiveModel {
    fn from(post: &Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            title: Set(post.title.clone()),
            slug: Set(post.slug.clone()),
            content: Set(post.content.clone()),
            featured_image: Set(post.featured_image.clone()),
            status: Set(post.status.as_str().to_string()),
            category_id: Set(post.category_id),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
