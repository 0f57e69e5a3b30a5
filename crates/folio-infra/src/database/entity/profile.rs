//! Profile entity for SeaORM. Keyed by the owning user's id.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use folio_core::domain::Profile;
use folio_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub role: String,
    #[sea_orm(column_type = "Text")]
    pub bio: String,
    pub avatar: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Profile {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let role = model
            .role
            .parse()
            .map_err(|_| RepoError::Query(format!("invalid stored role '{}'", model.role)))?;

        Ok(Self {
            user_id: model.user_id,
            role,
            bio: model.bio,
            avatar: model.avatar,
            website: model.website,
            created_at: model.created_at.into(),
        })
    }
}

impl From<Profile> for ActiveModel {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: Set(profile.user_id),
            role: Set(profile.role.as_str().to_string()),
            bio: Set(profile.bio),
            avatar: Set(profile.avatar),
            website: Set(profile.website),
            created_at: Set(profile.created_at.into()),
        }
    }
}
