use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Profile, Role, User};
use crate::error::DomainError;

/// Resolve the capability a user actually holds.
///
/// The superuser flag always yields `Admin`; otherwise the stored role
/// applies. A user without a profile breaks the one-profile-per-user
/// invariant and is reported as an internal inconsistency.
pub fn effective_role(user: &User, profile: Option<&Profile>) -> Result<Role, DomainError> {
    let Some(profile) = profile else {
        tracing::error!(user_id = %user.id, "User has no profile");
        return Err(DomainError::InternalInconsistency(format!(
            "user {} has no profile",
            user.id
        )));
    };

    if user.is_superuser {
        return Ok(Role::Admin);
    }

    Ok(profile.role)
}

/// An authenticated principal with its effective role resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: Uuid,
    pub username: String,
    pub is_staff: bool,
    pub role: Role,
}

impl Requester {
    pub fn resolve(user: &User, profile: Option<&Profile>) -> Result<Self, DomainError> {
        Ok(Self {
            user_id: user.id,
            username: user.username.clone(),
            is_staff: user.is_staff,
            role: effective_role(user, profile)?,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Authors and admins.
    pub fn is_author(&self) -> bool {
        self.role >= Role::Author
    }

    pub fn is(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}
