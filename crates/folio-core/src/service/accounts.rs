use uuid::Uuid;

use crate::domain::{Profile, Role, User};
use crate::error::DomainError;
use crate::policy::Requester;

use super::{BlogService, NewAccount, ProfileChanges};

impl BlogService {
    /// Create a user and its profile in one storage operation.
    ///
    /// Self-registration may choose `reader` or `author`; admin rights are
    /// granted out of band.
    pub async fn register(&self, account: NewAccount) -> Result<(User, Profile), DomainError> {
        let username = account.username.trim();
        if username.is_empty() {
            return Err(DomainError::validation("Username is required."));
        }
        if !account.email.contains('@') {
            return Err(DomainError::validation("Enter a valid email address."));
        }
        if account.role == Role::Admin {
            return Err(DomainError::validation("Role must be reader or author."));
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::validation(
                "A user with that username already exists.",
            ));
        }

        let user = User::new(username.to_string(), account.email, account.password_hash);
        let profile = Profile::new(user.id, account.role);
        let (user, profile) = self.users.create_with_profile(user, profile).await?;

        tracing::info!(user_id = %user.id, role = %profile.role, "User registered");
        Ok((user, profile))
    }

    /// Look up an account for credential checks.
    pub async fn find_user_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username.trim())
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))
    }

    /// Resolve an authenticated user id into a principal.
    pub async fn requester(&self, user_id: Uuid) -> Result<Requester, DomainError> {
        let (user, profile) = self.account(user_id).await?;
        Requester::resolve(&user, profile.as_ref())
    }

    /// The requester's own user record and profile.
    pub async fn profile(&self, requester: &Requester) -> Result<(User, Profile), DomainError> {
        let (user, profile) = self.account(requester.user_id).await?;
        let profile = profile.ok_or_else(|| {
            DomainError::InternalInconsistency(format!("user {} has no profile", user.id))
        })?;
        Ok((user, profile))
    }

    pub async fn update_profile(
        &self,
        requester: &Requester,
        changes: ProfileChanges,
    ) -> Result<Profile, DomainError> {
        let website = changes
            .website
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty());
        if let Some(website) = website.as_deref() {
            if !(website.starts_with("http://") || website.starts_with("https://")) {
                return Err(DomainError::validation("Enter a valid URL."));
            }
        }

        let (_, mut profile) = self.profile(requester).await?;
        profile.bio = changes.bio;
        profile.avatar = changes.avatar.filter(|a| !a.trim().is_empty());
        profile.website = website;

        let profile = self.users.update_profile(profile).await?;
        tracing::debug!(user_id = %requester.user_id, "Profile updated");
        Ok(profile)
    }

    async fn account(&self, user_id: Uuid) -> Result<(User, Option<Profile>), DomainError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;
        let profile = self.users.find_profile(user_id).await?;
        Ok((user, profile))
    }
}
