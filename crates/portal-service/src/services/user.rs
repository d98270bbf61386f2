//! User service
//!
//! Account creation outside the admin: the `create-superuser` command and
//! test fixtures.

use tracing::{info, instrument};
use validator::ValidateEmail;

use portal_common::validate_password_strength;
use portal_core::{is_valid_username, DomainError, NewUser, User, UserId};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    /// Create an account and its profile; `None` stores an unusable password
    #[instrument(skip(self, new_user, password), fields(username = %new_user.username))]
    pub async fn create_user(&self, new_user: &NewUser, password: Option<&str>) -> ServiceResult<User> {
        if !is_valid_username(&new_user.username) {
            return Err(DomainError::InvalidUsername(new_user.username.clone()).into());
        }
        if !new_user.email.validate_email() {
            return Err(DomainError::InvalidEmail.into());
        }

        let hash = self.ctx.password_service().hash_or_unusable(password)?;
        let user = self.ctx.user_repo().create(new_user, &hash).await?;
        let (profile, _) = self.ctx.profile_repo().get_or_create(user.id).await?;

        info!(user_id = %user.id, profile_id = %profile.id, "User created");
        Ok(user)
    }

    /// Create an active staff superuser after checking password strength
    #[instrument(skip(self, password))]
    pub async fn create_superuser(&self, username: &str, email: &str, password: &str) -> ServiceResult<User> {
        validate_password_strength(password, username)?;
        let new_user = NewUser::new(username, email).superuser();
        self.create_user(&new_user, Some(password)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::testing::harness;
    use crate::services::AuthService;

    #[tokio::test]
    async fn test_create_superuser() {
        let h = harness();
        let users = UserService::new(&h.ctx);

        let root = users
            .create_superuser("root", "root@Example.com", "s3cret-pass")
            .await
            .unwrap();
        assert!(root.is_superuser && root.is_staff && root.is_active);
        assert_eq!(root.email, "root@example.com");
        assert_eq!(users.get_user(root.id).await.unwrap().username, "root");

        AuthService::new(&h.ctx).authenticate("root", "s3cret-pass").await.unwrap();

        let profile = h.ctx.profile_repo().find_by_user(root.id).await.unwrap();
        assert!(profile.is_some());
        assert_eq!(h.ctx.profile_repo().list_with_owner().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_user_rejects_malformed_email() {
        let h = harness();
        let users = UserService::new(&h.ctx);

        for email in ["@", "root@", "no-at-sign", "a b@example.com"] {
            let err = users
                .create_user(&NewUser::new("root", email), None)
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 400, "{email}");
        }
        assert!(h.ctx.user_repo().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_superuser_rejects_weak_password() {
        let h = harness();
        let err = UserService::new(&h.ctx)
            .create_superuser("root", "root@example.com", "1234")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let h = harness();
        let users = UserService::new(&h.ctx);
        let new_user = NewUser::new("dup", "dup@example.com");
        users.create_user(&new_user, None).await.unwrap();

        let err = users
            .create_user(&NewUser::new("dup", "other@example.com"), None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 409);
    }
}
