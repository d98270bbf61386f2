//! Authentication service
//!
//! Handles login sessions, logout and the set-password step of a reset link.

use chrono::Utc;
use tracing::{info, instrument, warn};

use portal_common::{decode_uid, is_password_usable, AppError};
use portal_core::{AuthEvent, SessionRecord, User};

use crate::dto::{LoginForm, SetPasswordForm};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// A successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub session: SessionRecord,
}

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Check credentials without opening a session
    ///
    /// Unknown usernames, wrong passwords, unusable passwords and inactive
    /// accounts all fail with the same `InvalidCredentials` error, and each of
    /// them runs one Argon2 verification.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<User> {
        let invalid = || ServiceError::App(AppError::InvalidCredentials);

        let passwords = self.ctx.password_service();

        let Some(user) = self.ctx.user_repo().find_by_username(username).await? else {
            passwords.verify_dummy(password);
            warn!("Login failed: unknown username");
            return Err(invalid());
        };

        let stored = self
            .ctx
            .user_repo()
            .get_password_hash(user.id)
            .await?
            .filter(|hash| is_password_usable(hash));
        let Some(password_hash) = stored else {
            passwords.verify_dummy(password);
            warn!(user_id = %user.id, "Login failed: no usable password");
            return Err(invalid());
        };

        if !passwords.verify(password, &password_hash)? {
            warn!(user_id = %user.id, "Login failed: invalid password");
            return Err(invalid());
        }

        if !user.is_active {
            warn!(user_id = %user.id, "Login failed: inactive account");
            return Err(invalid());
        }

        Ok(user)
    }

    /// Log in with a cleaned form: open a session, stamp `last_login` and
    /// publish a `LoggedIn` event
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> ServiceResult<LoginOutcome> {
        let mut user = self.authenticate(&form.username, &form.password).await?;

        let now = Utc::now();
        self.ctx.user_repo().record_login(user.id, now).await?;
        user.last_login = Some(now);

        let session = self.ctx.session_store().create(user.id).await?;
        self.ctx
            .event_bus()
            .publish(&AuthEvent::logged_in(user.clone()))
            .await?;

        info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome { user, session })
    }

    /// Active account bound to a session key, if any
    #[instrument(skip(self, session_key))]
    pub async fn session_user(&self, session_key: &str) -> ServiceResult<Option<User>> {
        let Some(session) = self.ctx.session_store().load(session_key).await? else {
            return Ok(None);
        };

        let user = self.ctx.user_repo().find_by_id(session.user_id).await?;
        Ok(user.filter(|u| u.is_active))
    }

    /// Destroy the session; a `LoggedOut` event is published only when it
    /// belonged to an account
    #[instrument(skip(self, session_key))]
    pub async fn logout(&self, session_key: Option<&str>) -> ServiceResult<()> {
        let Some(key) = session_key else {
            return Ok(());
        };

        let user = self.session_user(key).await?;
        self.ctx.session_store().destroy(key).await?;

        if let Some(user) = user {
            self.ctx
                .event_bus()
                .publish(&AuthEvent::logged_out(user.clone()))
                .await?;
            info!(user_id = %user.id, "User logged out");
        }
        Ok(())
    }

    /// Resolve a reset link to its account; `None` when the link is invalid,
    /// expired or already used
    #[instrument(skip(self, token))]
    pub async fn check_reset_link(&self, uidb64: &str, token: &str) -> ServiceResult<Option<User>> {
        let Ok(user_id) = decode_uid(uidb64) else {
            return Ok(None);
        };
        let Some(user) = self.ctx.user_repo().find_by_id(user_id).await? else {
            return Ok(None);
        };
        let Some(password_hash) = self.ctx.user_repo().get_password_hash(user.id).await? else {
            return Ok(None);
        };

        match self.ctx.reset_tokens().check_token(&user, &password_hash, token) {
            Ok(()) => Ok(Some(user)),
            Err(e) => {
                warn!(user_id = %user.id, reason = e.error_code(), "Rejected password reset link");
                Ok(None)
            }
        }
    }

    /// Store the new password from a reset form
    #[instrument(skip(self, user, form), fields(user_id = %user.id))]
    pub async fn confirm_password_reset(
        &self,
        user: &User,
        form: &SetPasswordForm,
    ) -> ServiceResult<()> {
        let password = form.clean(&user.username)?;
        let hash = self.ctx.password_service().hash(&password)?;
        self.ctx.user_repo().update_password(user.id, &hash).await?;

        info!("Password set through reset link");
        Ok(())
    }
}
