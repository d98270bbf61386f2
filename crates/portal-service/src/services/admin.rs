//! Admin service
//!
//! Change lists, the add/change user forms and the invitation sent after an
//! account is created from the admin.

use tracing::{info, instrument, warn};

use portal_core::{ActionFlag, DomainError, LogEntry, NewLogEntry, User, UserId, USER_CONTENT_TYPE};

use crate::admin::{Capabilities, EntityKind, ModelAdmin};
use crate::dto::{AdminTable, AdminUserChangeForm, AdminUserCreateForm, FormErrors};
use crate::mail::{invitation_email, invitation_link};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const EMAIL_TAKEN: &str = "A user with that email already exists.";

/// Result of creating an account from the admin
#[derive(Debug, Clone)]
pub struct CreatedUser {
    pub user: User,
    /// Whether the post-create hook sent an invitation
    pub invited: bool,
}

/// Admin service; every operation requires a staff actor
pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    fn ensure_staff(actor: &User) -> ServiceResult<()> {
        if actor.can_access_admin() {
            Ok(())
        } else {
            Err(ServiceError::permission_denied(
                "You do not have permission to access the admin site.",
            ))
        }
    }

    /// The registered admin for `kind`, or not-found when it lacks `capability`
    pub fn model_admin(&self, kind: EntityKind, capability: Capabilities) -> ServiceResult<&'a ModelAdmin> {
        self.ctx
            .admin_site()
            .with_capability(kind, capability)
            .ok_or_else(|| ServiceError::not_found("Admin page", kind.slug()))
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn list_users(&self, actor: &User) -> ServiceResult<AdminTable> {
        Self::ensure_staff(actor)?;
        let admin = self.model_admin(EntityKind::User, Capabilities::LIST)?;
        let users = self.ctx.user_repo().list().await?;
        Ok(admin.table(EntityKind::User, &users))
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn list_profiles(&self, actor: &User) -> ServiceResult<AdminTable> {
        Self::ensure_staff(actor)?;
        let admin = self.model_admin(EntityKind::UserProfile, Capabilities::LIST)?;
        let profiles = self.ctx.profile_repo().list_with_owner().await?;
        Ok(admin.table(EntityKind::UserProfile, &profiles))
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn get_user(&self, actor: &User, id: UserId) -> ServiceResult<User> {
        Self::ensure_staff(actor)?;
        self.model_admin(EntityKind::User, Capabilities::EDIT)?;
        self.ctx
            .user_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", id))
    }

    /// Create an account from the admin form
    ///
    /// The account always gets its profile. With `CREATE_HOOK` registered it
    /// also gets an invitation mail whose link points at `base_url`. A mail
    /// failure is returned to the caller; the account and profile are kept and
    /// no "Added." entry is written.
    #[instrument(skip(self, actor, form), fields(actor_id = %actor.id, username = %form.username))]
    pub async fn create_user(
        &self,
        actor: &User,
        form: &AdminUserCreateForm,
        base_url: &str,
    ) -> ServiceResult<CreatedUser> {
        Self::ensure_staff(actor)?;
        let admin = self.model_admin(EntityKind::User, Capabilities::CREATE)?;
        let cleaned = form.clean()?;

        let mut taken = FormErrors::new();
        if self.ctx.user_repo().username_exists(&cleaned.user.username).await? {
            taken.add("username", USERNAME_TAKEN);
        }
        if self.ctx.user_repo().email_exists(&cleaned.user.email).await? {
            taken.add("email", EMAIL_TAKEN);
        }
        if !taken.is_empty() {
            return Err(taken.into());
        }

        let password_hash = self
            .ctx
            .password_service()
            .hash_or_unusable(cleaned.password.as_deref())?;
        let user = self
            .ctx
            .user_repo()
            .create(&cleaned.user, &password_hash)
            .await
            .map_err(conflict_to_form)?;
        let (profile, _) = self.ctx.profile_repo().get_or_create(user.id).await?;
        info!(user_id = %user.id, profile_id = %profile.id, "User created from admin");

        let invited = admin.allows(Capabilities::CREATE_HOOK);
        if invited {
            self.send_invitation(&user, &password_hash, base_url).await?;
        }

        self.log(actor, &user, ActionFlag::Addition, "Added.").await?;
        Ok(CreatedUser { user, invited })
    }

    /// Post-create hook: issue a reset token and mail the link
    async fn send_invitation(&self, user: &User, password_hash: &str, base_url: &str) -> ServiceResult<()> {
        let token = self.ctx.reset_tokens().make_token(user, password_hash)?;
        let link = invitation_link(base_url, user.id, &token);
        let message = invitation_email(user, &link, self.ctx.mail_from())?;

        if let Err(e) = self.ctx.mailer().send(&message).await {
            warn!(user_id = %user.id, error = %e, "Invitation mail failed; account kept");
            return Err(e.into());
        }

        info!(user_id = %user.id, "Invitation sent");
        Ok(())
    }

    /// Apply the change form; no invitation is sent on edits
    #[instrument(skip(self, actor, form), fields(actor_id = %actor.id))]
    pub async fn update_user(
        &self,
        actor: &User,
        id: UserId,
        form: &AdminUserChangeForm,
    ) -> ServiceResult<User> {
        let mut user = self.get_user(actor, id).await?;
        form.clean()?;

        let mut taken = FormErrors::new();
        if let Some(other) = self.ctx.user_repo().find_by_username(form.username.trim()).await? {
            if other.id != user.id {
                taken.add("username", USERNAME_TAKEN);
            }
        }
        let email = portal_core::normalize_email(form.email.trim());
        if let Some(other) = self.ctx.user_repo().find_by_email(&email).await? {
            if other.id != user.id {
                taken.add("email", EMAIL_TAKEN);
            }
        }
        if !taken.is_empty() {
            return Err(taken.into());
        }

        let changed = form.apply(&mut user);
        if !changed.is_empty() {
            self.ctx
                .user_repo()
                .update(&user)
                .await
                .map_err(conflict_to_form)?;
            info!(user_id = %user.id, fields = ?changed, "User changed from admin");
        }

        self.log(actor, &user, ActionFlag::Change, &change_message(&changed))
            .await?;
        Ok(user)
    }

    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn recent_actions(&self, actor: &User, limit: i64) -> ServiceResult<Vec<LogEntry>> {
        Self::ensure_staff(actor)?;
        Ok(self.ctx.audit_repo().recent(limit).await?)
    }

    /// Log entries about one account, newest first
    #[instrument(skip(self, actor), fields(actor_id = %actor.id))]
    pub async fn user_history(&self, actor: &User, id: UserId) -> ServiceResult<Vec<LogEntry>> {
        Self::ensure_staff(actor)?;
        Ok(self
            .ctx
            .audit_repo()
            .for_object(USER_CONTENT_TYPE, &id.to_string())
            .await?)
    }

    async fn log(&self, actor: &User, subject: &User, flag: ActionFlag, message: &str) -> ServiceResult<()> {
        self.ctx
            .audit_repo()
            .append(&NewLogEntry::for_user(actor, subject, flag, message))
            .await?;
        Ok(())
    }
}

/// Unique-constraint races surface as form errors like the pre-checks
fn conflict_to_form(err: DomainError) -> ServiceError {
    match err {
        DomainError::UsernameAlreadyExists => FormErrors::single("username", USERNAME_TAKEN).into(),
        DomainError::EmailAlreadyExists => FormErrors::single("email", EMAIL_TAKEN).into(),
        other => other.into(),
    }
}

/// `Changed email and is_staff.` style summary
fn change_message(fields: &[&str]) -> String {
    match fields {
        [] => "No fields changed.".to_string(),
        [only] => format!("Changed {only}."),
        [init @ .., last] => format!("Changed {} and {last}.", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::{AdminSite, ModelAdmin};
    use crate::services::context::testing::{harness, harness_with_mailer, FailingMailer, Harness};
    use crate::services::AuthService;
    use portal_core::{AuditLogRepository, NewUser, ProfileRepository, UserRepository};

    async fn staff(h: &Harness) -> User {
        h.user(NewUser::new("admin", "admin@example.com").staff(true), "adminpass1")
            .await
    }

    fn create_form(username: &str, email: &str) -> AdminUserCreateForm {
        AdminUserCreateForm {
            username: username.to_string(),
            email: email.to_string(),
            first_name: "New".to_string(),
            last_name: "User".to_string(),
            password: String::new(),
            is_staff: false,
            is_active: true,
        }
    }

    #[test]
    fn test_change_message() {
        assert_eq!(change_message(&[]), "No fields changed.");
        assert_eq!(change_message(&["email"]), "Changed email.");
        assert_eq!(
            change_message(&["email", "first_name", "is_staff"]),
            "Changed email, first_name and is_staff."
        );
    }

    #[tokio::test]
    async fn test_create_user_runs_invitation_hook() {
        let h = harness();
        let admin = staff(&h).await;

        let created = AdminService::new(&h.ctx)
            .create_user(&admin, &create_form("newuser", "new@example.com"), "http://testserver")
            .await
            .unwrap();
        assert!(created.invited);

        // Exactly one profile
        let profiles = h.db.list_with_owner().await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].owner.id, created.user.id);

        // Unusable password until the link is followed
        let hash = h.db.get_password_hash(created.user.id).await.unwrap().unwrap();
        assert!(hash.starts_with('!'));

        let outbox = h.mailer.outbox();
        assert_eq!(outbox.len(), 1);
        assert_eq!(outbox[0].subject, "You're invited to our platform");
        assert_eq!(outbox[0].to, ["new@example.com"]);
        assert_eq!(outbox[0].from, "noreply@example.com");

        let prefix = format!(
            "http://testserver/reset/{}/",
            portal_common::encode_uid(created.user.id)
        );
        assert!(outbox[0].body_text.contains(&prefix));

        let log = h.db.recent(10).await.unwrap();
        assert_eq!(log[0].change_message, "Added.");
        assert_eq!(log[0].user_id, admin.id);
    }

    #[tokio::test]
    async fn test_invitation_link_sets_password() {
        let h = harness();
        let admin = staff(&h).await;
        let created = AdminService::new(&h.ctx)
            .create_user(&admin, &create_form("newuser", "new@example.com"), "http://testserver")
            .await
            .unwrap();

        let body = &h.mailer.outbox()[0].body_text;
        let link = body
            .split_whitespace()
            .find(|word| word.starts_with("http://testserver/reset/"))
            .unwrap();
        let mut parts = link.trim_end_matches('/').rsplit('/');
        let token = parts.next().unwrap();
        let uid = parts.next().unwrap();

        let auth = AuthService::new(&h.ctx);
        let user = auth.check_reset_link(uid, token).await.unwrap().unwrap();
        assert_eq!(user.id, created.user.id);

        let form = crate::dto::SetPasswordForm {
            new_password1: "welcome-123".to_string(),
            new_password2: "welcome-123".to_string(),
        };
        auth.confirm_password_reset(&user, &form).await.unwrap();
        auth.authenticate("newuser", "welcome-123").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_user_with_password_and_no_hook() {
        let h = harness();
        let admin = staff(&h).await;
        let mut site = AdminSite::standard();
        let mut user_admin: ModelAdmin = site.get(EntityKind::User).unwrap().clone();
        user_admin.capabilities.remove(Capabilities::CREATE_HOOK);
        site.register(EntityKind::User, user_admin);
        let ctx = ServiceContext::builder()
            .user_repo(std::sync::Arc::new(h.db.clone()))
            .profile_repo(std::sync::Arc::new(h.db.clone()))
            .audit_repo(std::sync::Arc::new(h.db.clone()))
            .session_store(std::sync::Arc::new(portal_cache::MemorySessionStore::new(60)))
            .reset_tokens(std::sync::Arc::new(portal_common::PasswordResetTokens::new("k", 60)))
            .mailer(std::sync::Arc::new(h.mailer.clone()))
            .mail_from("noreply@example.com")
            .admin_site(site)
            .build()
            .unwrap();

        let mut form = create_form("plain", "plain@example.com");
        form.password = "chosen-pass1".to_string();
        let created = AdminService::new(&ctx)
            .create_user(&admin, &form, "http://testserver")
            .await
            .unwrap();

        assert!(!created.invited);
        assert!(h.mailer.outbox().is_empty());
        let profiles = h.db.list_with_owner().await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].owner.id, created.user.id);
        AuthService::new(&ctx).authenticate("plain", "chosen-pass1").await.unwrap();
    }

    #[tokio::test]
    async fn test_create_user_keeps_account_when_mail_fails() {
        let h = harness_with_mailer(std::sync::Arc::new(FailingMailer));
        let admin = staff(&h).await;

        let err = AdminService::new(&h.ctx)
            .create_user(&admin, &create_form("newuser", "new@example.com"), "http://testserver")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Mail(_)));
        assert_eq!(err.status_code(), 500);

        let user = h.db.find_by_username("newuser").await.unwrap().unwrap();
        let profiles = h.db.list_with_owner().await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].owner.id, user.id);

        let log = h.db.recent(10).await.unwrap();
        assert!(log.iter().all(|entry| entry.change_message != "Added."));
    }

    #[tokio::test]
    async fn test_create_user_reports_duplicates() {
        let h = harness();
        let admin = staff(&h).await;
        let admin_service = AdminService::new(&h.ctx);
        admin_service
            .create_user(&admin, &create_form("newuser", "new@example.com"), "http://testserver")
            .await
            .unwrap();

        let err = admin_service
            .create_user(&admin, &create_form("newuser", "new@example.com"), "http://testserver")
            .await
            .unwrap_err();
        let errors = err.form_errors().unwrap();
        assert_eq!(errors.get("username"), [USERNAME_TAKEN]);
        assert_eq!(errors.get("email"), [EMAIL_TAKEN]);
        assert_eq!(h.mailer.outbox().len(), 1);
    }

    #[tokio::test]
    async fn test_non_staff_is_rejected() {
        let h = harness();
        let regular = h.user(NewUser::new("regular", "regular@example.com"), "pass12345").await;

        let err = AdminService::new(&h.ctx).list_users(&regular).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_update_user_logs_changes_without_invitation() {
        let h = harness();
        let admin = staff(&h).await;
        let target = h.user(NewUser::new("target", "target@example.com"), "pass12345").await;
        let admin_service = AdminService::new(&h.ctx);

        let mut form = AdminUserChangeForm::from_user(&target);
        form.first_name = "Tina".to_string();
        form.is_staff = true;
        let updated = admin_service.update_user(&admin, target.id, &form).await.unwrap();
        assert_eq!(updated.first_name, "Tina");
        assert!(updated.is_staff);

        let unchanged = AdminUserChangeForm::from_user(&updated);
        admin_service.update_user(&admin, target.id, &unchanged).await.unwrap();

        let history = admin_service.user_history(&admin, target.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].change_message, "No fields changed.");
        assert_eq!(history[1].change_message, "Changed first_name and is_staff.");
        assert!(h.mailer.outbox().is_empty());
    }

    #[tokio::test]
    async fn test_update_user_rejects_taken_email() {
        let h = harness();
        let admin = staff(&h).await;
        let target = h.user(NewUser::new("target", "target@example.com"), "pass12345").await;

        let mut form = AdminUserChangeForm::from_user(&target);
        form.email = "admin@example.com".to_string();
        let err = AdminService::new(&h.ctx)
            .update_user(&admin, target.id, &form)
            .await
            .unwrap_err();
        assert_eq!(err.form_errors().unwrap().get("email"), [EMAIL_TAKEN]);
    }

    #[tokio::test]
    async fn test_profiles_are_not_editable() {
        let h = harness();
        let err = AdminService::new(&h.ctx)
            .model_admin(EntityKind::UserProfile, Capabilities::EDIT)
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }
}
