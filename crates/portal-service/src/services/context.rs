//! Service context - dependency container for services
//!
//! Holds the repositories, the session store, password and reset-token helpers,
//! the mailer, the event bus and the admin registry.

use std::sync::Arc;

use portal_cache::SharedRedisPool;
use portal_common::{PasswordResetTokens, PasswordService};
use portal_core::traits::{AuditLogRepository, ProfileRepository, SessionStore, UserRepository};
use portal_db::PgPool;

use crate::admin::AdminSite;
use crate::events::{AuditLogger, EventBus};
use crate::mail::Mailer;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// The pools are only present when the context runs against PostgreSQL and
/// Redis; they are kept for readiness checks.
#[derive(Clone)]
pub struct ServiceContext {
    pool: Option<PgPool>,
    redis_pool: Option<SharedRedisPool>,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    profile_repo: Arc<dyn ProfileRepository>,
    audit_repo: Arc<dyn AuditLogRepository>,

    // Sessions
    session_store: Arc<dyn SessionStore>,

    // Credentials
    password_service: PasswordService,
    reset_tokens: Arc<PasswordResetTokens>,

    // Outbound
    mailer: Arc<dyn Mailer>,
    mail_from: String,
    event_bus: EventBus,

    admin_site: Arc<AdminSite>,
}

impl ServiceContext {
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Pools ===

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub fn redis_pool(&self) -> Option<&SharedRedisPool> {
        self.redis_pool.as_ref()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn profile_repo(&self) -> &dyn ProfileRepository {
        self.profile_repo.as_ref()
    }

    pub fn audit_repo(&self) -> &dyn AuditLogRepository {
        self.audit_repo.as_ref()
    }

    // === Sessions ===

    pub fn session_store(&self) -> &dyn SessionStore {
        self.session_store.as_ref()
    }

    // === Credentials ===

    pub fn password_service(&self) -> &PasswordService {
        &self.password_service
    }

    pub fn reset_tokens(&self) -> &PasswordResetTokens {
        self.reset_tokens.as_ref()
    }

    // === Outbound ===

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    /// Sender address for outgoing mail
    pub fn mail_from(&self) -> &str {
        &self.mail_from
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // === Admin ===

    pub fn admin_site(&self) -> &AdminSite {
        self.admin_site.as_ref()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &self.pool.as_ref().map(|_| "PgPool"))
            .field("redis_pool", &self.redis_pool.as_ref().map(|_| "SharedRedisPool"))
            .field("repositories", &"...")
            .field("event_bus", &self.event_bus)
            .field("mail_from", &self.mail_from)
            .finish()
    }
}

/// Builder for [`ServiceContext`]
///
/// When no event bus is supplied, the built context publishes auth events to
/// an [`AuditLogger`] over the audit repository.
#[derive(Default)]
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<SharedRedisPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    profile_repo: Option<Arc<dyn ProfileRepository>>,
    audit_repo: Option<Arc<dyn AuditLogRepository>>,
    session_store: Option<Arc<dyn SessionStore>>,
    reset_tokens: Option<Arc<PasswordResetTokens>>,
    mailer: Option<Arc<dyn Mailer>>,
    mail_from: Option<String>,
    event_bus: Option<EventBus>,
    admin_site: Option<AdminSite>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: SharedRedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn profile_repo(mut self, repo: Arc<dyn ProfileRepository>) -> Self {
        self.profile_repo = Some(repo);
        self
    }

    pub fn audit_repo(mut self, repo: Arc<dyn AuditLogRepository>) -> Self {
        self.audit_repo = Some(repo);
        self
    }

    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    pub fn reset_tokens(mut self, tokens: Arc<PasswordResetTokens>) -> Self {
        self.reset_tokens = Some(tokens);
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn mail_from(mut self, from: impl Into<String>) -> Self {
        self.mail_from = Some(from.into());
        self
    }

    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn admin_site(mut self, site: AdminSite) -> Self {
        self.admin_site = Some(site);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if a required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        let audit_repo = required(self.audit_repo, "audit_repo")?;
        let event_bus = self.event_bus.unwrap_or_else(|| {
            EventBus::new().with_handler(Arc::new(AuditLogger::new(Arc::clone(&audit_repo))))
        });

        Ok(ServiceContext {
            pool: self.pool,
            redis_pool: self.redis_pool,
            user_repo: required(self.user_repo, "user_repo")?,
            profile_repo: required(self.profile_repo, "profile_repo")?,
            audit_repo,
            session_store: required(self.session_store, "session_store")?,
            password_service: PasswordService::new(),
            reset_tokens: required(self.reset_tokens, "reset_tokens")?,
            mailer: required(self.mailer, "mailer")?,
            mail_from: required(self.mail_from, "mail_from")?,
            event_bus,
            admin_site: Arc::new(self.admin_site.unwrap_or_else(AdminSite::standard)),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory context shared by the service tests

    use super::*;
    use portal_cache::MemorySessionStore;
    use portal_core::{NewUser, User};
    use portal_db::MemoryDatabase;

    use crate::mail::{EmailMessage, MailError, Mailer, MemoryMailer};

    pub(crate) struct Harness {
        pub ctx: ServiceContext,
        pub db: MemoryDatabase,
        pub mailer: MemoryMailer,
    }

    /// Mailer whose relay is always down
    pub(crate) struct FailingMailer;

    #[async_trait::async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _message: &EmailMessage) -> Result<(), MailError> {
            Err(MailError::Transport("connection refused".to_string()))
        }
    }

    pub(crate) fn harness() -> Harness {
        let mailer = MemoryMailer::new();
        let mut h = harness_with_mailer(Arc::new(mailer.clone()));
        h.mailer = mailer;
        h
    }

    /// Harness delivering through `mailer`; `Harness::mailer` stays empty
    pub(crate) fn harness_with_mailer(mailer: Arc<dyn Mailer>) -> Harness {
        let db = MemoryDatabase::new();
        let ctx = ServiceContext::builder()
            .user_repo(Arc::new(db.clone()))
            .profile_repo(Arc::new(db.clone()))
            .audit_repo(Arc::new(db.clone()))
            .session_store(Arc::new(MemorySessionStore::new(3600)))
            .reset_tokens(Arc::new(PasswordResetTokens::new("unit-test-secret", 3600)))
            .mailer(mailer)
            .mail_from("noreply@example.com")
            .build()
            .unwrap();
        Harness {
            ctx,
            db,
            mailer: MemoryMailer::new(),
        }
    }

    impl Harness {
        /// Create an account with a usable password
        pub(crate) async fn user(&self, new_user: NewUser, password: &str) -> User {
            let hash = self.ctx.password_service().hash(password).unwrap();
            self.ctx.user_repo().create(&new_user, &hash).await.unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_dependencies() {
        let err = ServiceContextBuilder::new().build().unwrap_err();
        assert!(err.to_string().contains("is required"));
    }

    #[test]
    fn test_default_bus_has_audit_logger() {
        let harness = testing::harness();
        assert_eq!(harness.ctx.event_bus().len(), 1);
        assert!(harness.ctx.pool().is_none());
    }
}
