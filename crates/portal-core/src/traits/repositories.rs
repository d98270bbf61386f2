//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! (PostgreSQL or in-memory) provides the implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{LogEntry, NewLogEntry, NewUser, ProfileWithOwner, User, UserProfile};
use crate::error::DomainError;
use crate::value_objects::{ProfileId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>>;

    /// Find user by exact username
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Check if username is already taken
    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Create a new user; the store assigns the id
    async fn create(&self, user: &NewUser, password_hash: &str) -> RepoResult<User>;

    /// Update account fields (not the password)
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// List all users ordered by id
    async fn list(&self) -> RepoResult<Vec<User>>;

    /// Get password hash for authentication
    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>>;

    /// Update password hash
    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()>;

    /// Stamp a successful login
    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> RepoResult<()>;
}

// ============================================================================
// Profile Repository
// ============================================================================

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Find profile by ID
    async fn find_by_id(&self, id: ProfileId) -> RepoResult<Option<UserProfile>>;

    /// Find the profile of an account
    async fn find_by_user(&self, user_id: UserId) -> RepoResult<Option<UserProfile>>;

    /// Return the account's profile, creating an empty one if absent.
    /// The flag is `true` when a row was inserted.
    async fn get_or_create(&self, user_id: UserId) -> RepoResult<(UserProfile, bool)>;

    /// Persist address, phone number and location
    async fn update(&self, profile: &UserProfile) -> RepoResult<()>;

    /// All profiles with their owners, ordered by profile id
    async fn list_with_owner(&self) -> RepoResult<Vec<ProfileWithOwner>>;

    /// Profiles with a non-null location, with their owners
    async fn list_located(&self) -> RepoResult<Vec<ProfileWithOwner>>;
}

// ============================================================================
// Audit Log Repository
// ============================================================================

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    /// Append an entry
    async fn append(&self, entry: &NewLogEntry) -> RepoResult<LogEntry>;

    /// Most recent entries first
    async fn recent(&self, limit: i64) -> RepoResult<Vec<LogEntry>>;

    /// Entries about one account, most recent first
    async fn for_object(&self, content_type: &str, object_id: &str) -> RepoResult<Vec<LogEntry>>;
}
