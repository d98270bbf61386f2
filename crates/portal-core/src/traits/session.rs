use async_trait::async_trait;

use super::RepoResult;
use crate::entities::SessionRecord;
use crate::value_objects::UserId;

/// Server-side session storage keyed by an opaque random key
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a new session for the account and return it with its fresh key
    async fn create(&self, user_id: UserId) -> RepoResult<SessionRecord>;

    /// Load a live session; expired or unknown keys yield `None`
    async fn load(&self, key: &str) -> RepoResult<Option<SessionRecord>>;

    /// Remove a session, returning whether it existed
    async fn destroy(&self, key: &str) -> RepoResult<bool>;
}
