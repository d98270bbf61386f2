//! Login session storage.
//!
//! Both stores hand out opaque random keys and drop sessions once
//! `expires_at` has passed.

mod memory_store;
mod redis_store;

pub use memory_store::MemorySessionStore;
pub use redis_store::{RedisSessionStore, SESSION_KEY_PREFIX};

/// A fresh 32-character hex session key
pub(crate) fn new_session_key() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
