//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};

use portal_core::NewUser;

/// Password given to every seeded account
pub const TEST_PASSWORD: &str = "testpass123";

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Kind of account to seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Regular,
    Staff,
    Superuser,
    Inactive,
}

impl Role {
    /// Account data for `username` with this role
    pub fn new_user(self, username: &str) -> NewUser {
        let user = NewUser::new(username, format!("{username}@example.com"))
            .with_names("Test", "User");
        match self {
            Self::Regular => user,
            Self::Staff => user.staff(true),
            Self::Superuser => user.superuser(),
            Self::Inactive => user.active(false),
        }
    }
}

/// Unique username with a readable prefix
pub fn unique_username(prefix: &str) -> String {
    format!("{prefix}{}", unique_suffix())
}
