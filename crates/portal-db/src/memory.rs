//! In-memory implementation of the repository traits
//!
//! One shared state backs users, profiles and log entries so joins and
//! uniqueness rules behave like the PostgreSQL schema. Used by tests and by
//! local runs without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use portal_core::{
    AuditLogRepository, DomainError, LogEntry, LogEntryId, NewLogEntry, NewUser, ProfileId,
    ProfileRepository, ProfileWithOwner, RepoResult, User, UserId, UserProfile, UserRepository,
};

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<UserId, (User, String)>,
    profiles: BTreeMap<ProfileId, UserProfile>,
    log_entries: Vec<LogEntry>,
    next_user_id: i64,
    next_profile_id: i64,
    next_log_entry_id: i64,
}

impl MemoryState {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn username_taken(&self, username: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|(u, _)| u.username == username && Some(u.id) != except)
    }

    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|(u, _)| u.email == email && Some(u.id) != except)
    }

    fn with_owner(&self, profile: &UserProfile) -> Option<ProfileWithOwner> {
        self.users
            .get(&profile.user_id)
            .map(|(owner, _)| ProfileWithOwner {
                profile: profile.clone(),
                owner: owner.clone(),
            })
    }
}

/// Shared in-memory store; clones share the same data
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.state.read().users.get(&id).map(|(u, _)| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|(u, _)| u.username == username)
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .find(|(u, _)| u.email == email)
            .map(|(u, _)| u.clone()))
    }

    async fn username_exists(&self, username: &str) -> RepoResult<bool> {
        Ok(self.state.read().username_taken(username, None))
    }

    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        Ok(self.state.read().email_taken(email, None))
    }

    async fn create(&self, user: &NewUser, password_hash: &str) -> RepoResult<User> {
        let mut state = self.state.write();

        if state.username_taken(&user.username, None) {
            return Err(DomainError::UsernameAlreadyExists);
        }
        if state.email_taken(&user.email, None) {
            return Err(DomainError::EmailAlreadyExists);
        }

        let created = User {
            id: UserId::new(MemoryState::next_id(&mut state.next_user_id)),
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            last_login: None,
            date_joined: Utc::now(),
        };
        state
            .users
            .insert(created.id, (created.clone(), password_hash.to_string()));

        Ok(created)
    }

    async fn update(&self, user: &User) -> RepoResult<()> {
        let mut state = self.state.write();

        if state.username_taken(&user.username, Some(user.id)) {
            return Err(DomainError::UsernameAlreadyExists);
        }
        if state.email_taken(&user.email, Some(user.id)) {
            return Err(DomainError::EmailAlreadyExists);
        }

        let (stored, _) = state
            .users
            .get_mut(&user.id)
            .ok_or(DomainError::UserNotFound(user.id))?;
        // last_login and date_joined are not editable through update
        *stored = User {
            last_login: stored.last_login,
            date_joined: stored.date_joined,
            ..user.clone()
        };
        Ok(())
    }

    async fn list(&self) -> RepoResult<Vec<User>> {
        Ok(self
            .state
            .read()
            .users
            .values()
            .map(|(u, _)| u.clone())
            .collect())
    }

    async fn get_password_hash(&self, id: UserId) -> RepoResult<Option<String>> {
        Ok(self.state.read().users.get(&id).map(|(_, h)| h.clone()))
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()> {
        let mut state = self.state.write();
        let (_, hash) = state
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        *hash = password_hash.to_string();
        Ok(())
    }

    async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> RepoResult<()> {
        let mut state = self.state.write();
        let (user, _) = state
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;
        user.last_login = Some(at);
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MemoryDatabase {
    async fn find_by_id(&self, id: ProfileId) -> RepoResult<Option<UserProfile>> {
        Ok(self.state.read().profiles.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> RepoResult<Option<UserProfile>> {
        Ok(self
            .state
            .read()
            .profiles
            .values()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn get_or_create(&self, user_id: UserId) -> RepoResult<(UserProfile, bool)> {
        let mut state = self.state.write();

        if !state.users.contains_key(&user_id) {
            return Err(DomainError::UserNotFound(user_id));
        }
        if let Some(existing) = state.profiles.values().find(|p| p.user_id == user_id) {
            return Ok((existing.clone(), false));
        }

        let profile = UserProfile {
            id: ProfileId::new(MemoryState::next_id(&mut state.next_profile_id)),
            user_id,
            home_address: None,
            phone_number: None,
            location: None,
        };
        state.profiles.insert(profile.id, profile.clone());
        Ok((profile, true))
    }

    async fn update(&self, profile: &UserProfile) -> RepoResult<()> {
        let mut state = self.state.write();
        let stored = state
            .profiles
            .get_mut(&profile.id)
            .ok_or(DomainError::ProfileNotFound(profile.id))?;
        *stored = UserProfile {
            user_id: stored.user_id,
            ..profile.clone()
        };
        Ok(())
    }

    async fn list_with_owner(&self) -> RepoResult<Vec<ProfileWithOwner>> {
        let state = self.state.read();
        Ok(state
            .profiles
            .values()
            .filter_map(|p| state.with_owner(p))
            .collect())
    }

    async fn list_located(&self) -> RepoResult<Vec<ProfileWithOwner>> {
        let state = self.state.read();
        Ok(state
            .profiles
            .values()
            .filter(|p| p.location.is_some())
            .filter_map(|p| state.with_owner(p))
            .collect())
    }
}

#[async_trait]
impl AuditLogRepository for MemoryDatabase {
    async fn append(&self, entry: &NewLogEntry) -> RepoResult<LogEntry> {
        let mut state = self.state.write();

        if !state.users.contains_key(&entry.user_id) {
            return Err(DomainError::UserNotFound(entry.user_id));
        }

        let stored = LogEntry {
            id: LogEntryId::new(MemoryState::next_id(&mut state.next_log_entry_id)),
            action_time: Utc::now(),
            user_id: entry.user_id,
            content_type: entry.content_type.clone(),
            object_id: entry.object_id.clone(),
            object_repr: entry.object_repr.clone(),
            action_flag: entry.action_flag,
            change_message: entry.change_message.clone(),
        };
        state.log_entries.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, limit: i64) -> RepoResult<Vec<LogEntry>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .state
            .read()
            .log_entries
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn for_object(&self, content_type: &str, object_id: &str) -> RepoResult<Vec<LogEntry>> {
        Ok(self
            .state
            .read()
            .log_entries
            .iter()
            .rev()
            .filter(|e| e.content_type == content_type && e.object_id.as_deref() == Some(object_id))
            .cloned()
            .collect())
    }
}
