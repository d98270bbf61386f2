//! User profile entity - one-to-one extension of a user account

use serde::Serialize;

use crate::entities::User;
use crate::value_objects::{GeoPoint, ProfileId, UserId};

/// Longest accepted phone number
pub const PHONE_NUMBER_MAX_LENGTH: usize = 15;

/// Address, phone number and optional home location of a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub home_address: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<GeoPoint>,
}

impl UserProfile {
    /// Only the owning account may edit a profile
    #[inline]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Replace the editable fields
    pub fn apply(&mut self, changes: ProfileChanges) {
        self.home_address = changes.home_address;
        self.phone_number = changes.phone_number;
        self.location = changes.location;
    }
}

/// Editable profile fields; `None` clears the stored value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub home_address: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<GeoPoint>,
}

/// A profile joined with its owning account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileWithOwner {
    pub profile: UserProfile,
    pub owner: User,
}
