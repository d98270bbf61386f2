//! Profile entity <-> model mapper

use portal_core::{DomainError, GeoPoint, ProfileId, ProfileWithOwner, User, UserId, UserProfile};

use crate::models::{ProfileModel, ProfileWithOwnerModel};

/// Split a location into the `(longitude, latitude)` bind parameters
pub fn point_columns(location: Option<&GeoPoint>) -> (Option<f64>, Option<f64>) {
    location.map_or((None, None), |p| (Some(p.longitude()), Some(p.latitude())))
}

fn location(longitude: Option<f64>, latitude: Option<f64>) -> Result<Option<GeoPoint>, DomainError> {
    match (longitude, latitude) {
        (Some(x), Some(y)) => Ok(Some(GeoPoint::new(x, y)?)),
        _ => Ok(None),
    }
}

impl TryFrom<ProfileModel> for UserProfile {
    type Error = DomainError;

    fn try_from(model: ProfileModel) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            id: ProfileId::new(model.id),
            user_id: UserId::new(model.user_id),
            home_address: model.home_address,
            phone_number: model.phone_number,
            location: location(model.longitude, model.latitude)?,
        })
    }
}

impl TryFrom<ProfileWithOwnerModel> for ProfileWithOwner {
    type Error = DomainError;

    fn try_from(model: ProfileWithOwnerModel) -> Result<Self, Self::Error> {
        Ok(ProfileWithOwner {
            profile: UserProfile {
                id: ProfileId::new(model.id),
                user_id: UserId::new(model.user_id),
                home_address: model.home_address,
                phone_number: model.phone_number,
                location: location(model.longitude, model.latitude)?,
            },
            owner: User {
                id: UserId::new(model.user_id),
                username: model.username,
                email: model.email,
                first_name: model.first_name,
                last_name: model.last_name,
                is_active: model.is_active,
                is_staff: model.is_staff,
                is_superuser: model.is_superuser,
                last_login: model.last_login,
                date_joined: model.date_joined,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_columns() {
        let point = GeoPoint::new(2.5, -1.0).unwrap();
        assert_eq!(point_columns(Some(&point)), (Some(2.5), Some(-1.0)));
        assert_eq!(point_columns(None), (None, None));
    }

    #[test]
    fn test_profile_model_mapping() {
        let model = ProfileModel {
            id: 4,
            user_id: 9,
            home_address: Some("New Address".to_string()),
            phone_number: None,
            longitude: Some(1.0),
            latitude: Some(1.0),
        };

        let profile = UserProfile::try_from(model).unwrap();
        assert_eq!(profile.id, ProfileId::new(4));
        assert_eq!(profile.user_id, UserId::new(9));
        assert_eq!(profile.location.unwrap().to_wkt(), "POINT(1 1)");
    }

    #[test]
    fn test_profile_without_location() {
        let model = ProfileModel {
            id: 1,
            user_id: 1,
            home_address: None,
            phone_number: None,
            longitude: None,
            latitude: None,
        };
        assert!(UserProfile::try_from(model).unwrap().location.is_none());
    }
}
