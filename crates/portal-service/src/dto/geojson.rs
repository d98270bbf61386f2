//! GeoJSON feature collection of located profiles

use serde::Serialize;

use portal_core::{GeoPoint, ProfileWithOwner};

/// Shown for a missing address or phone number
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub geometry: Option<PointGeometry>,
    pub properties: FeatureProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

impl From<&GeoPoint> for PointGeometry {
    fn from(point: &GeoPoint) -> Self {
        Self {
            kind: "Point",
            coordinates: point.coordinates(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureProperties {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub home_address: String,
    pub phone_number: String,
}

impl From<&ProfileWithOwner> for Feature {
    fn from(row: &ProfileWithOwner) -> Self {
        let or_na = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Self {
            kind: "Feature",
            geometry: row.profile.location.as_ref().map(PointGeometry::from),
            properties: FeatureProperties {
                username: row.owner.username.clone(),
                first_name: row.owner.first_name.clone(),
                last_name: row.owner.last_name.clone(),
                email: row.owner.email.clone(),
                home_address: or_na(&row.profile.home_address),
                phone_number: or_na(&row.profile.phone_number),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use portal_core::{ProfileId, User, UserId, UserProfile};
    use serde_json::json;

    #[test]
    fn test_feature_serialization() {
        let owner = User {
            id: UserId::new(1),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
            date_joined: Utc::now(),
        };
        let row = ProfileWithOwner {
            profile: UserProfile {
                id: ProfileId::new(3),
                user_id: owner.id,
                home_address: Some("1 Main St".to_string()),
                phone_number: None,
                location: Some(GeoPoint::new(2.5, -1.0).unwrap()),
            },
            owner,
        };

        let collection: FeatureCollection = std::iter::once(Feature::from(&row)).collect();
        let value = serde_json::to_value(&collection).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {"type": "Point", "coordinates": [2.5, -1.0]},
                    "properties": {
                        "username": "alice",
                        "first_name": "Alice",
                        "last_name": "Smith",
                        "email": "alice@example.com",
                        "home_address": "1 Main St",
                        "phone_number": "N/A"
                    }
                }]
            })
        );
    }

    #[test]
    fn test_empty_collection() {
        let value = serde_json::to_value(FeatureCollection::new(Vec::new())).unwrap();
        assert_eq!(value, json!({"type": "FeatureCollection", "features": []}));
    }
}
