//! Map service
//!
//! Builds the GeoJSON shown on the superuser location map.

use tracing::instrument;

use portal_core::User;

use crate::dto::{Feature, FeatureCollection};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Map service
pub struct MapService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MapService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Every profile with a stored location, for a superuser viewer
    #[instrument(skip(self, viewer), fields(user_id = %viewer.id))]
    pub async fn feature_collection(&self, viewer: &User) -> ServiceResult<FeatureCollection> {
        if !viewer.can_view_map() {
            return Err(ServiceError::permission_denied(
                "Only superusers may view the location map.",
            ));
        }

        let located = self.ctx.profile_repo().list_located().await?;
        Ok(located.iter().map(Feature::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::testing::harness;
    use portal_core::{GeoPoint, NewUser, ProfileRepository};

    #[tokio::test]
    async fn test_superuser_sees_located_profiles() {
        let h = harness();
        let admin = h.user(NewUser::new("root", "root@example.com").superuser(), "pass12345").await;
        let located = h.user(NewUser::new("alice", "alice@example.com"), "pass12345").await;
        let hidden = h.user(NewUser::new("bob", "bob@example.com"), "pass12345").await;

        let (mut profile, _) = h.db.get_or_create(located.id).await.unwrap();
        profile.location = Some(GeoPoint::new(10.0, 20.0).unwrap());
        ProfileRepository::update(&h.db, &profile).await.unwrap();
        h.db.get_or_create(hidden.id).await.unwrap();

        let collection = MapService::new(&h.ctx).feature_collection(&admin).await.unwrap();
        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.properties.username, "alice");
        assert_eq!(feature.properties.home_address, "N/A");
        assert_eq!(feature.geometry.as_ref().unwrap().coordinates, [10.0, 20.0]);
    }

    #[tokio::test]
    async fn test_staff_is_rejected() {
        let h = harness();
        let staff = h.user(NewUser::new("staff", "staff@example.com").staff(true), "pass12345").await;

        let err = MapService::new(&h.ctx).feature_collection(&staff).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
