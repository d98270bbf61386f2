//! Profile service
//!
//! Viewing and editing the profile attached to the current account.

use tracing::{info, instrument};

use portal_core::{DomainError, ProfileId, User, UserProfile};

use crate::dto::EditProfileForm;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Profile service
pub struct ProfileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProfileService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// The viewer's own profile, created empty on first access
    #[instrument(skip(self, viewer), fields(user_id = %viewer.id))]
    pub async fn own_profile(&self, viewer: &User) -> ServiceResult<UserProfile> {
        let (profile, created) = self.ctx.profile_repo().get_or_create(viewer.id).await?;
        if created {
            info!(profile_id = %profile.id, "Created profile on first visit");
        }
        Ok(profile)
    }

    /// Load a profile for editing: it must exist, then belong to `editor`
    #[instrument(skip(self, editor), fields(user_id = %editor.id))]
    pub async fn profile_for_edit(&self, editor: &User, id: ProfileId) -> ServiceResult<UserProfile> {
        let profile = self
            .ctx
            .profile_repo()
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Profile", id))?;

        if !profile.is_owned_by(editor.id) {
            return Err(DomainError::NotProfileOwner.into());
        }
        Ok(profile)
    }

    /// Apply a submitted edit form to the editor's own profile
    #[instrument(skip(self, editor, form), fields(user_id = %editor.id))]
    pub async fn update_profile(
        &self,
        editor: &User,
        id: ProfileId,
        form: &EditProfileForm,
    ) -> ServiceResult<UserProfile> {
        let mut profile = self.profile_for_edit(editor, id).await?;
        let changes = form.clean()?;

        profile.apply(changes);
        self.ctx.profile_repo().update(&profile).await?;

        info!(profile_id = %profile.id, "Profile updated");
        Ok(profile)
    }
}
