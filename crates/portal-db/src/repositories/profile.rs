//! PostgreSQL implementation of ProfileRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use portal_core::{
    DomainError, ProfileId, ProfileRepository, ProfileWithOwner, RepoResult, UserId, UserProfile,
};

use crate::mappers::point_columns;
use crate::models::{ProfileModel, ProfileWithOwnerModel};

use super::error::{map_db_error, map_missing_user, profile_not_found};

/// PostgreSQL implementation of ProfileRepository
#[derive(Clone)]
pub struct PgProfileRepository {
    pool: PgPool,
}

impl PgProfileRepository {
    /// Create a new PgProfileRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list_joined(&self, only_located: bool) -> RepoResult<Vec<ProfileWithOwner>> {
        let rows = sqlx::query_as::<_, ProfileWithOwnerModel>(
            r"
            SELECT p.id, p.user_id, p.home_address, p.phone_number,
                   ST_X(p.location) AS longitude, ST_Y(p.location) AS latitude,
                   u.username, u.email, u.first_name, u.last_name, u.is_active,
                   u.is_staff, u.is_superuser, u.last_login, u.date_joined
            FROM user_profiles p
            JOIN users u ON u.id = p.user_id
            WHERE NOT $1 OR p.location IS NOT NULL
            ORDER BY p.id
            ",
        )
        .bind(only_located)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(ProfileWithOwner::try_from).collect()
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ProfileId) -> RepoResult<Option<UserProfile>> {
        let result = sqlx::query_as::<_, ProfileModel>(
            r"
            SELECT id, user_id, home_address, phone_number,
                   ST_X(location) AS longitude, ST_Y(location) AS latitude
            FROM user_profiles
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserProfile::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: UserId) -> RepoResult<Option<UserProfile>> {
        let result = sqlx::query_as::<_, ProfileModel>(
            r"
            SELECT id, user_id, home_address, phone_number,
                   ST_X(location) AS longitude, ST_Y(location) AS latitude
            FROM user_profiles
            WHERE user_id = $1
            ",
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(UserProfile::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn get_or_create(&self, user_id: UserId) -> RepoResult<(UserProfile, bool)> {
        let inserted = sqlx::query_as::<_, ProfileModel>(
            r"
            INSERT INTO user_profiles (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, user_id, home_address, phone_number,
                      ST_X(location) AS longitude, ST_Y(location) AS latitude
            ",
        )
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_missing_user(e, user_id))?;

        if let Some(model) = inserted {
            return Ok((UserProfile::try_from(model)?, true));
        }

        // Lost the race or already present; the unique constraint guarantees a row now
        let existing = self
            .find_by_user(user_id)
            .await?
            .ok_or(DomainError::ProfileNotFoundForUser(user_id))?;
        Ok((existing, false))
    }

    #[instrument(skip(self), fields(profile_id = %profile.id))]
    async fn update(&self, profile: &UserProfile) -> RepoResult<()> {
        let (longitude, latitude) = point_columns(profile.location.as_ref());

        let result = sqlx::query(
            r"
            UPDATE user_profiles
            SET home_address = $2,
                phone_number = $3,
                location = CASE
                    WHEN $4::float8 IS NULL OR $5::float8 IS NULL THEN NULL
                    ELSE ST_SetSRID(ST_MakePoint($4, $5), 4326)
                END
            WHERE id = $1
            ",
        )
        .bind(profile.id.into_inner())
        .bind(&profile.home_address)
        .bind(&profile.phone_number)
        .bind(longitude)
        .bind(latitude)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(profile_not_found(profile.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_with_owner(&self) -> RepoResult<Vec<ProfileWithOwner>> {
        self.list_joined(false).await
    }

    #[instrument(skip(self))]
    async fn list_located(&self) -> RepoResult<Vec<ProfileWithOwner>> {
        self.list_joined(true).await
    }
}
