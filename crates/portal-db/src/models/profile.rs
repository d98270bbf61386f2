//! Profile database models
//!
//! The PostGIS point is selected as `ST_X(location) AS longitude, ST_Y(location) AS latitude`.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the user_profiles table
#[derive(Debug, Clone, FromRow)]
pub struct ProfileModel {
    pub id: i64,
    pub user_id: i64,
    pub home_address: Option<String>,
    pub phone_number: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

/// A profile row joined with its owner's columns
#[derive(Debug, Clone, FromRow)]
pub struct ProfileWithOwnerModel {
    pub id: i64,
    pub user_id: i64,
    pub home_address: Option<String>,
    pub phone_number: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}
