//! Data transfer objects
//!
//! - Form payloads with validation for the HTML views
//! - GeoJSON output for the location map
//! - Table rows for the admin list pages

pub mod forms;
pub mod geojson;
pub mod views;

pub use forms::{
    AdminUserChangeForm, AdminUserCreateForm, CleanedNewUser, EditProfileForm, FormErrors,
    LoginForm, SetPasswordForm, NON_FIELD_ERRORS, REQUIRED,
};
pub use geojson::{Feature, FeatureCollection, FeatureProperties, PointGeometry};
pub use views::{AdminTable, AdminTableRow, FormField, FormSection};
