//! HTML form payloads
//!
//! Every form deserializes from `application/x-www-form-urlencoded` bodies,
//! runs its `validator` rules and then a `clean` step that performs the checks
//! a derive cannot express. Errors are collected per field into [`FormErrors`]
//! so a page can be re-rendered with inline messages.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidateEmail, ValidationErrors};

use portal_common::password_problems;
use portal_core::{
    is_valid_username, normalize_email, GeoPoint, NewUser, ProfileChanges, User, UserProfile,
    USERNAME_MAX_LENGTH,
};

/// Message shown under an empty required field
pub const REQUIRED: &str = "This field is required.";

/// Key under which errors not tied to one field are stored
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Field name to messages, ordered by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    /// A set holding a single message for `field`
    #[must_use]
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages for one field, empty when it is valid
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn non_field(&self) -> &[String] {
        self.get(NON_FIELD_ERRORS)
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(value)` when no error was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    fn from_validation(result: Result<(), ValidationErrors>) -> Self {
        result.err().map(Self::from).unwrap_or_default()
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form = Self::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string);
                form.add(field.to_string(), message);
            }
        }
        form
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                first = false;
                write!(f, "{field}: {message}")?;
            }
        }
        Ok(())
    }
}

/// HTML checkboxes are only submitted when ticked, usually as `on`
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    ))
}

/// Trimmed value, or `None` when blank
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn check_username(username: &str, errors: &mut FormErrors) {
    if username.is_empty() {
        errors.add("username", REQUIRED);
    } else if username.chars().count() > USERNAME_MAX_LENGTH {
        errors.add(
            "username",
            format!("Ensure this value has at most {USERNAME_MAX_LENGTH} characters."),
        );
    } else if !is_valid_username(username) {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
}

fn check_email(email: &str, errors: &mut FormErrors) {
    if email.is_empty() {
        errors.add("email", "Email is required.");
    } else if !email.validate_email() {
        errors.add("email", "Enter a valid email address.");
    }
}

// ============================================================================
// Login
// ============================================================================

/// Login form; `next` is carried through from the query string
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,

    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Trim the username and check both fields are present
    pub fn clean(mut self) -> Result<Self, FormErrors> {
        self.username = self.username.trim().to_string();
        FormErrors::from_validation(self.validate()).into_result(self)
    }
}

// ============================================================================
// Profile
// ============================================================================

/// Edit-profile form; a blank field clears the stored value
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct EditProfileForm {
    #[serde(default)]
    pub home_address: String,

    #[serde(default)]
    #[validate(length(max = 15, message = "Ensure this value has at most 15 characters."))]
    pub phone_number: String,

    /// WKT `POINT(x y)` or a GeoJSON point
    #[serde(default)]
    pub location: String,
}

impl EditProfileForm {
    /// Prefill the form from the stored profile
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            home_address: profile.home_address.clone().unwrap_or_default(),
            phone_number: profile.phone_number.clone().unwrap_or_default(),
            location: profile
                .location
                .as_ref()
                .map(GeoPoint::to_wkt)
                .unwrap_or_default(),
        }
    }

    pub fn clean(&self) -> Result<ProfileChanges, FormErrors> {
        let mut errors = FormErrors::from_validation(self.validate());

        let location = match non_blank(&self.location) {
            None => None,
            Some(raw) => match raw.parse::<GeoPoint>() {
                Ok(point) => Some(point),
                Err(e) => {
                    errors.add("location", format!("Invalid geometry value: {e}."));
                    None
                }
            },
        };

        errors.into_result(ProfileChanges {
            home_address: non_blank(&self.home_address),
            phone_number: non_blank(&self.phone_number),
            location,
        })
    }
}

// ============================================================================
// Password reset
// ============================================================================

/// New password entered twice
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetPasswordForm {
    #[serde(default)]
    pub new_password1: String,

    #[serde(default)]
    pub new_password2: String,
}

impl SetPasswordForm {
    /// Returns the accepted password
    pub fn clean(&self, username: &str) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();

        if self.new_password1.is_empty() {
            errors.add("new_password1", REQUIRED);
        }
        if self.new_password2.is_empty() {
            errors.add("new_password2", REQUIRED);
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        if self.new_password1 != self.new_password2 {
            errors.add("new_password2", "The two password fields didn't match.");
            return Err(errors);
        }

        for problem in password_problems(&self.new_password2, username) {
            errors.add("new_password2", problem);
        }

        errors.into_result(self.new_password1.clone())
    }
}

// ============================================================================
// Admin
// ============================================================================

/// Admin "add user" form; a blank password leaves the account unusable until reset
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AdminUserCreateForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,

    #[serde(default, skip_serializing)]
    pub password: String,

    #[serde(default, deserialize_with = "checkbox")]
    pub is_staff: bool,

    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,
}

/// Output of a valid [`AdminUserCreateForm`]
#[derive(Debug, Clone)]
pub struct CleanedNewUser {
    pub user: NewUser,
    pub password: Option<String>,
}

impl AdminUserCreateForm {
    /// Defaults shown on an empty "add user" page
    #[must_use]
    pub fn initial() -> Self {
        Self {
            is_active: true,
            ..Self::default()
        }
    }

    pub fn clean(&self) -> Result<CleanedNewUser, FormErrors> {
        let mut errors = FormErrors::from_validation(self.validate());
        let username = self.username.trim();
        let email = self.email.trim();

        check_username(username, &mut errors);
        check_email(email, &mut errors);

        let password = (!self.password.is_empty()).then(|| self.password.clone());

        errors.into_result(CleanedNewUser {
            user: NewUser::new(username, email)
                .with_names(self.first_name.trim(), self.last_name.trim())
                .staff(self.is_staff)
                .active(self.is_active),
            password,
        })
    }
}

/// Admin "change user" form
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct AdminUserChangeForm {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,

    #[serde(default, deserialize_with = "checkbox")]
    pub is_active: bool,

    #[serde(default, deserialize_with = "checkbox")]
    pub is_staff: bool,

    #[serde(default, deserialize_with = "checkbox")]
    pub is_superuser: bool,
}

impl AdminUserChangeForm {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
        }
    }

    pub fn clean(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::from_validation(self.validate());
        check_username(self.username.trim(), &mut errors);
        check_email(self.email.trim(), &mut errors);
        errors.into_result(())
    }

    /// Copy the form onto `user`, returning the names of the fields that changed
    pub fn apply(&self, user: &mut User) -> Vec<&'static str> {
        let mut changed = Vec::new();

        let mut set_text = |name: &'static str, field: &mut String, value: String| {
            if *field != value {
                *field = value;
                changed.push(name);
            }
        };
        set_text("username", &mut user.username, self.username.trim().to_string());
        set_text("email", &mut user.email, normalize_email(self.email.trim()));
        set_text("first_name", &mut user.first_name, self.first_name.trim().to_string());
        set_text("last_name", &mut user.last_name, self.last_name.trim().to_string());

        for (name, field, value) in [
            ("is_active", &mut user.is_active, self.is_active),
            ("is_staff", &mut user.is_staff, self.is_staff),
            ("is_superuser", &mut user.is_superuser, self.is_superuser),
        ] {
            if *field != value {
                *field = value;
                changed.push(name);
            }
        }

        changed
    }
}
