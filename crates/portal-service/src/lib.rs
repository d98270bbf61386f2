//! # portal-service
//!
//! Application layer containing the portal's use cases: login sessions and
//! password resets, profile editing, the location map, the admin site with its
//! invitation hook, audit logging of auth events, and outgoing mail.

pub mod admin;
pub mod dto;
pub mod events;
pub mod mail;
pub mod services;

pub use admin::{AdminDisplay, AdminSite, Capabilities, EntityKind, Fieldset, ModelAdmin};
pub use dto::{
    AdminTable, AdminUserChangeForm, AdminUserCreateForm, EditProfileForm, Feature,
    FeatureCollection, FeatureProperties, FormErrors, LoginForm, PointGeometry, SetPasswordForm,
};
pub use events::{AuditLogger, AuthEventHandler, EventBus};
pub use mail::{
    mailer_from_config, ConsoleMailer, EmailMessage, MailError, Mailer, MemoryMailer, SmtpMailer,
};
pub use services::{
    AdminService, AuthService, CreatedUser, LoginOutcome, MapService, ProfileService,
    ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};
