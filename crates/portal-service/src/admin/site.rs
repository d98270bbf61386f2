use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;

use portal_core::{ProfileWithOwner, User};

use crate::dto::{AdminTable, AdminTableRow};

bitflags! {
    /// What the admin may do with a registered entity
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const LIST = 1 << 0;
        const EDIT = 1 << 1;
        const CREATE = 1 << 2;
        /// Run the post-create hook (profile, reset token, invitation mail)
        const CREATE_HOOK = 1 << 3;
        /// Show locations of the listed rows
        const GEO = 1 << 4;
    }
}

/// Entities the admin knows how to manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    User,
    UserProfile,
}

impl EntityKind {
    /// URL segment under `/admin/`
    pub const fn slug(self) -> &'static str {
        match self {
            Self::User => "users",
            Self::UserProfile => "profiles",
        }
    }

    pub const fn verbose_name_plural(self) -> &'static str {
        match self {
            Self::User => "Users",
            Self::UserProfile => "User profiles",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "users" => Some(Self::User),
            "profiles" => Some(Self::UserProfile),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verbose_name_plural())
    }
}

/// A titled group of form fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fieldset {
    pub title: Option<&'static str>,
    pub fields: &'static [&'static str],
}

/// How one entity is presented in the admin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelAdmin {
    pub list_display: &'static [&'static str],
    /// Layout of the change form
    pub fieldsets: Vec<Fieldset>,
    /// Layout of the add form
    pub add_fieldsets: Vec<Fieldset>,
    pub capabilities: Capabilities,
}

impl ModelAdmin {
    #[must_use]
    pub fn allows(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    /// Render `items` as a change list
    pub fn table<T: AdminDisplay>(&self, kind: EntityKind, items: &[T]) -> AdminTable {
        AdminTable {
            title: kind.verbose_name_plural(),
            columns: self.list_display.to_vec(),
            rows: items
                .iter()
                .map(|item| AdminTableRow {
                    id: item.pk(),
                    cells: self
                        .list_display
                        .iter()
                        .map(|column| item.column(column))
                        .collect(),
                })
                .collect(),
            editable: self.allows(Capabilities::EDIT),
            addable: self.allows(Capabilities::CREATE),
        }
    }
}

/// Column values of a listed entity
pub trait AdminDisplay {
    fn pk(&self) -> String;

    /// Display value for a `list_display` column; unknown columns render empty
    fn column(&self, name: &str) -> String;
}

fn yes_no(value: bool) -> String {
    if value { "Yes" } else { "No" }.to_string()
}

impl AdminDisplay for User {
    fn pk(&self) -> String {
        self.id.to_string()
    }

    fn column(&self, name: &str) -> String {
        match name {
            "id" => self.id.to_string(),
            "username" => self.username.clone(),
            "email" => self.email.clone(),
            "first_name" => self.first_name.clone(),
            "last_name" => self.last_name.clone(),
            "is_staff" => yes_no(self.is_staff),
            "is_active" => yes_no(self.is_active),
            "is_superuser" => yes_no(self.is_superuser),
            _ => String::new(),
        }
    }
}

impl AdminDisplay for ProfileWithOwner {
    fn pk(&self) -> String {
        self.profile.id.to_string()
    }

    fn column(&self, name: &str) -> String {
        match name {
            "id" => self.profile.id.to_string(),
            "user" => self.owner.username.clone(),
            "location" => self
                .profile
                .location
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
            "home_address" => self.profile.home_address.clone().unwrap_or_default(),
            "phone_number" => self.profile.phone_number.clone().unwrap_or_default(),
            _ => String::new(),
        }
    }
}

/// Registry of entities exposed in the admin
#[derive(Debug, Clone, Default)]
pub struct AdminSite {
    registry: BTreeMap<EntityKind, ModelAdmin>,
}

impl AdminSite {
    /// A site with nothing registered
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The portal's standard registrations
    #[must_use]
    pub fn standard() -> Self {
        let mut site = Self::empty();
        site.register(
            EntityKind::User,
            ModelAdmin {
                list_display: &[
                    "id",
                    "username",
                    "email",
                    "first_name",
                    "last_name",
                    "is_staff",
                    "is_active",
                ],
                fieldsets: vec![
                    Fieldset {
                        title: None,
                        fields: &["username", "email"],
                    },
                    Fieldset {
                        title: Some("Personal info"),
                        fields: &["first_name", "last_name"],
                    },
                    Fieldset {
                        title: Some("Permissions"),
                        fields: &["is_active", "is_staff", "is_superuser"],
                    },
                ],
                add_fieldsets: vec![Fieldset {
                    title: None,
                    fields: &[
                        "username",
                        "email",
                        "first_name",
                        "last_name",
                        "password",
                        "is_staff",
                        "is_active",
                    ],
                }],
                capabilities: Capabilities::LIST
                    | Capabilities::EDIT
                    | Capabilities::CREATE
                    | Capabilities::CREATE_HOOK,
            },
        );
        site.register(
            EntityKind::UserProfile,
            ModelAdmin {
                list_display: &["id", "user", "location", "home_address"],
                fieldsets: Vec::new(),
                add_fieldsets: Vec::new(),
                capabilities: Capabilities::LIST | Capabilities::GEO,
            },
        );
        site
    }

    /// Register or replace the admin for `kind`
    pub fn register(&mut self, kind: EntityKind, admin: ModelAdmin) -> Option<ModelAdmin> {
        self.registry.insert(kind, admin)
    }

    #[must_use]
    pub fn get(&self, kind: EntityKind) -> Option<&ModelAdmin> {
        self.registry.get(&kind)
    }

    /// The admin for `kind` when it is registered with `capability`
    #[must_use]
    pub fn with_capability(&self, kind: EntityKind, capability: Capabilities) -> Option<&ModelAdmin> {
        self.get(kind).filter(|admin| admin.allows(capability))
    }

    #[must_use]
    pub fn allows(&self, kind: EntityKind, capability: Capabilities) -> bool {
        self.with_capability(kind, capability).is_some()
    }

    /// Registered entities in a stable order
    pub fn entities(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.registry.keys().copied()
    }
}
