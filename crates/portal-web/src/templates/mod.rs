//! HTML templates
//!
//! Every page template is compiled into the binary and loaded into one
//! minijinja environment at startup. Autoescaping is on for all `.html` names.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::response::WebResult;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("profile.html", include_str!("../../templates/profile.html")),
    ("edit_profile.html", include_str!("../../templates/edit_profile.html")),
    ("map.html", include_str!("../../templates/map.html")),
    (
        "registration/reset_confirm.html",
        include_str!("../../templates/registration/reset_confirm.html"),
    ),
    (
        "registration/reset_invalid.html",
        include_str!("../../templates/registration/reset_invalid.html"),
    ),
    (
        "registration/reset_complete.html",
        include_str!("../../templates/registration/reset_complete.html"),
    ),
    ("admin/base_admin.html", include_str!("../../templates/admin/base_admin.html")),
    ("admin/list.html", include_str!("../../templates/admin/list.html")),
    ("admin/user_form.html", include_str!("../../templates/admin/user_form.html")),
    ("admin/log.html", include_str!("../../templates/admin/log.html")),
];

/// Compiled page templates
#[derive(Debug)]
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Compile all templates; `app_name` is exposed to every page as a global
    pub fn new(app_name: &str) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_global("app_name", app_name.to_string());
        Ok(Self { env })
    }

    /// Render a page
    pub fn render(&self, name: &str, context: impl Serialize) -> WebResult<Html<String>> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(context)?))
    }
}
