//! Invitation mail sent when an admin creates an account

use minijinja::{context, Environment};

use portal_common::encode_uid;
use portal_core::{User, UserId};

use super::{EmailMessage, MailError};

pub const INVITATION_SUBJECT: &str = "You're invited to our platform";

const INVITATION_TEMPLATE: &str = include_str!("../../templates/email/invitation.html");

/// `<base>/reset/<uidb64>/<token>/`
pub fn invitation_link(base_url: &str, user_id: UserId, token: &str) -> String {
    format!(
        "{}/reset/{}/{}/",
        base_url.trim_end_matches('/'),
        encode_uid(user_id),
        token
    )
}

fn invitation_text(full_name: &str, link: &str) -> String {
    format!(
        "Hello {full_name},\n\nYou've been registered by an admin.\n\
         Please set your password using this link: {link}\n\nThank you!"
    )
}

fn invitation_html(full_name: &str, link: &str) -> Result<String, MailError> {
    let mut env = Environment::new();
    env.add_template("invitation.html", INVITATION_TEMPLATE)?;
    let html = env
        .get_template("invitation.html")?
        .render(context! { full_name, link })?;
    Ok(html)
}

/// Invitation addressed to `user` with the set-password `link`
pub fn invitation_email(user: &User, link: &str, from: &str) -> Result<EmailMessage, MailError> {
    let full_name = user.full_name();
    let html = invitation_html(&full_name, link)?;

    Ok(EmailMessage::new(
        INVITATION_SUBJECT,
        from,
        user.email.clone(),
        invitation_text(&full_name, link),
    )
    .with_html(html))
}
