//! Email body rendering.

use crate::email::{EmailKind, User};

/// Values available to templates.
#[derive(Debug, Clone, Copy)]
pub struct EmailContext<'a> {
    pub app_name: &'a str,
    pub user: &'a User,
    /// Confirmation, reset or invitation link, when the email carries one.
    pub link: Option<&'a str>,
    /// Sender of an invitation; `user` is the person invited.
    pub invited_by: Option<&'a User>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub trait EmailRenderer: Send + Sync {
    fn render(&self, kind: EmailKind, ctx: &EmailContext<'_>) -> RenderedEmail;
}

/// Built-in plain templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRenderer;

impl EmailRenderer for DefaultRenderer {
    fn render(&self, kind: EmailKind, ctx: &EmailContext<'_>) -> RenderedEmail {
        let app = ctx.app_name;
        let greeting = match &ctx.user.username {
            Some(name) => format!("Dear {name},"),
            None => "Dear User,".to_string(),
        };
        let link = ctx.link.unwrap_or_default();

        let (subject, body) = match kind {
            EmailKind::ConfirmEmail => (
                format!("Confirm your email address for {app}"),
                format!("Please confirm your email address by visiting:\n{link}"),
            ),
            EmailKind::Registered if ctx.link.is_some() => (
                format!("Thank you for registering with {app}"),
                format!(
                    "You have registered with {app}.\nPlease confirm your email address by visiting:\n{link}"
                ),
            ),
            EmailKind::Registered => (
                format!("Thank you for registering with {app}"),
                format!("You have registered with {app}."),
            ),
            EmailKind::PasswordChanged => (
                format!("Your {app} password has been changed"),
                "Your password has been changed. If you did not make this change, reset your password right away.".to_string(),
            ),
            EmailKind::UsernameChanged => (
                format!("Your {app} username has been changed"),
                "Your username has been changed. If you did not make this change, contact us right away.".to_string(),
            ),
            EmailKind::ResetPassword => (
                format!("Reset your {app} password"),
                format!(
                    "We received a request to reset your password.\nTo reset it, visit:\n{link}\nIf you did not request this, you can ignore this email."
                ),
            ),
            EmailKind::Invitation => {
                let inviter = ctx
                    .invited_by
                    .map(|u| u.username.as_deref().unwrap_or(u.email.as_str()));
                let intro = match inviter {
                    Some(name) => format!("{name} has invited you to join {app}."),
                    None => format!("You have been invited to join {app}."),
                };
                (
                    format!("Invitation to join {app}"),
                    format!("{intro}\nTo accept, visit:\n{link}"),
                )
            }
        };

        let text = format!("{greeting}\n\n{body}\n\n-- {app}\n");
        let html = format!(
            "<p>{}</p>\n{}\n<p>-- {}</p>\n",
            escape_html(&greeting),
            body.lines()
                .map(|line| format!("<p>{}</p>", escape_html(line)))
                .collect::<Vec<_>>()
                .join("\n"),
            escape_html(app)
        );

        RenderedEmail {
            subject,
            html,
            text,
        }
    }
}

/// Subjects go into a single header line.
pub fn sanitize_subject(subject: &str) -> String {
    subject.replace(['\r', '\n'], " ")
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
