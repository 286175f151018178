//! Account emails carrying signed links.
//!
//! `EmailManager` ties together three independent parts:
//! - a `TokenManager` that issues and checks the link tokens
//! - an `EmailRenderer` that turns a kind of email into subject and bodies
//! - a `MailTransport` that delivers the result
//!
//! Which emails go out is decided by `EmailSettings` alone.

use std::fmt;
use std::sync::Arc;

use url_token::{Clock, SystemClock, TokenManager, VerifyOutcome};

use crate::configuration::{EmailSettings, LinkSettings, TokenPurpose};
use crate::error::{Error, Result};
use crate::render::{EmailContext, EmailRenderer, sanitize_subject};
use crate::transport::{MailTransport, Message};

/// Account owning the email address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub username: Option<String>,
}

/// Secondary email address record, for accounts with more than one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEmail {
    pub id: u64,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailKind {
    ConfirmEmail,
    Registered,
    PasswordChanged,
    UsernameChanged,
    ResetPassword,
    Invitation,
}

impl fmt::Display for EmailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EmailKind::ConfirmEmail => "confirm-email",
            EmailKind::Registered => "registered",
            EmailKind::PasswordChanged => "password-changed",
            EmailKind::UsernameChanged => "username-changed",
            EmailKind::ResetPassword => "reset-password",
            EmailKind::Invitation => "invitation",
        })
    }
}

/// Whether a send call produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Turned off by settings.
    Skipped,
}

pub struct EmailManager<C = SystemClock> {
    tokens: Arc<TokenManager<C>>,
    renderer: Arc<dyn EmailRenderer>,
    transport: Arc<dyn MailTransport>,
    settings: EmailSettings,
    links: LinkSettings,
}

impl<C: Clock> EmailManager<C> {
    pub fn new(
        tokens: Arc<TokenManager<C>>,
        renderer: Arc<dyn EmailRenderer>,
        transport: Arc<dyn MailTransport>,
        settings: EmailSettings,
        links: LinkSettings,
    ) -> Self {
        Self {
            tokens,
            renderer,
            transport,
            settings,
            links,
        }
    }

    /// Send a confirmation link for `user_email`, or for the user's own
    /// address when there is no separate record.
    pub async fn send_confirm_email(
        &self,
        user: &User,
        user_email: Option<&UserEmail>,
    ) -> Result<Delivery> {
        let s = &self.settings;
        if !s.enable_email || !(s.send_registered_email || s.enable_confirm_email) {
            return Ok(Delivery::Skipped);
        }

        let object_id = user_email.map_or(user.id, |e| e.id);
        let link = self.link_for(TokenPurpose::ConfirmEmail, object_id)?;
        let to = user_email.map_or(user.email.as_str(), |e| e.email.as_str());

        self.deliver(EmailKind::ConfirmEmail, user, to, Some(link.as_str()))
            .await
    }

    /// Send the "registered" notice, with a confirmation link if one was issued.
    pub async fn send_registered_email(
        &self,
        user: &User,
        user_email: Option<&UserEmail>,
        confirm_email_link: Option<&str>,
    ) -> Result<Delivery> {
        if !self.settings.enable_email || !self.settings.send_registered_email {
            return Ok(Delivery::Skipped);
        }

        let to = user_email.map_or(user.email.as_str(), |e| e.email.as_str());
        self.deliver(EmailKind::Registered, user, to, confirm_email_link)
            .await
    }

    pub async fn send_password_changed_email(&self, user: &User) -> Result<Delivery> {
        if !self.settings.enable_email || !self.settings.send_password_changed_email {
            return Ok(Delivery::Skipped);
        }
        self.deliver(EmailKind::PasswordChanged, user, &user.email, None)
            .await
    }

    pub async fn send_username_changed_email(&self, user: &User) -> Result<Delivery> {
        if !self.settings.enable_email || !self.settings.send_username_changed_email {
            return Ok(Delivery::Skipped);
        }
        self.deliver(EmailKind::UsernameChanged, user, &user.email, None)
            .await
    }

    /// Send a reset-password link. Fails if forgot-password is turned off,
    /// since callers should not offer the flow at all in that case.
    pub async fn send_reset_password_email(
        &self,
        user: &User,
        user_email: Option<&UserEmail>,
    ) -> Result<Delivery> {
        if !self.settings.enable_email {
            return Ok(Delivery::Skipped);
        }
        if !self.settings.enable_forgot_password {
            return Err(Error::Disabled(EmailKind::ResetPassword));
        }

        let link = self.link_for(TokenPurpose::ResetPassword, user.id)?;
        let to = user_email.map_or(user.email.as_str(), |e| e.email.as_str());

        self.deliver(EmailKind::ResetPassword, user, to, Some(link.as_str()))
            .await
    }

    /// Invite `invitee` to register. The token carries `invitation_id`.
    pub async fn send_invitation_email(
        &self,
        invited_by: &User,
        invitee: &User,
        invitation_id: u64,
    ) -> Result<Delivery> {
        if !self.settings.enable_email {
            return Ok(Delivery::Skipped);
        }
        if !self.settings.enable_invitations {
            return Err(Error::Disabled(EmailKind::Invitation));
        }

        let link = self.link_for(TokenPurpose::Invitation, invitation_id)?;
        let ctx = EmailContext {
            invited_by: Some(invited_by),
            ..self.context(invitee, Some(link.as_str()))
        };
        self.deliver_with(EmailKind::Invitation, &ctx, &invitee.email)
            .await
    }

    /// Check a token taken from one of our links, using the expiration
    /// configured for `purpose`.
    pub fn verify_link_token(&self, purpose: TokenPurpose, token: &str) -> VerifyOutcome {
        self.tokens
            .verify_token(token, self.settings.max_age(purpose))
    }

    fn link_for(&self, purpose: TokenPurpose, object_id: u64) -> Result<String> {
        let token = self.tokens.generate_token(object_id)?;
        Ok(self.links.link(purpose, &token))
    }

    fn context<'a>(&'a self, user: &'a User, link: Option<&'a str>) -> EmailContext<'a> {
        EmailContext {
            app_name: &self.settings.app_name,
            user,
            link,
            invited_by: None,
        }
    }

    async fn deliver(
        &self,
        kind: EmailKind,
        user: &User,
        to: &str,
        link: Option<&str>,
    ) -> Result<Delivery> {
        let ctx = self.context(user, link);
        self.deliver_with(kind, &ctx, to).await
    }

    async fn deliver_with(
        &self,
        kind: EmailKind,
        ctx: &EmailContext<'_>,
        to: &str,
    ) -> Result<Delivery> {
        let from = self.settings.sender_address()?;
        if to.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "user {} has no email address for {kind} email",
                ctx.user.id
            )));
        }

        let rendered = self.renderer.render(kind, ctx);

        let message = Message {
            from,
            to: to.to_string(),
            subject: sanitize_subject(&rendered.subject),
            html: rendered.html,
            text: rendered.text,
        };
        self.transport.send(&message).await?;

        log::debug!("Sent {} email for user {}", kind, ctx.user.id);
        Ok(Delivery::Sent)
    }
}
