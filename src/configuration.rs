use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use url_token::{TokenConfig, TokenManager};

use crate::error::{Error, Result};

/// Top-level configuration file.
#[derive(Deserialize)]
pub struct AppConfig {
    pub secret_key: String,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub links: LinkSettings,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("secret_key", &"<redacted>")
            .field("token", &self.token)
            .field("email", &self.email)
            .field("links", &self.links)
            .finish()
    }
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks what every command needs. Sender identity is only required
    /// once mail is actually sent; see [`EmailSettings::validate`].
    pub fn validate(&self) -> Result<()> {
        if self.secret_key.is_empty() {
            return Err(Error::InvalidConfig("secret_key must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn token_manager(&self) -> Result<TokenManager> {
        Ok(TokenManager::new(&self.secret_key, &self.token)?)
    }
}

/// Switches and identity for outgoing account emails.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    /// Master switch. When off, no email of any kind is sent.
    pub enable_email: bool,
    /// Send confirmation links after registration or email changes.
    pub enable_confirm_email: bool,
    /// Send the "you have registered" notice.
    pub send_registered_email: bool,
    /// Notify the user after a password change.
    pub send_password_changed_email: bool,
    /// Notify the user after a username change.
    pub send_username_changed_email: bool,
    /// Allow reset-password emails.
    pub enable_forgot_password: bool,
    /// Allow invitation emails.
    pub enable_invitations: bool,
    pub sender_name: Option<String>,
    pub sender_email: Option<String>,
    pub app_name: String,
    /// Seconds a confirmation link stays valid.
    pub confirm_email_expiration: u64,
    /// Seconds a reset-password link stays valid.
    pub reset_password_expiration: u64,
    /// Seconds an invitation link stays valid.
    pub invite_expiration: u64,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enable_email: true,
            enable_confirm_email: true,
            send_registered_email: true,
            send_password_changed_email: true,
            send_username_changed_email: true,
            enable_forgot_password: true,
            enable_invitations: false,
            sender_name: None,
            sender_email: None,
            app_name: "Account Links".to_string(),
            confirm_email_expiration: 2 * 24 * 3600,
            reset_password_expiration: 2 * 24 * 3600,
            invite_expiration: 90 * 24 * 3600,
        }
    }
}

impl EmailSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.enable_email {
            return Ok(());
        }
        self.sender_address().map(|_| ())
    }

    /// Sender formatted for a `From` header.
    pub fn sender_address(&self) -> Result<String> {
        let email = self.sender_email.as_deref().ok_or_else(|| {
            Error::InvalidConfig("email.sender_email is missing".to_string())
        })?;
        if !email.contains('@') {
            return Err(Error::InvalidConfig(format!(
                "email.sender_email '{email}' is not a valid email address"
            )));
        }
        Ok(match &self.sender_name {
            Some(name) => format!("{name} <{email}>"),
            None => email.to_string(),
        })
    }

    pub fn max_age(&self, purpose: TokenPurpose) -> Duration {
        Duration::from_secs(match purpose {
            TokenPurpose::ConfirmEmail => self.confirm_email_expiration,
            TokenPurpose::ResetPassword => self.reset_password_expiration,
            TokenPurpose::Invitation => self.invite_expiration,
        })
    }
}

/// What a token in a link is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPurpose {
    ConfirmEmail,
    ResetPassword,
    Invitation,
}

/// Where emailed links point.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkSettings {
    pub base_url: String,
    pub confirm_email_path: String,
    pub reset_password_path: String,
    pub register_path: String,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            confirm_email_path: "/user/confirm-email".to_string(),
            reset_password_path: "/user/reset-password".to_string(),
            register_path: "/user/register".to_string(),
        }
    }
}

impl LinkSettings {
    /// Build the absolute URL carrying `token` for `purpose`.
    ///
    /// Confirmation and reset links take the token as the last path
    /// segment; invitations pass it to the registration page as a query.
    pub fn link(&self, purpose: TokenPurpose, token: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        match purpose {
            TokenPurpose::ConfirmEmail => format!("{base}{}/{token}", self.confirm_email_path),
            TokenPurpose::ResetPassword => format!("{base}{}/{token}", self.reset_password_path),
            TokenPurpose::Invitation => format!("{base}{}?token={token}", self.register_path),
        }
    }
}
