use std::path::PathBuf;

use thiserror::Error;
use url_token::TokenError;

use crate::email::EmailKind;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("{0} emails are disabled")]
    Disabled(EmailKind),

    #[error("mail transport failed: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, Error>;
