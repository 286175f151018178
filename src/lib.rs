//! Account emails with signed, expiring links.
//!
//! Token issuing and checking lives in the `url-token` crate; this crate
//! adds configuration loading and the email side: rendering, delivery and
//! the switches deciding which emails are sent.

pub mod configuration;
pub mod email;
pub mod error;
pub mod render;
pub mod transport;

pub use error::{Error, Result};
