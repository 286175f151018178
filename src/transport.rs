//! Outbound mail delivery.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;

/// A fully rendered message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &Message) -> Result<()>;
}

/// Writes a line per message to the log instead of delivering it.
/// Bodies are left out since they carry live tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn send(&self, message: &Message) -> Result<()> {
        log::info!(
            "Sending email '{}' from {} to {}",
            message.subject,
            message.from,
            message.to
        );
        Ok(())
    }
}

/// Keeps every message in memory.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    sent: Mutex<Vec<Message>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.sent.lock().await.clone()
    }

    pub async fn take(&self) -> Vec<Message> {
        std::mem::take(&mut *self.sent.lock().await)
    }
}

#[async_trait]
impl MailTransport for MemoryTransport {
    async fn send(&self, message: &Message) -> Result<()> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}
