//! Outbound mail dispatch.
//!
//! Transport is pluggable: the service only knows the [`Mailer`] trait,
//! and the concrete implementation is injected at startup. Delivery is
//! fire-and-forget on a detached thread — no retry, no acknowledgment;
//! failures are logged and never surfaced to the request.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{info, warn};

/// A message ready for delivery.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("transport error: {0}")]
    Transport(String),
}

/// Pluggable mail transport.
pub trait Mailer: Send + Sync {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

/// Default transport: writes the mail to the log. Useful for
/// development and for deployments without an SMTP relay.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        info!(to = %mail.to, subject = %mail.subject, "outgoing mail:\n{}", mail.body);
        Ok(())
    }
}

/// Transport that captures sent mail instead of delivering it. Meant
/// for tests that need to read a verification or reset link back out.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Most recent mail addressed to `to`.
    pub fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.sent
            .lock()
            .map_err(|e| MailError::Transport(e.to_string()))?
            .push(mail.clone());
        Ok(())
    }
}

/// Dispatcher owned by the account service.
#[derive(Clone)]
pub struct Mailing {
    mailer: Arc<dyn Mailer>,
}

impl Mailing {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Deliver on a detached thread. Returns immediately.
    pub fn send_detached(&self, mail: OutgoingMail) {
        let mailer = Arc::clone(&self.mailer);
        std::thread::spawn(move || {
            if let Err(e) = mailer.send(&mail) {
                warn!(to = %mail.to, "mail delivery failed: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_mailer_accepts_mail() {
        let mail = OutgoingMail {
            to: "owner@example.com".into(),
            subject: "Confirm your email".into(),
            body: "hello".into(),
        };
        assert!(LogMailer.send(&mail).is_ok());
    }

    #[test]
    fn recording_mailer_captures() {
        let mailer = RecordingMailer::new();
        mailer
            .send(&OutgoingMail {
                to: "a@b.example".into(),
                subject: "first".into(),
                body: "b".into(),
            })
            .unwrap();
        mailer
            .send(&OutgoingMail {
                to: "a@b.example".into(),
                subject: "second".into(),
                body: "b".into(),
            })
            .unwrap();

        assert_eq!(mailer.sent().len(), 2);
        assert_eq!(mailer.last_to("a@b.example").unwrap().subject, "second");
        assert!(mailer.last_to("x@b.example").is_none());
    }
}
