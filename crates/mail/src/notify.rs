//! Notification delivery via SMTP.
//!
//! [`SmtpNotifier`] wraps the `lettre` async SMTP transport to send
//! plain-text notification emails. When delivery is not configured, or
//! an operator passed the email-suppression flag, callers use
//! [`NoopNotifier`] instead so the rest of the job pipeline is
//! unchanged.

use async_trait::async_trait;

use crate::config::EmailConfig;
use crate::error::MailError;
use crate::layout;
use crate::message::{Outgoing, Recipient, SYSADMINS_ADDRESS, SYSADMINS_NAME};

/// Delivery seam for rendered notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &Outgoing) -> Result<(), MailError>;
}

// ---------------------------------------------------------------------------
// SmtpNotifier
// ---------------------------------------------------------------------------

/// Sends notifications via SMTP.
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    /// Create a new SMTP notifier with the given configuration.
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

fn mailbox(recipient: &Recipient) -> Result<lettre::message::Mailbox, MailError> {
    Ok(lettre::message::Mailbox::new(
        Some(recipient.name.clone()),
        recipient.email.parse()?,
    ))
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: &Outgoing) -> Result<(), MailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let mut builder = Message::builder()
            .from(self.config.from_address.parse()?)
            .subject(layout::subject(&message.subject))
            .header(ContentType::TEXT_PLAIN);

        for recipient in &message.to {
            builder = builder.to(mailbox(recipient)?);
        }
        if message.copy_sysadmins {
            builder = builder.cc(mailbox(&Recipient::new(SYSADMINS_NAME, SYSADMINS_ADDRESS))?);
        }

        let email = builder
            .body(message.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port);

        if let (Some(user), Some(pass)) = (&self.config.smtp_user, &self.config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(
            to = ?message.to.iter().map(|r| r.email.as_str()).collect::<Vec<_>>(),
            subject = %message.subject,
            "Notification email sent"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// NoopNotifier
// ---------------------------------------------------------------------------

/// Logs notifications instead of sending them.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, message: &Outgoing) -> Result<(), MailError> {
        tracing::info!(
            to = ?message.to.iter().map(|r| r.email.as_str()).collect::<Vec<_>>(),
            subject = %message.subject,
            "Email delivery disabled; notification dropped"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_rejects_bad_addresses() {
        let recipient = Recipient::new("Ada", "not-an-email");
        assert!(mailbox(&recipient).is_err());
    }

    #[tokio::test]
    async fn noop_notifier_always_succeeds() {
        let message = Outgoing::new(
            vec![Recipient::new("Ada", "ada@example.test")],
            "Welcome",
            "body",
        );
        assert!(NoopNotifier.send(&message).await.is_ok());
    }
}
