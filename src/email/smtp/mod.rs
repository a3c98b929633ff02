//! src/email/smtp/mod.rs
use super::{DeliveryError, EmailSender};
use crate::configuration::{EmailSettings, Encryption};
use crate::domain::RecipientEmail;
use anyhow::Context;
use lettre::message::{header::ContentType, Mailbox};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[cfg(test)]
mod fake_relay;

/// Delivers plain-text mail through an authenticated SMTP relay.
///
/// A transport is opened per message; nothing is pooled between requests.
#[derive(Debug)]
pub struct SmtpMailer {
    sender: Mailbox,
    settings: EmailSettings,
}

impl SmtpMailer {
    pub fn new(settings: EmailSettings) -> Result<Self, anyhow::Error> {
        let sender_address: Address = settings
            .sender_email
            .parse()
            .with_context(|| format!("Invalid sender address {}", settings.sender_email))?;
        let sender = Mailbox::new(Some(settings.sender_name.clone()), sender_address);

        Ok(Self { sender, settings })
    }

    fn transport(
        &self,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, lettre::transport::smtp::Error> {
        let settings = &self.settings;
        let builder = match settings.encryption {
            Encryption::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
            }
            Encryption::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?,
            Encryption::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
            }
        };

        let mut builder = builder
            .port(settings.smtp_port)
            .timeout(Some(settings.timeout()));
        if let Some(credentials) = settings.credentials() {
            builder = builder.credentials(credentials);
        }

        Ok(builder.build())
    }
}

impl EmailSender for SmtpMailer {
    #[tracing::instrument(
        name = "Sending email through the SMTP relay",
        skip(self, subject, body),
        fields(relay = %self.settings.smtp_host, port = self.settings.smtp_port)
    )]
    async fn send(
        &self,
        to: &RecipientEmail,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let recipient: Address = to
            .as_ref()
            .parse()
            .map_err(DeliveryError::InvalidRecipient)?;

        let message = Message::builder()
            .from(self.sender.clone())
            .to(Mailbox::new(None, recipient))
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("Failed to build the report message")?;

        self.transport()?.send(message).await.map_err(|e| {
            tracing::error!(error.cause_chain = ?e, "Mail relay refused the message");
            e
        })?;

        tracing::info!("Mail relay accepted the message");
        Ok(())
    }
}
