//! src/email/mod.rs
use crate::domain::RecipientEmail;
use std::future::Future;

mod smtp;
pub use smtp::SmtpMailer;

#[derive(thiserror::Error, Debug)]
pub enum DeliveryError {
    #[error("Recipient address was refused: {0}")]
    InvalidRecipient(#[source] lettre::address::AddressError),
    #[error("Mail relay failure: {0}")]
    Relay(#[from] lettre::transport::smtp::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Hands one message to whatever actually transmits it.
///
/// Every call is a single attempt: implementations must not retry.
pub trait EmailSender: Send + Sync + 'static {
    fn send(
        &self,
        to: &RecipientEmail,
        subject: &str,
        body: &str,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}
