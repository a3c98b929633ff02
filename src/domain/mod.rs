//! src/domain/mod.rs
mod recipient_email;
pub use recipient_email::{RecipientEmail, ValidationError};
