//! src/domain/recipient_email.rs
use crate::routes::SendRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use validator::validate_email;

static ADDRESS_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("Address pattern is a valid regex")
});

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Email address is required")]
    Missing,
    #[error("Invalid email format: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct RecipientEmail(String);

impl RecipientEmail {
    pub fn parse(s: String) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Missing);
        }

        if ADDRESS_SHAPE.is_match(s) && validate_email(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(ValidationError::Invalid(s.to_string()))
        }
    }
}

impl TryFrom<SendRequest> for RecipientEmail {
    type Error = ValidationError;

    fn try_from(request: SendRequest) -> Result<Self, Self::Error> {
        let email = request.email.ok_or(ValidationError::Missing)?;
        Self::parse(email)
    }
}

impl AsRef<str> for RecipientEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecipientEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
