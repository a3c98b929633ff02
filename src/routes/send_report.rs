//! src/routes/send_report.rs
use crate::domain::{RecipientEmail, ValidationError};
use crate::email::{DeliveryError, EmailSender};
use crate::report::{ReportError, ReportSource};
use crate::routes::error_chain_fmt;
use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use uuid::Uuid;

#[derive(serde::Deserialize, Debug)]
pub struct SendRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
pub struct SendResult {
    pub success: bool,
    pub message: String,
    /// Failure text under the name the report page reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendResult {
    fn sent(recipient: &RecipientEmail) -> Self {
        Self {
            success: true,
            message: format!("Report sent successfully to {}", recipient),
            error: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            error: Some(message.clone()),
            message,
        }
    }
}

#[derive(thiserror::Error)]
pub enum SendReportError {
    #[error("Invalid request body: {0}")]
    InvalidPayload(#[source] JsonPayloadError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("Failed to send report: {0}")]
    Delivery(#[from] DeliveryError),
}

impl std::fmt::Debug for SendReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

// Every failure goes back to the caller as a `SendResult` body.
impl ResponseError for SendReportError {
    fn status_code(&self) -> StatusCode {
        match self {
            SendReportError::InvalidPayload(_) | SendReportError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            SendReportError::Report(ReportError::NotFound(_)) => StatusCode::NOT_FOUND,
            SendReportError::Report(_) | SendReportError::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(SendResult::failed(self.to_string()))
    }
}

/// Replaces actix's plain-text rejection of unreadable JSON bodies.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejecting request body: {}", err);
    SendReportError::InvalidPayload(err).into()
}

#[tracing::instrument(
    name = "Sending the report",
    skip_all,
    fields(request_id = %Uuid::new_v4(), recipient = tracing::field::Empty)
)]
pub async fn send_report<S: EmailSender>(
    payload: web::Json<SendRequest>,
    report_source: web::Data<ReportSource>,
    email_sender: web::Data<S>,
) -> Result<HttpResponse, SendReportError> {
    let recipient = RecipientEmail::try_from(payload.into_inner())?;
    tracing::Span::current().record("recipient", tracing::field::display(&recipient));

    let report = report_source.load().await?;

    email_sender
        .send(&recipient, &report.subject, &report.body)
        .await?;

    Ok(HttpResponse::Ok().json(SendResult::sent(&recipient)))
}

pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent().finish()
}
