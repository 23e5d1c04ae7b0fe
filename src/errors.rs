use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::{ContentType, RETRY_AFTER}, StatusCode},
    HttpResponse
};
use serde::Serialize;
use validator::ValidationErrors;

use crate::api_errors::RemoteError;
use crate::domain::validation::ValidationReport;
use crate::media::image_check::ImageError;
use crate::store::draft_store::AdmissionError;

pub const RETRY_MESSAGE: &str = "The marketplace service is unavailable right now. Please try again.";
pub const SUBMIT_RETRY_MESSAGE: &str = "Something went wrong while saving your listing. Please try again.";

#[derive(Debug)]
pub enum AppError {
    ValidationError(Vec<FieldError>),
    NotFound(String),
    Conflict(String),
    UnauthorizedAccess,
    ForbiddenAccess,
    /// Remote call failed; carries the message shown to the user.
    Upstream(String),
    TooManyRequests { message: String, retry_after: Option<u64> },
    PaymentIncomplete { listing_id: String, message: String },
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(errors) => {
                let messages = errors.iter()
                    .map(|e| format!("{}:{}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "validation error: {}", messages)
            }
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::UnauthorizedAccess => write!(f, "Unauthorized access"),
            AppError::ForbiddenAccess => write!(f, "Forbidden access"),
            AppError::Upstream(msg) => write!(f, "{}", msg),
            AppError::TooManyRequests { message, .. } => write!(f, "{}", message),
            AppError::PaymentIncomplete { message, .. } => write!(f, "Payment not started: {}", message),
            AppError::InternalError(msg) => write!(f, "Internal server error: {}", msg)
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::ValidationError(errors) => {
                serde_json::json!({
                    "error": "Validation failed",
                    "details": errors
                })
            }
            AppError::Upstream(message) => {
                serde_json::json!({
                    "error": message,
                    "retryable": true
                })
            }
            AppError::PaymentIncomplete { listing_id, message } => {
                serde_json::json!({
                    "error": "Your listing was saved but payment could not be started",
                    "details": message,
                    "listing_id": listing_id,
                    "retry_payment": format!("/api/v1/payments/retry/{}", urlencoding::encode(listing_id)),
                    "retryable": true
                })
            }
            _ => {
                serde_json::json!({"error": self.to_string()})
            }
        };
        let mut response = HttpResponse::build(self.status_code());
        response.insert_header(ContentType::json());

        if let AppError::TooManyRequests { retry_after: Some(secs), .. } = self {
            response.insert_header((RETRY_AFTER, secs.to_string()));
        }

        response.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UnauthorizedAccess => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenAccess => StatusCode::FORBIDDEN,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::PaymentIncomplete { .. } => StatusCode::BAD_GATEWAY,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        AppError::ValidationError(field_errors)
    }
}

impl From<ValidationReport> for AppError {
    fn from(report: ValidationReport) -> Self {
        let field_errors = report
            .field_errors
            .into_iter()
            .map(|(field, message)| FieldError { field, message })
            .collect();

        AppError::ValidationError(field_errors)
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        AppError::ValidationError(vec![FieldError {
            field: "images".to_string(),
            message: err.to_string(),
        }])
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::NotFound(msg) => AppError::NotFound(msg),
            RemoteError::Unauthorized(_) => AppError::UnauthorizedAccess,
            RemoteError::Forbidden(_) => AppError::ForbiddenAccess,
            other => {
                tracing::error!("Remote API call failed: {}", other);
                AppError::Upstream(RETRY_MESSAGE.to_string())
            }
        }
    }
}

impl From<AdmissionError> for AppError {
    fn from(err: AdmissionError) -> Self {
        tracing::warn!("Listing form refused: {}", err);
        AppError::TooManyRequests {
            message: err.to_string(),
            retry_after: None,
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
