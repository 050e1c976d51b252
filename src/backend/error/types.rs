/**
 * Backend Error Types
 *
 * This module defines the error type returned by every HTTP handler.
 *
 * # Error Categories
 *
 * - Validation errors: rejected with a user-facing message, no retry
 * - Not-found conditions: missing or foreign item/category/user
 * - Authorization: missing token (401), unpaid access (402), wrong owner or
 *   non-admin (403)
 * - External-service errors: billing or email provider failures, surfaced to
 *   the caller as a generic 502 and logged with detail server-side
 * - Storage errors: 500
 */

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::billing::BillingError;
use crate::backend::mail::MailError;
use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// Each variant maps to one HTTP status, see [`BackendError::status_code`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error with an explicit status code
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Requested resource does not exist for this user
    #[error("{resource} not found")]
    NotFound {
        /// Name of the missing resource
        resource: String,
    },

    /// Caller has no valid session
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Caller is authenticated but lacks paid access
    #[error("Payment required: {message}")]
    PaymentRequired { message: String },

    /// Caller is authenticated but not allowed to touch the resource
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// Unique constraint or state conflict
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Billing or email provider failure
    #[error("External service error ({service}): {detail}")]
    External {
        /// Which provider failed
        service: &'static str,
        /// Detailed cause, logged but not returned to the client
        detail: String,
    },

    /// Storage failure
    #[error("Storage error: {0}")]
    Store(StoreError),

    /// Shared error (validation, ordering)
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SharedError(SharedError::validation(field, message))
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn payment_required(message: impl Into<String>) -> Self {
        Self::PaymentRequired {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn external(service: &'static str, detail: impl Into<String>) -> Self {
        Self::External {
            service,
            detail: detail.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::PaymentRequired { .. } => StatusCode::PAYMENT_REQUIRED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::External { .. } => StatusCode::BAD_GATEWAY,
            Self::Store(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Database(_) | StoreError::Migration(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::DuplicateIdentifier { .. } => StatusCode::BAD_REQUEST,
                SharedError::UnknownIdentifier { .. } => StatusCode::FORBIDDEN,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the client.
    ///
    /// External and storage failures return a generic message; the detail
    /// only goes to the log.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::NotFound { resource } => format!("{} not found", resource),
            Self::Unauthorized { message }
            | Self::PaymentRequired { message }
            | Self::Forbidden { message }
            | Self::Conflict { message } => message.clone(),
            Self::External { service, .. } => {
                format!("The {} service is unavailable, please try again", service)
            }
            Self::Store(StoreError::NotFound(resource)) => format!("{} not found", resource),
            Self::Store(StoreError::Conflict(message)) => message.clone(),
            Self::Store(_) => "Internal storage error".to_string(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(_) => "Internal serialization error".to_string(),
        }
    }
}

impl From<StoreError> for BackendError {
    fn from(err: StoreError) -> Self {
        if matches!(err, StoreError::Database(_) | StoreError::Migration(_)) {
            tracing::error!("Storage failure: {}", err);
        }
        Self::Store(err)
    }
}

impl From<BillingError> for BackendError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Signature(message) => {
                tracing::warn!("Rejected webhook: {}", message);
                Self::handler(StatusCode::BAD_REQUEST, message)
            }
            BillingError::NotConfigured(what) => {
                tracing::error!("Billing not configured: {}", what);
                Self::service_unavailable("Billing is not configured")
            }
            BillingError::Payload(message) => {
                tracing::warn!("Malformed billing payload: {}", message);
                Self::handler(StatusCode::BAD_REQUEST, message)
            }
            BillingError::Store(err) => err.into(),
            other => {
                tracing::error!("Billing provider failure: {}", other);
                Self::external("billing", other.to_string())
            }
        }
    }
}

impl From<MailError> for BackendError {
    fn from(err: MailError) -> Self {
        tracing::error!("Email failure: {}", err);
        Self::external("email", err.to_string())
    }
}
