//! Shared Error Types
//!
//! This module defines error types raised by the platform-agnostic logic in
//! `shared`: request validation, price arithmetic and rank planning. The
//! backend wraps them in `BackendError` and maps each variant to an HTTP
//! status.
//!
//! # Error Categories
//!
//! - `SerializationError` - JSON serialization/deserialization failures
//! - `ValidationError` - A field failed validation
//! - `UnknownIdentifier` - A submitted id is not one of the caller's siblings
//! - `DuplicateIdentifier` - The same id was submitted twice
//!
//! # Usage
//!
//! ```rust
//! use cardapio::shared::error::SharedError;
//!
//! let error = SharedError::validation("name", "Category name cannot be empty");
//! assert!(error.to_string().contains("name"));
//! ```
use thiserror::Error;

/// Errors produced by shared validation and planning logic
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// An identifier outside the caller's scope was submitted
    #[error("Identifier {id} does not belong to this list")]
    UnknownIdentifier {
        /// The offending identifier, rendered as text
        id: String,
    },

    /// An identifier appeared more than once in an ordered list
    #[error("Identifier {id} appears more than once")]
    DuplicateIdentifier {
        /// The repeated identifier, rendered as text
        id: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown_identifier(id: impl ToString) -> Self {
        Self::UnknownIdentifier { id: id.to_string() }
    }

    pub fn duplicate_identifier(id: impl ToString) -> Self {
        Self::DuplicateIdentifier { id: id.to_string() }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
