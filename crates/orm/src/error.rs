//! Error types for the ORM system
//!
//! Every failure surfaces to the immediate caller unchanged; nothing in the
//! mapper retries or recovers. Driver failures arrive as `Database`,
//! `Connection` or `Transaction` and are forwarded as-is.

use mox_validation::ValidationErrors;
use thiserror::Error;

use crate::hook_error::HookError;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

/// Error types for ORM operations
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// No document matched an identifier-based operation
    #[error("Document not found in collection '{0}'")]
    NotFound(String),

    /// The model lacks a usable identifier where one is required
    #[error("Model in collection '{0}' has no valid ID")]
    NoIdentifier(String),

    /// The model does not opt into the capability an operation needs
    #[error("Document in collection '{collection}' does not support {operation}")]
    MissingCapability {
        collection: String,
        operation: &'static str,
    },

    /// Model or field validation failed
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// A lifecycle hook rejected the operation
    #[error("Hook error: {0}")]
    Hook(HookError),

    /// Driver-level read or write failure
    #[error("Database error: {0}")]
    Database(String),

    /// Connection establishment or transport failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Session or transaction failure
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Encoding or decoding a document failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Malformed filter, update or pipeline
    #[error("Query error: {0}")]
    Query(String),

    /// Relationship loading failed
    #[error("Relationship error: {0}")]
    Relationship(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ModelError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound(_))
    }

    pub fn is_no_identifier(&self) -> bool {
        matches!(self, ModelError::NoIdentifier(_))
    }

    pub fn is_missing_capability(&self) -> bool {
        matches!(self, ModelError::MissingCapability { .. })
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

impl From<ValidationErrors> for ModelError {
    fn from(err: ValidationErrors) -> Self {
        ModelError::Validation(err)
    }
}

impl From<HookError> for ModelError {
    fn from(err: HookError) -> Self {
        ModelError::Hook(err)
    }
}
