//! # AppError
//!
//! Centralized error handling for the WebGallery ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all wg-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found. The message is shown to the user verbatim.
    #[error("{0}")]
    NotFound(String),

    /// Validation failure (e.g., missing upload field, negative page number)
    #[error("{0}")]
    Validation(String),

    /// Infrastructure failure (e.g., DB query failed, disk full)
    #[error("{0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // `{:#}` keeps the context chain in the message
        AppError::Internal(format!("{:#}", err))
    }
}

/// A specialized Result type for WebGallery logic.
pub type Result<T> = std::result::Result<T, AppError>;
