/*!
 * Error types for the finlate application.
 *
 * This module contains custom error types for the different pipeline stages,
 * using the thiserror crate for ergonomic error definitions. Only
 * `PipelineError::InvalidDocument` is allowed to abort a document; every other
 * failure is recovered inside its phase.
 */

use thiserror::Error;

/// Errors that can occur when talking to a translation model backend
#[derive(Error, Debug)]
pub enum ModelError {
    /// Error when making a request fails
    #[error("Model request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing a model response fails
    #[error("Failed to parse model response: {0}")]
    ParseError(String),

    /// Error returned by the model server itself
    #[error("Model server responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the server
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The model returned a different number of outputs than inputs
    #[error("Model returned {actual} translations for {expected} inputs")]
    BatchSizeMismatch {
        /// Number of inputs sent
        expected: usize,
        /// Number of outputs received
        actual: usize,
    },

    /// The model could not be loaded or is not reachable
    #[error("Model unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while harvesting spans from a layout document
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The OCR engine failed on a page
    #[error("OCR failed on page {page}: {message}")]
    Ocr {
        /// Page number (1-based)
        page: u32,
        /// Engine error message
        message: String,
    },
}

/// Errors surfaced by the document pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The document structure is corrupt and cannot be processed
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// The routing whitelist pattern does not compile
    #[error("Invalid bypass pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the model backend
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::File(format!("invalid JSON: {}", error))
    }
}
