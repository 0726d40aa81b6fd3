//! Error types for the idp-core library.
//!
//! The extraction core itself never fails: bad input degrades to an empty
//! result and rejected candidates are dropped. These errors cover the edges
//! around it (configuration, custom rules, and the external collaborators).

use thiserror::Error;

/// Main error type for the idp library.
#[derive(Error, Debug)]
pub enum IdpError {
    /// Field extraction setup error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// OCR or PDF collaborator error.
    #[error("collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while preparing or running field extractors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A custom rule pattern failed to compile.
    #[error("invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },

    /// An extractor panicked and was isolated.
    #[error("extractor {0} failed")]
    ExtractorFailed(String),
}

/// Errors reported by the external OCR and PDF collaborators.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    /// Text recognition failed.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// Page rasterization failed.
    #[error("failed to render page {page}: {reason}")]
    Render { page: u32, reason: String },

    /// The PDF could not be opened.
    #[error("failed to open PDF: {0}")]
    Open(String),

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Result type for the idp library.
pub type Result<T> = std::result::Result<T, IdpError>;
