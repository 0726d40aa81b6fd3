//! Core library for document field extraction.
//!
//! This crate provides:
//! - Text normalization for OCR output (whitespace, character confusions)
//! - Rule-based document type classification
//! - Field extraction (dates, amounts, identifiers, contacts, currency, custom rules)
//! - JSON and plain-text exports of extraction results
//! - A multi-page document processor driving external OCR and PDF collaborators

pub mod error;
pub mod extraction;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use error::{CollaboratorError, ExtractionError, IdpError, Result};
pub use extraction::{run, DocumentExtractor, ExtractorKind};
pub use models::config::IdpConfig;
pub use models::document::{DocumentType, ExtractionResult, FieldMatch};
pub use ocr::{OcrBackend, OcrLine, OcrOptions};
pub use pdf::PageRasterizer;
pub use pipeline::{DocumentProcessor, DocumentReport, PageReport};
