//! Data models for the extraction pipeline.

pub mod config;
pub mod document;

pub use config::IdpConfig;
pub use document::{DocumentType, ExtractionResult, FieldMatch};
