//! Field extraction over OCR lines.
//!
//! Lines are normalized and joined, the document type is classified, and the
//! extractors mapped to that type run over the joined text.

pub mod classifier;
pub mod export;
pub mod normalize;
mod orchestrator;
pub mod rules;

pub use classifier::{classify, DocumentClassifier};
pub use normalize::{normalize, NormalizedText};
pub use orchestrator::{run, DocumentExtractor};
pub use rules::{ExtractorKind, FieldExtractor, SourceText};
