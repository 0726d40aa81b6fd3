//! Extraction orchestrator: normalize, classify, extract, package.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, error, info};

use super::classifier::DocumentClassifier;
use super::rules::{
    AmountExtractor, CurrencyExtractor, CustomRuleExtractor, DateExtractor, EmailExtractor,
    ExtractorKind, FieldExtractor, IbanExtractor, InvoiceNumberExtractor, PhoneExtractor,
    PoNumberExtractor, SourceText,
};
use crate::error::ExtractionError;
use crate::models::config::IdpConfig;
use crate::models::document::{ExtractionResult, FieldMatch};
use crate::ocr::OcrLine;

/// Configured extraction pipeline.
///
/// Holds no per-run state and can be shared between threads.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    classifier: DocumentClassifier,
    day_first: bool,
    validate_iban: bool,
    min_field_confidence: f32,
    custom: CustomRuleExtractor,
}

impl DocumentExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            classifier: DocumentClassifier::new(),
            day_first: true,
            validate_iban: true,
            min_field_confidence: 0.0,
            custom: CustomRuleExtractor::default(),
        }
    }

    /// Build from configuration. Invalid custom patterns are skipped with a warning.
    pub fn from_config(config: &IdpConfig) -> Self {
        Self::with_config(config, CustomRuleExtractor::lenient(&config.extraction.custom_rules))
    }

    /// Build from configuration, rejecting invalid custom patterns.
    pub fn try_from_config(config: &IdpConfig) -> Result<Self, ExtractionError> {
        let custom = CustomRuleExtractor::new(&config.extraction.custom_rules)?;
        Ok(Self::with_config(config, custom))
    }

    fn with_config(config: &IdpConfig, custom: CustomRuleExtractor) -> Self {
        Self {
            classifier: DocumentClassifier::from_config(&config.classifier),
            day_first: config.extraction.day_first,
            validate_iban: true,
            min_field_confidence: config.extraction.min_field_confidence,
            custom,
        }
    }

    /// Set the document classifier.
    pub fn with_classifier(mut self, classifier: DocumentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set day-first reading of ambiguous numeric dates.
    pub fn with_day_first(mut self, day_first: bool) -> Self {
        self.day_first = day_first;
        self
    }

    /// Set IBAN checksum validation.
    pub fn with_iban_validation(mut self, validate: bool) -> Self {
        self.validate_iban = validate;
        self
    }

    /// Set minimum confidence for keeping a field.
    pub fn with_min_confidence(mut self, confidence: f32) -> Self {
        self.min_field_confidence = confidence;
        self
    }

    /// Run the full pipeline over OCR lines.
    pub fn run(&self, lines: &[OcrLine]) -> ExtractionResult {
        let start = Instant::now();
        let source = SourceText::from_lines(lines);

        if source.is_empty() {
            debug!("No text in {} OCR lines, returning empty result", lines.len());
            return ExtractionResult::empty();
        }

        let (document_type, confidence) = self.classifier.classify(source.text());
        debug!("Classified as {} ({:.3})", document_type, confidence);

        let mut fields = Vec::new();
        for kind in ExtractorKind::for_document(document_type) {
            let found = isolate(kind.name(), || self.extract_kind(*kind, &source));
            debug!("{}: {} matches", kind.name(), found.len());
            fields.extend(found);
        }
        if !self.custom.is_empty() {
            fields.extend(isolate("custom", || self.custom.extract_all(&source)));
        }

        let before = fields.len();
        fields.retain(|f| f.confidence >= self.min_field_confidence);
        if fields.len() < before {
            debug!(
                "Dropped {} fields below confidence {}",
                before - fields.len(),
                self.min_field_confidence
            );
        }

        info!(
            "Extracted {} fields from {} lines as {} in {}ms",
            fields.len(),
            lines.len(),
            document_type,
            start.elapsed().as_millis()
        );

        ExtractionResult {
            document_type,
            confidence,
            fields,
            text: source.text().to_string(),
        }
    }

    fn extract_kind(&self, kind: ExtractorKind, source: &SourceText) -> Vec<FieldMatch> {
        match kind {
            ExtractorKind::InvoiceNumber => InvoiceNumberExtractor::new().extract_all(source),
            ExtractorKind::PoNumber => PoNumberExtractor::new().extract_all(source),
            ExtractorKind::Date => DateExtractor::new()
                .with_day_first(self.day_first)
                .extract_all(source),
            ExtractorKind::Amount => AmountExtractor::new().extract_all(source),
            ExtractorKind::Currency => CurrencyExtractor::new().extract_all(source),
            ExtractorKind::Iban => IbanExtractor::new()
                .with_validation(self.validate_iban)
                .extract_all(source),
            ExtractorKind::Email => EmailExtractor::new().extract_all(source),
            ExtractorKind::Phone => PhoneExtractor::new().extract_all(source),
        }
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one extractor, turning a panic into an empty match list.
fn isolate<F>(name: &str, f: F) -> Vec<FieldMatch>
where
    F: FnOnce() -> Vec<FieldMatch>,
{
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(found) => found,
        Err(_) => {
            error!("{}", ExtractionError::ExtractorFailed(name.to_string()));
            Vec::new()
        }
    }
}

/// Run extraction with the default configuration.
pub fn run(lines: &[OcrLine]) -> ExtractionResult {
    DocumentExtractor::new().run(lines)
}
