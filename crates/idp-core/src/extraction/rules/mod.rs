//! Rule-based field extractors.

pub mod amounts;
pub mod contact;
pub mod currency;
pub mod custom;
pub mod dates;
pub mod identifiers;
pub mod patterns;

pub use amounts::{parse_amount, AmountExtractor};
pub use contact::{EmailExtractor, PhoneExtractor};
pub use currency::CurrencyExtractor;
pub use custom::CustomRuleExtractor;
pub use dates::DateExtractor;
pub use identifiers::{validate_iban, IbanExtractor, InvoiceNumberExtractor, PoNumberExtractor};

use serde::{Deserialize, Serialize};

use crate::models::document::{DocumentType, FieldMatch};
use crate::ocr::OcrLine;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// Extract all occurrences of the field, ordered by position.
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch>;

    /// Extract the first occurrence of the field.
    fn extract(&self, source: &SourceText) -> Option<FieldMatch> {
        self.extract_all(source).into_iter().next()
    }
}

/// Identifier of a built-in extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    InvoiceNumber,
    PoNumber,
    Date,
    Amount,
    Currency,
    Iban,
    Email,
    Phone,
}

impl ExtractorKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::InvoiceNumber => "invoice_number",
            Self::PoNumber => "po_number",
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Currency => "currency",
            Self::Iban => "iban",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    /// Extractors applicable to a document type, in run order.
    pub fn for_document(doc_type: DocumentType) -> &'static [ExtractorKind] {
        use ExtractorKind::*;

        match doc_type {
            DocumentType::Invoice => &[InvoiceNumber, Date, Amount, Currency, Iban, Email, Phone],
            DocumentType::Receipt => &[Date, Amount, Currency, Email, Phone],
            DocumentType::PurchaseOrder => &[PoNumber, Date, Amount, Currency, Email, Phone],
            DocumentType::Contract | DocumentType::Unknown => &[Date, Email, Phone],
        }
    }
}

/// Byte range of one OCR line inside the joined text.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LineSpan {
    start: usize,
    end: usize,
    line: usize,
    confidence: f32,
}

/// Normalized document text with a map back to its OCR lines.
#[derive(Debug, Clone, Default)]
pub struct SourceText {
    text: String,
    spans: Vec<LineSpan>,
}

impl SourceText {
    /// Normalize each line and join the non-empty ones with newlines.
    pub fn from_lines(lines: &[OcrLine]) -> Self {
        let mut text = String::new();
        let mut spans = Vec::with_capacity(lines.len());

        for (index, line) in lines.iter().enumerate() {
            let normalized = super::normalize::normalize(&line.text);
            if normalized.is_empty() {
                continue;
            }
            if !text.is_empty() {
                text.push('\n');
            }
            let start = text.len();
            text.push_str(&normalized);
            spans.push(LineSpan {
                start,
                end: text.len(),
                line: index,
                confidence: line.clamped_confidence(),
            });
        }

        Self { text, spans }
    }

    /// Build from plain text, one line per row, full confidence.
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<OcrLine> = text.lines().map(|l| OcrLine::new(l, 1.0)).collect();
        Self::from_lines(&lines)
    }

    /// The joined normalized text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn span_at(&self, offset: usize) -> Option<&LineSpan> {
        let idx = self.spans.partition_point(|s| s.start <= offset);
        self.spans.get(idx.saturating_sub(1))
    }

    /// Index of the source OCR line containing a byte offset.
    pub fn line_at(&self, offset: usize) -> usize {
        self.span_at(offset).map(|s| s.line).unwrap_or(0)
    }

    /// Confidence of the OCR line containing a byte offset.
    pub fn confidence_at(&self, offset: usize) -> f32 {
        self.span_at(offset).map(|s| s.confidence).unwrap_or(0.0)
    }

    /// Text between the start of the containing line and `offset`.
    pub fn line_prefix(&self, offset: usize) -> &str {
        match self.span_at(offset) {
            Some(span) if offset <= span.end => &self.text[span.start..offset],
            _ => "",
        }
    }

    /// Build a match starting at `start`, scoring it against its line.
    pub fn field(
        &self,
        name: impl Into<String>,
        raw: impl Into<String>,
        normalized: impl Into<String>,
        weight: f32,
        start: usize,
    ) -> FieldMatch {
        FieldMatch {
            name: name.into(),
            raw: raw.into(),
            normalized: normalized.into(),
            confidence: ((self.confidence_at(start) + weight) / 2.0).clamp(0.0, 1.0),
            line: self.line_at(start),
        }
    }
}

/// Non-overlapping matches of one extractor.
///
/// Candidates are offered in pattern priority order; one that overlaps an
/// already accepted match is dropped.
#[derive(Debug, Default)]
pub(crate) struct MatchSet {
    accepted: Vec<(usize, usize, FieldMatch)>,
}

impl MatchSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn overlaps(&self, start: usize, end: usize) -> bool {
        self.accepted.iter().any(|(s, e, _)| start < *e && *s < end)
    }

    pub(crate) fn push(&mut self, start: usize, end: usize, field: FieldMatch) -> bool {
        if self.overlaps(start, end) {
            return false;
        }
        self.accepted.push((start, end, field));
        true
    }

    pub(crate) fn into_sorted(mut self) -> Vec<FieldMatch> {
        self.accepted.sort_by_key(|(start, _, _)| *start);
        self.accepted.into_iter().map(|(_, _, f)| f).collect()
    }
}

/// True when the range is glued to a longer number (a date or decimal
/// continuing past the match, e.g. "15.01" in "15.01.2024").
pub(crate) fn glued_to_number(text: &str, start: usize, end: usize) -> bool {
    let mut after = text[end..].chars();
    let glued_after = match (after.next(), after.next()) {
        (Some('%'), _) => true,
        (Some(c), Some(d)) if matches!(c, '.' | ',' | '/' | '-') => d.is_ascii_digit(),
        _ => false,
    };

    let mut before = text[..start].chars().rev();
    let glued_before = match (before.next(), before.next()) {
        (Some(c), _) if c.is_ascii_digit() => true,
        (Some(c), Some(d)) if matches!(c, '.' | ',' | '/' | '-') => d.is_ascii_digit(),
        _ => false,
    };

    glued_after || glued_before
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_source_text_skips_blank_lines() {
        let lines = vec![
            OcrLine::new("  INVOICE  ", 0.9),
            OcrLine::new("   ", 0.1),
            OcrLine::new("Total:  $5.00", 0.8),
        ];
        let source = SourceText::from_lines(&lines);

        assert_eq!(source.text(), "INVOICE\nTotal: $5.00");
        assert_eq!(source.line_at(0), 0);
        assert_eq!(source.line_at(8), 2);
        assert_eq!(source.line_at(source.text().len() - 1), 2);
        assert_eq!(source.confidence_at(10), 0.8);
    }

    #[test]
    fn test_line_prefix() {
        let source = SourceText::from_text("Invoice\nDue date: 2024-02-01");
        let offset = source.text().find("2024").unwrap();
        assert_eq!(source.line_prefix(offset), "Due date: ");
        assert_eq!(source.line_prefix(0), "");
    }

    #[test]
    fn test_field_confidence_averages_line_and_weight() {
        let lines = vec![OcrLine::new("a@b.co", 0.5)];
        let source = SourceText::from_lines(&lines);
        let field = source.field("email", "a@b.co", "a@b.co", 0.9, 0);
        assert!((field.confidence - 0.7).abs() < 1e-6);
        assert_eq!(field.line, 0);
    }

    #[test]
    fn test_match_set_drops_overlaps() {
        let source = SourceText::from_text("x");
        let mut set = MatchSet::new();
        assert!(set.push(5, 10, source.field("a", "", "", 1.0, 0)));
        assert!(!set.push(8, 12, source.field("b", "", "", 1.0, 0)));
        assert!(set.push(0, 5, source.field("c", "", "", 1.0, 0)));
        let names: Vec<String> = set.into_sorted().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_glued_to_number() {
        let text = "15.01.2024 and 12.50 and 23%";
        assert!(glued_to_number(text, 0, 5));
        assert!(!glued_to_number(text, 15, 20));
        assert!(glued_to_number(text, 25, 27));
    }

    #[test]
    fn test_extractor_mapping() {
        assert_eq!(
            ExtractorKind::for_document(DocumentType::Unknown),
            &[ExtractorKind::Date, ExtractorKind::Email, ExtractorKind::Phone]
        );
        assert_eq!(
            ExtractorKind::for_document(DocumentType::Invoice)[0],
            ExtractorKind::InvoiceNumber
        );
        assert!(ExtractorKind::for_document(DocumentType::PurchaseOrder)
            .contains(&ExtractorKind::PoNumber));
    }
}
