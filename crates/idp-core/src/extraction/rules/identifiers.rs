//! Document identifier extraction: invoice numbers, PO numbers and IBANs.

use regex::Regex;

use super::patterns::{IBAN, INVOICE_NUMBER, INVOICE_NUMBER_STANDALONE, PO_NUMBER};
use super::{FieldExtractor, MatchSet, SourceText};
use crate::models::document::FieldMatch;

/// Collect captured reference numbers (group 1) from patterns in priority order.
fn extract_references(
    source: &SourceText,
    name: &str,
    patterns: &[(&Regex, f32)],
) -> Vec<FieldMatch> {
    let text = source.text();
    let mut matches = MatchSet::new();

    for (pattern, weight) in patterns {
        for caps in pattern.captures_iter(text) {
            let Some(value) = caps.get(1) else { continue };
            let raw = value.as_str().trim_matches(['-', '/']);
            if !is_reference(raw) {
                continue;
            }
            let field = source.field(name, raw, raw.to_uppercase(), *weight, value.start());
            matches.push(value.start(), value.end(), field);
        }
    }

    matches.into_sorted()
}

/// A document reference holds a digit and has a sane length.
fn is_reference(value: &str) -> bool {
    (3..=32).contains(&value.len()) && value.chars().any(|c| c.is_ascii_digit())
}

/// Invoice number extractor.
pub struct InvoiceNumberExtractor;

impl InvoiceNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InvoiceNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for InvoiceNumberExtractor {
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch> {
        extract_references(
            source,
            "invoice_number",
            &[(&INVOICE_NUMBER, 0.9), (&INVOICE_NUMBER_STANDALONE, 0.7)],
        )
    }
}

/// Purchase order number extractor.
pub struct PoNumberExtractor;

impl PoNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PoNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PoNumberExtractor {
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch> {
        extract_references(source, "po_number", &[(&PO_NUMBER, 0.9)])
    }
}

/// IBAN field extractor.
pub struct IbanExtractor {
    validate: bool,
}

impl IbanExtractor {
    /// Create a new IBAN extractor.
    pub fn new() -> Self {
        Self { validate: true }
    }

    /// Set whether to validate IBAN checksums.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// The accepted part of a candidate. A spaced short tail that breaks the
    /// checksum is another token on the line, so retry without it.
    fn accept<'a>(&self, candidate: &'a str) -> Option<&'a str> {
        if self.is_acceptable(candidate) {
            return Some(candidate);
        }
        match candidate.rsplit_once(' ') {
            Some((head, tail)) if tail.len() <= 3 && self.is_acceptable(head) => Some(head),
            _ => None,
        }
    }

    fn is_acceptable(&self, candidate: &str) -> bool {
        let compact = compact_iban(candidate);
        (15..=34).contains(&compact.len()) && (!self.validate || validate_iban(&compact))
    }
}

impl Default for IbanExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for IbanExtractor {
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch> {
        let text = source.text();
        let mut matches = MatchSet::new();

        for caps in IBAN.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let Some(raw) = self.accept(m.as_str()) else {
                continue;
            };

            let compact = compact_iban(raw);
            let field = source.field("iban", raw, compact, 0.9, m.start());
            matches.push(m.start(), m.start() + raw.len(), field);
        }

        matches.into_sorted()
    }
}

fn compact_iban(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Validate an IBAN using the checksum algorithm.
///
/// Algorithm:
/// 1. Move first 4 characters to the end
/// 2. Replace letters with numbers (A=10, B=11, ..., Z=35)
/// 3. The resulting number mod 97 should equal 1
pub fn validate_iban(iban: &str) -> bool {
    let iban: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if iban.len() < 5 || !iban.is_ascii() {
        return false;
    }

    let (country_code, check_digits) = (&iban[..2], &iban[2..4]);
    if !country_code.chars().all(|c| c.is_ascii_alphabetic())
        || !check_digits.chars().all(|c| c.is_ascii_digit())
    {
        return false;
    }

    // Fold digit by digit; the full number does not fit in a u64.
    let mut remainder: u32 = 0;
    for c in iban[4..].chars().chain(iban[..4].chars()) {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }

    remainder == 1
}
