//! Contact details: email addresses and phone numbers.

use super::patterns::{EMAIL, PHONE_INTL, PHONE_LABELED, PHONE_PLAIN};
use super::{glued_to_number, FieldExtractor, MatchSet, SourceText};
use crate::models::document::FieldMatch;

/// Email address extractor.
pub struct EmailExtractor;

impl EmailExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for EmailExtractor {
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch> {
        let mut matches = MatchSet::new();

        for m in EMAIL.find_iter(source.text()) {
            if !is_valid_email(m.as_str()) {
                continue;
            }
            let field = source.field("email", m.as_str(), m.as_str().to_lowercase(), 0.9, m.start());
            matches.push(m.start(), m.end(), field);
        }

        matches.into_sorted()
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && domain.contains('.')
        && domain
            .split('.')
            .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}

/// Phone number extractor.
pub struct PhoneExtractor;

impl PhoneExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PhoneExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for PhoneExtractor {
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch> {
        let text = source.text();
        let mut matches = MatchSet::new();

        // "Tel: ..." labeled numbers
        for caps in PHONE_LABELED.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let raw = trim_trailing_amounts(m.as_str(), glued_to_number(text, m.start(), m.end()));
            push_phone(source, &mut matches, m.start(), raw, 0.95);
        }

        // "+44 20 7946 0958"
        for m in PHONE_INTL.find_iter(text) {
            push_phone(source, &mut matches, m.start(), m.as_str(), 0.85);
        }

        // Bare digit runs
        for m in PHONE_PLAIN.find_iter(text) {
            if glued_to_number(text, m.start(), m.end()) {
                continue;
            }
            push_phone(source, &mut matches, m.start(), m.as_str(), 0.6);
        }

        matches.into_sorted()
    }
}

fn push_phone(source: &SourceText, matches: &mut MatchSet, start: usize, raw: &str, weight: f32) {
    let Some(normalized) = normalize_phone(raw) else {
        return;
    };
    let field = source.field("phone", raw, normalized, weight, start);
    matches.push(start, start + raw.len(), field);
}

/// Drop space-separated amounts the labeled pattern ran into, e.g. the
/// "12.50" in "Phone: 555-1234 12.50". A last token cut off mid-number
/// (`glued`) goes too.
fn trim_trailing_amounts(mut raw: &str, mut glued: bool) -> &str {
    while let Some((head, last)) = raw.rsplit_once(' ') {
        if !glued && !is_decimal_amount(last) {
            break;
        }
        raw = head.trim_end();
        glued = false;
    }
    raw
}

fn is_decimal_amount(token: &str) -> bool {
    match token.rsplit_once(['.', ',']) {
        Some((whole, cents)) => {
            !whole.is_empty()
                && cents.len() == 2
                && whole.chars().all(|c| c.is_ascii_digit())
                && cents.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Digits only, keeping a leading "+"; None unless 7-15 digits.
fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if !(7..=15).contains(&digits.len()) {
        return None;
    }
    if raw.trim_start().starts_with('+') {
        Some(format!("+{}", digits))
    } else {
        Some(digits)
    }
}
