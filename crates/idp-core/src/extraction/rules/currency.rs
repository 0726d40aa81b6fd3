//! Currency detection.

use super::patterns::CURRENCY;
use super::{FieldExtractor, MatchSet, SourceText};
use crate::models::document::FieldMatch;

/// Currency code and symbol extractor.
pub struct CurrencyExtractor;

impl CurrencyExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CurrencyExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CurrencyExtractor {
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch> {
        let mut matches = MatchSet::new();

        for caps in CURRENCY.captures_iter(source.text()) {
            let Some(m) = caps.get(0) else { continue };
            let code = match (caps.get(1), caps.get(2)) {
                (Some(code), _) => code.as_str().to_uppercase(),
                (None, Some(symbol)) => match symbol_to_code(symbol.as_str()) {
                    Some(code) => code.to_string(),
                    None => continue,
                },
                (None, None) => continue,
            };
            let field = source.field("currency", m.as_str(), code, 0.8, m.start());
            matches.push(m.start(), m.end(), field);
        }

        matches.into_sorted()
    }
}

fn symbol_to_code(symbol: &str) -> Option<&'static str> {
    match symbol {
        "$" => Some("USD"),
        "€" => Some("EUR"),
        "£" => Some("GBP"),
        "₹" => Some("INR"),
        _ => None,
    }
}
