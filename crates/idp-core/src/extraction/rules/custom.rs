//! User-configured regex rules.

use std::collections::BTreeMap;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use super::{FieldExtractor, SourceText};
use crate::error::ExtractionError;
use crate::models::document::FieldMatch;

const WEIGHT_CUSTOM: f32 = 0.75;

/// Extractor for user-defined fields.
///
/// Patterns are case-insensitive. The value of a match is its last
/// participating capture group, or the whole match when there is none.
#[derive(Debug, Clone, Default)]
pub struct CustomRuleExtractor {
    rules: Vec<(String, Vec<Regex>)>,
}

impl CustomRuleExtractor {
    /// Compile rules, failing on the first invalid pattern.
    pub fn new(rules: &BTreeMap<String, Vec<String>>) -> Result<Self, ExtractionError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for (field, patterns) in rules {
            let regexes = patterns
                .iter()
                .map(|p| compile(field, p))
                .collect::<Result<Vec<_>, _>>()?;
            compiled.push((field.clone(), regexes));
        }
        Ok(Self { rules: compiled })
    }

    /// Compile rules, skipping invalid patterns with a warning.
    pub fn lenient(rules: &BTreeMap<String, Vec<String>>) -> Self {
        let compiled = rules
            .iter()
            .map(|(field, patterns)| {
                let regexes = patterns
                    .iter()
                    .filter_map(|p| match compile(field, p) {
                        Ok(re) => Some(re),
                        Err(e) => {
                            warn!("Skipping custom rule: {}", e);
                            None
                        }
                    })
                    .collect();
                (field.clone(), regexes)
            })
            .collect();
        Self { rules: compiled }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.iter().all(|(_, patterns)| patterns.is_empty())
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex, ExtractionError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ExtractionError::InvalidPattern {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

impl FieldExtractor for CustomRuleExtractor {
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch> {
        let text = source.text();
        let mut found: Vec<(usize, FieldMatch)> = Vec::new();

        for (field, patterns) in &self.rules {
            let mut taken: Vec<(usize, usize)> = Vec::new();

            for pattern in patterns {
                for caps in pattern.captures_iter(text) {
                    let Some(value) = (1..caps.len()).rev().find_map(|i| caps.get(i)).or_else(|| caps.get(0))
                    else {
                        continue;
                    };
                    let raw = value.as_str().trim();
                    if raw.is_empty() {
                        continue;
                    }
                    let (start, end) = (value.start(), value.end());
                    if taken.iter().any(|(s, e)| start < *e && *s < end) {
                        continue;
                    }
                    taken.push((start, end));
                    found.push((start, source.field(field, raw, raw, WEIGHT_CUSTOM, start)));
                }
            }
        }

        found.sort_by_key(|(start, _)| *start);
        found.into_iter().map(|(_, f)| f).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules(pairs: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|p| p.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_last_group_wins() {
        let extractor = CustomRuleExtractor::new(&rules(&[(
            "invoice_number",
            &[r"\b(invoice|inv)\s*(no|#|number)\s*[:\-]?\s*([A-Z0-9\-/]{4,})\b"],
        )]))
        .unwrap();

        let fields = extractor.extract_all(&SourceText::from_text("Invoice No: INV-12345"));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "invoice_number");
        assert_eq!(fields[0].normalized, "INV-12345");
    }

    #[test]
    fn test_whole_match_without_groups() {
        let extractor = CustomRuleExtractor::new(&rules(&[("order_ref", &[r"ord-\d+"])])).unwrap();
        let fields = extractor.extract_all(&SourceText::from_text("see ORD-77 and ord-78"));
        let values: Vec<&str> = fields.iter().map(|f| f.raw.as_str()).collect();
        assert_eq!(values, vec!["ORD-77", "ord-78"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let bad = rules(&[("broken", &[r"(unclosed"]), ("ok", &[r"ok\d"])]);
        assert!(matches!(
            CustomRuleExtractor::new(&bad),
            Err(ExtractionError::InvalidPattern { .. })
        ));

        let lenient = CustomRuleExtractor::lenient(&bad);
        let fields = lenient.extract_all(&SourceText::from_text("ok1"));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "ok");
    }
}
