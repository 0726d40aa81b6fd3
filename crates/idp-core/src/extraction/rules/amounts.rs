//! Monetary amount extraction.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::AMOUNT;
use super::{glued_to_number, FieldExtractor, MatchSet, SourceText};
use crate::models::document::FieldMatch;

const WEIGHT_LABELED: f32 = 0.9;
const WEIGHT_CURRENCY: f32 = 0.8;
const WEIGHT_BARE: f32 = 0.6;

/// Amount field extractor.
///
/// Accepts numbers that carry a label ("Total:", "VAT"), a currency marker,
/// or a two-digit decimal part. Plain integers and pieces of dates are
/// rejected.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch> {
        let text = source.text();
        let mut matches = MatchSet::new();

        for caps in AMOUNT.captures_iter(text) {
            let (Some(full), Some(num)) = (caps.get(0), caps.name("num")) else {
                continue;
            };

            // "23%" is a rate, "15.01" may be the start of a date.
            if glued_to_number(text, num.start(), num.end()) {
                continue;
            }

            let label = caps.name("label").map(|m| m.as_str().to_lowercase());
            let has_currency = caps.name("cur").is_some() || caps.name("suffix").is_some();
            let has_decimals = num.as_str().contains(['.', ',']);

            let weight = if label.is_some() {
                WEIGHT_LABELED
            } else if has_currency {
                WEIGHT_CURRENCY
            } else if has_decimals {
                WEIGHT_BARE
            } else {
                continue;
            };

            let Some(amount) = parse_amount(num.as_str()) else {
                continue;
            };

            let name = field_name(label.as_deref());
            let raw = full.as_str().trim();
            let field = source.field(name, raw, format_amount(amount), weight, full.start());
            matches.push(full.start(), full.end(), field);
        }

        matches.into_sorted()
    }
}

fn field_name(label: Option<&str>) -> &'static str {
    let Some(label) = label else {
        return "amount";
    };
    let compact: String = label.split_whitespace().collect::<Vec<_>>().join(" ");
    match compact.as_str() {
        "subtotal" | "sub-total" => "subtotal",
        "vat" | "tax" => "tax_amount",
        _ => "total_amount",
    }
}

/// Parse an amount such as "1,234.56", "1.234,56", "12,50" or "$ 250".
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Both present: the last one is the decimal separator
        (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        // Only commas: a single comma followed by exactly two digits is decimal
        (Some(c), None) if cleaned.matches(',').count() == 1 && cleaned.len() - c - 1 == 2 => {
            cleaned.replace(',', ".")
        }
        (Some(_), None) => cleaned.replace(',', ""),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok()
}

/// Format an amount with exactly two decimal places.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}
