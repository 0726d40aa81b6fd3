//! OCR text normalization.

use std::borrow::Cow;

/// Punctuation that may appear inside a numeric token (dates, amounts, ids).
const NUMERIC_PUNCTUATION: &[char] = &[
    '.', ',', ':', '/', '-', '+', '#', '$', '€', '£', '₹', '%', '(', ')',
];

/// Normalized text with a case-folded copy for matching.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText {
    /// Normalized text, original case.
    pub text: String,
    /// Lowercased copy of `text`.
    pub folded: String,
}

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        let text = normalize(raw);
        let folded = text.to_lowercase();
        Self { text, folded }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Normalize raw OCR text.
///
/// Collapses whitespace runs to a single space, trims the ends, and repairs
/// letter/digit confusions inside numeric tokens ("2O24" becomes "2024",
/// "INVOICE" is left alone).
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(fix_numeric_token)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Digit a letter is commonly misread for.
fn confusable_digit(c: char) -> Option<char> {
    match c {
        'O' | 'o' | 'Q' => Some('0'),
        'I' | 'l' | '|' => Some('1'),
        'Z' => Some('2'),
        'S' => Some('5'),
        'B' => Some('8'),
        _ => None,
    }
}

/// A token is numeric when it holds at least one digit and nothing but
/// digits, confusable letters and numeric punctuation. Short codes such as
/// "B2B" or "I5" are left alone: digits must outnumber the confusable
/// letters unless the token is shaped like an amount ("25O.OO").
fn fix_numeric_token(token: &str) -> Cow<'_, str> {
    let mut digits = 0;
    let mut confusables = 0;

    for c in token.chars() {
        if c.is_ascii_digit() {
            digits += 1;
        } else if confusable_digit(c).is_some() {
            confusables += 1;
        } else if !NUMERIC_PUNCTUATION.contains(&c) {
            return Cow::Borrowed(token);
        }
    }

    if digits == 0 || confusables == 0 {
        return Cow::Borrowed(token);
    }
    if digits <= confusables && !is_amount_shaped(token) {
        return Cow::Borrowed(token);
    }

    Cow::Owned(
        token
            .chars()
            .map(|c| confusable_digit(c).unwrap_or(c))
            .collect(),
    )
}

/// Integer part, a decimal separator and exactly two decimals, after any
/// currency symbol.
fn is_amount_shaped(token: &str) -> bool {
    let body = token.trim_start_matches(['$', '€', '£', '₹']);
    let is_digitish = |c: char| c.is_ascii_digit() || confusable_digit(c).is_some();

    match body.rsplit_once(['.', ',']) {
        Some((whole, cents)) => {
            !whole.is_empty()
                && cents.chars().count() == 2
                && whole.chars().all(|c| is_digitish(c) || c == ',' || c == '.')
                && cents.chars().all(is_digitish)
        }
        None => false,
    }
}
