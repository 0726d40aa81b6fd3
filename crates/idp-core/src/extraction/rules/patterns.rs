//! Common regex patterns for field extraction.
//!
//! Patterns run over normalized text: single spaces inside a line, `\n`
//! between lines. Intra-line gaps use ` *` so a label never pairs with a
//! value on the next line.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Dates
    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_TEXT_DMY: Regex = Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)? +(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?,? +(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_TEXT_MDY: Regex = Regex::new(
        r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.? +(\d{1,2})(?:st|nd|rd|th)?,? +(\d{4})\b"
    ).unwrap();

    /// Label right before a date, matched against the line prefix.
    pub static ref DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(invoice|issue|due|order|delivery) *date *[:\-]? *$"
    ).unwrap();

    // Amounts
    pub static ref AMOUNT: Regex = Regex::new(
        r"(?i)(?:\b(?P<label>grand +total|total +amount|total|amount +due|balance +due|sub-?total|vat|tax)\b *(?:\(? *\d{1,2}(?:\.\d+)? *% *\)?)? *[:\-]? *)?(?P<cur>\b(?:usd|eur|gbp|inr|aed|sar|bhd|qar|omr|jod)|[$€£₹])? ?(?P<num>\d{1,3}(?:,\d{3})+(?:\.\d{1,2})?|\d+[.,]\d{2}|\d+)\b(?P<suffix> ?(?:usd|eur|gbp|inr|aed|sar|bhd|qar|omr|jod)\b)?"
    ).unwrap();

    // Currency
    pub static ref CURRENCY: Regex = Regex::new(
        r"(?i)\b(usd|eur|gbp|inr|aed|sar|bhd|qar|omr|jod)\b|([$€£₹])"
    ).unwrap();

    // Document identifiers
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"(?i)\binv(?:oice)?\.? *(?:no\.?|#|number|num\.?) *[:\-]? *([A-Z0-9\-/]*\d[A-Z0-9\-/]*)"
    ).unwrap();

    pub static ref INVOICE_NUMBER_STANDALONE: Regex = Regex::new(
        r"(?i)\b(inv[\-/#][A-Z0-9\-/]*\d[A-Z0-9\-/]*)"
    ).unwrap();

    pub static ref PO_NUMBER: Regex = Regex::new(
        r"(?i)\b(?:p\.?o\.?|purchase +order) *(?:no\.?|#|number|num\.?)? *[:\-]? *([A-Z0-9\-/]*\d[A-Z0-9\-/]*)"
    ).unwrap();

    // IBAN (uppercase, optionally grouped by four). A short tail is either
    // glued to the last group or all digits, so "EUR" after it stays out.
    pub static ref IBAN: Regex = Regex::new(
        r"\b([A-Z]{2}\d{2}(?: ?[A-Z0-9]{4}){2,7}(?: ?\d{1,3}|[A-Z0-9]{1,3})?)\b"
    ).unwrap();

    // Email pattern
    pub static ref EMAIL: Regex = Regex::new(
        r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b"
    ).unwrap();

    // Phone patterns, most specific first
    pub static ref PHONE_LABELED: Regex = Regex::new(
        r"(?i)\b(?:phone|tel|telephone|mobile|mob|fax|ph)\.? *[:\-]? *(\+?[\d(][\d ()\-.]{5,20}\d)"
    ).unwrap();

    pub static ref PHONE_INTL: Regex = Regex::new(
        r"\+\d{1,3}[ \-]?\(?\d{1,4}\)?(?:[ \-.]?\d{2,4}){2,4}\b"
    ).unwrap();

    pub static ref PHONE_PLAIN: Regex = Regex::new(
        r"\b\d{7,14}\b"
    ).unwrap();
}
