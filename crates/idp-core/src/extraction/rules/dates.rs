//! Date extraction.

use chrono::NaiveDate;

use super::patterns::{DATE_ISO, DATE_LABEL, DATE_NUMERIC, DATE_TEXT_DMY, DATE_TEXT_MDY};
use super::{FieldExtractor, MatchSet, SourceText};
use crate::models::document::FieldMatch;

const WEIGHT_ISO: f32 = 0.95;
const WEIGHT_TEXT: f32 = 0.9;
const WEIGHT_NUMERIC: f32 = 0.8;

/// Date field extractor.
pub struct DateExtractor {
    day_first: bool,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self { day_first: true }
    }

    /// Read ambiguous numeric dates as day/month (default) or month/day.
    pub fn with_day_first(mut self, day_first: bool) -> Self {
        self.day_first = day_first;
        self
    }

    fn numeric_date(&self, first: u32, second: u32, year: i32) -> Option<NaiveDate> {
        let (day_first, month_first) = (
            calendar_date(year, second, first),
            calendar_date(year, first, second),
        );
        if self.day_first {
            day_first.or(month_first)
        } else {
            month_first.or(day_first)
        }
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    fn extract_all(&self, source: &SourceText) -> Vec<FieldMatch> {
        let text = source.text();
        let mut matches = MatchSet::new();

        // YYYY-MM-DD or YYYY/MM/DD
        for caps in DATE_ISO.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let date = calendar_date(parse_year(&caps[1]), parse_u32(&caps[2]), parse_u32(&caps[3]));
            if let Some(date) = date {
                matches.push(m.start(), m.end(), date_field(source, m.as_str(), date, WEIGHT_ISO, m.start()));
            }
        }

        // "15 January 2024"
        for caps in DATE_TEXT_DMY.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let date = month_from_name(&caps[2])
                .and_then(|month| calendar_date(parse_year(&caps[3]), month, parse_u32(&caps[1])));
            if let Some(date) = date {
                matches.push(m.start(), m.end(), date_field(source, m.as_str(), date, WEIGHT_TEXT, m.start()));
            }
        }

        // "January 15, 2024"
        for caps in DATE_TEXT_MDY.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            let date = month_from_name(&caps[1])
                .and_then(|month| calendar_date(parse_year(&caps[3]), month, parse_u32(&caps[2])));
            if let Some(date) = date {
                matches.push(m.start(), m.end(), date_field(source, m.as_str(), date, WEIGHT_TEXT, m.start()));
            }
        }

        // DD.MM.YYYY, DD/MM/YY, MM-DD-YYYY...
        for caps in DATE_NUMERIC.captures_iter(text) {
            let Some(m) = caps.get(0) else { continue };
            if matches.overlaps(m.start(), m.end()) {
                continue;
            }
            let date = self.numeric_date(parse_u32(&caps[1]), parse_u32(&caps[2]), parse_year(&caps[3]));
            if let Some(date) = date {
                matches.push(m.start(), m.end(), date_field(source, m.as_str(), date, WEIGHT_NUMERIC, m.start()));
            }
        }

        matches.into_sorted()
    }
}

fn date_field(source: &SourceText, raw: &str, date: NaiveDate, weight: f32, start: usize) -> FieldMatch {
    let name = field_name(source.line_prefix(start));
    source.field(name, raw, date.format("%Y-%m-%d").to_string(), weight, start)
}

/// Field name from the label preceding the date on its line.
fn field_name(prefix: &str) -> &'static str {
    match DATE_LABEL.captures(prefix) {
        Some(caps) => match caps[1].to_lowercase().as_str() {
            "invoice" | "issue" => "invoice_date",
            "due" => "due_date",
            "order" => "order_date",
            "delivery" => "delivery_date",
            _ => "date",
        },
        None => "date",
    }
}

/// A real calendar date within a plausible document range.
fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(1900..=2100).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_u32(s: &str) -> u32 {
    s.parse().unwrap_or(0)
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if s.len() <= 2 {
        // Two-digit year: assume 2000s for 00-50, 1900s for 51-99
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

fn month_from_name(month: &str) -> Option<u32> {
    let month = month.to_lowercase();
    let number = match month.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(text: &str) -> Vec<(String, String)> {
        DateExtractor::new()
            .extract_all(&SourceText::from_text(text))
            .into_iter()
            .map(|f| (f.name, f.normalized))
            .collect()
    }

    #[test]
    fn test_extract_date_iso() {
        assert_eq!(values("Date: 2024-01-15"), vec![("date".into(), "2024-01-15".into())]);
    }

    #[test]
    fn test_extract_date_day_first() {
        assert_eq!(values("15.01.2024"), vec![("date".into(), "2024-01-15".into())]);
        assert_eq!(values("12/11/2025"), vec![("date".into(), "2025-11-12".into())]);
    }

    #[test]
    fn test_falls_back_to_month_first() {
        assert_eq!(values("12/31/2024"), vec![("date".into(), "2024-12-31".into())]);
    }

    #[test]
    fn test_month_first_preference() {
        let source = SourceText::from_text("12/11/2025");
        let fields = DateExtractor::new().with_day_first(false).extract_all(&source);
        assert_eq!(fields[0].normalized, "2025-12-11");
    }

    #[test]
    fn test_invalid_date_discarded() {
        assert!(values("Date: 32/13/2024").is_empty());
        assert!(values("2024-02-30").is_empty());
    }

    #[test]
    fn test_textual_dates() {
        assert_eq!(values("15 Jan 2024"), vec![("date".into(), "2024-01-15".into())]);
        assert_eq!(
            values("Signed on March 3rd, 2023"),
            vec![("date".into(), "2023-03-03".into())]
        );
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(values("15.01.24"), vec![("date".into(), "2024-01-15".into())]);
    }

    #[test]
    fn test_labeled_dates() {
        let text = "Invoice Date: 12/11/2025\nDue Date: 2025-12-26\nShipped 2025-11-20";
        assert_eq!(
            values(text),
            vec![
                ("invoice_date".into(), "2025-11-12".into()),
                ("due_date".into(), "2025-12-26".into()),
                ("date".into(), "2025-11-20".into()),
            ]
        );
    }

    #[test]
    fn test_source_line_and_confidence() {
        let lines = vec![
            crate::ocr::OcrLine::new("INVOICE", 0.99),
            crate::ocr::OcrLine::new("Date: 2024-01-15", 0.85),
        ];
        let fields = DateExtractor::new().extract_all(&SourceText::from_lines(&lines));
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].line, 1);
        assert_eq!(fields[0].raw, "2024-01-15");
        assert!((fields[0].confidence - (0.85 + WEIGHT_ISO) / 2.0).abs() < 1e-6);
    }
}
