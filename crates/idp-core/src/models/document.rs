//! Extraction data models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type of document detected by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Invoice (tax invoice, bill).
    Invoice,
    /// Point-of-sale receipt.
    Receipt,
    /// Purchase order.
    PurchaseOrder,
    /// Contract or agreement.
    Contract,
    /// No rule set scored above the threshold.
    Unknown,
}

impl DocumentType {
    /// Known document types in declaration order (the default tie-break priority).
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Invoice,
        DocumentType::Receipt,
        DocumentType::PurchaseOrder,
        DocumentType::Contract,
    ];

    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Receipt => "receipt",
            Self::PurchaseOrder => "purchase_order",
            Self::Contract => "contract",
            Self::Unknown => "unknown",
        }
    }
}

impl Default for DocumentType {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "invoice" => Ok(Self::Invoice),
            "receipt" => Ok(Self::Receipt),
            "purchase_order" | "po" => Ok(Self::PurchaseOrder),
            "contract" => Ok(Self::Contract),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("unknown document type: {}", other)),
        }
    }
}

/// A single extracted field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatch {
    /// Field name (e.g. "date", "total_amount").
    pub name: String,

    /// Text as it appeared in the normalized document.
    pub raw: String,

    /// Canonical value (ISO date, 2-decimal amount, uppercase identifier...).
    pub normalized: String,

    /// Match confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Index of the OCR line the match starts on.
    pub line: usize,
}

/// Structured output of one extraction run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Detected document type.
    pub document_type: DocumentType,

    /// Classifier confidence (0.0 - 1.0).
    pub confidence: f32,

    /// Extracted fields in extractor order, then position.
    pub fields: Vec<FieldMatch>,

    /// Normalized full text, one OCR line per row.
    pub text: String,
}

impl ExtractionResult {
    /// The result returned for empty input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All matches for a field name, in document order.
    pub fn fields_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a FieldMatch> + use<'a, 'n> {
        self.fields.iter().filter(move |f| f.name == name)
    }

    /// First normalized value for a field name.
    pub fn first_value<'a>(&'a self, name: &str) -> Option<&'a str> {
        self.fields_named(name).next().map(|f| f.normalized.as_str())
    }
}
