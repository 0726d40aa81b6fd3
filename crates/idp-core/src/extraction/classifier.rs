//! Rule-based document type classifier.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::models::config::ClassifierConfig;
use crate::models::document::DocumentType;

/// A single classification rule, evaluated against lowercased text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Literal term matched on word boundaries.
    Keyword(&'static str),
    /// Regular expression (lowercase).
    Pattern(&'static str),
}

/// Rules scored for one document type.
#[derive(Debug)]
pub struct RuleSet {
    pub document_type: DocumentType,
    pub rules: &'static [Rule],
}

/// Rule tables, in declaration order.
pub static RULE_SETS: &[RuleSet] = &[
    RuleSet {
        document_type: DocumentType::Invoice,
        rules: &[
            Rule::Keyword("invoice"),
            Rule::Keyword("inv#"),
            Rule::Keyword("amount due"),
            Rule::Keyword("bill to"),
            Rule::Keyword("tax invoice"),
            Rule::Keyword("vat"),
            Rule::Keyword("due date"),
            Rule::Pattern(r"\binv(?:oice)?\s*(?:no\.?|#|number)"),
        ],
    },
    RuleSet {
        document_type: DocumentType::Receipt,
        rules: &[
            Rule::Keyword("receipt"),
            Rule::Keyword("thank you"),
            Rule::Keyword("change"),
            Rule::Keyword("cashier"),
            Rule::Keyword("subtotal"),
            Rule::Pattern(r"\b(?:cash|card|visa|mastercard)\b"),
        ],
    },
    RuleSet {
        document_type: DocumentType::PurchaseOrder,
        rules: &[
            Rule::Keyword("purchase order"),
            Rule::Keyword("po number"),
            Rule::Keyword("ship to"),
            Rule::Keyword("deliver to"),
            Rule::Keyword("vendor"),
            Rule::Pattern(r"\bp\.?o\.?\s*(?:no\.?|#|number)"),
        ],
    },
    RuleSet {
        document_type: DocumentType::Contract,
        rules: &[
            Rule::Keyword("agreement"),
            Rule::Keyword("party"),
            Rule::Keyword("terms and conditions"),
            Rule::Keyword("hereinafter"),
            Rule::Keyword("whereas"),
            Rule::Pattern(r"\bin witness whereof\b"),
        ],
    },
];

lazy_static! {
    static ref RULE_PATTERNS: HashMap<&'static str, Regex> = RULE_SETS
        .iter()
        .flat_map(|set| set.rules.iter())
        .filter_map(|rule| match rule {
            Rule::Pattern(p) => Some((*p, Regex::new(p).unwrap())),
            Rule::Keyword(_) => None,
        })
        .collect();
}

impl Rule {
    /// Check the rule against lowercased text.
    pub fn matches(&self, folded: &str) -> bool {
        match self {
            Rule::Keyword(term) => contains_term(folded, term),
            Rule::Pattern(pattern) => RULE_PATTERNS
                .get(pattern)
                .is_some_and(|re| re.is_match(folded)),
        }
    }
}

impl RuleSet {
    /// Fraction of rules matched, in [0, 1].
    pub fn score(&self, folded: &str) -> f32 {
        if self.rules.is_empty() {
            return 0.0;
        }
        let hits = self.rules.iter().filter(|r| r.matches(folded)).count();
        hits as f32 / self.rules.len() as f32
    }
}

/// Find `term` in `haystack` where it is not glued to surrounding letters or digits.
fn contains_term(haystack: &str, term: &str) -> bool {
    let guard_start = term.chars().next().is_some_and(char::is_alphanumeric);
    let guard_end = term.chars().last().is_some_and(char::is_alphanumeric);

    haystack.match_indices(term).any(|(start, matched)| {
        let before_ok = !guard_start
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(char::is_alphanumeric);
        let after_ok = !guard_end
            || !haystack[start + matched.len()..]
                .chars()
                .next()
                .is_some_and(char::is_alphanumeric);
        before_ok && after_ok
    })
}

/// Document type classifier over the static rule tables.
#[derive(Debug, Clone)]
pub struct DocumentClassifier {
    threshold: f32,
    priority: Vec<DocumentType>,
}

impl DocumentClassifier {
    /// Create a classifier with the default threshold and priority.
    pub fn new() -> Self {
        Self::from_config(&ClassifierConfig::default())
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new_unchecked(config.threshold, &config.priority)
    }

    fn new_unchecked(threshold: f32, priority: &[DocumentType]) -> Self {
        let mut order: Vec<DocumentType> = Vec::with_capacity(DocumentType::ALL.len());
        for doc_type in priority.iter().chain(DocumentType::ALL.iter()) {
            if *doc_type != DocumentType::Unknown && !order.contains(doc_type) {
                order.push(*doc_type);
            }
        }
        Self {
            threshold,
            priority: order,
        }
    }

    /// Set the minimum winning score.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the tie-break order. Types left out keep declaration order after the listed ones.
    pub fn with_priority(self, priority: &[DocumentType]) -> Self {
        Self::new_unchecked(self.threshold, priority)
    }

    /// Score every known type, in priority order.
    pub fn scores(&self, text: &str) -> Vec<(DocumentType, f32)> {
        let folded = text.to_lowercase();
        self.priority
            .iter()
            .filter_map(|doc_type| {
                RULE_SETS
                    .iter()
                    .find(|set| set.document_type == *doc_type)
                    .map(|set| (*doc_type, set.score(&folded)))
            })
            .collect()
    }

    /// Classify normalized text. Returns the type and its score.
    pub fn classify(&self, text: &str) -> (DocumentType, f32) {
        if text.is_empty() {
            return (DocumentType::Unknown, 0.0);
        }

        let mut best = (DocumentType::Unknown, 0.0f32);
        for (doc_type, score) in self.scores(text) {
            if score > best.1 {
                best = (doc_type, score);
            }
        }

        debug!("Classifier best score {:.3} for {}", best.1, best.0);

        if best.1 <= 0.0 || best.1 < self.threshold {
            (DocumentType::Unknown, best.1)
        } else {
            best
        }
    }
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify normalized text with the default configuration.
pub fn classify(text: &str) -> (DocumentType, f32) {
    DocumentClassifier::new().classify(text)
}
