//! Configuration structures for the extraction pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IdpError, Result};
use crate::models::document::DocumentType;

/// Main configuration for the idp pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdpConfig {
    /// Document type classifier configuration.
    pub classifier: ClassifierConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Options forwarded to the OCR collaborator.
    pub ocr: OcrConfig,

    /// PDF rasterization configuration.
    pub pdf: PdfConfig,
}

/// Document type classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum rule score (0.0 - 1.0) for a type to be reported instead of "unknown".
    pub threshold: f32,

    /// Tie-break order between equally scored types (first wins).
    pub priority: Vec<DocumentType>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            priority: DocumentType::ALL.to_vec(),
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Read ambiguous numeric dates as day/month/year.
    pub day_first: bool,

    /// Minimum confidence to keep an extracted field.
    pub min_field_confidence: f32,

    /// Extra fields: field name to regex patterns.
    pub custom_rules: BTreeMap<String, Vec<String>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            day_first: true,
            min_field_confidence: 0.0,
            custom_rules: BTreeMap::new(),
        }
    }
}

/// OCR collaborator options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Grayscale, denoise and threshold the image before recognition.
    pub preprocess: bool,

    /// Straighten skewed scans (slow).
    pub deskew: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            preprocess: true,
            deskew: false,
        }
    }
}

/// PDF rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// DPI for rendering PDF pages to images.
    pub render_dpi: u32,

    /// Maximum pages to process.
    pub max_pages: u32,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            render_dpi: 200,
            max_pages: 10,
        }
    }
}

impl IdpConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.classifier.threshold) {
            return Err(IdpError::Config(format!(
                "classifier.threshold must be within [0, 1], got {}",
                self.classifier.threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.extraction.min_field_confidence) {
            return Err(IdpError::Config(format!(
                "extraction.min_field_confidence must be within [0, 1], got {}",
                self.extraction.min_field_confidence
            )));
        }
        if self.pdf.render_dpi == 0 {
            return Err(IdpError::Config("pdf.render_dpi must be positive".to_string()));
        }
        if self.pdf.max_pages == 0 {
            return Err(IdpError::Config("pdf.max_pages must be positive".to_string()));
        }
        Ok(())
    }

    /// Default location of the config file for the given config directory.
    pub fn default_path(config_dir: &Path) -> PathBuf {
        config_dir.join("idp").join("config.json")
    }
}
