//! OCR collaborator boundary.
//!
//! Recognition itself happens outside this crate. Engines plug in through
//! [`OcrBackend`] and hand back [`OcrLine`]s in reading order.

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::config::OcrConfig;

/// A recognized line of text with its geometry and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,

    /// Quadrilateral corners [[x, y]; 4], clockwise from top-left.
    #[serde(default)]
    pub bbox: [[f32; 2]; 4],
}

impl OcrLine {
    /// Create a line without geometry.
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            bbox: [[0.0; 2]; 4],
        }
    }

    /// Set the bounding quadrilateral.
    pub fn with_bbox(mut self, bbox: [[f32; 2]; 4]) -> Self {
        self.bbox = bbox;
        self
    }

    /// Confidence clamped into [0, 1]; NaN counts as zero.
    pub fn clamped_confidence(&self) -> f32 {
        if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        }
    }

    /// Get the axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let min_x = self.bbox.iter().map(|p| p[0]).fold(f32::INFINITY, f32::min);
        let max_x = self.bbox.iter().map(|p| p[0]).fold(f32::NEG_INFINITY, f32::max);
        let min_y = self.bbox.iter().map(|p| p[1]).fold(f32::INFINITY, f32::min);
        let max_y = self.bbox.iter().map(|p| p[1]).fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Options passed to the OCR collaborator for each image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrOptions {
    /// Preprocess the image (grayscale, denoise, threshold).
    pub preprocess: bool,
    /// Deskew the image before recognition.
    pub deskew: bool,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self::from(&OcrConfig::default())
    }
}

impl From<&OcrConfig> for OcrOptions {
    fn from(config: &OcrConfig) -> Self {
        Self {
            preprocess: config.preprocess,
            deskew: config.deskew,
        }
    }
}

/// Trait for OCR engines.
pub trait OcrBackend {
    /// Recognize text lines in an image, in reading order.
    fn recognize(&self, image: &DynamicImage, options: &OcrOptions) -> Result<Vec<OcrLine>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clamped_confidence() {
        assert_eq!(OcrLine::new("a", 1.7).clamped_confidence(), 1.0);
        assert_eq!(OcrLine::new("a", -0.2).clamped_confidence(), 0.0);
        assert_eq!(OcrLine::new("a", f32::NAN).clamped_confidence(), 0.0);
        assert_eq!(OcrLine::new("a", 0.42).clamped_confidence(), 0.42);
    }

    #[test]
    fn test_rect() {
        let line = OcrLine::new("Total", 0.9)
            .with_bbox([[10.0, 5.0], [60.0, 6.0], [61.0, 20.0], [9.0, 19.0]]);
        assert_eq!(line.rect(), (9.0, 5.0, 61.0, 20.0));
    }

    #[test]
    fn test_bbox_defaults_when_missing() {
        let line: OcrLine = serde_json::from_str(r#"{"text": "Hi", "confidence": 0.5}"#).unwrap();
        assert_eq!(line.bbox, [[0.0; 2]; 4]);
    }
}
