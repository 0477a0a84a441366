use image::GrayImage;
use thiserror::Error;

use crate::types::Detection;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image rejected by OCR engine: {0}")]
    ImageRejected(String),
    #[error("OCR engine error: {0}")]
    Engine(String),
    #[error("OCR backend not available")]
    NotAvailable,
}

/// Abstraction over the external text-detection model.
///
/// Implementations take a normalized grayscale image and return raw
/// per-token detections. Text arrives in reading order within visually
/// distinct blocks, but rows are not aligned across columns — the merger
/// downstream rebuilds them from geometry.
pub trait OcrBackend: Send + Sync + 'static {
    fn detect(&self, image: &GrayImage) -> Result<Vec<Detection>, OcrError>;
}

/// Mean confidence across detections; 0.0 for an empty pass.
pub fn mean_confidence(detections: &[Detection]) -> f32 {
    if detections.is_empty() {
        return 0.0;
    }
    detections.iter().map(|d| d.confidence).sum::<f32>() / detections.len() as f32
}

// ── Mock backend (always available, used for tests) ───────────────────────────

/// Returns preset detections regardless of the image — lets the pipeline
/// and extractors be exercised without a real detection model.
pub struct MockRecognizer {
    pub detections: Vec<Detection>,
}

impl MockRecognizer {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    /// Single-column receipt: one detection per input line, stacked
    /// vertically with uniform confidence.
    pub fn from_text(text: &str, confidence: f32) -> Self {
        let detections = text
            .lines()
            .enumerate()
            .map(|(i, line)| {
                Detection::axis_aligned(line, confidence, 0.0, i as f32 * 40.0, 300.0, 20.0)
            })
            .collect();
        Self { detections }
    }
}

impl OcrBackend for MockRecognizer {
    fn detect(&self, _image: &GrayImage) -> Result<Vec<Detection>, OcrError> {
        Ok(self.detections.clone())
    }
}
