use serde::{Deserialize, Serialize};

/// Corner points of an OCR quadrilateral, ordered TL, TR, BR, BL,
/// in image pixel coordinates (y grows downward).
pub type BBox = [[f32; 2]; 4];

/// A single raw token returned by the text-detection backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub text: String,
    /// Recognition confidence (0.0–1.0).
    pub confidence: f32,
    pub bbox: BBox,
}

impl Detection {
    pub fn new(text: impl Into<String>, confidence: f32, bbox: BBox) -> Self {
        Self { text: text.into(), confidence, bbox }
    }

    /// Convenience constructor for an axis-aligned box.
    pub fn axis_aligned(text: impl Into<String>, confidence: f32, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(
            text,
            confidence,
            [[x, y], [x + w, y], [x + w, y + h], [x, y + h]],
        )
    }

    pub fn x_center(&self) -> f32 {
        (self.bbox[0][0] + self.bbox[2][0]) / 2.0
    }

    pub fn y_center(&self) -> f32 {
        (self.bbox[0][1] + self.bbox[2][1]) / 2.0
    }

    pub fn height(&self) -> f32 {
        (self.bbox[2][1] - self.bbox[0][1]).abs()
    }
}

/// One logical receipt row, merged from detections sharing a baseline.
/// Lines are ordered top to bottom; every extractor depends on that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// Arithmetic mean of the merged detections' confidences.
    pub confidence: f32,
    /// Union of the merged detections' boxes.
    pub bbox: BBox,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_and_height_from_axis_aligned_box() {
        let d = Detection::axis_aligned("커피", 0.9, 10.0, 20.0, 100.0, 30.0);
        assert_eq!(d.x_center(), 60.0);
        assert_eq!(d.y_center(), 35.0);
        assert_eq!(d.height(), 30.0);
    }

    #[test]
    fn height_is_absolute() {
        // Flipped quadrilateral still reports a positive height.
        let d = Detection::new("x", 0.5, [[0.0, 40.0], [10.0, 40.0], [10.0, 10.0], [0.0, 10.0]]);
        assert_eq!(d.height(), 30.0);
    }
}
