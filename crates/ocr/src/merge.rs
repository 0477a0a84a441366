//! Groups raw OCR detections into logical receipt rows.
//!
//! The detection model returns the item name and its price on the same
//! visual row as separate tokens with no row alignment guarantee, so rows
//! are rebuilt from bounding-box geometry: detections whose vertical
//! centers fall within a dynamic threshold of a row's first member are
//! merged, left to right.

use std::cmp::Ordering;

use crate::types::{Detection, TextLine};

/// Height fraction used for the automatic vertical threshold.
const HEIGHT_FACTOR: f32 = 0.6;
/// Floor for the automatic threshold.
const MIN_Y_THRESHOLD: f32 = 10.0;
/// Threshold when no detection reports a usable height.
const FALLBACK_Y_THRESHOLD: f32 = 15.0;

/// Merge detections into lines ordered top to bottom.
///
/// `y_threshold` overrides the automatic height-based threshold; pass `None`
/// for normal operation.
pub fn merge_lines(mut detections: Vec<Detection>, y_threshold: Option<f32>) -> Vec<TextLine> {
    if detections.is_empty() {
        return Vec::new();
    }
    let threshold = y_threshold.unwrap_or_else(|| auto_threshold(&detections));

    detections.sort_by(|a, b| {
        a.y_center()
            .partial_cmp(&b.y_center())
            .unwrap_or(Ordering::Equal)
    });

    let mut merged = Vec::new();
    let mut group: Vec<Detection> = Vec::new();
    for det in detections {
        if group.is_empty() || (det.y_center() - group[0].y_center()).abs() <= threshold {
            group.push(det);
        } else {
            merged.push(merge_group(std::mem::take(&mut group)));
            group.push(det);
        }
    }
    if !group.is_empty() {
        merged.push(merge_group(group));
    }
    merged
}

/// Mean detection height × 0.6, floored at 10 px; 15 px when heights are
/// degenerate.
fn auto_threshold(detections: &[Detection]) -> f32 {
    let heights: Vec<f32> = detections
        .iter()
        .map(Detection::height)
        .filter(|h| *h > 0.0)
        .collect();
    if heights.is_empty() {
        return FALLBACK_Y_THRESHOLD;
    }
    let mean = heights.iter().sum::<f32>() / heights.len() as f32;
    (mean * HEIGHT_FACTOR).max(MIN_Y_THRESHOLD)
}

/// Join one row's detections left to right into a single line.
fn merge_group(mut group: Vec<Detection>) -> TextLine {
    group.sort_by(|a, b| {
        a.x_center()
            .partial_cmp(&b.x_center())
            .unwrap_or(Ordering::Equal)
    });

    let text = group
        .iter()
        .map(|d| d.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let confidence = group.iter().map(|d| d.confidence).sum::<f32>() / group.len() as f32;

    let xs = group.iter().flat_map(|d| d.bbox.iter().map(|p| p[0]));
    let ys = group.iter().flat_map(|d| d.bbox.iter().map(|p| p[1]));
    let min_x = xs.clone().fold(f32::INFINITY, f32::min);
    let max_x = xs.fold(f32::NEG_INFINITY, f32::max);
    let min_y = ys.clone().fold(f32::INFINITY, f32::min);
    let max_y = ys.fold(f32::NEG_INFINITY, f32::max);

    TextLine {
        text,
        confidence,
        bbox: [
            [min_x, min_y],
            [max_x, min_y],
            [max_x, max_y],
            [min_x, max_y],
        ],
    }
}
