//! Page-skew estimation.
//!
//! A photographed receipt sits as a dark-on-white region in the frame, so
//! the primary estimate fits a minimum-area rectangle to the largest
//! foreground contour. When the contour is unreliable (too small relative
//! to the frame), the estimate falls back to the median slope of detected
//! text lines.

use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::edges::canny;
use imageproc::geometry::min_area_rect;
use imageproc::hough::{detect_lines, LineDetectionOptions};
use imageproc::point::Point;

/// Pixels darker than near-white count as receipt foreground.
const FOREGROUND_THRESHOLD: u8 = 250;
/// Above this coverage the page already fills the frame: treat as aligned.
const ALIGNED_AREA_RATIO: f64 = 0.9;
/// Below this coverage the contour is likely noise: use the line fallback.
const MIN_CONTOUR_AREA_RATIO: f64 = 0.05;

/// Minimum near-horizontal lines required for a trustworthy line estimate.
const HOUGH_MIN_LINES: usize = 10;
/// Maximum angular standard deviation before the line set counts as noise.
const HOUGH_MAX_STD: f64 = 5.0;
const HOUGH_VOTE_THRESHOLD: u32 = 80;
const HOUGH_SUPPRESSION_RADIUS: u32 = 8;

/// Estimate the page rotation in degrees (positive = counter-clockwise).
/// Returns 0.0 on failure or ambiguity.
pub fn estimate_skew(gray: &GrayImage) -> f32 {
    let mask = foreground_mask(gray);
    let Some(largest) = largest_outer_contour(&mask) else {
        return 0.0;
    };

    let img_area = f64::from(gray.width()) * f64::from(gray.height());
    if img_area == 0.0 {
        return 0.0;
    }
    let ratio = contour_area(&largest) / img_area;

    if ratio > ALIGNED_AREA_RATIO {
        return 0.0;
    }
    if ratio < MIN_CONTOUR_AREA_RATIO {
        return estimate_skew_from_lines(gray);
    }

    min_rect_angle(&largest.points)
}

/// Binary mask of the receipt region: non-white pixels become foreground.
pub(crate) fn foreground_mask(gray: &GrayImage) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] <= FOREGROUND_THRESHOLD {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// The outer contour enclosing the most area, if any.
pub(crate) fn largest_outer_contour(mask: &GrayImage) -> Option<Contour<i32>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer)
        .max_by(|a, b| {
            contour_area(a)
                .partial_cmp(&contour_area(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Polygon area of a contour via the shoelace formula.
pub(crate) fn contour_area(contour: &Contour<i32>) -> f64 {
    let pts = &contour.points;
    if pts.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0f64;
    for i in 0..pts.len() {
        let j = (i + 1) % pts.len();
        area += f64::from(pts[i].x) * f64::from(pts[j].y);
        area -= f64::from(pts[j].x) * f64::from(pts[i].y);
    }
    area.abs() / 2.0
}

/// Angle of the minimum-area rectangle fitted to `points`.
///
/// The fitted rectangle reports an angle in [0°, 90°); `angle` and
/// `angle − 90°` describe the same rectangle, so the smaller magnitude wins,
/// with a 45° tie broken toward the reading that makes the rectangle wider
/// than tall.
fn min_rect_angle(points: &[Point<i32>]) -> f32 {
    if points.len() < 3 {
        return 0.0;
    }
    let rect = min_area_rect(points);
    let (e0x, e0y) = (
        f64::from(rect[1].x - rect[0].x),
        f64::from(rect[1].y - rect[0].y),
    );
    let (e1x, e1y) = (
        f64::from(rect[3].x - rect[0].x),
        f64::from(rect[3].y - rect[0].y),
    );
    let mut w = (e0x * e0x + e0y * e0y).sqrt();
    let mut h = (e1x * e1x + e1y * e1y).sqrt();

    let mut angle = e0y.atan2(e0x).to_degrees().rem_euclid(180.0);
    if angle >= 90.0 {
        angle -= 90.0;
        std::mem::swap(&mut w, &mut h);
    }

    let alt = angle - 90.0;
    if alt.abs() < angle.abs() {
        angle = alt;
    } else if alt.abs() == angle.abs() && w > h {
        angle = alt;
    }
    angle as f32
}

/// Fallback: median slope of near-horizontal detected lines (text rows).
/// Too few lines or too much angular spread means no trustworthy estimate.
fn estimate_skew_from_lines(gray: &GrayImage) -> f32 {
    let edges = canny(gray, 50.0, 150.0);
    let lines = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: HOUGH_VOTE_THRESHOLD,
            suppression_radius: HOUGH_SUPPRESSION_RADIUS,
        },
    );

    // A polar line's normal at θ means the line itself runs at θ − 90°.
    let angles: Vec<f64> = lines
        .iter()
        .map(|l| f64::from(l.angle_in_degrees) - 90.0)
        .filter(|a| a.abs() < 45.0)
        .collect();

    if angles.len() < HOUGH_MIN_LINES {
        return 0.0;
    }
    if std_dev(&angles) > HOUGH_MAX_STD {
        return 0.0;
    }
    median(&angles) as f32
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted[sorted.len() / 2]
}

fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
