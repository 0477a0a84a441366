//! Image normalization ahead of text detection: skew correction with canvas
//! expansion, then a tight crop back to the receipt region.

use image::{GrayImage, Luma};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use thiserror::Error;
use tracing::{debug, info};

use crate::skew;

/// Padding kept around the detected receipt region when cropping.
const CROP_PADDING: i64 = 10;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decode raw bytes (JPEG / PNG / BMP / WebP) and deskew the result.
pub fn deskew_from_bytes(
    data: &[u8],
    skew_threshold_deg: f32,
) -> Result<GrayImage, PreprocessError> {
    let img = image::load_from_memory(data)?;
    Ok(deskew(img.to_luma8(), skew_threshold_deg))
}

/// Correct page skew when the estimate exceeds the threshold; smaller
/// angles pass through untouched (over-correction avoidance).
pub fn deskew(img: GrayImage, skew_threshold_deg: f32) -> GrayImage {
    let angle = skew::estimate_skew(&img);
    correct(img, angle, skew_threshold_deg)
}

pub(crate) fn correct(img: GrayImage, angle_deg: f32, threshold_deg: f32) -> GrayImage {
    if angle_deg.abs() <= threshold_deg {
        debug!(angle_deg, "skew within tolerance, image unchanged");
        return img;
    }
    info!(angle_deg, "correcting page skew");
    let rotated = rotate_expanded(&img, angle_deg);
    crop_to_content(rotated)
}

/// Rotate about the image center, expanding the canvas so no content is
/// clipped. New border area is filled white, matching the paper background.
fn rotate_expanded(img: &GrayImage, angle_deg: f32) -> GrayImage {
    let (w, h) = (img.width() as f32, img.height() as f32);
    // Image coordinates grow downward, so a screen-counter-clockwise
    // correction is a negative mathematical rotation.
    let theta = -angle_deg.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let new_w = (h * sin + w * cos).round().max(1.0) as u32;
    let new_h = (h * cos + w * sin).round().max(1.0) as u32;

    let projection = Projection::translate(new_w as f32 / 2.0, new_h as f32 / 2.0)
        * Projection::rotate(theta)
        * Projection::translate(-w / 2.0, -h / 2.0);

    let mut out = GrayImage::from_pixel(new_w, new_h, Luma([255u8]));
    warp_into(img, &projection, Interpolation::Bilinear, Luma([255u8]), &mut out);
    out
}

/// Crop to the largest foreground contour with fixed padding. A blank
/// canvas (no contour) degrades to the uncropped input.
fn crop_to_content(img: GrayImage) -> GrayImage {
    let mask = skew::foreground_mask(&img);
    let Some(contour) = skew::largest_outer_contour(&mask) else {
        return img;
    };

    let min_x = contour.points.iter().map(|p| i64::from(p.x)).min().unwrap_or(0);
    let max_x = contour.points.iter().map(|p| i64::from(p.x)).max().unwrap_or(0);
    let min_y = contour.points.iter().map(|p| i64::from(p.y)).min().unwrap_or(0);
    let max_y = contour.points.iter().map(|p| i64::from(p.y)).max().unwrap_or(0);

    let x = (min_x - CROP_PADDING).max(0);
    let y = (min_y - CROP_PADDING).max(0);
    let w = (max_x - min_x + 1 + 2 * CROP_PADDING).min(i64::from(img.width()) - x);
    let h = (max_y - min_y + 1 + 2 * CROP_PADDING).min(i64::from(img.height()) - y);
    if w <= 0 || h <= 0 {
        return img;
    }

    image::imageops::crop_imm(&img, x as u32, y as u32, w as u32, h as u32).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(img: &GrayImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image::DynamicImage::ImageLuma8(img.clone())
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn angle_at_threshold_leaves_image_unrotated() {
        let img = GrayImage::from_pixel(100, 50, Luma([255u8]));
        let out = correct(img.clone(), 3.0, 3.0);
        assert_eq!(out, img);
    }

    #[test]
    fn angle_just_over_threshold_triggers_rotation() {
        let img = GrayImage::from_pixel(100, 50, Luma([255u8]));
        let out = correct(img, 3.1, 3.0);
        // The expanded canvas has different dimensions.
        assert_ne!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn negative_angle_also_triggers() {
        let img = GrayImage::from_pixel(100, 50, Luma([255u8]));
        let out = correct(img, -8.0, 3.0);
        assert_ne!((out.width(), out.height()), (100, 50));
    }

    #[test]
    fn crop_tightens_to_content_with_padding() {
        let mut img = GrayImage::from_pixel(200, 200, Luma([255u8]));
        for y in 40..100 {
            for x in 30..60 {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
        let cropped = crop_to_content(img);
        assert_eq!((cropped.width(), cropped.height()), (50, 80));
    }

    #[test]
    fn crop_without_content_returns_input() {
        let img = GrayImage::from_pixel(64, 64, Luma([255u8]));
        let out = crop_to_content(img.clone());
        assert_eq!(out, img);
    }

    #[test]
    fn deskew_from_bytes_decodes_png() {
        let img = GrayImage::from_pixel(40, 40, Luma([200u8]));
        let out = deskew_from_bytes(&png_bytes(&img), 3.0).unwrap();
        // Full-frame dark page estimates 0° skew — unchanged dimensions.
        assert_eq!((out.width(), out.height()), (40, 40));
    }

    #[test]
    fn deskew_from_bytes_rejects_garbage() {
        assert!(deskew_from_bytes(b"definitely not an image", 3.0).is_err());
    }
}
