//! Frame preprocessing and the two similarity metrics used by the
//! scanners.
//!
//! Scene detection uses SSIM, which is robust to compression noise but
//! dampens small localized changes. Interaction detection uses the raw
//! mean absolute pixel difference, which is cheap and sensitive to
//! exactly those small changes (a cursor click, a hover highlight).

use image::{GrayImage, RgbImage, imageops};

use crate::config::MAX_COMPARE_DIM;

const SSIM_WINDOW: u32 = 7;
const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// Convert a decoded color frame into a normalized comparison buffer:
/// single-channel luma, downscaled so that the longest side is at most
/// [`MAX_COMPARE_DIM`] pixels, aspect ratio preserved.
pub fn preprocess(frame: &RgbImage) -> GrayImage {
    let gray = imageops::grayscale(frame);
    let (width, height) = gray.dimensions();
    let max_dim = width.max(height);
    if max_dim <= MAX_COMPARE_DIM {
        return gray;
    }

    let scale = MAX_COMPARE_DIM as f64 / max_dim as f64;
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);
    imageops::resize(&gray, new_width, new_height, imageops::FilterType::Triangle)
}

/// Mean structural similarity index between two grayscale buffers.
///
/// Computed over sliding uniform windows (7x7, clamped to the smaller
/// image dimension) with the standard stabilizing constants and sample
/// covariance. Identical buffers score 1.0; buffers with mismatched
/// dimensions score 0.0.
pub fn ssim(a: &GrayImage, b: &GrayImage) -> f64 {
    if a.dimensions() != b.dimensions() {
        return 0.0;
    }
    let (width, height) = a.dimensions();
    if width == 0 || height == 0 {
        return 1.0;
    }

    let mut win = SSIM_WINDOW.min(width).min(height);
    if win % 2 == 0 {
        win -= 1;
    }
    let n = (win * win) as f64;

    let mut total = 0.0;
    let mut windows = 0u64;

    for y0 in 0..=(height - win) {
        for x0 in 0..=(width - win) {
            let mut sum_a = 0.0;
            let mut sum_b = 0.0;
            let mut sum_aa = 0.0;
            let mut sum_bb = 0.0;
            let mut sum_ab = 0.0;

            for y in y0..y0 + win {
                for x in x0..x0 + win {
                    let pa = a.get_pixel(x, y).0[0] as f64;
                    let pb = b.get_pixel(x, y).0[0] as f64;
                    sum_a += pa;
                    sum_b += pb;
                    sum_aa += pa * pa;
                    sum_bb += pb * pb;
                    sum_ab += pa * pb;
                }
            }

            let mean_a = sum_a / n;
            let mean_b = sum_b / n;
            // Sample covariance; a 1x1 window degenerates to the
            // luminance-only term.
            let norm = if n > 1.0 { n - 1.0 } else { 1.0 };
            let var_a = (sum_aa - sum_a * mean_a) / norm;
            let var_b = (sum_bb - sum_b * mean_b) / norm;
            let cov = (sum_ab - sum_a * mean_b) / norm;

            let score = ((2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2))
                / ((mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2));
            total += score;
            windows += 1;
        }
    }

    total / windows as f64
}

/// Mean absolute per-pixel difference on the 0-255 scale. Buffers of
/// different sizes are compared over their overlapping region.
pub fn mean_abs_diff(a: &GrayImage, b: &GrayImage) -> f64 {
    let width = a.width().min(b.width());
    let height = a.height().min(b.height());
    let total = width as u64 * height as u64;
    if total == 0 {
        return 0.0;
    }

    let mut sum: u64 = 0;
    for y in 0..height {
        for x in 0..width {
            let pa = a.get_pixel(x, y).0[0] as i32;
            let pb = b.get_pixel(x, y).0[0] as i32;
            sum += pa.abs_diff(pb) as u64;
        }
    }

    sum as f64 / total as f64
}
