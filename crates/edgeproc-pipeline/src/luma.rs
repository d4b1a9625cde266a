//! RGBA-to-luma reduction.
//!
//! Converts each 4-byte RGBA pixel to one 8-bit luma sample using the
//! BT.601 luminance weights. The alpha channel is ignored. This is a
//! pure elementwise map: each output byte depends only on its own four
//! input bytes.

use image::GrayImage;

use crate::types::PipelineError;
use crate::validate::{self, BYTES_PER_PIXEL};

/// BT.601 red weight.
pub const WEIGHT_RED: f32 = 0.299;
/// BT.601 green weight.
pub const WEIGHT_GREEN: f32 = 0.587;
/// BT.601 blue weight.
pub const WEIGHT_BLUE: f32 = 0.114;

/// Weighted luma of a single pixel, rounded to nearest.
///
/// The weights sum to 1.0, so the result of valid 8-bit inputs never
/// exceeds 255; the clamp is a saturation guard, not a normal code path.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn weighted_luma(r: u8, g: u8, b: u8) -> u8 {
    let y = WEIGHT_RED.mul_add(
        f32::from(r),
        WEIGHT_GREEN.mul_add(f32::from(g), WEIGHT_BLUE * f32::from(b)),
    );
    y.round().clamp(0.0, 255.0) as u8
}

/// Reduce an RGBA buffer to its luma plane.
///
/// `rgba` must already have passed [`validate::validate_frame`] and be
/// sliced to exactly `width * height * 4` bytes; the length is
/// re-checked here so a contract violation fails fast instead of
/// producing a short plane.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] if `rgba` is not exactly
/// `width * height * 4` bytes.
pub fn luma_plane(rgba: &[u8], width: u32, height: u32) -> Result<GrayImage, PipelineError> {
    let expected = validate::expected_len(width, height).filter(|&n| n == rgba.len());
    if expected.is_none() {
        return Err(PipelineError::InvalidInput(format!(
            "luma reducer expects exactly {width}x{height}x4 bytes, got {}",
            rgba.len(),
        )));
    }

    let pixel_count = rgba.len() / BYTES_PER_PIXEL;
    let mut plane = Vec::with_capacity(pixel_count);
    plane.extend(
        rgba.chunks_exact(BYTES_PER_PIXEL)
            .map(|px| weighted_luma(px[0], px[1], px[2])),
    );

    GrayImage::from_raw(width, height, plane).ok_or_else(|| {
        PipelineError::InvalidInput(format!("luma plane does not fit {width}x{height}"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Reference luma in f64, for comparing against the f32 production path.
    fn reference_luma(r: u8, g: u8, b: u8) -> f64 {
        0.114f64.mul_add(
            f64::from(b),
            0.299f64.mul_add(f64::from(r), 0.587 * f64::from(g)),
        )
    }

    #[test]
    fn black_pixel_is_zero() {
        assert_eq!(weighted_luma(0, 0, 0), 0);
    }

    #[test]
    fn white_pixel_is_full_scale() {
        assert_eq!(weighted_luma(255, 255, 255), 255);
    }

    #[test]
    fn primary_channels_follow_weights() {
        let r = weighted_luma(255, 0, 0);
        let g = weighted_luma(0, 255, 0);
        let b = weighted_luma(0, 0, 255);
        // Green carries the largest weight, blue the smallest.
        assert!(g > r && r > b, "expected G > R > B, got R={r} G={g} B={b}");
        assert_eq!(r, 76); // round(0.299 * 255)
        assert_eq!(g, 150); // round(0.587 * 255)
        assert_eq!(b, 29); // round(0.114 * 255)
    }

    #[test]
    fn luma_matches_reference_within_one_level() {
        // Sweep a spread of channel combinations; the f32 path must stay
        // within one level of the exact rounded weighted sum.
        for r in (0..=255).step_by(15) {
            for g in (0..=255).step_by(15) {
                for b in (0..=255).step_by(15) {
                    let (r, g, b) = (r as u8, g as u8, b as u8);
                    let got = f64::from(weighted_luma(r, g, b));
                    let want = reference_luma(r, g, b).round();
                    assert!(
                        (got - want).abs() <= 1.0,
                        "luma({r},{g},{b}) = {got}, reference {want}",
                    );
                }
            }
        }
    }

    #[test]
    fn alpha_is_ignored() {
        let opaque = [10u8, 20, 30, 255];
        let transparent = [10u8, 20, 30, 0];
        let a = luma_plane(&opaque, 1, 1).unwrap();
        let b = luma_plane(&transparent, 1, 1).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn plane_has_one_byte_per_pixel() {
        let rgba = vec![128u8; 7 * 5 * 4];
        let plane = luma_plane(&rgba, 7, 5).unwrap();
        assert_eq!(plane.as_raw().len(), 35);
        assert_eq!(plane.width(), 7);
        assert_eq!(plane.height(), 5);
    }

    #[test]
    fn reduction_is_position_independent() {
        // The same (R,G,B) must produce the same luma at every position.
        let rgba: Vec<u8> = std::iter::repeat_n([200u8, 100, 50, 255], 12)
            .flatten()
            .collect();
        let plane = luma_plane(&rgba, 4, 3).unwrap();
        let first = plane.as_raw()[0];
        assert!(plane.as_raw().iter().all(|&y| y == first));
    }

    #[test]
    fn reduction_is_deterministic() {
        let rgba: Vec<u8> = (0..=255u8).flat_map(|v| [v, v / 2, v / 3, 255]).collect();
        let a = luma_plane(&rgba, 16, 16).unwrap();
        let b = luma_plane(&rgba, 16, 16).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn wrong_length_is_rejected() {
        let rgba = vec![0u8; 15];
        let result = luma_plane(&rgba, 2, 2);
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
    }

    #[test]
    fn oversized_slice_is_rejected() {
        // The reducer takes the validated slice, not the raw caller
        // buffer; an unsliced oversized buffer is a caller bug.
        let rgba = vec![0u8; 32];
        let result = luma_plane(&rgba, 2, 2);
        assert!(matches!(result, Err(PipelineError::InvalidInput(_))));
    }
}
