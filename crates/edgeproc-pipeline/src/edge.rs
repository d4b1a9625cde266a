//! Edge detection over a luma plane.
//!
//! Public wrapper around the [`crate::canny`] operator. Returns a binary
//! plane where white pixels (255) are edges and black pixels (0) are
//! background. Thresholds compare against raw Sobel gradient magnitude,
//! so a full-scale step produces magnitudes far above the default
//! thresholds.

use image::GrayImage;

use crate::canny;

/// Minimum allowed hysteresis threshold.
///
/// A low threshold of zero would classify every pixel with any gradient
/// response as a weak candidate, flooding the edge map on noisy camera
/// frames.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Detect edges in a (typically pre-blurred) luma plane.
///
/// Pixels with suppressed gradient magnitude at or above
/// `high_threshold` are definite edges; those between `low_threshold`
/// and `high_threshold` become edges only when 8-connected to a
/// definite edge. Border pixels are never edges.
///
/// Both thresholds are clamped to a minimum of [`MIN_THRESHOLD`] and
/// `low_threshold` is clamped to at most `high_threshold`, so malformed
/// host-side values degrade gracefully. This stage is total: it cannot
/// fail on any luma plane.
#[must_use = "returns the binary edge map"]
pub fn detect_edges(luma: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    canny::detect(luma, low, high)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 20x20 plane with a sharp vertical step at x = 10.
    fn vertical_step_plane() -> GrayImage {
        GrayImage::from_fn(20, 20, |x, _y| {
            if x < 10 {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        })
    }

    /// Deterministic busy plane with gradients in many directions.
    fn textured_plane() -> GrayImage {
        GrayImage::from_fn(32, 32, |x, y| {
            image::Luma([((x * 37 + y * 59) % 256) as u8])
        })
    }

    fn edge_count(edges: &GrayImage) -> u32 {
        edges.pixels().map(|p| u32::from(p.0[0] == 255)).sum()
    }

    /// Every edge pixel in `a` is also an edge pixel in `b`.
    fn is_subset(a: &GrayImage, b: &GrayImage) -> bool {
        a.pixels()
            .zip(b.pixels())
            .all(|(pa, pb)| pa.0[0] == 0 || pb.0[0] == 255)
    }

    #[test]
    fn uniform_plane_produces_no_edges() {
        let plane = GrayImage::from_fn(20, 20, |_, _| image::Luma([128]));
        let edges = detect_edges(&plane, 80.0, 150.0);
        assert_eq!(edge_count(&edges), 0, "expected no edges in uniform plane");
    }

    #[test]
    fn sharp_step_is_detected() {
        let edges = detect_edges(&vertical_step_plane(), 80.0, 150.0);
        assert!(edge_count(&edges) > 0, "expected edges at the step");
    }

    #[test]
    fn output_dimensions_match_input() {
        let edges = detect_edges(&GrayImage::new(17, 31), 80.0, 150.0);
        assert_eq!(edges.width(), 17);
        assert_eq!(edges.height(), 31);
    }

    #[test]
    fn output_values_are_binary() {
        let edges = detect_edges(&textured_plane(), 40.0, 90.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn raising_high_never_adds_edges() {
        let plane = textured_plane();
        let loose = detect_edges(&plane, 40.0, 90.0);
        let strict = detect_edges(&plane, 40.0, 140.0);
        assert!(
            is_subset(&strict, &loose),
            "raising the high threshold must only remove edges",
        );
    }

    #[test]
    fn lowering_low_never_removes_edges() {
        let plane = textured_plane();
        let strict = detect_edges(&plane, 80.0, 140.0);
        let loose = detect_edges(&plane, 20.0, 140.0);
        assert!(
            is_subset(&strict, &loose),
            "lowering the low threshold must only add edges",
        );
    }

    #[test]
    fn zero_low_threshold_is_clamped_to_min() {
        let plane = vertical_step_plane();
        let edges_zero = detect_edges(&plane, 0.0, 150.0);
        let edges_min = detect_edges(&plane, MIN_THRESHOLD, 150.0);
        assert_eq!(edges_zero, edges_min);
    }

    #[test]
    fn low_above_high_is_clamped() {
        let plane = vertical_step_plane();
        let edges_inverted = detect_edges(&plane, 200.0, 100.0);
        let edges_equal = detect_edges(&plane, 100.0, 100.0);
        assert_eq!(edges_inverted, edges_equal);
    }
}
