//! Gaussian blur for noise suppression before gradient computation.
//!
//! Wraps [`imageproc::filter::gaussian_blur_f32`] to smooth the luma
//! plane, reducing high-frequency noise that would otherwise produce
//! spurious gradients in the edge detector. Only runs in edge mode; the
//! luma path returns the reduced plane untouched.

use image::GrayImage;

/// Apply Gaussian blur to a luma plane.
///
/// Higher `sigma` values produce more smoothing. Non-positive sigma
/// values (zero or negative) return the plane unchanged, since
/// `imageproc`'s underlying function panics on `sigma <= 0.0`; this also
/// serves as the switch for callers that want gradients on the raw luma.
#[must_use = "returns the blurred plane"]
pub fn gaussian_blur(plane: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return plane.clone();
    }

    imageproc::filter::gaussian_blur_f32(plane, sigma)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10x10 plane with a sharp black-to-white boundary at x=5.
    fn sharp_step_plane() -> GrayImage {
        GrayImage::from_fn(10, 10, |x, _y| {
            if x < 5 { image::Luma([0]) } else { image::Luma([255]) }
        })
    }

    #[test]
    fn zero_sigma_returns_identical_plane() {
        let plane = sharp_step_plane();
        assert_eq!(plane, gaussian_blur(&plane, 0.0));
    }

    #[test]
    fn negative_sigma_returns_identical_plane() {
        let plane = sharp_step_plane();
        assert_eq!(plane, gaussian_blur(&plane, -1.0));
    }

    #[test]
    fn output_dimensions_preserved() {
        let plane = GrayImage::new(17, 31);
        let blurred = gaussian_blur(&plane, 1.4);
        assert_eq!(blurred.width(), 17);
        assert_eq!(blurred.height(), 31);
    }

    #[test]
    fn blur_softens_sharp_step() {
        let blurred = gaussian_blur(&sharp_step_plane(), 2.0);

        // At the boundary the blurred plane should hold intermediate
        // values rather than a hard 0-to-255 jump.
        let left_of_step = blurred.get_pixel(4, 5).0[0];
        let right_of_step = blurred.get_pixel(5, 5).0[0];
        assert!(
            left_of_step > 0,
            "expected blur to raise left-of-step above 0, got {left_of_step}",
        );
        assert!(
            right_of_step < 255,
            "expected blur to lower right-of-step below 255, got {right_of_step}",
        );
    }

    #[test]
    fn uniform_plane_unchanged_by_blur() {
        let plane = GrayImage::from_fn(10, 10, |_, _| image::Luma([128]));
        let blurred = gaussian_blur(&plane, 1.4);
        for pixel in blurred.pixels() {
            let diff = i16::from(pixel.0[0]) - 128;
            assert!(
                diff.abs() <= 1,
                "expected uniform plane to stay near 128 after blur, got {}",
                pixel.0[0],
            );
        }
    }
}
