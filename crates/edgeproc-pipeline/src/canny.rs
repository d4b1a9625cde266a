//! Canny edge operator internals: Sobel gradients, non-maximum
//! suppression, and double-threshold hysteresis.
//!
//! The operator is implemented in-crate rather than delegated to an
//! external vision library so the numeric policy stays pinned: 3x3
//! Sobel kernels with clamped borders, 4-bin direction quantization for
//! the suppression step, and an iterative 8-connected flood-fill for
//! weak-edge promotion.
//!
//! Border policy: border pixels are excluded from edge status. Gradients
//! and suppression run over interior pixels only, and the flood-fill
//! never promotes into the one-pixel frame, so the edge map border is
//! always 0.
//!
//! The public entry point with threshold clamping is
//! [`crate::edge::detect_edges`]; this module assumes thresholds are
//! already sane (`0 < low <= high`).

use image::{GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::filter::filter_clamped;
use imageproc::kernel;

/// Output value for edge pixels. Non-edge pixels are 0.
pub(crate) const EDGE: u8 = 255;

/// tan(22.5 deg), the boundary between the horizontal/vertical and
/// diagonal direction bins.
const TAN_22_5_DEG: f32 = 0.414_213_56;

/// The 8-connected neighborhood used by hysteresis edge tracking.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Run the edge operator on a (typically pre-blurred) luma plane.
///
/// Returns a binary map: [`EDGE`] for edge pixels, 0 otherwise. Planes
/// with no interior pixel (either dimension < 3) have no gradient
/// neighborhood anywhere and come back all zero.
pub(crate) fn detect(luma: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    debug_assert!(high_threshold >= low_threshold);

    let (width, height) = luma.dimensions();
    if width < 3 || height < 3 {
        return GrayImage::new(width, height);
    }

    let gx: Image<Luma<i16>> = filter_clamped(luma, kernel::SOBEL_HORIZONTAL_3X3);
    let gy: Image<Luma<i16>> = filter_clamped(luma, kernel::SOBEL_VERTICAL_3X3);
    let magnitude = gradient_magnitude(&gx, &gy);
    let thinned = suppress_non_maxima(&magnitude, &gx, &gy);
    hysteresis(&thinned, low_threshold, high_threshold)
}

/// Per-pixel Euclidean gradient magnitude.
fn gradient_magnitude(gx: &Image<Luma<i16>>, gy: &Image<Luma<i16>>) -> Image<Luma<f32>> {
    Image::from_fn(gx.width(), gx.height(), |x, y| {
        Luma([f32::from(gx[(x, y)][0]).hypot(f32::from(gy[(x, y)][0]))])
    })
}

/// Thin gradient ridges to local maxima along the gradient direction.
///
/// A pixel survives only if its magnitude is at least that of both
/// neighbors along the quantized gradient direction; ties survive so a
/// perfectly symmetric step keeps its ridge. The output border is 0.
fn suppress_non_maxima(
    magnitude: &Image<Luma<f32>>,
    gx: &Image<Luma<i16>>,
    gy: &Image<Luma<i16>>,
) -> Image<Luma<f32>> {
    let (width, height) = magnitude.dimensions();
    let mut out = Image::from_pixel(width, height, Luma([0.0f32]));
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mag = magnitude[(x, y)][0];
            if mag <= 0.0 {
                continue;
            }
            let dx = f32::from(gx[(x, y)][0]);
            let dy = f32::from(gy[(x, y)][0]);
            let (first, second) = direction_neighbors(magnitude, x, y, dx, dy);
            if mag >= first && mag >= second {
                out.put_pixel(x, y, Luma([mag]));
            }
        }
    }
    out
}

/// Magnitudes of the two neighbors along the quantized gradient
/// direction of `(dx, dy)`.
///
/// The direction is quantized to 4 bins (0, 45, 90, 135 degrees) by
/// comparing `|dx|` and `|dy|` against the tan(22.5 deg) boundary,
/// avoiding a per-pixel `atan2`. Only called for interior pixels, so
/// the `x +- 1` / `y +- 1` lookups stay in bounds.
fn direction_neighbors(
    magnitude: &Image<Luma<f32>>,
    x: u32,
    y: u32,
    dx: f32,
    dy: f32,
) -> (f32, f32) {
    let abs_dx = dx.abs();
    let abs_dy = dy.abs();
    let same_sign = (dx >= 0.0) == (dy >= 0.0);

    if abs_dy <= abs_dx * TAN_22_5_DEG {
        // Near-horizontal gradient: compare along the row.
        (magnitude[(x - 1, y)][0], magnitude[(x + 1, y)][0])
    } else if abs_dx <= abs_dy * TAN_22_5_DEG {
        // Near-vertical gradient: compare along the column.
        (magnitude[(x, y - 1)][0], magnitude[(x, y + 1)][0])
    } else if same_sign {
        // 45 degree diagonal (y axis points down).
        (magnitude[(x + 1, y + 1)][0], magnitude[(x - 1, y - 1)][0])
    } else {
        // 135 degree diagonal.
        (magnitude[(x + 1, y - 1)][0], magnitude[(x - 1, y + 1)][0])
    }
}

/// Double-threshold hysteresis with 8-connected weak-edge promotion.
///
/// Strong pixels (magnitude >= `high`) seed an iterative flood-fill
/// that promotes transitively 8-connected weak pixels (magnitude >=
/// `low`). Weak pixels not reached from any strong pixel stay 0. The
/// fill never enters the one-pixel border frame.
fn hysteresis(magnitude: &Image<Luma<f32>>, low: f32, high: f32) -> GrayImage {
    let (width, height) = magnitude.dimensions();
    let mut out = GrayImage::new(width, height);
    let mut pending = Vec::new();

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if magnitude[(x, y)][0] < high || out[(x, y)][0] != 0 {
                continue;
            }
            out.put_pixel(x, y, Luma([EDGE]));
            pending.push((x, y));

            while let Some((cx, cy)) = pending.pop() {
                for (dx, dy) in NEIGHBOR_OFFSETS {
                    let Some(nx) = cx.checked_add_signed(dx) else {
                        continue;
                    };
                    let Some(ny) = cy.checked_add_signed(dy) else {
                        continue;
                    };
                    // Border pixels never gain edge status.
                    if nx == 0 || ny == 0 || nx + 1 >= width || ny + 1 >= height {
                        continue;
                    }
                    if magnitude[(nx, ny)][0] >= low && out[(nx, ny)][0] == 0 {
                        out.put_pixel(nx, ny, Luma([EDGE]));
                        pending.push((nx, ny));
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 20x20 plane with a sharp vertical step at x = 10.
    fn vertical_step_plane() -> GrayImage {
        GrayImage::from_fn(20, 20, |x, _y| {
            if x < 10 { Luma([0]) } else { Luma([255]) }
        })
    }

    #[test]
    fn uniform_plane_has_no_edges() {
        let plane = GrayImage::from_fn(20, 20, |_, _| Luma([128]));
        let edges = detect(&plane, 80.0, 150.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn output_values_are_binary() {
        let edges = detect(&vertical_step_plane(), 80.0, 150.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0 || p.0[0] == EDGE));
    }

    #[test]
    fn vertical_step_yields_edge_column() {
        let edges = detect(&vertical_step_plane(), 80.0, 150.0);

        // Interior rows must have edge pixels at the step and nowhere else.
        for y in 1..19 {
            let row_edges: Vec<u32> = (0..20).filter(|&x| edges[(x, y)][0] == EDGE).collect();
            assert!(
                !row_edges.is_empty(),
                "expected step edge in interior row {y}",
            );
            assert!(
                row_edges.iter().all(|&x| (9..=10).contains(&x)),
                "row {y} has edges away from the step: {row_edges:?}",
            );
        }
    }

    #[test]
    fn border_frame_stays_zero() {
        let edges = detect(&vertical_step_plane(), 1.0, 2.0);
        let (w, h) = edges.dimensions();
        for x in 0..w {
            assert_eq!(edges[(x, 0)][0], 0);
            assert_eq!(edges[(x, h - 1)][0], 0);
        }
        for y in 0..h {
            assert_eq!(edges[(0, y)][0], 0);
            assert_eq!(edges[(w - 1, y)][0], 0);
        }
    }

    #[test]
    fn planes_without_interior_come_back_zeroed() {
        for (w, h) in [(1, 1), (2, 2), (1, 10), (10, 2)] {
            let plane = GrayImage::from_fn(w, h, |x, y| Luma([((x + y) * 100 % 256) as u8]));
            let edges = detect(&plane, 80.0, 150.0);
            assert_eq!(edges.dimensions(), (w, h));
            assert!(edges.pixels().all(|p| p.0[0] == 0), "{w}x{h}");
        }
    }

    #[test]
    fn strong_edge_next_to_border_does_not_panic() {
        // Flood-fill from a strong column one pixel in from the border
        // must stop at the frame instead of underflowing coordinates.
        let plane = GrayImage::from_fn(10, 10, |x, _y| {
            if x <= 1 { Luma([255]) } else { Luma([0]) }
        });
        let edges = detect(&plane, 1.0, 2.0);
        for y in 0..10 {
            assert_eq!(edges[(0, y)][0], 0, "border column must stay zero");
        }
    }

    // --- hysteresis unit tests on synthetic magnitude maps ---

    /// Build a magnitude map from a sparse list of (x, y, magnitude).
    fn magnitude_map(w: u32, h: u32, samples: &[(u32, u32, f32)]) -> Image<Luma<f32>> {
        let mut map = Image::from_pixel(w, h, Luma([0.0f32]));
        for &(x, y, m) in samples {
            map.put_pixel(x, y, Luma([m]));
        }
        map
    }

    #[test]
    fn weak_chain_connected_to_strong_is_promoted() {
        let map = magnitude_map(10, 10, &[(2, 2, 200.0), (3, 2, 100.0), (4, 2, 100.0)]);
        let out = hysteresis(&map, 80.0, 150.0);
        assert_eq!(out[(2, 2)][0], EDGE);
        assert_eq!(out[(3, 2)][0], EDGE, "weak pixel adjacent to strong");
        assert_eq!(out[(4, 2)][0], EDGE, "weak pixel reached transitively");
    }

    #[test]
    fn diagonal_weak_neighbor_is_promoted() {
        let map = magnitude_map(10, 10, &[(2, 2, 200.0), (3, 3, 100.0)]);
        let out = hysteresis(&map, 80.0, 150.0);
        assert_eq!(out[(3, 3)][0], EDGE, "8-connectivity includes diagonals");
    }

    #[test]
    fn isolated_weak_pixel_is_discarded() {
        let map = magnitude_map(10, 10, &[(2, 2, 200.0), (7, 7, 100.0)]);
        let out = hysteresis(&map, 80.0, 150.0);
        assert_eq!(out[(7, 7)][0], 0, "weak pixel with no strong connection");
    }

    #[test]
    fn below_low_is_never_promoted() {
        let map = magnitude_map(10, 10, &[(2, 2, 200.0), (3, 2, 79.9)]);
        let out = hysteresis(&map, 80.0, 150.0);
        assert_eq!(out[(3, 2)][0], 0);
    }

    #[test]
    fn weak_only_map_has_no_edges() {
        let map = magnitude_map(10, 10, &[(2, 2, 100.0), (3, 2, 100.0), (4, 2, 149.9)]);
        let out = hysteresis(&map, 80.0, 150.0);
        assert!(out.pixels().all(|p| p.0[0] == 0));
    }
}
