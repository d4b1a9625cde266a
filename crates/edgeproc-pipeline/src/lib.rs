//! edgeproc-pipeline: Pure per-frame luma and edge-map transform (sans-IO).
//!
//! Converts a raw RGBA8888 frame into a single-channel plane through:
//! validation -> luma reduction -> (optional) Gaussian blur ->
//! (optional) Canny edge detection -> output packing.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and returns structured data. All host interaction
//! (worker messaging, file decode for the bench CLI) lives in the
//! sibling crates.
//!
//! Every invocation is independent and stateless: the transform holds
//! no cache and no reference to caller buffers after returning, so it
//! is safe to call concurrently from independent threads on independent
//! frames.

pub mod blur;
mod canny;
pub mod diagnostics;
pub mod edge;
pub mod luma;
pub mod pack;
pub mod types;
pub mod validate;

use web_time::Instant;

use crate::diagnostics::{FrameDiagnostics, FrameSummary, StageDiagnostics, StageMetrics};
pub use crate::types::{
    Dimensions, FrameConfig, FrameResult, GrayImage, OutputMode, PipelineError, StagedFrame,
};

/// Fixed readiness string for host-side module probes.
pub const READINESS: &str = "edgeproc pipeline ready";

/// Report that the pipeline module is initialized and callable.
///
/// Exists so bridge callers can confirm the module loaded correctly
/// before sending real frames; takes no input and cannot fail.
#[must_use]
pub const fn readiness() -> &'static str {
    READINESS
}

/// Transform one RGBA frame into a packed single-channel plane.
///
/// This is the hot path for per-frame callers: no intermediate planes
/// are retained and no diagnostics are collected. Use
/// [`process_staged`] when intermediates or timings are needed.
///
/// # Transform steps
///
/// 1. Validate the buffer against `width * height * 4`
/// 2. Reduce RGBA to a luma plane (BT.601 weights)
/// 3. Edge mode only: Gaussian blur, then Canny edge detection
/// 4. Pack the selected plane into a fresh `width * height` buffer
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] when the buffer is shorter
/// than the dimensions require or either dimension is zero.
/// Returns [`PipelineError::AllocationFailure`] when the output plane
/// cannot be allocated. No partial output is ever returned.
pub fn process(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &FrameConfig,
) -> Result<FrameResult, PipelineError> {
    let expected = validate::validate_frame(rgba, width, height)?;
    let luma = luma::luma_plane(&rgba[..expected], width, height)?;

    let plane = match config.mode {
        OutputMode::Luma => pack::pack_plane(&luma)?,
        OutputMode::Edges => {
            let blurred = blur::gaussian_blur(&luma, config.blur_sigma);
            let edges = edge::detect_edges(&blurred, config.low_threshold, config.high_threshold);
            pack::pack_plane(&edges)?
        }
    };

    Ok(FrameResult {
        plane,
        dimensions: Dimensions { width, height },
    })
}

/// Transform one RGBA frame, retaining every intermediate plane and
/// collecting per-stage diagnostics.
///
/// Runs the identical stage sequence as [`process`]; preview UIs and
/// the bench CLI use this variant to show intermediate planes and
/// per-stage timings.
///
/// # Errors
///
/// Same failure modes as [`process`].
pub fn process_staged(
    rgba: &[u8],
    width: u32,
    height: u32,
    config: &FrameConfig,
) -> Result<(StagedFrame, FrameDiagnostics), PipelineError> {
    let total_start = Instant::now();

    let stage_start = Instant::now();
    let expected = validate::validate_frame(rgba, width, height)?;
    let validate_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Validate {
            input_bytes: rgba.len(),
            expected_bytes: expected,
            width,
            height,
        },
    };

    let dimensions = Dimensions { width, height };

    let stage_start = Instant::now();
    let luma = luma::luma_plane(&rgba[..expected], width, height)?;
    let luma_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Luma {
            pixel_count: dimensions.pixel_count(),
        },
    };

    let (blurred, edges, blur_diag, edge_diag) = match config.mode {
        OutputMode::Luma => (None, None, None, None),
        OutputMode::Edges => {
            let stage_start = Instant::now();
            let blurred = blur::gaussian_blur(&luma, config.blur_sigma);
            let blur_diag = StageDiagnostics {
                duration: stage_start.elapsed(),
                metrics: StageMetrics::Blur {
                    sigma: config.blur_sigma,
                },
            };

            let stage_start = Instant::now();
            let edges = edge::detect_edges(&blurred, config.low_threshold, config.high_threshold);
            let edge_diag = StageDiagnostics {
                duration: stage_start.elapsed(),
                metrics: StageMetrics::EdgeDetection {
                    low_threshold: config.low_threshold,
                    high_threshold: config.high_threshold,
                    edge_pixel_count: diagnostics::count_edge_pixels(&edges),
                    total_pixel_count: dimensions.pixel_count(),
                },
            };

            (Some(blurred), Some(edges), Some(blur_diag), Some(edge_diag))
        }
    };

    let stage_start = Instant::now();
    let plane = pack::pack_plane(edges.as_ref().unwrap_or(&luma))?;
    let pack_diag = StageDiagnostics {
        duration: stage_start.elapsed(),
        metrics: StageMetrics::Pack {
            output_bytes: plane.len(),
        },
    };

    let edge_pixel_count = edges.as_ref().map(diagnostics::count_edge_pixels);
    let diagnostics = FrameDiagnostics {
        validate: validate_diag,
        luma: luma_diag,
        blur: blur_diag,
        edge_detection: edge_diag,
        pack: pack_diag,
        total_duration: total_start.elapsed(),
        summary: FrameSummary {
            mode: config.mode,
            image_width: width,
            image_height: height,
            pixel_count: dimensions.pixel_count(),
            edge_pixel_count,
        },
    };

    Ok((
        StagedFrame {
            luma,
            blurred,
            edges,
            plane,
            dimensions,
        },
        diagnostics,
    ))
}
