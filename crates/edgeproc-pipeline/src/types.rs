//! Shared types for the edgeproc frame transform.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference the
/// single-channel planes without depending on `image` directly.
pub use image::GrayImage;

/// Frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count (`width * height`).
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Which single-channel plane the transform returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// Return the luma plane directly.
    #[default]
    Luma,
    /// Return the edge map derived from the luma plane.
    Edges,
}

impl OutputMode {
    /// Map the host-side boolean flag to a mode.
    ///
    /// Bridge callers (the worker, host UIs) express the mode as a
    /// single `useEdges` boolean; the core API uses the enum.
    #[must_use]
    pub const fn from_edges_flag(use_edges: bool) -> Self {
        if use_edges { Self::Edges } else { Self::Luma }
    }
}

/// Configuration for a single frame transform.
///
/// All parameters have named default constants so bridge code and the
/// bench CLI cannot silently diverge from the library defaults.
///
/// # Threshold invariants
///
/// `high_threshold` must be at least [`edge::MIN_THRESHOLD`](crate::edge::MIN_THRESHOLD)
/// and `low_threshold` must not exceed `high_threshold`. Both are
/// clamped inside [`edge::detect_edges`](crate::edge::detect_edges), so
/// out-of-range values degrade gracefully instead of producing a
/// degenerate edge map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Which plane to return: luma or edges.
    pub mode: OutputMode,

    /// Gaussian blur sigma applied before gradient computation in edge
    /// mode. Non-positive values skip the blur. Ignored in luma mode.
    pub blur_sigma: f32,

    /// Hysteresis low threshold. Pixels with suppressed gradient
    /// magnitude between `low_threshold` and `high_threshold` become
    /// edges only when 8-connected to a strong edge.
    pub low_threshold: f32,

    /// Hysteresis high threshold. Pixels with suppressed gradient
    /// magnitude at or above this value are definite edges.
    pub high_threshold: f32,
}

impl FrameConfig {
    /// Default Gaussian blur sigma (kernel support is roughly 5x5).
    pub const DEFAULT_BLUR_SIGMA: f32 = 1.4;
    /// Default hysteresis low threshold.
    pub const DEFAULT_LOW_THRESHOLD: f32 = 80.0;
    /// Default hysteresis high threshold.
    pub const DEFAULT_HIGH_THRESHOLD: f32 = 150.0;
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            mode: OutputMode::default(),
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            low_threshold: Self::DEFAULT_LOW_THRESHOLD,
            high_threshold: Self::DEFAULT_HIGH_THRESHOLD,
        }
    }
}

/// Result of a single frame transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameResult {
    /// The packed single-channel plane, exactly `width * height` bytes.
    pub plane: Vec<u8>,

    /// Dimensions of the source frame in pixels.
    ///
    /// The plane has the same shape; bridge callers need the dimensions
    /// to size the texture or canvas they upload the plane into.
    pub dimensions: Dimensions,
}

/// Result of a frame transform with all intermediate planes preserved.
///
/// Produced by [`process_staged`](crate::process_staged) for preview
/// UIs and the bench CLI. Stages that are skipped in luma mode have
/// `None` fields.
///
/// Note: does not derive `PartialEq` because `GrayImage` does not
/// implement it.
#[derive(Debug, Clone)]
pub struct StagedFrame {
    /// Stage 1: luma plane reduced from the RGBA input.
    pub luma: GrayImage,
    /// Stage 2: Gaussian-blurred luma (`None` in luma mode).
    pub blurred: Option<GrayImage>,
    /// Stage 3: binary edge map (`None` in luma mode).
    pub edges: Option<GrayImage>,
    /// Stage 4: the packed output plane, exactly `width * height` bytes.
    pub plane: Vec<u8>,
    /// Source frame dimensions in pixels.
    pub dimensions: Dimensions,
}

/// Errors that can occur during a frame transform.
///
/// Both variants are terminal for the call: the transform never returns
/// a truncated or partially-written plane. Serde derives let the error
/// cross the worker boundary as JSON.
#[derive(Debug, thiserror::Error, Serialize, Deserialize)]
pub enum PipelineError {
    /// The input buffer or dimensions violate the frame contract.
    /// Detected before any processing; no partial output is produced.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The output plane could not be allocated.
    #[error("failed to allocate {bytes} byte output plane")]
    AllocationFailure {
        /// Requested allocation size in bytes.
        bytes: usize,
    },
}
