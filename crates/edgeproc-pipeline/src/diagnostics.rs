//! Frame transform diagnostics: per-stage timing and counts.
//!
//! These diagnostics are permanent instrumentation intended for
//! threshold tuning and per-frame budget tracking. Every call to
//! [`process_staged`](crate::process_staged) collects diagnostics
//! alongside the transform results.
//!
//! Duration measurements use [`std::time::Duration`] (platform-agnostic).
//! Timestamps are captured internally via the `web-time` crate, which
//! uses `performance.now()` on WASM and `std::time::Instant` on native.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::OutputMode;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single frame transform.
///
/// Each field captures metrics for one stage. The blur and edge
/// detection stages only run in edge mode and are `None` in luma mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDiagnostics {
    /// Stage 0: input validation.
    pub validate: StageDiagnostics,
    /// Stage 1: RGBA-to-luma reduction.
    pub luma: StageDiagnostics,
    /// Stage 2: Gaussian blur (edge mode only).
    pub blur: Option<StageDiagnostics>,
    /// Stage 3: edge detection (edge mode only).
    pub edge_detection: Option<StageDiagnostics>,
    /// Stage 4: output plane packing.
    pub pack: StageDiagnostics,
    /// Total wall-clock duration of the entire transform (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: FrameSummary,
}

/// Diagnostics for a single transform stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics (counts, sizes, etc.).
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by transform stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Input validation metrics.
    Validate {
        /// Bytes supplied by the caller.
        input_bytes: usize,
        /// Bytes the declared dimensions require.
        expected_bytes: usize,
        /// Declared frame width in pixels.
        width: u32,
        /// Declared frame height in pixels.
        height: u32,
    },
    /// Luma reduction metrics.
    Luma {
        /// Pixels reduced (`width * height`).
        pixel_count: u64,
    },
    /// Gaussian blur metrics.
    Blur {
        /// Sigma value used for the blur kernel.
        sigma: f32,
    },
    /// Edge detection metrics.
    EdgeDetection {
        /// Low threshold (before clamping).
        low_threshold: f32,
        /// High threshold (before clamping).
        high_threshold: f32,
        /// Number of edge pixels (value == 255) in the output.
        edge_pixel_count: u64,
        /// Total pixel count for computing edge density.
        total_pixel_count: u64,
    },
    /// Output packing metrics.
    Pack {
        /// Bytes in the packed output plane.
        output_bytes: usize,
    },
}

/// High-level summary counts for the entire transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSummary {
    /// Which plane was returned.
    pub mode: OutputMode,
    /// Source frame width in pixels.
    pub image_width: u32,
    /// Source frame height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Edge pixels in the output (`None` in luma mode).
    pub edge_pixel_count: Option<u64>,
}

impl FrameDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Frame Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Frame: {}x{} ({} pixels), mode {:?}",
            self.summary.image_width,
            self.summary.image_height,
            self.summary.pixel_count,
            self.summary.mode,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        // Per-stage breakdown.
        lines.push(format!(
            "{:<20} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);

        let stages: Vec<(&str, &StageDiagnostics)> = {
            let mut s = vec![("Validate", &self.validate), ("Luma", &self.luma)];
            if let Some(ref blur) = self.blur {
                s.push(("Blur", blur));
            }
            if let Some(ref edge) = self.edge_detection {
                s.push(("Edge Detection", edge));
            }
            s.push(("Pack", &self.pack));
            s
        };

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<20} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        if let Some(edge_pixels) = self.summary.edge_pixel_count {
            lines.push(String::new());
            lines.push(format!("Edge pixels: {edge_pixels}"));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Validate {
            input_bytes,
            expected_bytes,
            width,
            height,
        } => {
            format!("{input_bytes} bytes (need {expected_bytes}) for {width}x{height}")
        }
        StageMetrics::Luma { pixel_count } => format!("{pixel_count} px"),
        StageMetrics::Blur { sigma } => format!("sigma={sigma:.2}"),
        StageMetrics::EdgeDetection {
            low_threshold,
            high_threshold,
            edge_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *edge_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!(
                "low={low_threshold:.1} high={high_threshold:.1} edges={edge_pixel_count} ({density:.1}%)",
            )
        }
        StageMetrics::Pack { output_bytes } => format!("{output_bytes} bytes"),
    }
}

/// Count edge pixels (value == 255) in a plane.
pub(crate) fn count_edge_pixels(plane: &image::GrayImage) -> u64 {
    plane
        .pixels()
        .map(|p| u64::from(u8::from(p.0[0] == 255)))
        .sum()
}
