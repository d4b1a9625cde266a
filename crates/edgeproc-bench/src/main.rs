//! edgeproc-bench: CLI tool for transform parameter experimentation and
//! diagnostics.
//!
//! Decodes an image file, feeds its raw RGBA pixels through the frame
//! transform with configurable parameters, and prints detailed
//! per-stage diagnostics. Useful for:
//!
//! - Tuning hysteresis thresholds and blur sigma against real frames
//! - Measuring per-stage durations against a per-frame budget
//! - Inspecting the output plane visually (`--output` writes a PNG)
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin edgeproc-bench -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use edgeproc_pipeline::diagnostics::FrameDiagnostics;
use edgeproc_pipeline::{FrameConfig, OutputMode};

/// Frame transform parameter experimentation and diagnostics for edgeproc.
///
/// Runs the luma/edge transform on a given image with configurable
/// parameters and prints detailed per-stage timing and count diagnostics.
#[derive(Parser)]
#[command(name = "edgeproc-bench", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Produce the edge map instead of the luma plane.
    #[arg(long)]
    edges: bool,

    /// Gaussian blur sigma (edge mode only; <= 0 disables the blur).
    #[arg(long, default_value_t = FrameConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Hysteresis low threshold.
    #[arg(long, default_value_t = FrameConfig::DEFAULT_LOW_THRESHOLD)]
    low_threshold: f32,

    /// Hysteresis high threshold.
    #[arg(long, default_value_t = FrameConfig::DEFAULT_HIGH_THRESHOLD)]
    high_threshold: f32,

    /// Write the output plane to a PNG file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Full frame config as a JSON string.
    ///
    /// When provided, all other transform parameter flags are ignored.
    /// The JSON must be a valid `FrameConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`FrameConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<FrameConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(FrameConfig {
        mode: OutputMode::from_edges_flag(cli.edges),
        blur_sigma: cli.blur_sigma,
        low_threshold: cli.low_threshold,
        high_threshold: cli.high_threshold,
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let rgba = match image::load_from_memory(&image_bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Error decoding {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };
    let (width, height) = rgba.dimensions();

    eprintln!(
        "Image: {} ({width}x{height}, {} bytes raw RGBA)",
        cli.image_path.display(),
        rgba.as_raw().len(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match edgeproc_pipeline::process_staged(rgba.as_raw(), width, height, &config) {
            Ok((staged, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                // Write the output plane on the first run only.
                if run == 0
                    && let Some(ref output_path) = cli.output
                    && let Err(code) = write_plane(output_path, &staged.plane, width, height)
                {
                    return code;
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Transform error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// Write a packed plane as a grayscale PNG.
fn write_plane(path: &Path, plane: &[u8], width: u32, height: u32) -> Result<(), ExitCode> {
    let Some(img) = image::GrayImage::from_raw(width, height, plane.to_vec()) else {
        eprintln!("Error: output plane does not fit {width}x{height}");
        return Err(ExitCode::FAILURE);
    };
    match img.save(path) {
        Ok(()) => {
            eprintln!("Output plane written to {}", path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Error writing {}: {e}", path.display());
            Err(ExitCode::FAILURE)
        }
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&FrameDiagnostics) -> Option<std::time::Duration>;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[FrameDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<20} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(36));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Validate", |d| Some(d.validate.duration)),
        ("Luma", |d| Some(d.luma.duration)),
        ("Blur", |d| d.blur.as_ref().map(|s| s.duration)),
        ("Edge Detection", |d| {
            d.edge_detection.as_ref().map(|s| s.duration)
        }),
        ("Pack", |d| Some(d.pack.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        println!("{name:<20} {stage_mean:>10.3}ms");
    }
}
