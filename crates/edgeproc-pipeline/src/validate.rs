//! Input frame validation.
//!
//! Checks the RGBA buffer against the declared dimensions before any
//! pixel is read. This is the first step of the transform: a frame that
//! fails here produces no output at all.

use crate::types::PipelineError;

/// Bytes per RGBA8888 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Expected RGBA buffer length for a `width` x `height` frame.
///
/// Returns `None` when the product overflows `usize` (only reachable on
/// 32-bit targets with absurd dimensions, but the multiplication is
/// checked rather than assumed).
#[must_use]
pub fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(BYTES_PER_PIXEL)
}

/// Validate an RGBA frame buffer against its declared dimensions.
///
/// Returns the expected byte length on success. Buffers longer than
/// expected are accepted; the trailing bytes are ignored by later
/// stages (callers may hand over a pooled buffer larger than one frame).
///
/// # Errors
///
/// Returns [`PipelineError::InvalidInput`] when either dimension is
/// zero, the expected size overflows, or the buffer holds fewer than
/// `width * height * 4` bytes.
pub fn validate_frame(rgba: &[u8], width: u32, height: u32) -> Result<usize, PipelineError> {
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidInput(format!(
            "dimensions must be positive, got {width}x{height}",
        )));
    }

    let expected = expected_len(width, height).ok_or_else(|| {
        PipelineError::InvalidInput(format!("frame size {width}x{height} overflows"))
    })?;

    if rgba.len() < expected {
        return Err(PipelineError::InvalidInput(format!(
            "buffer holds {} bytes but {width}x{height} RGBA needs {expected}",
            rgba.len(),
        )));
    }

    Ok(expected)
}
