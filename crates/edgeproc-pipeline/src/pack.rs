//! Output plane packing.
//!
//! Copies the selected single-channel plane into a freshly allocated
//! buffer handed to the caller. The allocation is the transform's only
//! late-stage failure path: an allocator refusal surfaces as
//! [`PipelineError::AllocationFailure`] instead of aborting the process,
//! so a bridge can report it to the host like any other rejected frame.

use image::GrayImage;

use crate::types::PipelineError;

/// Copy a plane into a freshly allocated `width * height` byte buffer.
///
/// # Errors
///
/// Returns [`PipelineError::AllocationFailure`] when the output buffer
/// cannot be reserved.
pub fn pack_plane(plane: &GrayImage) -> Result<Vec<u8>, PipelineError> {
    let bytes = plane.as_raw().len();
    let mut out = Vec::new();
    out.try_reserve_exact(bytes)
        .map_err(|_| PipelineError::AllocationFailure { bytes })?;
    out.extend_from_slice(plane.as_raw());
    Ok(out)
}
