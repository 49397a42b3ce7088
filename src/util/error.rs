//! Error types for pixelshift.

use thiserror::Error;

/// Result alias for pixelshift operations.
pub type PixelShiftResult<T> = std::result::Result<T, PixelShiftError>;

/// Errors that can occur when running pixelshift algorithms.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PixelShiftError {
    /// A scratch buffer could not be reserved.
    #[error("failed to allocate {context} buffer ({len} elements)")]
    AllocationFailure { context: &'static str, len: usize },
    /// Elimination found no pivot above tolerance.
    #[error("singular matrix: no usable pivot at elimination step {step}")]
    SingularMatrix { step: usize },
    /// The minimum tile size does not fit into the valid region.
    #[error(
        "degenerate tiling: min tile size {min_tile_size} does not fit region {region_width}x{region_height}"
    )]
    DegenerateTiling {
        region_width: usize,
        region_height: usize,
        min_tile_size: usize,
    },
    /// Width or height is zero or overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// The sample buffer does not match the declared dimensions.
    #[error("buffer size mismatch: expected {expected} samples, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
    /// The valid region does not lie inside the frame.
    #[error(
        "region ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height} frame"
    )]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// A region string could not be parsed.
    #[error("invalid region specification {spec:?}: {reason}")]
    InvalidRegionSpec { spec: String, reason: &'static str },
    /// Two slices that must be paired have different lengths.
    #[error("length mismatch for {context}: {left} vs {right}")]
    LengthMismatch {
        context: &'static str,
        left: usize,
        right: usize,
    },
    /// A profile passed to correlation is empty.
    #[error("empty profile")]
    EmptyProfile,
    /// Frame and reference differ in size.
    #[error("frame sizes [{width}, {height}] and [{ref_width}, {ref_height}] don't match")]
    SizeMismatch {
        width: usize,
        height: usize,
        ref_width: usize,
        ref_height: usize,
    },
    /// The input data or parameters are invalid.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// Image decoding or encoding failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
}

/// Reserves a zeroed buffer of `len` samples, reporting allocation failure
/// instead of aborting.
pub(crate) fn try_zeroed(len: usize, context: &'static str) -> PixelShiftResult<Vec<f64>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| PixelShiftError::AllocationFailure { context, len })?;
    buf.resize(len, 0.0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::{try_zeroed, PixelShiftError};

    #[test]
    fn try_zeroed_returns_requested_len() {
        let buf = try_zeroed(7, "test").unwrap();
        assert_eq!(buf.len(), 7);
        assert!(buf.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn try_zeroed_reports_capacity_overflow() {
        let err = try_zeroed(usize::MAX, "huge").unwrap_err();
        assert_eq!(
            err,
            PixelShiftError::AllocationFailure {
                context: "huge",
                len: usize::MAX,
            }
        );
    }

    #[test]
    fn singular_matrix_message_names_step() {
        let err = PixelShiftError::SingularMatrix { step: 2 };
        assert!(err.to_string().contains("step 2"));
    }
}
