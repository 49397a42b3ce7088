//! Frame-to-reference shift measurement.
//!
//! Both frames are background subtracted, collapsed into axis profiles, and
//! the reference profile is correlated against the frame profile on each axis.

use crate::background::subtract_background;
use crate::correlate::{find_correlation_peak, CorrelationPeak};
use crate::image::Image;
use crate::profile::{project_axes_with_clip, AxisProfiles, DEFAULT_CLIP_SIGMA};
use crate::trace::{trace_event, trace_span};
use crate::util::{PixelShiftError, PixelShiftResult};

/// Configuration for shift measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShiftConfig {
    /// Minimum background tile size in pixels; should be much larger than the
    /// stellar FWHM.
    pub min_tile_size: usize,
    /// Clip threshold, in standard deviations, for the profile baseline.
    pub clip_sigma: f64,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            min_tile_size: 64,
            clip_sigma: DEFAULT_CLIP_SIGMA,
        }
    }
}

impl ShiftConfig {
    /// Validates configuration values.
    pub fn validate(&self) -> PixelShiftResult<()> {
        if self.min_tile_size == 0 {
            return Err(PixelShiftError::InvalidInput("min_tile_size must be >= 1"));
        }
        if !self.clip_sigma.is_finite() || self.clip_sigma <= 0.0 {
            return Err(PixelShiftError::InvalidInput(
                "clip_sigma must be finite and > 0",
            ));
        }
        Ok(())
    }
}

/// Measured translation of a frame relative to its reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameShift {
    /// Shift along x in pixels.
    pub x: f64,
    /// Shift along y in pixels.
    pub y: f64,
    /// Correlation peak found on the x profiles.
    pub peak_x: CorrelationPeak,
    /// Correlation peak found on the y profiles.
    pub peak_y: CorrelationPeak,
}

/// Measures frame shifts with a fixed configuration.
#[derive(Clone, Debug, Default)]
pub struct ShiftEstimator {
    cfg: ShiftConfig,
}

impl ShiftEstimator {
    /// Creates an estimator with the given configuration.
    pub fn new(cfg: ShiftConfig) -> Self {
        Self { cfg }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ShiftConfig {
        &self.cfg
    }

    /// Background subtracts `frame` in place and returns its axis profiles.
    pub fn prepare(&self, frame: &mut Image) -> PixelShiftResult<AxisProfiles> {
        self.cfg.validate()?;
        subtract_background(frame, self.cfg.min_tile_size)?;
        Ok(project_axes_with_clip(frame, self.cfg.clip_sigma))
    }

    /// Measures the shift of `frame` relative to `reference`.
    ///
    /// Inputs are left untouched; background subtraction runs on copies.
    pub fn measure(&self, frame: &Image, reference: &Image) -> PixelShiftResult<FrameShift> {
        let mut frame = frame.clone();
        let mut reference = reference.clone();
        self.measure_in_place(&mut frame, &mut reference)
    }

    /// Measures the shift of `frame` relative to `reference`, background
    /// subtracting both in place.
    pub fn measure_in_place(
        &self,
        frame: &mut Image,
        reference: &mut Image,
    ) -> PixelShiftResult<FrameShift> {
        let _span = trace_span!(
            "measure_shift",
            width = frame.width(),
            height = frame.height(),
            min_tile_size = self.cfg.min_tile_size
        )
        .entered();

        if frame.width() != reference.width() || frame.height() != reference.height() {
            return Err(PixelShiftError::SizeMismatch {
                width: frame.width(),
                height: frame.height(),
                ref_width: reference.width(),
                ref_height: reference.height(),
            });
        }

        let frame_profiles = self.prepare(frame)?;
        let ref_profiles = self.prepare(reference)?;

        let peak_x = find_correlation_peak(&ref_profiles.x, &frame_profiles.x)?;
        let peak_y = find_correlation_peak(&ref_profiles.y, &frame_profiles.y)?;
        trace_event!("frame_shift", x = peak_x.offset, y = peak_y.offset);

        Ok(FrameShift {
            x: peak_x.offset,
            y: peak_y.offset,
            peak_x,
            peak_y,
        })
    }
}

/// Measures the shift of `frame` relative to `reference` using `cfg`.
pub fn measure_frame_shift(
    frame: &Image,
    reference: &Image,
    cfg: ShiftConfig,
) -> PixelShiftResult<FrameShift> {
    ShiftEstimator::new(cfg).measure(frame, reference)
}
