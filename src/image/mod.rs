//! In-memory frames.
//!
//! `Image` owns a contiguous row-major `f64` buffer together with the `Region`
//! of valid pixels. Statistics only read inside the region; background
//! subtraction mutates the buffer in place and zeroes everything outside it.

use crate::util::{PixelShiftError, PixelShiftResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod region;

pub use region::Region;

/// Owned frame of floating-point samples.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    data: Vec<f64>,
    width: usize,
    height: usize,
    region: Region,
}

impl Image {
    /// Wraps a `width * height` buffer; the valid region is the whole frame.
    pub fn new(data: Vec<f64>, width: usize, height: usize) -> PixelShiftResult<Self> {
        let expected = required_len(width, height)?;
        if data.len() != expected {
            return Err(PixelShiftError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            region: Region::full(width, height),
        })
    }

    /// Creates a frame filled with `value`.
    pub fn filled(width: usize, height: usize, value: f64) -> PixelShiftResult<Self> {
        let len = required_len(width, height)?;
        Self::new(vec![value; len], width, height)
    }

    /// Builds a frame by evaluating `f(x, y)` at every pixel.
    pub fn from_fn<F>(width: usize, height: usize, mut f: F) -> PixelShiftResult<Self>
    where
        F: FnMut(usize, usize) -> f64,
    {
        let len = required_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(data, width, height)
    }

    /// Restricts statistics and subtraction to `region`.
    pub fn with_region(mut self, region: Region) -> PixelShiftResult<Self> {
        self.set_region(region)?;
        Ok(self)
    }

    /// Replaces the valid region after checking it lies inside the frame.
    pub fn set_region(&mut self, region: Region) -> PixelShiftResult<()> {
        let fits = region.width > 0
            && region.height > 0
            && region
                .x
                .checked_add(region.width)
                .is_some_and(|end| end <= self.width)
            && region
                .y
                .checked_add(region.height)
                .is_some_and(|end| end <= self.height);
        if !fits {
            return Err(PixelShiftError::RegionOutOfBounds {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
                img_width: self.width,
                img_height: self.height,
            });
        }
        self.region = region;
        Ok(())
    }

    /// Returns the frame width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the frame height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the valid region.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Returns true when the region is smaller than the frame.
    pub fn has_overscan(&self) -> bool {
        self.region != Region::full(self.width, self.height)
    }

    /// Returns the row-major samples.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the row-major samples mutably.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Consumes the frame and returns its buffer.
    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Returns the sample at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }

    /// Returns row `y`.
    pub fn row(&self, y: usize) -> Option<&[f64]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    /// Sets every pixel outside the valid region to zero.
    pub fn zero_outside_region(&mut self) {
        if !self.has_overscan() {
            return;
        }
        let region = self.region;
        for (y, row) in self.data.chunks_exact_mut(self.width).enumerate() {
            for (x, px) in row.iter_mut().enumerate() {
                if !region.contains(x, y) {
                    *px = 0.0;
                }
            }
        }
    }
}

fn required_len(width: usize, height: usize) -> PixelShiftResult<usize> {
    if width == 0 || height == 0 {
        return Err(PixelShiftError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(PixelShiftError::InvalidDimensions { width, height })
}
