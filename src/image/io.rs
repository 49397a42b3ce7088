//! Loading and saving frames via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Frames are read as 16-bit
//! luma. They are written either as 16-bit grayscale through `image`, or as
//! 64-bit float TIFF through `tiff` when negative or fractional residuals must
//! survive.

use crate::image::Image;
use crate::util::{PixelShiftError, PixelShiftResult};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tiff::encoder::{colortype, TiffEncoder};

/// Converts a 16-bit grayscale buffer into a frame.
pub fn image_from_gray16(img: &image::ImageBuffer<image::Luma<u16>, Vec<u16>>) -> PixelShiftResult<Image> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = img.as_raw().iter().map(|&v| f64::from(v)).collect();
    Image::new(data, width, height)
}

/// Loads an image from disk and converts it to a grayscale frame.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> PixelShiftResult<Image> {
    let img = image::open(path).map_err(|err| PixelShiftError::ImageIo {
        reason: err.to_string(),
    })?;
    image_from_gray16(&img.to_luma16())
}

/// Writes a frame as 16-bit grayscale; the format follows the file extension.
///
/// Samples are rounded and clamped to `[0, 65535]`, so negative residuals
/// left by background subtraction are written as zero.
pub fn save_gray_image<P: AsRef<Path>>(frame: &Image, path: P) -> PixelShiftResult<()> {
    let width = u32::try_from(frame.width()).map_err(|_| PixelShiftError::InvalidDimensions {
        width: frame.width(),
        height: frame.height(),
    })?;
    let height =
        u32::try_from(frame.height()).map_err(|_| PixelShiftError::InvalidDimensions {
            width: frame.width(),
            height: frame.height(),
        })?;
    let raw: Vec<u16> = frame
        .data()
        .iter()
        .map(|&v| v.round().clamp(0.0, f64::from(u16::MAX)) as u16)
        .collect();
    let buffer = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(width, height, raw)
        .ok_or(PixelShiftError::BufferSizeMismatch {
            expected: frame.width() * frame.height(),
            got: frame.data().len(),
        })?;
    buffer.save(path).map_err(|err| PixelShiftError::ImageIo {
        reason: err.to_string(),
    })
}

/// Writes a frame as a single-channel 64-bit float TIFF, keeping every sample
/// exactly.
pub fn save_float_tiff<P: AsRef<Path>>(frame: &Image, path: P) -> PixelShiftResult<()> {
    let width = u32::try_from(frame.width()).map_err(|_| PixelShiftError::InvalidDimensions {
        width: frame.width(),
        height: frame.height(),
    })?;
    let height =
        u32::try_from(frame.height()).map_err(|_| PixelShiftError::InvalidDimensions {
            width: frame.width(),
            height: frame.height(),
        })?;
    let io_err = |err: &dyn std::fmt::Display| PixelShiftError::ImageIo {
        reason: err.to_string(),
    };
    let file = File::create(path).map_err(|err| io_err(&err))?;
    let mut writer = BufWriter::new(file);
    {
        let mut encoder = TiffEncoder::new(&mut writer).map_err(|err| io_err(&err))?;
        encoder
            .write_image::<colortype::Gray64Float>(width, height, frame.data())
            .map_err(|err| io_err(&err))?;
    }
    writer.flush().map_err(|err| io_err(&err))
}

/// Writes `frame` in the format implied by the extension of `path`.
///
/// `.tif` and `.tiff` get a lossless float TIFF; anything else goes through
/// [`save_gray_image`].
pub fn save_frame<P: AsRef<Path>>(frame: &Image, path: P) -> PixelShiftResult<()> {
    let path = path.as_ref();
    let is_tiff = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"));
    if is_tiff {
        save_float_tiff(frame, path)
    } else {
        save_gray_image(frame, path)
    }
}

#[cfg(test)]
mod tests {
    use super::{image_from_gray16, save_frame};
    use crate::image::Image;
    use std::fs::File;
    use tiff::decoder::{Decoder, DecodingResult};

    #[test]
    fn float_tiff_keeps_negative_residuals() {
        let frame = Image::new(vec![-12.25, 0.1, 3.3, 70000.5, -0.0, 1e-9], 3, 2).unwrap();
        let path = std::env::temp_dir().join(format!(
            "pixelshift-float-{}.tiff",
            std::process::id()
        ));
        save_frame(&frame, &path).unwrap();

        let mut decoder = Decoder::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (3, 2));
        let data = match decoder.read_image().unwrap() {
            DecodingResult::F64(data) => data,
            _ => panic!("expected 64-bit float samples"),
        };
        std::fs::remove_file(&path).ok();
        assert_eq!(data, frame.data());
    }

    #[test]
    fn gray16_converts_samples() {
        let buf = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(
            2,
            2,
            vec![0, 1, 1000, 65535],
        )
        .unwrap();
        let frame = image_from_gray16(&buf).unwrap();
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.data(), &[0.0, 1.0, 1000.0, 65535.0]);
    }
}
