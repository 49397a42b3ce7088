//! PixelShift measures the sub-pixel translation between two astronomical
//! frames.
//!
//! Each frame has its smooth sky background removed (tile medians joined by a
//! bicubic surface), is collapsed into x and y profiles, and the profiles are
//! cross-correlated with a quadratic refinement of the peak. The least-squares
//! solver and polynomial fit used for the refinement are public as well.
//!
//! ```
//! use pixelshift::{estimate_shift, subtract_background, project_axes, Image};
//!
//! let star = |cx: f64, cy: f64| {
//!     move |x: usize, y: usize| {
//!         let (dx, dy) = (x as f64 - cx, y as f64 - cy);
//!         100.0 + 5000.0 * (-(dx * dx + dy * dy) / 8.0).exp()
//!     }
//! };
//! let mut reference = Image::from_fn(64, 64, star(30.0, 28.0)).unwrap();
//! let mut frame = Image::from_fn(64, 64, star(33.0, 26.0)).unwrap();
//! subtract_background(&mut reference, 16).unwrap();
//! subtract_background(&mut frame, 16).unwrap();
//!
//! let r = project_axes(&reference);
//! let f = project_axes(&frame);
//! let dx = estimate_shift(&r.x, &f.x).unwrap();
//! let dy = estimate_shift(&r.y, &f.y).unwrap();
//! assert!((dx - 3.0).abs() < 0.5);
//! assert!((dy + 2.0).abs() < 0.5);
//! ```

pub mod background;
pub mod correlate;
pub mod fit;
pub mod image;
pub mod linalg;
pub mod lowlevel;
pub mod profile;
mod refine;
pub mod shift;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use image::io;

pub use background::{subtract_background, BackgroundMap, TileGrid};
pub use correlate::{estimate_shift, find_correlation_peak, CorrelationPeak};
pub use fit::{fit_linear, fit_polynomial, BasisFunctions, Polynomial};
pub use image::{Image, Region};
pub use linalg::{solve_linear_system, AugmentedMatrix};
pub use profile::{project_axes, AxisProfiles};
pub use shift::{measure_frame_shift, FrameShift, ShiftConfig, ShiftEstimator};
pub use util::{PixelShiftError, PixelShiftResult};
