//! Low-level building blocks for custom pipelines.
//!
//! These expose the interpolation kernels, correlation sums, and robust
//! baseline helpers that the high-level functions are built from. Most users
//! should prefer `subtract_background`, `project_axes`, and `estimate_shift`.

pub use crate::background::interp::{bicubic_interpolate, cubic_interpolate};
pub use crate::correlate::correlation_at;
pub use crate::fit::eval_polynomial;
pub use crate::linalg::SINGULAR_EPS;
pub use crate::profile::{project_axes_with_clip, remove_baseline, DEFAULT_CLIP_SIGMA};
