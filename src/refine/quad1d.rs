//! Quadratic 1D fitting for correlation peak refinement.

use crate::fit::fit_polynomial;
use crate::util::{PixelShiftError, PixelShiftResult};

const OFFSETS: [f64; 3] = [-1.0, 0.0, 1.0];

/// Vertex offset of the parabola through `(-1, fm)`, `(0, f0)`, `(1, fp)`.
///
/// The parabola comes from a degree-2 least-squares fit, which is exact for
/// three points. A singular fit or a vertex that is not finite (zero
/// curvature) is reported as an error so the caller can keep the integer
/// position.
pub(crate) fn quad_peak_offset_1d(fm: f64, f0: f64, fp: f64) -> PixelShiftResult<f64> {
    let p = fit_polynomial(&OFFSETS, &[fm, f0, fp], None, 2)?;
    let dx = -p[1] / (2.0 * p[2]);
    if dx.is_finite() {
        Ok(dx)
    } else {
        Err(PixelShiftError::InvalidInput("parabola has no finite vertex"))
    }
}

#[cfg(test)]
mod tests {
    use super::quad_peak_offset_1d;

    #[test]
    fn quad_peak_offset_symmetric() {
        let dx = quad_peak_offset_1d(0.9, 1.0, 0.9).unwrap();
        assert_eq!(dx, 0.0);
    }

    #[test]
    fn quad_peak_offset_shifted() {
        let f = |x: f64| 1.0 - (x - 0.25).powi(2);
        let dx = quad_peak_offset_1d(f(-1.0), f(0.0), f(1.0)).unwrap();
        assert!((dx - 0.25).abs() < 1e-9);
    }

    #[test]
    fn quad_peak_offset_flat_has_no_vertex() {
        assert!(quad_peak_offset_1d(1.0, 1.0, 1.0).is_err());
    }
}
