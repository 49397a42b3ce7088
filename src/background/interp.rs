//! Catmull-Rom cubic kernels for the background surface.

/// Four-point Catmull-Rom interpolation between `p[1]` and `p[2]`.
///
/// `t` is the fractional position in `[0, 1)`; `t = 0` yields `p[1]` exactly
/// and the tangents come from the neighbouring differences `p[2] - p[0]` and
/// `p[3] - p[1]`.
///
/// The polynomial is expanded around `p[1]`, so equal control points return
/// that value exactly.
#[inline]
pub fn cubic_interpolate(p: &[f64; 4], t: f64) -> f64 {
    let d0 = p[0] - p[1];
    let d2 = p[2] - p[1];
    let d3 = p[3] - p[1];
    p[1] + 0.5 * t * (d2 - d0 + t * (2.0 * d0 + 4.0 * d2 - d3 + t * (d3 - d0 - 3.0 * d2)))
}

/// Separable bicubic interpolation over a row-major 4x4 control grid.
///
/// Each row is interpolated along x at `tx`, then the four results are
/// interpolated along y at `ty`.
#[inline]
pub fn bicubic_interpolate(p: &[[f64; 4]; 4], tx: f64, ty: f64) -> f64 {
    let column = [
        cubic_interpolate(&p[0], tx),
        cubic_interpolate(&p[1], tx),
        cubic_interpolate(&p[2], tx),
        cubic_interpolate(&p[3], tx),
    ];
    cubic_interpolate(&column, ty)
}
