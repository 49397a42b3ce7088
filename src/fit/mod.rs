//! Weighted linear least-squares fits over arbitrary basis functions.

use crate::linalg::AugmentedMatrix;
use crate::util::error::try_zeroed;
use crate::util::{PixelShiftError, PixelShiftResult};

/// Generator of the basis values a linear model is fitted over.
pub trait BasisFunctions {
    /// Number of basis functions (and fitted coefficients).
    fn num_params(&self) -> usize;

    /// Writes the value of every basis function at `x` into `out`.
    ///
    /// `out.len()` equals [`num_params`](Self::num_params).
    fn evaluate(&self, x: f64, out: &mut [f64]);
}

/// Monomial basis `{1, x, x^2, ..., x^degree}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Polynomial {
    /// Highest power in the basis.
    pub degree: usize,
}

impl BasisFunctions for Polynomial {
    fn num_params(&self) -> usize {
        self.degree + 1
    }

    fn evaluate(&self, x: f64, out: &mut [f64]) {
        let mut term = 1.0;
        for slot in out.iter_mut() {
            *slot = term;
            term *= x;
        }
    }
}

/// Fits the coefficients of `basis` to `(x, y)` by weighted least squares.
///
/// `sigma` holds per-sample standard deviations; samples are weighted by
/// `1 / sigma^2`, or uniformly when `None`. Underdetermined or degenerate
/// inputs surface as [`PixelShiftError::SingularMatrix`].
pub fn fit_linear<B: BasisFunctions + ?Sized>(
    x: &[f64],
    y: &[f64],
    sigma: Option<&[f64]>,
    basis: &B,
) -> PixelShiftResult<Vec<f64>> {
    if x.len() != y.len() {
        return Err(PixelShiftError::LengthMismatch {
            context: "fit samples x/y",
            left: x.len(),
            right: y.len(),
        });
    }
    if let Some(sigma) = sigma {
        if sigma.len() != x.len() {
            return Err(PixelShiftError::LengthMismatch {
                context: "fit samples x/sigma",
                left: x.len(),
                right: sigma.len(),
            });
        }
    }

    let rows = basis.num_params();
    let mut system = AugmentedMatrix::zeros(rows)?;
    let mut values = try_zeroed(rows, "basis values")?;

    for (i, (&xi, &yi)) in x.iter().zip(y).enumerate() {
        basis.evaluate(xi, &mut values);
        let var = sigma.map_or(1.0, |s| s[i] * s[i]);
        for j in 0..rows {
            for k in 0..rows {
                system.accumulate(j, k, values[j] * values[k] / var);
            }
            system.accumulate(j, rows, yi * values[j] / var);
        }
    }

    system.solve()
}

/// Fits a polynomial of `degree`; coefficients are returned lowest order first.
pub fn fit_polynomial(
    x: &[f64],
    y: &[f64],
    sigma: Option<&[f64]>,
    degree: usize,
) -> PixelShiftResult<Vec<f64>> {
    fit_linear(x, y, sigma, &Polynomial { degree })
}

/// Evaluates a polynomial with lowest-order-first coefficients at `x`.
pub fn eval_polynomial(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}
