//! Cross-correlation of 1D profiles with sub-pixel peak refinement.
//!
//! `corr(lag) = sum_i a[i] * b[i + lag]`, where samples of `b` outside
//! `[0, n)` count as zero. The integer peak over `lag in [-n, n)` is refined
//! with a parabola through the normalised neighbours unless it sits on the
//! edge of the search range.

use crate::refine::quad1d::quad_peak_offset_1d;
use crate::trace::{trace_event, trace_span, trace_warn};
use crate::util::{PixelShiftError, PixelShiftResult};

/// Location and quality of a correlation maximum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrelationPeak {
    /// Integer lag with the largest correlation sum.
    pub lag: isize,
    /// Correlation sum at `lag`.
    pub score: f64,
    /// Sub-pixel lag estimate; equals `lag` when unrefined.
    pub offset: f64,
    /// Whether the quadratic refinement was applied.
    pub refined: bool,
}

/// Correlation sum of `a` against `b` displaced by `lag` with zero padding.
pub fn correlation_at(a: &[f64], b: &[f64], lag: isize) -> f64 {
    let n = a.len().min(b.len()) as isize;
    let start = (-lag).clamp(0, n);
    let end = (n - lag).clamp(0, n);
    let mut sum = 0.0;
    for i in start..end {
        sum += a[i as usize] * b[(i + lag) as usize];
    }
    sum
}

/// Finds the lag at which `b` best matches `a` and refines it to sub-pixel
/// precision.
///
/// Lags are scanned from `-n` upwards with a strict `>` comparison, so the
/// smallest lag wins ties. Peaks at `-n` or `n - 1` are returned unrefined, as
/// are peaks whose quadratic fit fails.
pub fn find_correlation_peak(a: &[f64], b: &[f64]) -> PixelShiftResult<CorrelationPeak> {
    if a.len() != b.len() {
        return Err(PixelShiftError::LengthMismatch {
            context: "correlation profiles",
            left: a.len(),
            right: b.len(),
        });
    }
    if a.is_empty() {
        return Err(PixelShiftError::EmptyProfile);
    }
    let n = isize::try_from(a.len()).map_err(|_| PixelShiftError::InvalidInput("profile too long"))?;

    let mut best_lag = -n;
    let mut best = f64::NEG_INFINITY;
    for lag in -n..n {
        let score = correlation_at(a, b, lag);
        if score > best {
            best = score;
            best_lag = lag;
        }
    }

    let unrefined = CorrelationPeak {
        lag: best_lag,
        score: best,
        offset: best_lag as f64,
        refined: false,
    };

    if best_lag == -n || best_lag == n - 1 {
        trace_event!("correlation_peak_on_edge", lag = best_lag, score = best);
        return Ok(unrefined);
    }
    if best <= 0.0 {
        trace_warn!(lag = best_lag, score = best, "non-positive correlation peak");
        return Ok(unrefined);
    }

    let fm = correlation_at(a, b, best_lag - 1) / best;
    let fp = correlation_at(a, b, best_lag + 1) / best;
    match quad_peak_offset_1d(fm, 1.0, fp) {
        Ok(dx) => Ok(CorrelationPeak {
            offset: best_lag as f64 + dx,
            refined: true,
            ..unrefined
        }),
        Err(_err) => {
            trace_warn!(lag = best_lag, error = %_err, "sub-pixel fit failed");
            Ok(unrefined)
        }
    }
}

/// Estimates the real-valued lag at which `b` best matches `a`.
///
/// See [`find_correlation_peak`] for the search and refinement rules.
pub fn estimate_shift(a: &[f64], b: &[f64]) -> PixelShiftResult<f64> {
    let _span = trace_span!("estimate_shift", len = a.len()).entered();
    let peak = find_correlation_peak(a, b)?;
    trace_event!(
        "shift_estimate",
        lag = peak.lag,
        offset = peak.offset,
        refined = peak.refined
    );
    Ok(peak.offset)
}

#[cfg(test)]
mod tests {
    use super::{correlation_at, estimate_shift, find_correlation_peak};
    use crate::util::PixelShiftError;

    fn gaussian(n: usize, center: f64, sigma: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let d = i as f64 - center;
                100.0 * (-0.5 * d * d / (sigma * sigma)).exp()
            })
            .collect()
    }

    #[test]
    fn correlation_uses_zero_padding() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert_eq!(correlation_at(&a, &b, 0), 4.0 + 10.0 + 18.0);
        assert_eq!(correlation_at(&a, &b, 1), 5.0 + 12.0);
        assert_eq!(correlation_at(&a, &b, -2), 3.0 * 4.0);
        assert_eq!(correlation_at(&a, &b, 3), 0.0);
        assert_eq!(correlation_at(&a, &b, -3), 0.0);
    }

    #[test]
    fn self_correlation_is_exactly_zero() {
        let a = gaussian(64, 20.3, 2.5);
        assert_eq!(estimate_shift(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn integer_shift_is_recovered() {
        let a = gaussian(80, 40.0, 3.0);
        for k in [-17isize, -5, -1, 1, 6, 23] {
            let b: Vec<f64> = (0..80)
                .map(|i| {
                    let src = i as isize - k;
                    if (0..80).contains(&src) {
                        a[src as usize]
                    } else {
                        0.0
                    }
                })
                .collect();
            let shift = estimate_shift(&a, &b).unwrap();
            assert!((shift - k as f64).abs() < 0.1, "k={k} shift={shift}");
        }
    }

    #[test]
    fn fractional_shift_is_refined() {
        let a = gaussian(64, 30.0, 3.0);
        let b = gaussian(64, 32.4, 3.0);
        let peak = find_correlation_peak(&a, &b).unwrap();
        assert_eq!(peak.lag, 2);
        assert!(peak.refined);
        assert!((peak.offset - 2.4).abs() < 0.15, "{peak:?}");
    }

    #[test]
    fn boundary_peak_is_unrefined() {
        // Only lag n - 1 pairs a's first sample with b's last.
        let a = [5.0, 0.0, 0.0, 0.0];
        let b = [0.0, 0.0, 0.0, 7.0];
        let peak = find_correlation_peak(&a, &b).unwrap();
        assert_eq!(peak.lag, 3);
        assert!(!peak.refined);
        assert_eq!(estimate_shift(&a, &b).unwrap(), 3.0);
    }

    #[test]
    fn empty_signal_stops_at_first_lag() {
        let a = [0.0; 5];
        let peak = find_correlation_peak(&a, &a).unwrap();
        assert_eq!(peak.lag, -5);
        assert!(!peak.refined);
    }

    #[test]
    fn ties_resolve_to_smallest_lag() {
        // Two identical peaks in b give equal sums at lags -2 and +2.
        let a = [0.0, 0.0, 1.0, 0.0, 0.0];
        let b = [1.0, 0.0, 0.0, 0.0, 1.0];
        let peak = find_correlation_peak(&a, &b).unwrap();
        assert_eq!(peak.lag, -2);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let err = estimate_shift(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(err, PixelShiftError::LengthMismatch { .. }));
        assert_eq!(estimate_shift(&[], &[]).unwrap_err(), PixelShiftError::EmptyProfile);
    }
}
