//! Robust statistics shared by the background and profile stages.

/// Sorts `values` in place and returns the element at `len / 2`.
///
/// For even lengths this is the upper of the two middle samples; no averaging
/// is done. Ordering is IEEE total order, so NaN samples sort to the ends
/// deterministically. Returns `None` for an empty slice.
pub(crate) fn median_in_place(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);
    Some(values[values.len() / 2])
}

/// Mean of the samples lying strictly within `sigma` standard deviations of
/// the raw mean.
///
/// The standard deviation is the population one. When no sample survives the
/// clip (e.g. a constant input with zero spread) the raw mean is returned.
pub(crate) fn sigma_clipped_mean(data: &[f64], sigma: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let var = data.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let limit = sigma * var.sqrt();

    let mut total = 0.0;
    let mut count = 0usize;
    for &v in data {
        if (v - mean).abs() < limit {
            total += v;
            count += 1;
        }
    }

    if count == 0 {
        mean
    } else {
        total / count as f64
    }
}
