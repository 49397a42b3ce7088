//! Marginal profiles of a background-subtracted frame.

use crate::image::Image;
use crate::trace::trace_span;
use crate::util::math::sigma_clipped_mean;

/// Default clip used when removing the profile baseline.
pub const DEFAULT_CLIP_SIGMA: f64 = 1.0;

/// Column and row sums of a frame after baseline removal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisProfiles {
    /// One value per column (length = frame width).
    pub x: Vec<f64>,
    /// One value per row (length = frame height).
    pub y: Vec<f64>,
}

/// Sums `image` along both axes and removes each profile's baseline.
///
/// Uses a one-sigma clip; see [`project_axes_with_clip`].
pub fn project_axes(image: &Image) -> AxisProfiles {
    project_axes_with_clip(image, DEFAULT_CLIP_SIGMA)
}

/// Sums `image` along both axes and removes each profile's baseline.
///
/// `x[i]` is the sum of column `i` and `y[j]` the sum of row `j`. Each profile
/// then has its `clip_sigma`-clipped mean subtracted and is clamped at zero,
/// leaving only the positive excess from stars.
pub fn project_axes_with_clip(image: &Image, clip_sigma: f64) -> AxisProfiles {
    let _span = trace_span!(
        "project_axes",
        width = image.width(),
        height = image.height()
    )
    .entered();

    let width = image.width();
    let mut x = vec![0.0; width];
    let mut y = vec![0.0; image.height()];
    for (row, sum) in image.data().chunks_exact(width).zip(y.iter_mut()) {
        for (&px, col) in row.iter().zip(x.iter_mut()) {
            *col += px;
            *sum += px;
        }
    }

    remove_baseline(&mut x, clip_sigma);
    remove_baseline(&mut y, clip_sigma);
    AxisProfiles { x, y }
}

/// Subtracts the sigma-clipped mean of `profile` and clamps negatives to zero.
pub fn remove_baseline(profile: &mut [f64], clip_sigma: f64) {
    let baseline = sigma_clipped_mean(profile, clip_sigma);
    for v in profile.iter_mut() {
        *v = (*v - baseline).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::{project_axes, remove_baseline};
    use crate::image::Image;

    #[test]
    fn sums_follow_axes() {
        // A single bright pixel at (3, 1) on a flat floor.
        let img = Image::from_fn(6, 4, |x, y| if (x, y) == (3, 1) { 100.0 } else { 1.0 })
            .unwrap();
        let profiles = project_axes(&img);
        assert_eq!(profiles.x.len(), 6);
        assert_eq!(profiles.y.len(), 4);

        let peak_x = profiles
            .x
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        assert_eq!(peak_x, Some(3));
        assert_eq!(profiles.x[0], 0.0);
        assert_eq!(profiles.x[3], 99.0);
        assert_eq!(profiles.y[1], 99.0);
        assert_eq!(profiles.y[2], 0.0);
    }

    #[test]
    fn baseline_is_clamped_at_zero() {
        let mut profile = vec![5.0, 4.0, 6.0, 5.0, 5.0, 40.0, 5.0, 4.0, 6.0, 5.0];
        remove_baseline(&mut profile, 1.0);
        assert!(profile.iter().all(|&v| v >= 0.0));
        assert!((profile[5] - 35.0).abs() < 1e-12);
        assert_eq!(profile[1], 0.0);
    }

    #[test]
    fn empty_clip_uses_raw_mean() {
        // Both samples sit exactly one std from the mean, so none survive the
        // strict clip and the baseline is the raw mean.
        let mut profile = vec![0.0, 10.0];
        remove_baseline(&mut profile, 1.0);
        assert_eq!(profile, vec![0.0, 5.0]);
    }

    #[test]
    fn flat_frame_projects_to_zero() {
        let img = Image::filled(8, 5, 3.0).unwrap();
        let profiles = project_axes(&img);
        assert!(profiles.x.iter().all(|&v| v == 0.0));
        assert!(profiles.y.iter().all(|&v| v == 0.0));
    }
}
