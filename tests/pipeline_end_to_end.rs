use pixelshift::{
    estimate_shift, find_correlation_peak, project_axes, subtract_background, Image, Region,
    ShiftConfig, ShiftEstimator,
};

fn gaussian_star(x: f64, y: f64, cx: f64, cy: f64, peak: f64, sigma: f64) -> f64 {
    let dx = x - cx;
    let dy = y - cy;
    peak * (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp()
}

fn star_field(width: usize, height: usize, dx: f64, dy: f64) -> Image {
    let stars = [
        (30.0, 40.0, 4000.0, 2.0),
        (70.0, 25.0, 2500.0, 1.8),
        (55.0, 80.0, 6000.0, 2.2),
        (95.0, 60.0, 3000.0, 2.0),
    ];
    Image::from_fn(width, height, |x, y| {
        let (fx, fy) = (x as f64, y as f64);
        let mut v = 500.0 + 0.05 * fx;
        for &(cx, cy, peak, sigma) in &stars {
            v += gaussian_star(fx, fy, cx + dx, cy + dy, peak, sigma);
        }
        v
    })
    .unwrap()
}

#[test]
fn pipeline_measures_fractional_shift() {
    let reference = star_field(128, 112, 0.0, 0.0);
    let frame = star_field(128, 112, 2.3, -1.6);

    let cfg = ShiftConfig {
        min_tile_size: 32,
        ..ShiftConfig::default()
    };
    let shift = ShiftEstimator::new(cfg).measure(&frame, &reference).unwrap();

    assert_eq!(shift.peak_x.lag, 2);
    assert_eq!(shift.peak_y.lag, -2);
    assert!(shift.peak_x.refined && shift.peak_y.refined);
    assert!((shift.x - 2.3).abs() < 0.25, "x = {}", shift.x);
    assert!((shift.y + 1.6).abs() < 0.25, "y = {}", shift.y);
}

#[test]
fn pipeline_matches_manual_stages() {
    let reference = star_field(128, 112, 0.0, 0.0);
    let frame = star_field(128, 112, -3.0, 4.0);

    let mut r = reference.clone();
    let mut f = frame.clone();
    subtract_background(&mut r, 32).unwrap();
    subtract_background(&mut f, 32).unwrap();
    let rp = project_axes(&r);
    let fp = project_axes(&f);
    let x = estimate_shift(&rp.x, &fp.x).unwrap();
    let y = estimate_shift(&rp.y, &fp.y).unwrap();

    let cfg = ShiftConfig {
        min_tile_size: 32,
        ..ShiftConfig::default()
    };
    let shift = ShiftEstimator::new(cfg).measure(&frame, &reference).unwrap();
    assert_eq!(shift.x, x);
    assert_eq!(shift.y, y);
    assert!((x + 3.0).abs() < 0.1);
    assert!((y - 4.0).abs() < 0.1);
}

#[test]
fn identical_frames_measure_exactly_zero() {
    let frame = star_field(128, 112, 0.0, 0.0);
    let shift = ShiftEstimator::new(ShiftConfig {
        min_tile_size: 40,
        ..ShiftConfig::default()
    })
    .measure(&frame, &frame)
    .unwrap();
    assert_eq!(shift.x, 0.0);
    assert_eq!(shift.y, 0.0);
}

#[test]
fn overscan_does_not_bias_shift() {
    let region = Region::parse("[9:136,9:120]").unwrap();
    assert_eq!(region, Region::new(8, 8, 127, 111));

    let with_overscan = |dx: f64, dy: f64| {
        let field = star_field(128, 112, dx, dy);
        Image::from_fn(144, 128, |x, y| {
            if region.contains(x, y) {
                field.get(x - 8, y - 8).unwrap_or(0.0)
            } else {
                // Bright, ramped bias strip.
                20_000.0 + 10.0 * y as f64
            }
        })
        .unwrap()
        .with_region(region)
        .unwrap()
    };

    let reference = with_overscan(0.0, 0.0);
    let frame = with_overscan(1.5, 2.5);
    let shift = ShiftEstimator::new(ShiftConfig {
        min_tile_size: 32,
        ..ShiftConfig::default()
    })
    .measure(&frame, &reference)
    .unwrap();
    assert!((shift.x - 1.5).abs() < 0.25, "x = {}", shift.x);
    assert!((shift.y - 2.5).abs() < 0.25, "y = {}", shift.y);
}

#[test]
fn background_subtraction_handles_uneven_region() {
    // Three 33-pixel tiles across; the leftover column joins the last tile.
    let mut img = Image::from_fn(100, 70, |x, y| 200.0 + 0.5 * x as f64 + 0.25 * y as f64)
        .unwrap();
    subtract_background(&mut img, 30).unwrap();
    assert!(img.data().iter().all(|v| v.is_finite()));

    let mut centre = 0.0;
    let mut count = 0.0;
    for y in 20..50 {
        for x in 20..80 {
            centre += img.get(x, y).unwrap().abs();
            count += 1.0;
        }
    }
    assert!(centre / count < 2.0, "mean residual {}", centre / count);
}

#[test]
fn correlation_peak_reports_integer_lag() {
    let reference = star_field(128, 112, 0.0, 0.0);
    let frame = star_field(128, 112, 5.0, 0.0);
    let mut r = reference;
    let mut f = frame;
    subtract_background(&mut r, 32).unwrap();
    subtract_background(&mut f, 32).unwrap();
    let peak = find_correlation_peak(&project_axes(&r).x, &project_axes(&f).x).unwrap();
    assert_eq!(peak.lag, 5);
    assert!(peak.refined);
    assert!((peak.offset - 5.0).abs() < 0.05);
}
