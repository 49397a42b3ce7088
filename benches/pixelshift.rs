use criterion::{criterion_group, criterion_main, Criterion};
use pixelshift::{
    estimate_shift, project_axes, solve_linear_system, subtract_background, Image, ShiftConfig,
    ShiftEstimator,
};
use std::hint::black_box;

fn make_frame(width: usize, height: usize, dx: f64, dy: f64) -> Image {
    Image::from_fn(width, height, |x, y| {
        let (fx, fy) = (x as f64, y as f64);
        let mut v = 800.0 + 0.02 * fx + 0.01 * fy;
        for i in 0..24 {
            let cx = 40.0 + ((i * 97) % (width - 80)) as f64 + dx;
            let cy = 40.0 + ((i * 61) % (height - 80)) as f64 + dy;
            let r2 = (fx - cx).powi(2) + (fy - cy).powi(2);
            v += 3000.0 * (-r2 / 8.0).exp();
        }
        v
    })
    .unwrap()
}

fn bench_pipeline(c: &mut Criterion) {
    let width = 1024;
    let height = 768;
    let reference = make_frame(width, height, 0.0, 0.0);
    let frame = make_frame(width, height, 3.4, -1.7);

    c.bench_function("subtract_background_1024x768", |b| {
        b.iter(|| {
            let mut img = reference.clone();
            subtract_background(&mut img, 64).unwrap();
            black_box(img)
        });
    });

    let mut r = reference.clone();
    let mut f = frame.clone();
    subtract_background(&mut r, 64).unwrap();
    subtract_background(&mut f, 64).unwrap();
    let rp = project_axes(&r);
    let fp = project_axes(&f);

    c.bench_function("project_axes_1024x768", |b| {
        b.iter(|| black_box(project_axes(&f)));
    });

    c.bench_function("estimate_shift_1024", |b| {
        b.iter(|| black_box(estimate_shift(&rp.x, &fp.x).unwrap()));
    });

    let estimator = ShiftEstimator::new(ShiftConfig::default());
    c.bench_function("measure_shift_1024x768", |b| {
        b.iter(|| black_box(estimator.measure(&frame, &reference).unwrap()));
    });
}

fn bench_solver(c: &mut Criterion) {
    let n = 12;
    let mut system = vec![0.0; n * (n + 1)];
    for r in 0..n {
        for col in 0..=n {
            system[r * (n + 1) + col] = if r == col {
                n as f64 + 1.0
            } else {
                ((r * 7 + col * 3) % 5) as f64 * 0.1
            };
        }
    }

    c.bench_function("solve_linear_system_12", |b| {
        b.iter(|| {
            let mut m = system.clone();
            solve_linear_system(&mut m, n).unwrap();
            black_box(m)
        });
    });
}

criterion_group!(benches, bench_pipeline, bench_solver);
criterion_main!(benches);
