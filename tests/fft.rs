// Test intent: checks every engine against a naive DFT and the algebraic
// properties of the transform.
use dspfft::fft::{classify, EngineKind, FftPlan, LengthClass};
use dspfft::tables::TableCache;
use dspfft::{czt, Complex64, FftError, FftPlanner};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn slow_dft(x: &[Complex64]) -> Vec<Complex64> {
    let n = x.len();
    (0..n)
        .map(|k| {
            x.iter().enumerate().fold(Complex64::zero(), |acc, (j, &v)| {
                let ang = -2.0 * std::f64::consts::PI * ((j * k) % n) as f64 / n as f64;
                acc + v * Complex64::expi(ang)
            })
        })
        .collect()
}

fn random_signal(rng: &mut StdRng, n: usize) -> Vec<Complex64> {
    (0..n)
        .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
        .collect()
}

fn assert_close(a: &[Complex64], b: &[Complex64], tol: f64) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert!((*x - *y).norm() <= tol, "bin {i}: {x:?} vs {y:?}");
    }
}

#[test]
fn all_engines_match_slow_dft() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut planner = FftPlanner::<f64>::new();
    for n in 2..=64 {
        let x = random_signal(&mut rng, n);
        let y = planner.fft(&x).unwrap();
        assert_close(&y, &slow_dft(&x), 1e-9 * n as f64);
    }
}

#[test]
fn large_prime_and_composite_lengths() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut planner = FftPlanner::<f64>::new();
    for n in [97usize, 127, 131, 210, 243, 500, 1000, 1009] {
        let x = random_signal(&mut rng, n);
        let y = planner.fft(&x).unwrap();
        assert_close(&y, &slow_dft(&x), 1e-8 * n as f64);
    }
}

#[test]
fn round_trip_recovers_input() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut planner = FftPlanner::<f64>::new();
    for n in [1usize, 2, 3, 4, 7, 8, 15, 16, 31, 48, 64, 101, 255, 256, 360] {
        let x = random_signal(&mut rng, n);
        let y = planner.fft(&x).unwrap();
        let back = planner.ifft(&y).unwrap();
        assert_close(&back, &x, 1e-10);
    }
}

#[test]
fn known_vectors() {
    let mut planner = FftPlanner::<f64>::new();
    let real = [1.0, 2.0, 3.0, 4.0].map(|v| Complex64::new(v, 0.0));
    assert_close(
        &planner.fft(&real).unwrap(),
        &[
            Complex64::new(10.0, 0.0),
            Complex64::new(-2.0, 2.0),
            Complex64::new(-2.0, 0.0),
            Complex64::new(-2.0, -2.0),
        ],
        1e-12,
    );
    let diag = [1.0, 2.0, 3.0, 4.0].map(|v| Complex64::new(v, v));
    assert_close(
        &planner.fft(&diag).unwrap(),
        &[
            Complex64::new(10.0, 10.0),
            Complex64::new(-4.0, 0.0),
            Complex64::new(-2.0, -2.0),
            Complex64::new(0.0, -4.0),
        ],
        1e-12,
    );
}

#[test]
fn linearity() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut planner = FftPlanner::<f64>::new();
    for n in [12usize, 32, 37, 90] {
        let x = random_signal(&mut rng, n);
        let z = random_signal(&mut rng, n);
        let (a, b) = (Complex64::new(0.5, -1.5), Complex64::new(2.0, 0.25));
        let mix: Vec<Complex64> = x.iter().zip(&z).map(|(&p, &q)| a * p + b * q).collect();
        let fx = planner.fft(&x).unwrap();
        let fz = planner.fft(&z).unwrap();
        let expected: Vec<Complex64> = fx.iter().zip(&fz).map(|(&p, &q)| a * p + b * q).collect();
        assert_close(&planner.fft(&mix).unwrap(), &expected, 1e-9);
    }
}

#[test]
fn parseval() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut planner = FftPlanner::<f64>::new();
    for n in [16usize, 30, 53, 128] {
        let x = random_signal(&mut rng, n);
        let y = planner.fft(&x).unwrap();
        let time: f64 = x.iter().map(|v| v.norm_sqr()).sum();
        let freq: f64 = y.iter().map(|v| v.norm_sqr()).sum::<f64>() / n as f64;
        assert!((time - freq).abs() < 1e-9 * time.max(1.0), "n={n}");
    }
}

#[test]
fn chirp_z_on_unit_circle_is_the_dft() {
    let mut rng = StdRng::seed_from_u64(42);
    for n in [5usize, 16, 43, 100] {
        let x = random_signal(&mut rng, n);
        let w = Complex64::expi(-2.0 * std::f64::consts::PI / n as f64);
        let y = czt(&x, n, w, Complex64::one()).unwrap();
        assert_close(&y, &slow_dft(&x), 1e-9 * n as f64);
    }
}

#[test]
fn real_and_complex_paths_agree() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut planner = FftPlanner::<f64>::new();
    for n in [2usize, 9, 10, 64, 97, 150] {
        let x: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let xc: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        let real = planner.rfft(&x).unwrap();
        let complex = planner.fft(&xc).unwrap();
        assert_close(&real, &complex, 1e-10);
        let back = planner.irfft(&real[..n / 2 + 1], n).unwrap();
        for (a, b) in back.iter().zip(&x) {
            assert!((a - b).abs() < 1e-10);
        }
    }
}

#[test]
fn classification_is_stable() {
    for n in 1..500 {
        let first = classify(n).unwrap();
        assert_eq!(classify(n).unwrap(), first);
        if n.is_power_of_two() {
            assert_eq!(first, LengthClass::PowerOfTwo);
        }
    }
    assert_eq!(classify(0), Err(FftError::EmptyInput));
}

#[test]
fn engine_choice_follows_classification() {
    let mut tables = TableCache::<f64>::new();
    let cases = [
        (4, EngineKind::Small),
        (1024, EngineKind::Radix2),
        (29, EngineKind::Prime),
        (4099, EngineKind::Prime),
        (96, EngineKind::MixedRadix),
        (225, EngineKind::MixedRadix),
    ];
    for (n, kind) in cases {
        assert_eq!(FftPlan::new(n, false, &mut tables).unwrap().kind(), kind, "n={n}");
    }
}

#[test]
fn cached_plans_give_identical_results() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut planner = FftPlanner::<f64>::new();
    let x = random_signal(&mut rng, 180);
    let first = planner.fft(&x).unwrap();
    for _ in 0..3 {
        assert_eq!(planner.fft(&x).unwrap(), first);
    }
    planner.clear();
    assert_eq!(planner.fft(&x).unwrap(), first);
}

#[test]
fn empty_and_mismatched_inputs() {
    let mut planner = FftPlanner::<f64>::new();
    assert_eq!(planner.fft(&[]), Err(FftError::EmptyInput));
    let mut plan = planner.plan_fft(8).unwrap();
    let x = vec![Complex64::zero(); 8];
    let mut y = vec![Complex64::zero(); 7];
    assert_eq!(
        plan.solve(&x, &mut y),
        Err(FftError::MismatchedLengths { expected: 8, actual: 7 })
    );
}
