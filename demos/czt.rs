//! Chirp Z-Transform example.
//!
//! Zooms into a narrow band around a tone that falls between FFT bins.

use dspfft::{czt, Complex64};

fn main() {
    println!("=== CZT example ===\n");

    let n = 64;
    let f0 = 10.3 / n as f64;
    let signal: Vec<Complex64> = (0..n)
        .map(|i| Complex64::expi(2.0 * core::f64::consts::PI * f0 * i as f64))
        .collect();

    // 16 points from bin 9 to bin 11 in steps of 1/8 bin
    let step = 2.0 * core::f64::consts::PI / (8.0 * n as f64);
    let w = Complex64::expi(-step);
    let a = Complex64::expi(9.0 * 8.0 * step);
    let result = czt(&signal, 17, w, a).unwrap();
    for (k, v) in result.iter().enumerate() {
        println!("bin {:.3}: |X| = {:.3}", 9.0 + k as f64 / 8.0, v.norm());
    }
}
