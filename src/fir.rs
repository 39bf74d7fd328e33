//! Windowed-sinc FIR design.

use alloc::vec::Vec;

use crate::fft::FftError;
use crate::num::Float;
use crate::window::{hamming, kaiser};

/// Half-length of the multirate prototype in input samples per phase.
pub const DEFAULT_MULTIRATE_HLEN: usize = 12;
/// Stopband attenuation of the multirate prototype, dB.
pub const DEFAULT_MULTIRATE_ASTOP: f64 = 80.0;

fn sinc<T: Float>(x: T) -> T {
    if x == T::zero() {
        return T::one();
    }
    let px = T::pi() * x;
    px.sin() / px
}

/// Lowpass of order `order` (`order + 1` taps) with cutoff `cutoff` relative
/// to Nyquist, shaped by `window` and scaled to unit DC gain.
pub fn fir1<T: Float>(order: usize, cutoff: T, window: &[T]) -> Result<Vec<T>, FftError> {
    if !(cutoff > T::zero() && cutoff <= T::one()) {
        return Err(FftError::InvalidParameter("cutoff must be in (0, 1]"));
    }
    if window.len() != order + 1 {
        return Err(FftError::MismatchedLengths {
            expected: order + 1,
            actual: window.len(),
        });
    }
    let center = T::from_usize(order) / T::from_f32(2.0);
    let mut h: Vec<T> = window
        .iter()
        .enumerate()
        .map(|(i, &w)| cutoff * sinc(cutoff * (T::from_usize(i) - center)) * w)
        .collect();
    let mut total = T::zero();
    for &v in &h {
        total += v;
    }
    if total == T::zero() {
        return Err(FftError::InvalidParameter("filter has zero DC gain"));
    }
    for v in h.iter_mut() {
        *v /= total;
    }
    Ok(h)
}

/// [`fir1`] with a Hamming window.
pub fn fir1_hamming<T: Float>(order: usize, cutoff: T) -> Result<Vec<T>, FftError> {
    fir1(order, cutoff, &hamming::<T>(order + 1))
}

/// Kaiser `beta` giving roughly `astop` dB of stopband attenuation.
pub fn kaiser_beta<T: Float>(astop: T) -> T {
    let a = astop.to_f64();
    let beta = if a >= 50.0 {
        0.1102 * (a - 8.71)
    } else if a > 21.0 {
        0.5842 * libm::pow(a - 21.0, 0.4) + 0.07886 * (a - 21.0)
    } else {
        0.0
    };
    T::from_f64(beta)
}

/// Prototype lowpass for a rational rate change by `interp / decim`.
pub fn design_multirate_fir<T: Float>(interp: usize, decim: usize) -> Result<Vec<T>, FftError> {
    design_multirate_fir_with(
        interp,
        decim,
        DEFAULT_MULTIRATE_HLEN,
        T::from_f64(DEFAULT_MULTIRATE_ASTOP),
    )
}

/// Kaiser-windowed prototype with `hlen` taps per phase on each side of the
/// center and `astop` dB stopband attenuation, scaled by `interp`.
pub fn design_multirate_fir_with<T: Float>(
    interp: usize,
    decim: usize,
    hlen: usize,
    astop: T,
) -> Result<Vec<T>, FftError> {
    if interp == 0 || decim == 0 || hlen == 0 {
        return Err(FftError::InvalidParameter("rates and hlen must be positive"));
    }
    let (l, m, p) = (interp, decim, hlen);
    let r = if l > 1 { l } else { m };
    // odd tap count keeps the group delay integral for some downsampling ratios
    let keep_last = m > l && l > 1 && (p * l) % m != 0;
    let order = if keep_last { 2 * p * r + 1 } else { 2 * p * r };
    let window = kaiser(order + 1, kaiser_beta(astop));
    let cutoff = T::one() / T::from_usize(l.max(m));
    let mut h = fir1(order, cutoff, &window)?;
    let gain = T::from_usize(l);
    for v in h.iter_mut() {
        *v *= gain;
    }
    if !keep_last {
        h.pop();
    }
    Ok(h)
}
