//! Symmetric window functions for FIR design.

use alloc::vec;
use alloc::vec::Vec;

use crate::num::Float;

/// Zeroth-order modified Bessel function of the first kind, by power series.
pub fn bessel0<T: Float>(x: T) -> T {
    let y = x * x / T::from_f32(4.0);
    let mut sum = T::one();
    let mut term = T::one();
    for k in 1..64 {
        let k = T::from_usize(k);
        term *= y / (k * k);
        sum += term;
        if term < sum * T::epsilon() {
            break;
        }
    }
    sum
}

/// Symmetric Hamming window of length `len`.
pub fn hamming<T: Float>(len: usize) -> Vec<T> {
    if len <= 1 {
        return vec![T::one(); len];
    }
    let step = T::from_f32(2.0) * T::pi() / T::from_usize(len - 1);
    let (a0, a1) = (T::from_f64(0.54), T::from_f64(0.46));
    (0..len)
        .map(|i| a0 - a1 * (step * T::from_usize(i)).cos())
        .collect()
}

/// Symmetric Kaiser window of length `len` and shape parameter `beta`.
pub fn kaiser<T: Float>(len: usize, beta: T) -> Vec<T> {
    if len <= 1 {
        return vec![T::one(); len];
    }
    let denom = bessel0(beta);
    let m = T::from_usize(len - 1) / T::from_f32(2.0);
    (0..len)
        .map(|i| {
            let r = (T::from_usize(i) - m) / m;
            let arg = T::one() - r * r;
            let arg = if arg < T::zero() { T::zero() } else { arg };
            bessel0(beta * arg.sqrt()) / denom
        })
        .collect()
}
