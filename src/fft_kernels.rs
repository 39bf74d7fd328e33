//! Closed-form in-place transforms for tiny lengths.
//!
//! Lengths 1, 2, 4 and 8 back the small-size fast path of the planner;
//! lengths 2, 3 and 5 are the closed-form leaves of the mixed-radix tree.

use crate::num::{Complex, Float};

#[inline(always)]
pub fn fft2<T: Float>(input: &mut [Complex<T>]) {
    debug_assert_eq!(input.len(), 2);
    let a = input[0];
    let b = input[1];
    input[0] = a + b;
    input[1] = a - b;
}

#[inline(always)]
pub fn fft3<T: Float>(input: &mut [Complex<T>]) {
    debug_assert_eq!(input.len(), 3);
    let half = T::from_f32(0.5);
    let s = T::from_f64(0.866_025_403_784_438_6); // sin(2π/3)
    let a = input[0];
    let t1 = input[1] + input[2];
    let t2 = (input[1] - input[2]).scale(s).mul_neg_i();
    let m = a - t1.scale(half);
    input[0] = a + t1;
    input[1] = m + t2;
    input[2] = m - t2;
}

#[inline(always)]
pub fn fft4<T: Float>(input: &mut [Complex<T>]) {
    debug_assert_eq!(input.len(), 4);
    let a0 = input[0];
    let a1 = input[1];
    let a2 = input[2];
    let a3 = input[3];
    let even0 = a0 + a2;
    let even1 = a0 - a2;
    let odd0 = a1 + a3;
    let t1 = (a1 - a3).mul_neg_i();
    input[0] = even0 + odd0;
    input[2] = even0 - odd0;
    input[1] = even1 + t1;
    input[3] = even1 - t1;
}

#[inline(always)]
pub fn fft5<T: Float>(input: &mut [Complex<T>]) {
    debug_assert_eq!(input.len(), 5);
    let c1 = T::from_f64(0.309_016_994_374_947_45); // cos(2π/5)
    let c2 = T::from_f64(-0.809_016_994_374_947_5); // cos(4π/5)
    let s1 = T::from_f64(0.951_056_516_295_153_5); // sin(2π/5)
    let s2 = T::from_f64(0.587_785_252_292_473_1); // sin(4π/5)
    let x0 = input[0];
    let t1 = input[1] + input[4];
    let t2 = input[2] + input[3];
    let t3 = input[1] - input[4];
    let t4 = input[2] - input[3];
    let a1 = x0 + t1.scale(c1) + t2.scale(c2);
    let a2 = x0 + t1.scale(c2) + t2.scale(c1);
    let b1 = (t3.scale(s1) + t4.scale(s2)).mul_neg_i();
    let b2 = (t3.scale(s2) - t4.scale(s1)).mul_neg_i();
    input[0] = x0 + t1 + t2;
    input[1] = a1 + b1;
    input[4] = a1 - b1;
    input[2] = a2 + b2;
    input[3] = a2 - b2;
}

#[inline(always)]
pub fn fft8<T: Float>(input: &mut [Complex<T>]) {
    debug_assert_eq!(input.len(), 8);
    let x0 = input[0];
    let x1 = input[1];
    let x2 = input[2];
    let x3 = input[3];
    let x4 = input[4];
    let x5 = input[5];
    let x6 = input[6];
    let x7 = input[7];

    // FFT4 on even indices (0,2,4,6)
    let a0 = x0 + x4;
    let a1 = x0 - x4;
    let a2 = x2 + x6;
    let t = (x2 - x6).mul_neg_i();
    let e0 = a0 + a2;
    let e2 = a0 - a2;
    let e1 = a1 + t;
    let e3 = a1 - t;

    // FFT4 on odd indices (1,3,5,7)
    let b0 = x1 + x5;
    let b1 = x1 - x5;
    let b2 = x3 + x7;
    let t = (x3 - x7).mul_neg_i();
    let o0 = b0 + b2;
    let o2 = b0 - b2;
    let o1 = b1 + t;
    let o3 = b1 - t;

    let s = T::from_f64(core::f64::consts::FRAC_1_SQRT_2);
    let t1 = o1 * Complex::new(s, -s);
    let t2 = o2.mul_neg_i();
    let t3 = o3 * Complex::new(-s, -s);

    input[0] = e0 + o0;
    input[4] = e0 - o0;
    input[1] = e1 + t1;
    input[5] = e1 - t1;
    input[2] = e2 + t2;
    input[6] = e2 - t2;
    input[3] = e3 + t3;
    input[7] = e3 - t3;
}

/// Dispatch a supported closed-form length. Returns `false` for other lengths.
#[inline]
pub fn fft_small<T: Float>(input: &mut [Complex<T>]) -> bool {
    match input.len() {
        1 => {}
        2 => fft2(input),
        3 => fft3(input),
        4 => fft4(input),
        5 => fft5(input),
        8 => fft8(input),
        _ => return false,
    }
    true
}
