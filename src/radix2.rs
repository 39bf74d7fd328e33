//! Iterative radix-2 Cooley-Tukey transform for power-of-two lengths.

use alloc::sync::Arc;

use crate::fft::FftError;
use crate::num::{Complex, Float};
use crate::tables::TableCache;

#[derive(Debug, Clone)]
pub struct Radix2Fft<T: Float> {
    n: usize,
    /// `exp(-2πi·k/n)`, only the first half is read.
    twiddles: Arc<[Complex<T>]>,
    bitrev: Arc<[usize]>,
}

impl<T: Float> Radix2Fft<T> {
    pub fn new(n: usize, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if !n.is_power_of_two() {
            return Err(FftError::NonPowerOfTwo(n));
        }
        Ok(Self {
            n,
            twiddles: tables.twiddles(n)?,
            bitrev: tables.bitrev(n)?,
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Forward transform of `x` into `y`. Both slices have length `n`.
    pub fn solve(&self, x: &[Complex<T>], y: &mut [Complex<T>]) {
        debug_assert_eq!(x.len(), self.n);
        debug_assert_eq!(y.len(), self.n);
        for (dst, &src) in y.iter_mut().zip(self.bitrev.iter()) {
            *dst = x[src];
        }
        let n = self.n;
        let mut half = 1;
        while half < n {
            let len = half * 2;
            let stride = n / len;
            for cluster in y.chunks_exact_mut(len) {
                let (lo, hi) = cluster.split_at_mut(half);
                for (k, (a, b)) in lo.iter_mut().zip(hi.iter_mut()).enumerate() {
                    let w = self.twiddles[k * stride];
                    let t = *b * w;
                    *b = *a - t;
                    *a += t;
                }
            }
            half = len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Complex64;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn impulse_is_flat() {
        let mut tables = TableCache::new();
        let plan = Radix2Fft::<f64>::new(16, &mut tables).unwrap();
        let mut x = vec![Complex64::zero(); 16];
        x[0] = Complex64::one();
        let mut y = vec![Complex64::zero(); 16];
        plan.solve(&x, &mut y);
        for c in &y {
            assert!((c.re - 1.0).abs() < 1e-12);
            assert!(c.im.abs() < 1e-12);
        }
    }

    #[test]
    fn shifted_impulse_is_twiddle() {
        let mut tables = TableCache::new();
        let plan = Radix2Fft::<f64>::new(32, &mut tables).unwrap();
        let mut x = vec![Complex64::zero(); 32];
        x[1] = Complex64::one();
        let mut y = vec![Complex64::zero(); 32];
        plan.solve(&x, &mut y);
        let expected: Vec<Complex64> = crate::tables::twiddle_table(32);
        for (a, b) in y.iter().zip(expected.iter()) {
            assert!((a.re - b.re).abs() < 1e-12);
            assert!((a.im - b.im).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_non_pow2() {
        let mut tables = TableCache::<f32>::new();
        assert_eq!(Radix2Fft::new(12, &mut tables).unwrap_err(), FftError::NonPowerOfTwo(12));
        assert_eq!(Radix2Fft::new(0, &mut tables).unwrap_err(), FftError::EmptyInput);
    }
}
