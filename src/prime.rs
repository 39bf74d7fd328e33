//! Prime-length transforms: direct summation for small primes, Chirp-Z above.

use alloc::boxed::Box;
use alloc::sync::Arc;

use crate::czt::CztPlan;
use crate::fft::FftError;
use crate::num::{Complex, Float};
use crate::primes::is_prime;
use crate::tables::TableCache;

/// Largest prime handled by direct O(N²) summation.
pub const MAX_DIRECT_DFT: usize = 41;

/// Direct DFT walking the twiddle table with a running modular index.
#[derive(Debug, Clone)]
pub struct DirectDft<T: Float> {
    twiddles: Arc<[Complex<T>]>,
}

impl<T: Float> DirectDft<T> {
    pub fn new(n: usize, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        Ok(Self {
            twiddles: tables.twiddles(n)?,
        })
    }

    pub fn len(&self) -> usize {
        self.twiddles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.twiddles.is_empty()
    }

    pub fn solve(&self, x: &[Complex<T>], y: &mut [Complex<T>]) {
        let n = self.twiddles.len();
        for (k, out) in y.iter_mut().enumerate() {
            let mut acc = Complex::zero();
            let mut iw = 0;
            for &v in x {
                acc += v * self.twiddles[iw];
                iw += k;
                if iw >= n {
                    iw -= n;
                }
            }
            *out = acc;
        }
    }
}

#[derive(Debug, Clone)]
pub enum PrimeFft<T: Float> {
    Direct(DirectDft<T>),
    ChirpZ(Box<CztPlan<T>>),
}

impl<T: Float> PrimeFft<T> {
    pub fn new(n: usize, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        if !is_prime(n) {
            return Err(FftError::InvalidLength(n));
        }
        if n <= MAX_DIRECT_DFT {
            Ok(PrimeFft::Direct(DirectDft::new(n, tables)?))
        } else {
            Ok(PrimeFft::ChirpZ(Box::new(CztPlan::dft(n, tables)?)))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PrimeFft::Direct(dft) => dft.len(),
            PrimeFft::ChirpZ(plan) => plan.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_chirp_z(&self) -> bool {
        matches!(self, PrimeFft::ChirpZ(_))
    }

    pub fn solve(&mut self, x: &[Complex<T>], y: &mut [Complex<T>]) {
        match self {
            PrimeFft::Direct(dft) => dft.solve(x, y),
            PrimeFft::ChirpZ(plan) => plan.apply(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Complex64;
    use alloc::vec;
    use alloc::vec::Vec;

    fn naive(x: &[Complex64]) -> Vec<Complex64> {
        let n = x.len();
        (0..n)
            .map(|k| {
                x.iter().enumerate().fold(Complex64::zero(), |acc, (j, &v)| {
                    let ang = -2.0 * core::f64::consts::PI * ((j * k) % n) as f64 / n as f64;
                    acc + v * Complex64::expi(ang)
                })
            })
            .collect()
    }

    #[test]
    fn direct_and_chirp_z_match_naive() {
        let mut tables = TableCache::new();
        for n in [3usize, 7, 13, 31, 41, 43, 97, 257] {
            let mut plan = PrimeFft::<f64>::new(n, &mut tables).unwrap();
            assert_eq!(plan.is_chirp_z(), n > MAX_DIRECT_DFT);
            let x: Vec<Complex64> = (0..n).map(|i| Complex64::new((i % 5) as f64, (i % 3) as f64 - 1.0)).collect();
            let mut y = vec![Complex64::zero(); n];
            plan.solve(&x, &mut y);
            let expected = naive(&x);
            for (a, b) in y.iter().zip(expected.iter()) {
                assert!((*a - *b).norm() < 1e-9 * n as f64, "n={n}: {a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn composite_is_rejected() {
        let mut tables = TableCache::<f64>::new();
        assert!(matches!(PrimeFft::new(15, &mut tables), Err(FftError::InvalidLength(15))));
    }
}
