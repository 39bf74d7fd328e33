//! Chirp Z-Transform (CZT) module.
//!
//! Evaluates `X[k] = Σ x[j]·A^(-j)·W^(j·k)` for `k = 0..m` on a spiral contour
//! by turning the sum into a convolution with the chirp `W^(t²/2)`
//! (Bluestein's identity `jk = (j² + k² − (k−j)²)/2`). Three power-of-two
//! transforms of length `L = next_pow2(m + n − 1)` do the work; the chirp
//! factors and the transformed inverse-chirp kernel are built once per plan.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;

use log::debug;

use crate::fft::{FftEngine, FftError};
use crate::num::{Complex, Float};
use crate::primes::next_pow2;
use crate::tables::TableCache;

/// Reusable CZT of `n` inputs onto `m` outputs.
#[derive(Debug, Clone)]
pub struct CztPlan<T: Float> {
    n: usize,
    m: usize,
    /// `A^(-k)·W^(k²/2)` for `k = 0..n`.
    premul: Vec<Complex<T>>,
    /// `FFT_L(W^(-t²/2))` for `t = 1−n..m`, pre-scaled by `1/L`.
    kernel: Vec<Complex<T>>,
    /// `W^(k²/2)` for `k = 0..m`.
    postmul: Vec<Complex<T>>,
    fft: Box<FftEngine<T>>,
    work: Vec<Complex<T>>,
    spec: Vec<Complex<T>>,
}

impl<T: Float> CztPlan<T> {
    /// Plan for an arbitrary spiral: ratio `w` between successive output
    /// points and starting point `a`. Both must be nonzero and finite.
    pub fn new(
        n: usize,
        m: usize,
        w: Complex<T>,
        a: Complex<T>,
        tables: &mut TableCache<T>,
    ) -> Result<Self, FftError> {
        if !w.is_finite() || w.norm_sqr() == T::zero() {
            return Err(FftError::InvalidParameter("w must be finite and nonzero"));
        }
        if !a.is_finite() || a.norm_sqr() == T::zero() {
            return Err(FftError::InvalidParameter("a must be finite and nonzero"));
        }
        let (wr, wt) = (w.norm(), w.arg());
        let (ar, at) = (a.norm(), a.arg());
        let half = T::from_f32(0.5);
        let chirp = |t: i64| {
            let e = T::from_f64((t * t) as f64) * half;
            Complex::from_polar(wr.powf(e), wt * e)
        };
        let a_inv_pow = |k: usize| {
            let e = T::from_usize(k);
            Complex::from_polar(ar.powf(-e), -(at * e))
        };
        Self::with_chirp(n, m, chirp, a_inv_pow, tables)
    }

    /// Plan equivalent to an `n`-point DFT (`m = n`, `W = exp(-2πi/n)`,
    /// `A = 1`). The chirp phase is reduced modulo `2n` in integers, which
    /// keeps it exact for long transforms.
    pub fn dft(n: usize, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        let period = 2 * n as i64;
        let step = -T::pi() / T::from_usize(n.max(1));
        let chirp = |t: i64| {
            let r = (t * t).rem_euclid(period.max(1));
            Complex::expi(step * T::from_f64(r as f64))
        };
        Self::with_chirp(n, n, chirp, |_| Complex::one(), tables)
    }

    fn with_chirp<C, A>(
        n: usize,
        m: usize,
        chirp: C,
        a_inv_pow: A,
        tables: &mut TableCache<T>,
    ) -> Result<Self, FftError>
    where
        C: Fn(i64) -> Complex<T>,
        A: Fn(usize) -> Complex<T>,
    {
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if m == 0 {
            return Err(FftError::InvalidParameter("output length must be positive"));
        }
        let l = next_pow2(m + n - 1);
        debug!("czt plan n={} m={} conv_len={}", n, m, l);

        let premul: Vec<Complex<T>> = (0..n).map(|k| a_inv_pow(k) * chirp(k as i64)).collect();
        let postmul: Vec<Complex<T>> = (0..m).map(|k| chirp(k as i64)).collect();

        let mut fft = FftEngine::new(l, tables)?;
        let inv_l = T::one() / T::from_usize(l);
        let mut padded = vec![Complex::zero(); l];
        for (i, v) in padded.iter_mut().take(m + n - 1).enumerate() {
            let t = i as i64 - (n as i64 - 1);
            *v = Complex::one() / chirp(t);
        }
        let mut kernel = vec![Complex::zero(); l];
        fft.solve(&padded, &mut kernel);
        for v in kernel.iter_mut() {
            *v = v.scale(inv_l);
        }

        Ok(Self {
            n,
            m,
            premul,
            kernel,
            postmul,
            fft: Box::new(fft),
            work: padded,
            spec: vec![Complex::zero(); l],
        })
    }

    /// Input length.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn output_len(&self) -> usize {
        self.m
    }

    /// Convolution length used internally.
    pub fn conv_len(&self) -> usize {
        self.kernel.len()
    }

    /// Transform `x` (length `n`) into `y` (length `m`) without allocating.
    pub fn solve(&mut self, x: &[Complex<T>], y: &mut [Complex<T>]) -> Result<(), FftError> {
        if x.len() != self.n {
            return Err(FftError::MismatchedLengths {
                expected: self.n,
                actual: x.len(),
            });
        }
        if y.len() != self.m {
            return Err(FftError::MismatchedLengths {
                expected: self.m,
                actual: y.len(),
            });
        }
        self.apply(x, y);
        Ok(())
    }

    /// Unchecked core of [`CztPlan::solve`].
    pub(crate) fn apply(&mut self, x: &[Complex<T>], y: &mut [Complex<T>]) {
        let n = self.n;
        for ((w, &v), &c) in self.work.iter_mut().zip(x).zip(&self.premul) {
            *w = v * c;
        }
        for w in self.work[n..].iter_mut() {
            *w = Complex::zero();
        }
        self.fft.solve(&self.work, &mut self.spec);
        // inverse transform as conj(fft(conj(.))); 1/L already sits in the kernel
        for (s, &k) in self.spec.iter_mut().zip(&self.kernel) {
            *s = (*s * k).conj();
        }
        self.fft.solve(&self.spec, &mut self.work);
        for ((out, &v), &c) in y.iter_mut().zip(&self.work[n - 1..]).zip(&self.postmul) {
            *out = v.conj() * c;
        }
    }

    pub fn process(&mut self, x: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let mut y = vec![Complex::zero(); self.m];
        self.solve(x, &mut y)?;
        Ok(y)
    }
}

/// One-shot Chirp-Z transform of `x` onto `m` points of the spiral
/// `a·w^(-k)`.
///
/// Builds a fresh plan on every call; callers repeating the same
/// parameters should keep a [`CztPlan`].
pub fn czt<T: Float>(
    x: &[Complex<T>],
    m: usize,
    w: Complex<T>,
    a: Complex<T>,
) -> Result<Vec<Complex<T>>, FftError> {
    let mut tables = TableCache::new();
    CztPlan::new(x.len(), m, w, a, &mut tables)?.process(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Complex64;
    use core::f64::consts::PI;

    fn naive_czt(x: &[Complex64], m: usize, w: Complex64, a: Complex64) -> Vec<Complex64> {
        (0..m)
            .map(|k| {
                let mut acc = Complex64::zero();
                let mut z = Complex64::one();
                let step = (Complex64::one() / a) * {
                    let mut p = Complex64::one();
                    for _ in 0..k {
                        p = p * w;
                    }
                    p
                };
                for &v in x {
                    acc += v * z;
                    z = z * step;
                }
                acc
            })
            .collect()
    }

    #[test]
    fn zoomed_unit_circle_matches_naive() {
        let x: Vec<Complex64> = (0..10).map(|i| Complex64::new(i as f64, (i * i) as f64 * 0.1)).collect();
        let w = Complex64::expi(-2.0 * PI / 64.0);
        let a = Complex64::expi(0.3);
        let got = czt(&x, 16, w, a).unwrap();
        let expected = naive_czt(&x, 16, w, a);
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((*g - *e).norm() < 1e-9, "{g:?} vs {e:?}");
        }
    }

    #[test]
    fn spiral_contour_matches_naive() {
        let x: Vec<Complex64> = (0..7).map(|i| Complex64::new(1.0 / (i + 1) as f64, 0.25)).collect();
        let w = Complex64::from_polar(0.995, -0.2);
        let a = Complex64::from_polar(0.9, 0.1);
        let got = czt(&x, 5, w, a).unwrap();
        let expected = naive_czt(&x, 5, w, a);
        for (g, e) in got.iter().zip(expected.iter()) {
            assert!((*g - *e).norm() < 1e-9 * (1.0 + e.norm()), "{g:?} vs {e:?}");
        }
    }

    #[test]
    fn dft_plan_matches_general_plan() {
        let n = 53;
        let mut tables = TableCache::new();
        let x: Vec<Complex64> = (0..n).map(|i| Complex64::new((i as f64).sin(), 0.5)).collect();
        let mut exact = CztPlan::dft(n, &mut tables).unwrap();
        let mut general =
            CztPlan::new(n, n, Complex64::expi(-2.0 * PI / n as f64), Complex64::one(), &mut tables).unwrap();
        let a = exact.process(&x).unwrap();
        let b = general.process(&x).unwrap();
        for (u, v) in a.iter().zip(b.iter()) {
            assert!((*u - *v).norm() < 1e-9);
        }
        assert_eq!(exact.conv_len(), 128);
    }

    #[test]
    fn invalid_parameters() {
        let x = [Complex64::one(); 4];
        assert!(matches!(
            czt(&x, 4, Complex64::zero(), Complex64::one()),
            Err(FftError::InvalidParameter(_))
        ));
        assert!(matches!(
            czt(&x, 4, Complex64::one(), Complex64::zero()),
            Err(FftError::InvalidParameter(_))
        ));
        assert!(matches!(
            czt(&x, 0, Complex64::one(), Complex64::one()),
            Err(FftError::InvalidParameter(_))
        ));
        assert_eq!(
            czt::<f64>(&[], 4, Complex64::one(), Complex64::one()),
            Err(FftError::EmptyInput)
        );
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut tables = TableCache::new();
        let mut plan = CztPlan::<f64>::dft(8, &mut tables).unwrap();
        let x = [Complex64::one(); 7];
        let mut y = [Complex64::zero(); 8];
        assert_eq!(
            plan.solve(&x, &mut y),
            Err(FftError::MismatchedLengths { expected: 8, actual: 7 })
        );
    }
}
