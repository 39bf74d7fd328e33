//! Real FFT (RFFT) plans built on top of the complex engines.
//!
//! Even lengths pack adjacent sample pairs into one complex value, run a
//! half-length complex transform and separate the even and odd halves
//! afterwards. Odd lengths go through the full complex engine.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use log::debug;

use crate::fft::{FftEngine, FftError};
use crate::num::{Complex, Float};
use crate::tables::TableCache;

#[derive(Debug, Clone)]
enum Layout<T: Float> {
    /// Half-length transform plus `exp(-2πi·k/n)`.
    Packed {
        half: FftEngine<T>,
        twiddles: Arc<[Complex<T>]>,
    },
    Full(FftEngine<T>),
}

impl<T: Float> Layout<T> {
    fn new(n: usize, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if n % 2 == 0 {
            Ok(Layout::Packed {
                half: FftEngine::new(n / 2, tables)?,
                twiddles: tables.twiddles(n)?,
            })
        } else {
            Ok(Layout::Full(FftEngine::new(n, tables)?))
        }
    }

    fn scratch_len(&self, n: usize) -> usize {
        match self {
            Layout::Packed { .. } => n / 2,
            Layout::Full(_) => n,
        }
    }
}

/// Real-to-complex forward plan producing the full `n`-bin spectrum.
#[derive(Debug, Clone)]
pub struct RealFftPlan<T: Float> {
    n: usize,
    layout: Layout<T>,
    work: Vec<Complex<T>>,
    spec: Vec<Complex<T>>,
}

impl<T: Float> RealFftPlan<T> {
    pub fn new(n: usize, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        let layout = Layout::new(n, tables)?;
        let len = layout.scratch_len(n);
        debug!("rfft plan n={} packed={}", n, matches!(layout, Layout::Packed { .. }));
        Ok(Self {
            n,
            layout,
            work: vec![Complex::zero(); len],
            spec: vec![Complex::zero(); len],
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn solve(&mut self, x: &[T], y: &mut [Complex<T>]) -> Result<(), FftError> {
        let n = self.n;
        for len in [x.len(), y.len()] {
            if len != n {
                return Err(FftError::MismatchedLengths {
                    expected: n,
                    actual: len,
                });
            }
        }
        match &mut self.layout {
            Layout::Full(engine) => {
                for (w, &v) in self.work.iter_mut().zip(x) {
                    *w = Complex::new(v, T::zero());
                }
                engine.solve(&self.work, y);
            }
            Layout::Packed { half, twiddles } => {
                let m = n / 2;
                for (w, pair) in self.work.iter_mut().zip(x.chunks_exact(2)) {
                    *w = Complex::new(pair[0], pair[1]);
                }
                half.solve(&self.work, &mut self.spec);
                let z = &self.spec;
                let h = T::from_f32(0.5);
                for k in 0..m {
                    let zk = z[k];
                    let zc = z[(m - k) % m].conj();
                    let even = (zk + zc).scale(h);
                    let odd = (zk - zc).scale(h).mul_neg_i();
                    y[k] = even + odd * twiddles[k];
                    if k == 0 {
                        y[m] = even - odd;
                    }
                }
                for k in 1..m {
                    y[n - k] = y[k].conj();
                }
            }
        }
        Ok(())
    }

    pub fn process(&mut self, x: &[T]) -> Result<Vec<Complex<T>>, FftError> {
        let mut y = vec![Complex::zero(); self.n];
        self.solve(x, &mut y)?;
        Ok(y)
    }
}

/// Complex-to-real inverse plan.
///
/// Accepts either the full `n`-bin spectrum or the first `n/2 + 1` bins and
/// assumes conjugate symmetry.
#[derive(Debug, Clone)]
pub struct RealIfftPlan<T: Float> {
    n: usize,
    layout: Layout<T>,
    work: Vec<Complex<T>>,
    spec: Vec<Complex<T>>,
}

impl<T: Float> RealIfftPlan<T> {
    pub fn new(n: usize, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        let layout = Layout::new(n, tables)?;
        let len = layout.scratch_len(n);
        debug!("irfft plan n={} packed={}", n, matches!(layout, Layout::Packed { .. }));
        Ok(Self {
            n,
            layout,
            work: vec![Complex::zero(); len],
            spec: vec![Complex::zero(); len],
        })
    }

    /// Number of real output samples.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Length of the packed input form.
    pub fn packed_len(&self) -> usize {
        self.n / 2 + 1
    }

    pub fn solve(&mut self, x: &[Complex<T>], y: &mut [T]) -> Result<(), FftError> {
        let n = self.n;
        let packed = self.packed_len();
        if x.len() != n && x.len() != packed {
            return Err(FftError::MismatchedLengths {
                expected: packed,
                actual: x.len(),
            });
        }
        if y.len() != n {
            return Err(FftError::MismatchedLengths {
                expected: n,
                actual: y.len(),
            });
        }
        match &mut self.layout {
            Layout::Full(engine) => {
                // mirror into conj(X) so a forward transform yields n·conj(x)
                let given = x.len().min(packed);
                for k in 0..given {
                    self.work[k] = x[k].conj();
                    if k > 0 {
                        self.work[n - k] = x[k];
                    }
                }
                engine.solve(&self.work, &mut self.spec);
                let scale = T::one() / T::from_usize(n);
                for (out, v) in y.iter_mut().zip(&self.spec) {
                    *out = v.re * scale;
                }
            }
            Layout::Packed { half, twiddles } => {
                let m = n / 2;
                let h = T::from_f32(0.5);
                for k in 0..m {
                    let xk = x[k];
                    let xc = x[m - k].conj();
                    let even = (xk + xc).scale(h);
                    let odd = (xk - xc).scale(h) * twiddles[k].conj();
                    // Z = E + i·O, stored conjugated for the forward engine
                    let z = Complex::new(even.re - odd.im, even.im + odd.re);
                    self.work[k] = z.conj();
                }
                half.solve(&self.work, &mut self.spec);
                let scale = T::one() / T::from_usize(m);
                for (pair, v) in y.chunks_exact_mut(2).zip(&self.spec) {
                    pair[0] = v.re * scale;
                    pair[1] = -v.im * scale;
                }
            }
        }
        Ok(())
    }

    pub fn process(&mut self, x: &[Complex<T>]) -> Result<Vec<T>, FftError> {
        let mut y = vec![T::zero(); self.n];
        self.solve(x, &mut y)?;
        Ok(y)
    }
}


#[cfg(all(feature = "internal-tests", test))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn real_round_trip(x in proptest::collection::vec(-1.0e3f64..1.0e3, 1..160)) {
            let n = x.len();
            let mut tables = TableCache::new();
            let spectrum = RealFftPlan::new(n, &mut tables).unwrap().process(&x).unwrap();
            let back = RealIfftPlan::new(n, &mut tables).unwrap().process(&spectrum[..n / 2 + 1]).unwrap();
            for (a, b) in back.iter().zip(x.iter()) {
                prop_assert!((a - b).abs() < 1e-7 * (1.0 + b.abs()));
            }
        }
    }
}
