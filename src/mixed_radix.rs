//! Mixed-radix Cooley-Tukey transform for composite lengths.
//!
//! The length is split into a near-balanced `N = P·Q` and the two factors
//! are split recursively, giving a binary plan tree whose leaves are prime
//! lengths. One node executes as
//!
//! 1. transpose the `P×Q` input to `Q×P`,
//! 2. `Q` transforms of length `P`,
//! 3. twiddle correction `W_N^(n2·k1)`,
//! 4. transpose back to `P×Q`,
//! 5. `P` transforms of length `Q`,
//! 6. transpose to natural output order.

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::fft::FftError;
use crate::fft_kernels::fft_small;
use crate::num::{Complex, Float};
use crate::prime::PrimeFft;
use crate::primes::factor;
use crate::tables::TableCache;

#[derive(Debug, Clone)]
enum FactorNode<T: Float> {
    /// Prime length 2, 3 or 5 with a closed-form kernel.
    Closed,
    Prime(PrimeFft<T>),
    Split {
        p: usize,
        q: usize,
        /// Transform of length `p`, applied `q` times.
        inner: Box<FactorNode<T>>,
        /// Transform of length `q`, applied `p` times.
        outer: Box<FactorNode<T>>,
    },
}

fn transpose<T: Float>(src: &[Complex<T>], dst: &mut [Complex<T>], rows: usize, cols: usize) {
    for r in 0..rows {
        let row = &src[r * cols..(r + 1) * cols];
        for (c, &v) in row.iter().enumerate() {
            dst[c * rows + r] = v;
        }
    }
}

impl<T: Float> FactorNode<T> {
    fn build(n: usize, factors: &[usize], tables: &mut TableCache<T>) -> Result<Self, FftError> {
        if factors.len() == 1 {
            return match n {
                2 | 3 | 5 => Ok(FactorNode::Closed),
                _ => Ok(FactorNode::Prime(PrimeFft::new(n, tables)?)),
            };
        }
        let mut p = factors[0];
        let mut split = 1;
        while split < factors.len() {
            let next = p * factors[split];
            if next * next > n {
                break;
            }
            p = next;
            split += 1;
        }
        let q = n / p;
        Ok(FactorNode::Split {
            p,
            q,
            inner: Box::new(Self::build(p, &factors[..split], tables)?),
            outer: Box::new(Self::build(q, &factors[split..], tables)?),
        })
    }

    fn depth(&self) -> usize {
        match self {
            FactorNode::Split { inner, outer, .. } => 1 + inner.depth().max(outer.depth()),
            _ => 0,
        }
    }

    /// In-place transform of `data`. `scratch` holds at least `data.len()`
    /// elements; `tw` is the root twiddle table, a multiple of every node length.
    fn transform(&mut self, data: &mut [Complex<T>], scratch: &mut [Complex<T>], tw: &[Complex<T>]) {
        match self {
            FactorNode::Closed => {
                fft_small(data);
            }
            FactorNode::Prime(plan) => {
                let tmp = &mut scratch[..data.len()];
                tmp.copy_from_slice(data);
                plan.solve(tmp, data);
            }
            FactorNode::Split { p, q, inner, outer } => {
                let (p, q) = (*p, *q);
                let n = p * q;
                let tmp = &mut scratch[..n];

                transpose(data, tmp, p, q);
                for row in tmp.chunks_exact_mut(p) {
                    inner.transform(row, data, tw);
                }

                // first row and column are multiplied by W^0
                let decim = tw.len() / n;
                for n2 in 1..q {
                    let row = &mut tmp[n2 * p..(n2 + 1) * p];
                    for (k1, v) in row.iter_mut().enumerate().skip(1) {
                        *v *= tw[n2 * k1 * decim];
                    }
                }

                transpose(tmp, data, q, p);
                for row in data.chunks_exact_mut(q) {
                    outer.transform(row, tmp, tw);
                }

                transpose(data, tmp, p, q);
                data.copy_from_slice(tmp);
            }
        }
    }
}

/// Plan for a composite, non-prime length.
#[derive(Debug, Clone)]
pub struct MixedRadixFft<T: Float> {
    n: usize,
    root: FactorNode<T>,
    twiddles: Arc<[Complex<T>]>,
    scratch: Vec<Complex<T>>,
}

impl<T: Float> MixedRadixFft<T> {
    pub fn new(n: usize, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        let factors = factor(n);
        if factors.len() < 2 {
            return Err(FftError::InvalidLength(n));
        }
        Ok(Self {
            n,
            root: FactorNode::build(n, &factors, tables)?,
            twiddles: tables.twiddles(n)?,
            scratch: vec![Complex::zero(); n],
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Number of split levels in the plan tree.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn solve(&mut self, x: &[Complex<T>], y: &mut [Complex<T>]) {
        debug_assert_eq!(x.len(), self.n);
        debug_assert_eq!(y.len(), self.n);
        y.copy_from_slice(x);
        self.root.transform(y, &mut self.scratch, &self.twiddles);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Complex64;

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
    fn composite_lengths_match_naive() {
        let mut tables = TableCache::new();
        for n in [4usize, 6, 9, 10, 12, 15, 18, 30, 36, 45, 49, 60, 77, 96, 100, 126, 210] {
            let mut plan = MixedRadixFft::<f64>::new(n, &mut tables).unwrap();
            let x: Vec<Complex64> = (0..n)
                .map(|i| Complex64::new((i as f64 * 0.37).sin(), (i as f64 * 0.11).cos()))
                .collect();
            let mut y = vec![Complex64::zero(); n];
            plan.solve(&x, &mut y);
            let expected = naive(&x);
            for (a, b) in y.iter().zip(expected.iter()) {
                assert!((*a - *b).norm() < 1e-9, "n={n}: {a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn prime_leaf_above_direct_threshold() {
        // 2 * 47 puts a Chirp-Z leaf inside the tree
        let mut tables = TableCache::new();
        let n = 94;
        let mut plan = MixedRadixFft::<f64>::new(n, &mut tables).unwrap();
        let x: Vec<Complex64> = (0..n).map(|i| Complex64::new(i as f64, -(i as f64) * 0.5)).collect();
        let mut y = vec![Complex64::zero(); n];
        plan.solve(&x, &mut y);
        let expected = naive(&x);
        for (a, b) in y.iter().zip(expected.iter()) {
            assert!((*a - *b).norm() < 1e-8 * n as f64, "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn split_is_balanced() {
        let mut tables = TableCache::<f64>::new();
        let plan = MixedRadixFft::new(2 * 2 * 3 * 3 * 5, &mut tables).unwrap();
        match &plan.root {
            FactorNode::Split { p, q, .. } => assert_eq!((*p, *q), (12, 15)),
            _ => panic!("expected a split root"),
        }
        assert!(plan.depth() >= 2);
    }

    #[test]
    fn prime_lengths_are_rejected() {
        let mut tables = TableCache::<f64>::new();
        assert_eq!(MixedRadixFft::new(13, &mut tables).unwrap_err(), FftError::InvalidLength(13));
    }
}
