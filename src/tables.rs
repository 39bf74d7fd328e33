//! Twiddle and bit-reversal table cache.
//!
//! The cache keeps the largest table generated so far and serves shorter
//! lengths by strided decimation whenever the requested length divides the
//! cached one. Decimated twiddles are bit-identical to freshly generated
//! ones because every entry is computed from the exact ratio `k / n`.

use alloc::sync::Arc;
use alloc::vec::Vec;

use log::trace;

use crate::fft::FftError;
use crate::num::{Complex, Float};

/// `exp(-2πi·k/n)` for `k = 0..n`.
pub fn twiddle_table<T: Float>(n: usize) -> Vec<Complex<T>> {
    let two_pi = T::from_f32(2.0) * T::pi();
    let len = T::from_usize(n);
    (0..n)
        .map(|k| {
            let ratio = T::from_usize(k) / len;
            Complex::expi(-(two_pi * ratio))
        })
        .collect()
}

/// Bit-reversal permutation of `0..n` for a power-of-two `n`.
pub fn bitrev_table(n: usize) -> Result<Vec<usize>, FftError> {
    if !n.is_power_of_two() {
        return Err(FftError::NonPowerOfTwo(n));
    }
    let bits = n.trailing_zeros();
    if bits == 0 {
        return Ok(alloc::vec![0]);
    }
    Ok((0..n)
        .map(|i| i.reverse_bits() >> (usize::BITS - bits))
        .collect())
}

fn decimate<V: Copy>(base: &[V], n: usize) -> Arc<[V]> {
    let step = base.len() / n;
    base.iter().step_by(step).copied().collect::<Vec<_>>().into()
}

/// Per-context cache of the largest twiddle and bit-reversal tables seen so far.
#[derive(Debug, Clone)]
pub struct TableCache<T: Float> {
    twiddles: Option<Arc<[Complex<T>]>>,
    bitrev: Option<Arc<[usize]>>,
}

impl<T: Float> Default for TableCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> TableCache<T> {
    pub fn new() -> Self {
        Self {
            twiddles: None,
            bitrev: None,
        }
    }

    /// Length of the cached twiddle table, `0` when nothing is cached.
    pub fn twiddle_len(&self) -> usize {
        self.twiddles.as_ref().map_or(0, |t| t.len())
    }

    /// Length of the cached bit-reversal table, `0` when nothing is cached.
    pub fn bitrev_len(&self) -> usize {
        self.bitrev.as_ref().map_or(0, |t| t.len())
    }

    /// Twiddle table of length `n`: `exp(-2πi·k/n)` for `k = 0..n`.
    pub fn twiddles(&mut self, n: usize) -> Result<Arc<[Complex<T>]>, FftError> {
        if n == 0 {
            return Err(FftError::EmptyInput);
        }
        if let Some(base) = &self.twiddles {
            if base.len() == n {
                return Ok(Arc::clone(base));
            }
            if base.len() % n == 0 {
                return Ok(decimate(base, n));
            }
        }
        let table: Arc<[Complex<T>]> = twiddle_table(n).into();
        if n > self.twiddle_len() {
            trace!("twiddle cache regrown to {}", n);
            self.twiddles = Some(Arc::clone(&table));
        }
        Ok(table)
    }

    /// Bit-reversal table for a power-of-two `n`. The cache only grows.
    pub fn bitrev(&mut self, n: usize) -> Result<Arc<[usize]>, FftError> {
        if !n.is_power_of_two() {
            return Err(FftError::NonPowerOfTwo(n));
        }
        if let Some(base) = &self.bitrev {
            if base.len() == n {
                return Ok(Arc::clone(base));
            }
            if base.len() > n {
                // both lengths are powers of two, so `n` divides the base
                return Ok(decimate(base, n));
            }
        }
        trace!("bit-reversal cache regrown to {}", n);
        let table: Arc<[usize]> = bitrev_table(n)?.into();
        self.bitrev = Some(Arc::clone(&table));
        Ok(table)
    }
}
