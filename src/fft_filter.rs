//! Overlap-add FIR filtering through the FFT.
//!
//! For an impulse response of `M` taps the transform length is
//! `nfft = next_pow2(2M)` and input is consumed in blocks of
//! `N = nfft - M + 1` samples. Each block is convolved in the frequency
//! domain, the first `M - 1` output samples are added to the tail carried
//! over from the previous block and exactly `N` samples are emitted.
//!
//! Output depends only on the concatenated input stream, never on how it is
//! split across [`FftFilter::process`] calls. Samples of an incomplete block
//! stay buffered; feed `M - 1` zeros to drain the filter.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::AddAssign;

use log::debug;

use crate::fft::{FftError, FftPlan, FftPlanner};
use crate::num::{Complex, Float};
use crate::rfft::{RealFftPlan, RealIfftPlan};

/// Block bookkeeping shared by the complex and real filters.
#[derive(Debug, Clone)]
struct OverlapAdd<V> {
    block: usize,
    pending: Vec<V>,
    overlap: Vec<V>,
    conv: Vec<V>,
}

impl<V: Copy + Default + AddAssign> OverlapAdd<V> {
    fn new(taps: usize, nfft: usize) -> Self {
        let block = nfft - taps + 1;
        Self {
            block,
            pending: Vec::with_capacity(block),
            overlap: vec![V::default(); taps - 1],
            conv: vec![V::default(); nfft],
        }
    }

    fn run<F>(&mut self, x: &[V], mut convolve: F) -> Result<Vec<V>, FftError>
    where
        F: FnMut(&[V], &mut [V]) -> Result<(), FftError>,
    {
        let n = self.block;
        let mut out = Vec::with_capacity((self.pending.len() + x.len()) / n * n);
        let mut rest = x;
        while !rest.is_empty() {
            let take = (n - self.pending.len()).min(rest.len());
            self.pending.extend_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.pending.len() < n {
                break;
            }
            convolve(&self.pending, &mut self.conv)?;
            self.pending.clear();
            let start = out.len();
            out.extend_from_slice(&self.conv[..n]);
            for (y, &o) in out[start..].iter_mut().zip(&self.overlap) {
                *y += o;
            }
            let tail = self.overlap.len();
            self.overlap.copy_from_slice(&self.conv[n..n + tail]);
        }
        Ok(out)
    }

    fn reset(&mut self) {
        self.pending.clear();
        for v in self.overlap.iter_mut() {
            *v = V::default();
        }
    }
}

fn fft_size(taps: usize) -> Result<usize, FftError> {
    if taps == 0 {
        return Err(FftError::EmptyInput);
    }
    Ok((2 * taps).next_power_of_two())
}

/// Overlap-add filter for complex samples.
///
/// The stored spectrum is that of the conjugated impulse response, so
/// real-valued taps behave as a plain FIR.
#[derive(Debug, Clone)]
pub struct FftFilter<T: Float> {
    taps: usize,
    spectrum: Vec<Complex<T>>,
    forward: FftPlan<T>,
    inverse: FftPlan<T>,
    padded: Vec<Complex<T>>,
    freq: Vec<Complex<T>>,
    state: OverlapAdd<Complex<T>>,
}

impl<T: Float> FftFilter<T> {
    pub fn new(h: &[Complex<T>]) -> Result<Self, FftError> {
        Self::with_planner(h, &mut FftPlanner::new())
    }

    /// Build the filter with plans from an existing planner.
    pub fn with_planner(h: &[Complex<T>], planner: &mut FftPlanner<T>) -> Result<Self, FftError> {
        let nfft = fft_size(h.len())?;
        let mut forward = planner.plan_fft(nfft)?;
        let inverse = planner.plan_ifft(nfft)?;
        let mut padded = vec![Complex::zero(); nfft];
        for (p, v) in padded.iter_mut().zip(h) {
            *p = v.conj();
        }
        let mut spectrum = vec![Complex::zero(); nfft];
        forward.solve(&padded, &mut spectrum)?;
        let state = OverlapAdd::new(h.len(), nfft);
        debug!("fft filter taps={} nfft={} block={}", h.len(), nfft, state.block);
        Ok(Self {
            taps: h.len(),
            spectrum,
            forward,
            inverse,
            padded,
            freq: vec![Complex::zero(); nfft],
            state,
        })
    }

    pub fn taps(&self) -> usize {
        self.taps
    }

    /// Samples consumed per transform.
    pub fn block_len(&self) -> usize {
        self.state.block
    }

    pub fn fft_len(&self) -> usize {
        self.spectrum.len()
    }

    /// Filter the next chunk of the stream. Returns a whole number of blocks.
    pub fn process(&mut self, x: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let Self {
            spectrum,
            forward,
            inverse,
            padded,
            freq,
            state,
            ..
        } = self;
        state.run(x, |block, conv| {
            padded[..block.len()].copy_from_slice(block);
            for p in padded[block.len()..].iter_mut() {
                *p = Complex::zero();
            }
            forward.solve(&padded[..], &mut freq[..])?;
            for (f, &h) in freq.iter_mut().zip(spectrum.iter()) {
                *f *= h;
            }
            inverse.solve(&freq[..], conv)
        })
    }

    /// Drop buffered input and the carried tail.
    pub fn reset(&mut self) {
        self.state.reset();
    }
}

/// Overlap-add filter for real samples using real transforms.
#[derive(Debug, Clone)]
pub struct RealFftFilter<T: Float> {
    taps: usize,
    spectrum: Vec<Complex<T>>,
    forward: RealFftPlan<T>,
    inverse: RealIfftPlan<T>,
    padded: Vec<T>,
    freq: Vec<Complex<T>>,
    state: OverlapAdd<T>,
}

impl<T: Float> RealFftFilter<T> {
    pub fn new(h: &[T]) -> Result<Self, FftError> {
        Self::with_planner(h, &mut FftPlanner::new())
    }

    pub fn with_planner(h: &[T], planner: &mut FftPlanner<T>) -> Result<Self, FftError> {
        let nfft = fft_size(h.len())?;
        let mut forward = planner.plan_rfft(nfft)?;
        let inverse = planner.plan_irfft(nfft)?;
        let mut padded = vec![T::zero(); nfft];
        padded[..h.len()].copy_from_slice(h);
        let mut spectrum = vec![Complex::zero(); nfft];
        forward.solve(&padded, &mut spectrum)?;
        let state = OverlapAdd::new(h.len(), nfft);
        debug!("real fft filter taps={} nfft={} block={}", h.len(), nfft, state.block);
        Ok(Self {
            taps: h.len(),
            spectrum,
            forward,
            inverse,
            padded,
            freq: vec![Complex::zero(); nfft],
            state,
        })
    }

    pub fn taps(&self) -> usize {
        self.taps
    }

    pub fn block_len(&self) -> usize {
        self.state.block
    }

    pub fn fft_len(&self) -> usize {
        self.spectrum.len()
    }

    pub fn process(&mut self, x: &[T]) -> Result<Vec<T>, FftError> {
        let Self {
            spectrum,
            forward,
            inverse,
            padded,
            freq,
            state,
            ..
        } = self;
        state.run(x, |block, conv| {
            padded[..block.len()].copy_from_slice(block);
            for p in padded[block.len()..].iter_mut() {
                *p = T::zero();
            }
            forward.solve(&padded[..], &mut freq[..])?;
            for (f, &h) in freq.iter_mut().zip(spectrum.iter()) {
                *f *= h;
            }
            inverse.solve(&freq[..], conv)
        })
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Complex64;

    fn direct(x: &[f64], h: &[f64]) -> Vec<f64> {
        (0..x.len())
            .map(|i| {
                h.iter()
                    .enumerate()
                    .filter(|(k, _)| *k <= i)
                    .map(|(k, &c)| c * x[i - k])
                    .sum()
            })
            .collect()
    }

    fn signal(n: usize) -> Vec<f64> {
        (0..n).map(|i| ((i * 13 % 17) as f64) * 0.1 - 0.8).collect()
    }

    #[test]
    fn block_geometry() {
        let f = RealFftFilter::<f64>::new(&[1.0; 5]).unwrap();
        assert_eq!(f.fft_len(), 16);
        assert_eq!(f.block_len(), 12);
        let g = FftFilter::<f64>::new(&[Complex64::one(); 8]).unwrap();
        assert_eq!(g.fft_len(), 16);
        assert_eq!(g.block_len(), 9);
    }

    #[test]
    fn real_filter_matches_direct_convolution() {
        let h = [0.5, -0.25, 0.125, 0.75, 0.1, -0.3, 0.2];
        let x = signal(200);
        let mut f = RealFftFilter::new(&h).unwrap();
        let y = f.process(&x).unwrap();
        let expected = direct(&x, &h);
        assert_eq!(y.len(), x.len() / f.block_len() * f.block_len());
        for (a, b) in y.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn complex_filter_with_real_taps_is_plain_fir() {
        let h = [0.5, -0.25, 0.125, 0.75];
        let taps: Vec<Complex64> = h.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        let x = signal(100);
        let xc: Vec<Complex64> = x.iter().map(|&v| Complex64::new(v, -v)).collect();
        let mut f = FftFilter::new(&taps).unwrap();
        let y = f.process(&xc).unwrap();
        let expected = direct(&x, &h);
        for (a, b) in y.iter().zip(expected.iter()) {
            assert!((a.re - b).abs() < 1e-10);
            assert!((a.im + b).abs() < 1e-10);
        }
    }

    #[test]
    fn partial_blocks_stay_buffered() {
        let mut f = RealFftFilter::<f64>::new(&[1.0, 1.0, 1.0]).unwrap();
        let n = f.block_len();
        assert!(f.process(&vec![1.0; n - 1]).unwrap().is_empty());
        assert_eq!(f.process(&[1.0]).unwrap().len(), n);
        f.reset();
        assert!(f.process(&vec![1.0; n - 1]).unwrap().is_empty());
    }

    #[test]
    fn empty_response_is_rejected() {
        assert_eq!(RealFftFilter::<f64>::new(&[]).unwrap_err(), FftError::EmptyInput);
    }
}
