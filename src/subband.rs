//! Uniform DFT filter banks.
//!
//! [`Channelizer`] splits a real stream into `M` complex subbands, emitting
//! one spectrum frame for every `M / D` input samples. [`ChannelSynthesizer`]
//! recombines such frames into a real stream by weighted overlap-add.
//!
//! Both share a lowpass prototype of `M·T` taps. For the newest input sample
//! `t` the analysis frame is
//!
//! ```text
//! Y[k] = Σ_n h[n]·exp(+2πi·k·n/M)·x[t − n],   k = 0..M
//! ```
//!
//! evaluated as `M` polyphase sums of `T` products followed by one real FFT.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use log::debug;

use crate::fft::{FftPlan, FftPlanner};
use crate::fir::fir1_hamming;
use crate::num::{Complex, Float};
use crate::resample::ResampleError;
use crate::rfft::RealFftPlan;

/// Validated bank geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Geometry {
    bands: usize,
    decim: usize,
    taps: usize,
}

impl Geometry {
    fn new(filter_len: usize, bands: usize, decim: usize) -> Result<Self, ResampleError> {
        if bands == 0 {
            return Err(ResampleError::InvalidFactor(bands));
        }
        if decim == 0 || bands % decim != 0 {
            return Err(ResampleError::InvalidFactor(decim));
        }
        if filter_len == 0 || filter_len % bands != 0 {
            return Err(ResampleError::InvalidFilter(
                "prototype length must be a multiple of the band count",
            ));
        }
        let taps = filter_len / bands;
        if taps % 2 != 0 {
            return Err(ResampleError::InvalidFilter(
                "taps per band must be even",
            ));
        }
        Ok(Self { bands, decim, taps })
    }

    fn frame_len(&self) -> usize {
        self.bands / self.decim
    }

    fn span(&self) -> usize {
        self.bands * self.taps
    }
}

/// Default prototype: Hamming-windowed lowpass of `bands·taps` taps with
/// cutoff `1/bands`.
pub fn design_prototype<T: Float>(bands: usize, taps: usize) -> Result<Vec<T>, ResampleError> {
    if bands == 0 || taps == 0 {
        return Err(ResampleError::InvalidFactor(0));
    }
    Ok(fir1_hamming(bands * taps - 1, T::one() / T::from_usize(bands))?)
}

/// Analysis filter bank.
#[derive(Debug, Clone)]
pub struct Channelizer<T: Float> {
    geo: Geometry,
    filter: Vec<T>,
    /// Last `M·T` input samples, newest at the end.
    history: Vec<T>,
    pout: Vec<T>,
    fft: RealFftPlan<T>,
}

impl<T: Float> Channelizer<T> {
    pub fn new(filter: &[T], num_bands: usize, decim: usize) -> Result<Self, ResampleError> {
        let geo = Geometry::new(filter.len(), num_bands, decim)?;
        let fft = FftPlanner::new().plan_rfft(num_bands)?;
        debug!(
            "channelizer bands={} decim={} taps={}",
            geo.bands, geo.decim, geo.taps
        );
        Ok(Self {
            geo,
            filter: filter.to_vec(),
            history: vec![T::zero(); geo.span()],
            pout: vec![T::zero(); num_bands],
            fft,
        })
    }

    /// Bank with the [`design_prototype`] filter.
    pub fn with_taps(num_bands: usize, decim: usize, taps: usize) -> Result<Self, ResampleError> {
        Self::new(&design_prototype(num_bands, taps)?, num_bands, decim)
    }

    pub fn num_bands(&self) -> usize {
        self.geo.bands
    }

    /// Input samples consumed per output frame.
    pub fn frame_len(&self) -> usize {
        self.geo.frame_len()
    }

    /// Consume `frame_len()` samples and return `num_bands()` subband values.
    pub fn process(&mut self, x: &[T]) -> Result<Vec<Complex<T>>, ResampleError> {
        let l = self.frame_len();
        if x.len() != l {
            return Err(ResampleError::InvalidFrameLength {
                len: x.len(),
                multiple: l,
            });
        }
        let span = self.geo.span();
        self.history.copy_within(l.., 0);
        self.history[span - l..].copy_from_slice(x);

        let m = self.geo.bands;
        for (phase, out) in self.pout.iter_mut().enumerate() {
            let mut acc = T::zero();
            for j in 0..self.geo.taps {
                let n = j * m + phase;
                acc += self.filter[n] * self.history[span - 1 - n];
            }
            *out = acc;
        }

        let mut y = self.fft.process(&self.pout)?;
        for v in y.iter_mut() {
            *v = v.conj();
        }
        Ok(y)
    }
}

/// Synthesis filter bank matching [`Channelizer`].
///
/// The output lags the analysis input by `num_bands·taps` samples.
#[derive(Debug, Clone)]
pub struct ChannelSynthesizer<T: Float> {
    geo: Geometry,
    /// Prototype divided by the per-phase overlap-add gain.
    synth: Vec<T>,
    acc: VecDeque<T>,
    fft: FftPlan<T>,
}

impl<T: Float> ChannelSynthesizer<T> {
    pub fn new(filter: &[T], num_bands: usize, decim: usize) -> Result<Self, ResampleError> {
        let geo = Geometry::new(filter.len(), num_bands, decim)?;
        let (m, l) = (geo.bands, geo.frame_len());

        // P(φ): sum of prototype taps congruent to φ mod M
        let mut aliased = vec![T::zero(); m];
        for (n, &h) in filter.iter().enumerate() {
            aliased[n % m] += h;
        }
        let mut gain = vec![T::zero(); l];
        for (n, &h) in filter.iter().enumerate() {
            gain[n % l] += h * aliased[n % m];
        }
        if gain.iter().any(|&g| g == T::zero()) {
            return Err(ResampleError::InvalidFilter(
                "prototype cannot reconstruct every phase",
            ));
        }
        let synth = filter
            .iter()
            .enumerate()
            .map(|(n, &h)| h / gain[n % l])
            .collect();

        let fft = FftPlanner::new().plan_fft(num_bands)?;
        debug!(
            "channel synthesizer bands={} decim={} taps={}",
            geo.bands, geo.decim, geo.taps
        );
        Ok(Self {
            geo,
            synth,
            acc: core::iter::repeat(T::zero()).take(geo.span()).collect(),
            fft,
        })
    }

    pub fn with_taps(num_bands: usize, decim: usize, taps: usize) -> Result<Self, ResampleError> {
        Self::new(&design_prototype(num_bands, taps)?, num_bands, decim)
    }

    pub fn num_bands(&self) -> usize {
        self.geo.bands
    }

    /// Output samples produced per input frame.
    pub fn frame_len(&self) -> usize {
        self.geo.frame_len()
    }

    /// Fixed output delay in samples.
    pub fn delay(&self) -> usize {
        self.geo.span()
    }

    /// Consume one frame of `num_bands()` subband values.
    pub fn process(&mut self, y: &[Complex<T>]) -> Result<Vec<T>, ResampleError> {
        let m = self.geo.bands;
        if y.len() != m {
            return Err(ResampleError::InvalidFrameLength {
                len: y.len(),
                multiple: m,
            });
        }
        let u = self.fft.process(y)?;
        let scale = T::one() / T::from_usize(m);

        let l = self.frame_len();
        self.acc.extend(core::iter::repeat(T::zero()).take(l));
        let newest = self.acc.len() - 1;
        for (n, &s) in self.synth.iter().enumerate() {
            self.acc[newest - n] += s * u[n % m].re * scale;
        }
        Ok(self.acc.drain(..l).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::num::Complex64;

    fn naive_frame(h: &[f64], m: usize, past: &[f64]) -> Vec<Complex64> {
        // past[0] is the newest sample
        (0..m)
            .map(|k| {
                h.iter().enumerate().fold(Complex64::zero(), |acc, (n, &c)| {
                    let v = past.get(n).copied().unwrap_or(0.0);
                    let ang = 2.0 * core::f64::consts::PI * ((k * n) % m) as f64 / m as f64;
                    acc + Complex64::expi(ang).scale(c * v)
                })
            })
            .collect()
    }

    #[test]
    fn geometry_is_validated() {
        let h = vec![0.1; 32];
        assert!(matches!(Channelizer::new(&h, 8, 3), Err(ResampleError::InvalidFactor(3))));
        assert!(matches!(Channelizer::new(&h[..30], 8, 2), Err(ResampleError::InvalidFilter(_))));
        // 24 taps over 8 bands is odd per band
        assert!(matches!(Channelizer::new(&h[..24], 8, 2), Err(ResampleError::InvalidFilter(_))));
        let mut bank = Channelizer::new(&h, 8, 2).unwrap();
        assert_eq!(bank.frame_len(), 4);
        assert!(matches!(
            bank.process(&[0.0; 5]),
            Err(ResampleError::InvalidFrameLength { len: 5, multiple: 4 })
        ));
    }

    #[test]
    fn analysis_matches_direct_sum() {
        let (m, d, t) = (8, 2, 4);
        let h = design_prototype::<f64>(m, t).unwrap();
        let mut bank = Channelizer::new(&h, m, d).unwrap();
        let x: Vec<f64> = (0..64).map(|i| ((i * 5) % 9) as f64 - 4.0).collect();
        let l = m / d;
        for (f, frame) in x.chunks(l).enumerate() {
            let got = bank.process(frame).unwrap();
            let newest = (f + 1) * l - 1;
            let past: Vec<f64> = (0..=newest).rev().map(|i| x[i]).collect();
            let expected = naive_frame(&h, m, &past);
            for (a, b) in got.iter().zip(expected.iter()) {
                assert!((*a - *b).norm() < 1e-10, "frame {f}: {a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn constant_input_is_reconstructed_exactly() {
        let (m, d, t) = (8, 2, 8);
        let mut ana = Channelizer::<f64>::with_taps(m, d, t).unwrap();
        let mut syn = ChannelSynthesizer::<f64>::with_taps(m, d, t).unwrap();
        let l = ana.frame_len();
        let mut out = Vec::new();
        for _ in 0..64 {
            let y = ana.process(&vec![1.0; l]).unwrap();
            out.extend(syn.process(&y).unwrap());
        }
        // history fills after M·T samples, the synthesizer adds another M·T
        for v in &out[2 * m * t..] {
            assert!((v - 1.0).abs() < 1e-9, "{v}");
        }
    }

    #[test]
    fn slow_tone_survives_analysis_and_synthesis() {
        let (m, d, t) = (8, 2, 8);
        let mut ana = Channelizer::<f64>::with_taps(m, d, t).unwrap();
        let mut syn = ChannelSynthesizer::<f64>::with_taps(m, d, t).unwrap();
        let delay = syn.delay();
        let x: Vec<f64> = (0..2048)
            .map(|i| (2.0 * core::f64::consts::PI * 0.001 * i as f64).sin())
            .collect();
        let mut out = Vec::new();
        for frame in x.chunks(ana.frame_len()) {
            out.extend(syn.process(&ana.process(frame).unwrap()).unwrap());
        }
        for i in 2 * m * t..out.len() {
            assert!((out[i] - x[i - delay]).abs() < 0.05, "i={i}");
        }
    }
}
