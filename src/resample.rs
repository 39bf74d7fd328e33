//! Polyphase FIR resampling by rational factors.
//!
//! A rate change by `L / M` is the cascade "upsample by `L`, lowpass,
//! downsample by `M`". The lowpass is split into polyphase branches so that
//! only the products that reach an output sample are computed:
//!
//! * [`FirDecimator`]: `y[i] = Σ h[n]·x[i·M − n]`,
//! * [`FirInterpolator`] and [`FirRateConverter`]:
//!   `y[m] = L·Σ h[n]·xu[m·M − n]`, where `xu` is `x` with `L − 1` zeros
//!   inserted after every sample.
//!
//! The taps are normalized to unit sum before splitting. State carries over
//! between `process` calls, so a stream may be fed in any whole number of
//! frames.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use log::debug;

use crate::fft::FftError;
use crate::fir::design_multirate_fir;
use crate::num::Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleError {
    /// An interpolation or decimation factor of zero.
    InvalidFactor(usize),
    /// A sample rate of zero.
    InvalidRate { out_fs: usize, in_fs: usize },
    /// A frame whose length is not a multiple of the required block.
    InvalidFrameLength { len: usize, multiple: usize },
    InvalidFilter(&'static str),
    Fft(FftError),
}

impl fmt::Display for ResampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResampleError::InvalidFactor(v) => write!(f, "rate factor must be positive, got {}", v),
            ResampleError::InvalidRate { out_fs, in_fs } => {
                write!(f, "sample rates must be positive, got {} / {}", out_fs, in_fs)
            }
            ResampleError::InvalidFrameLength { len, multiple } => {
                write!(f, "frame length {} is not a multiple of {}", len, multiple)
            }
            ResampleError::InvalidFilter(msg) => write!(f, "invalid filter: {}", msg),
            ResampleError::Fft(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ResampleError {}

impl From<FftError> for ResampleError {
    fn from(e: FftError) -> Self {
        ResampleError::Fft(e)
    }
}

pub(crate) fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Smallest length `>= size` accepted by a `p / q` resampler.
pub fn next_size(size: usize, p: usize, q: usize) -> usize {
    let d = q / gcd(p, q).max(1);
    if d <= 1 {
        return size;
    }
    size.div_ceil(d) * d
}

/// Largest length `<= size` accepted by a `p / q` resampler.
pub fn prev_size(size: usize, p: usize, q: usize) -> usize {
    let d = q / gcd(p, q).max(1);
    if d <= 1 {
        return size;
    }
    size / d * d
}

/// Split `h` into `m` branches, `branch[i][k] = h[i + k·m]·gain`, after
/// zero-padding to a multiple of `m` and normalizing to unit sum.
pub fn polyphase<T: Float>(h: &[T], m: usize, gain: T) -> Result<Vec<Vec<T>>, ResampleError> {
    if m == 0 {
        return Err(ResampleError::InvalidFactor(m));
    }
    if h.is_empty() {
        return Err(ResampleError::InvalidFilter("no taps"));
    }
    let mut total = T::zero();
    for &v in h {
        total += v;
    }
    if total == T::zero() {
        return Err(ResampleError::InvalidFilter("taps sum to zero"));
    }
    let sublen = h.len().div_ceil(m);
    let mut branches = vec![vec![T::zero(); sublen]; m];
    for (n, &v) in h.iter().enumerate() {
        branches[n % m][n / m] = v / total * gain;
    }
    Ok(branches)
}

/// Group delay of `taps` taps measured at an output rate of `1/decim`.
fn group_delay(taps: usize, decim: usize) -> usize {
    (taps - 1 + decim) / (2 * decim)
}

fn check_frame(len: usize, multiple: usize) -> Result<(), ResampleError> {
    if len % multiple != 0 {
        return Err(ResampleError::InvalidFrameLength { len, multiple });
    }
    Ok(())
}

/// Streaming rate changer.
pub trait Resampler<T: Float> {
    /// Resample the next frame of the stream.
    fn process(&mut self, x: &[T]) -> Result<Vec<T>, ResampleError>;

    /// Filter delay in output samples.
    fn delay(&self) -> usize;

    fn interp_rate(&self) -> usize {
        1
    }

    fn decim_rate(&self) -> usize {
        1
    }

    /// Smallest accepted frame length `>= size`.
    fn next_size(&self, size: usize) -> usize {
        next_size(size, self.interp_rate(), self.decim_rate())
    }

    /// Largest accepted frame length `<= size`.
    fn prev_size(&self, size: usize) -> usize {
        prev_size(size, self.interp_rate(), self.decim_rate())
    }
}

/// Integer-factor decimating FIR.
#[derive(Debug, Clone)]
pub struct FirDecimator<T: Float> {
    decim: usize,
    taps: usize,
    branches: Vec<Vec<T>>,
    history: Vec<T>,
    buf: Vec<T>,
}

impl<T: Float> FirDecimator<T> {
    /// Decimator with the default multirate prototype.
    pub fn new(decim: usize) -> Result<Self, ResampleError> {
        if decim == 0 {
            return Err(ResampleError::InvalidFactor(decim));
        }
        Self::with_filter(decim, &design_multirate_fir(1, decim)?)
    }

    pub fn with_filter(decim: usize, h: &[T]) -> Result<Self, ResampleError> {
        let branches = polyphase(h, decim, T::one())?;
        let hist = decim * branches[0].len() - 1;
        debug!("fir decimator decim={} taps={}", decim, h.len());
        Ok(Self {
            decim,
            taps: h.len(),
            branches,
            history: vec![T::zero(); hist],
            buf: Vec::new(),
        })
    }
}

impl<T: Float> Resampler<T> for FirDecimator<T> {
    fn process(&mut self, x: &[T]) -> Result<Vec<T>, ResampleError> {
        let d = self.decim;
        check_frame(x.len(), d)?;
        let hist = self.history.len();
        self.buf.clear();
        self.buf.extend_from_slice(&self.history);
        self.buf.extend_from_slice(x);

        let mut y = vec![T::zero(); x.len() / d];
        for (i, out) in y.iter_mut().enumerate() {
            let now = hist + i * d;
            let mut acc = T::zero();
            for (k, branch) in self.branches.iter().enumerate() {
                let mut idx = now - k;
                for &c in branch {
                    acc += c * self.buf[idx];
                    idx = idx.wrapping_sub(d);
                }
            }
            *out = acc;
        }

        let tail = self.buf.len() - hist;
        self.history.copy_from_slice(&self.buf[tail..]);
        Ok(y)
    }

    fn delay(&self) -> usize {
        group_delay(self.taps, self.decim)
    }

    fn decim_rate(&self) -> usize {
        self.decim
    }
}

/// Rational `interp / decim` converter.
#[derive(Debug, Clone)]
pub struct FirRateConverter<T: Float> {
    interp: usize,
    decim: usize,
    taps: usize,
    branches: Vec<Vec<T>>,
    /// Per output within one period of `interp` outputs: branch and input offset.
    schedule: Vec<(usize, usize)>,
    history: Vec<T>,
    buf: Vec<T>,
}

impl<T: Float> FirRateConverter<T> {
    pub fn new(interp: usize, decim: usize) -> Result<Self, ResampleError> {
        if interp == 0 || decim == 0 {
            return Err(ResampleError::InvalidFactor(0));
        }
        Self::with_filter(interp, decim, &design_multirate_fir(interp, decim)?)
    }

    pub fn with_filter(interp: usize, decim: usize, h: &[T]) -> Result<Self, ResampleError> {
        if decim == 0 {
            return Err(ResampleError::InvalidFactor(decim));
        }
        let branches = polyphase(h, interp, T::from_usize(interp))?;
        let schedule = (0..interp)
            .map(|r| ((r * decim) % interp, (r * decim) / interp))
            .collect();
        let hist = branches[0].len() - 1;
        debug!(
            "fir rate converter interp={} decim={} taps={}",
            interp,
            decim,
            h.len()
        );
        Ok(Self {
            interp,
            decim,
            taps: h.len(),
            branches,
            schedule,
            history: vec![T::zero(); hist],
            buf: Vec::new(),
        })
    }
}

impl<T: Float> Resampler<T> for FirRateConverter<T> {
    fn process(&mut self, x: &[T]) -> Result<Vec<T>, ResampleError> {
        let (l, m) = (self.interp, self.decim);
        check_frame(x.len(), m)?;
        let hist = self.history.len();
        self.buf.clear();
        self.buf.extend_from_slice(&self.history);
        self.buf.extend_from_slice(x);

        let periods = x.len() / m;
        let mut y = Vec::with_capacity(periods * l);
        for p in 0..periods {
            for &(phase, offset) in &self.schedule {
                let newest = hist + p * m + offset;
                let acc = self.branches[phase]
                    .iter()
                    .enumerate()
                    .fold(T::zero(), |acc, (j, &c)| acc + c * self.buf[newest - j]);
                y.push(acc);
            }
        }

        let tail = self.buf.len() - hist;
        self.history.copy_from_slice(&self.buf[tail..]);
        Ok(y)
    }

    fn delay(&self) -> usize {
        group_delay(self.taps, self.decim)
    }

    fn interp_rate(&self) -> usize {
        self.interp
    }

    fn decim_rate(&self) -> usize {
        self.decim
    }
}

/// Integer-factor interpolating FIR.
#[derive(Debug, Clone)]
pub struct FirInterpolator<T: Float> {
    inner: FirRateConverter<T>,
}

impl<T: Float> FirInterpolator<T> {
    pub fn new(interp: usize) -> Result<Self, ResampleError> {
        if interp == 0 {
            return Err(ResampleError::InvalidFactor(interp));
        }
        Self::with_filter(interp, &design_multirate_fir(interp, 1)?)
    }

    pub fn with_filter(interp: usize, h: &[T]) -> Result<Self, ResampleError> {
        Ok(Self {
            inner: FirRateConverter::with_filter(interp, 1, h)?,
        })
    }
}

impl<T: Float> Resampler<T> for FirInterpolator<T> {
    fn process(&mut self, x: &[T]) -> Result<Vec<T>, ResampleError> {
        self.inner.process(x)
    }

    fn delay(&self) -> usize {
        self.inner.delay()
    }

    fn interp_rate(&self) -> usize {
        self.inner.interp
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleMode {
    Bypass,
    Decimator,
    Interpolator,
    RateConverter,
}

#[derive(Debug, Clone)]
enum Stage<T: Float> {
    Bypass,
    Decimator(FirDecimator<T>),
    Interpolator(FirInterpolator<T>),
    RateConverter(FirRateConverter<T>),
}

/// Converter between two sample rates, picking the cheapest structure for
/// the reduced ratio `out_fs / in_fs`.
#[derive(Debug, Clone)]
pub struct FirResampler<T: Float> {
    stage: Stage<T>,
}

impl<T: Float> FirResampler<T> {
    pub fn new(out_fs: usize, in_fs: usize) -> Result<Self, ResampleError> {
        if out_fs == 0 || in_fs == 0 {
            return Err(ResampleError::InvalidRate { out_fs, in_fs });
        }
        let g = gcd(out_fs, in_fs);
        let (l, m) = (out_fs / g, in_fs / g);
        let stage = match (l, m) {
            (1, 1) => Stage::Bypass,
            (1, m) => Stage::Decimator(FirDecimator::new(m)?),
            (l, 1) => Stage::Interpolator(FirInterpolator::new(l)?),
            (l, m) => Stage::RateConverter(FirRateConverter::new(l, m)?),
        };
        Ok(Self { stage })
    }

    pub fn mode(&self) -> ResampleMode {
        match self.stage {
            Stage::Bypass => ResampleMode::Bypass,
            Stage::Decimator(_) => ResampleMode::Decimator,
            Stage::Interpolator(_) => ResampleMode::Interpolator,
            Stage::RateConverter(_) => ResampleMode::RateConverter,
        }
    }
}

impl<T: Float> Resampler<T> for FirResampler<T> {
    fn process(&mut self, x: &[T]) -> Result<Vec<T>, ResampleError> {
        match &mut self.stage {
            Stage::Bypass => Ok(x.to_vec()),
            Stage::Decimator(r) => r.process(x),
            Stage::Interpolator(r) => r.process(x),
            Stage::RateConverter(r) => r.process(x),
        }
    }

    fn delay(&self) -> usize {
        match &self.stage {
            Stage::Bypass => 0,
            Stage::Decimator(r) => r.delay(),
            Stage::Interpolator(r) => r.delay(),
            Stage::RateConverter(r) => r.delay(),
        }
    }

    fn interp_rate(&self) -> usize {
        match &self.stage {
            Stage::Bypass | Stage::Decimator(_) => 1,
            Stage::Interpolator(r) => r.interp_rate(),
            Stage::RateConverter(r) => r.interp_rate(),
        }
    }

    fn decim_rate(&self) -> usize {
        match &self.stage {
            Stage::Bypass | Stage::Interpolator(_) => 1,
            Stage::Decimator(r) => r.decim_rate(),
            Stage::RateConverter(r) => r.decim_rate(),
        }
    }
}

/// Resample a whole signal by `p / q`, compensating the filter delay.
///
/// Returns `x.len()·p'/q'` samples where `p'/q'` is the reduced ratio.
pub fn resample<T: Float>(x: &[T], p: usize, q: usize) -> Result<Vec<T>, ResampleError> {
    let mut rs = FirResampler::new(p, q)?;
    let (l, m) = (rs.interp_rate(), rs.decim_rate());
    let out_len = x.len() * l / m;
    let delay = rs.delay();

    let mut padded = x.to_vec();
    padded.resize(rs.next_size(x.len()), T::zero());
    let mut y = rs.process(&padded)?;
    let flush = rs.next_size((delay * m).div_ceil(l));
    y.extend(rs.process(&vec![T::zero(); flush])?);

    y.drain(..delay.min(y.len()));
    y.truncate(out_len);
    Ok(y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(x: &[f64], h: &[f64]) -> Vec<f64> {
        (0..x.len())
            .map(|i| (0..h.len()).filter(|&k| k <= i).map(|k| h[k] * x[i - k]).sum())
            .collect()
    }

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| ((i * 7) % 13) as f64 - 6.0).collect()
    }

    #[test]
    fn polyphase_splits_normalized_taps() {
        let b = polyphase(&[1.0, 2.0, 3.0, 4.0, 5.0], 2, 2.0).unwrap();
        assert_eq!(b.len(), 2);
        let s = 15.0;
        assert_eq!(b[0], vec![2.0 / s, 6.0 / s, 10.0 / s]);
        assert_eq!(b[1], vec![4.0 / s, 8.0 / s, 0.0]);
        assert_eq!(polyphase(&[1.0, -1.0], 2, 1.0), Err(ResampleError::InvalidFilter("taps sum to zero")));
        assert_eq!(polyphase::<f64>(&[1.0], 0, 1.0), Err(ResampleError::InvalidFactor(0)));
    }

    #[test]
    fn sizes_round_to_reduced_decimation() {
        assert_eq!(next_size(10, 2, 6), 12);
        assert_eq!(prev_size(10, 2, 6), 9);
        assert_eq!(next_size(10, 3, 1), 10);
    }

    #[test]
    fn decimator_is_filter_then_downsample() {
        let h = [0.1, 0.2, 0.4, 0.2, 0.1, 0.05, 0.3];
        let total: f64 = h.iter().sum();
        let hn: Vec<f64> = h.iter().map(|v| v / total).collect();
        let x = ramp(60);
        let full = direct(&x, &hn);
        let mut dec = FirDecimator::with_filter(3, &h).unwrap();
        let mut y = dec.process(&x[..30]).unwrap();
        y.extend(dec.process(&x[30..]).unwrap());
        assert_eq!(y.len(), 20);
        for (i, v) in y.iter().enumerate() {
            assert!((v - full[3 * i]).abs() < 1e-12, "i={i}");
        }
        assert_eq!(
            dec.process(&x[..4]),
            Err(ResampleError::InvalidFrameLength { len: 4, multiple: 3 })
        );
    }

    #[test]
    fn rate_converter_is_upsample_filter_downsample() {
        let (l, m) = (3, 2);
        let h: Vec<f64> = (0..11).map(|i| 1.0 + (i as f64 * 0.5).sin()).collect();
        let total: f64 = h.iter().sum();
        let hn: Vec<f64> = h.iter().map(|v| v / total * l as f64).collect();
        let x = ramp(40);
        let mut up = vec![0.0; x.len() * l];
        for (i, &v) in x.iter().enumerate() {
            up[i * l] = v;
        }
        let full = direct(&up, &hn);
        let mut rc = FirRateConverter::with_filter(l, m, &h).unwrap();
        let mut y = Vec::new();
        for chunk in x.chunks(8) {
            y.extend(rc.process(chunk).unwrap());
        }
        assert_eq!(y.len(), x.len() * l / m);
        for (k, v) in y.iter().enumerate() {
            assert!((v - full[k * m]).abs() < 1e-12, "k={k}");
        }
    }

    #[test]
    fn resampler_picks_mode_from_reduced_ratio() {
        let modes = [
            ((48_000, 48_000), ResampleMode::Bypass),
            ((16_000, 48_000), ResampleMode::Decimator),
            ((48_000, 16_000), ResampleMode::Interpolator),
            ((48_000, 44_100), ResampleMode::RateConverter),
        ];
        for ((out_fs, in_fs), mode) in modes {
            assert_eq!(FirResampler::<f64>::new(out_fs, in_fs).unwrap().mode(), mode);
        }
        assert!(matches!(
            FirResampler::<f64>::new(0, 8),
            Err(ResampleError::InvalidRate { .. })
        ));
    }

    #[test]
    fn resample_keeps_a_slow_tone_aligned() {
        let n = 600;
        let f = 0.01;
        let x: Vec<f64> = (0..n).map(|i| (2.0 * core::f64::consts::PI * f * i as f64).sin()).collect();
        for (p, q) in [(1usize, 2usize), (2, 1), (3, 2), (2, 3)] {
            let y = resample(&x, p, q).unwrap();
            assert_eq!(y.len(), n * p / q);
            let ratio = q as f64 / p as f64;
            // skip the edges where the filter sees the zero padding
            let edge = 40;
            for (i, v) in y.iter().enumerate().skip(edge).take(y.len() - 2 * edge) {
                let t = i as f64 * ratio;
                let expected = (2.0 * core::f64::consts::PI * f * t).sin();
                assert!((v - expected).abs() < 0.05, "p={p} q={q} i={i}: {v} vs {expected}");
            }
        }
    }
}
