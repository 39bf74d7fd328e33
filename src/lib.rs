//! # dspfft - FFT engines and multirate filtering for Rust
//!
//! Transform plans for any length, an overlap-add FIR filter and polyphase
//! resamplers built on them.
//!
//! ## Features
//!
//! - **Any transform length**: radix-2 for powers of two, a mixed-radix
//!   factor tree for composite lengths, direct DFT for small primes and the
//!   Chirp-Z transform above that
//! - **Real transforms** at half the cost for even lengths
//! - **Plan caching**: bounded LRU per thread plus a last-plan fast path
//! - **Filtering**: overlap-add FFT filters, FIR design, polyphase
//!   decimators, interpolators and rate converters, DFT filter banks
//!
//! ## Cargo Features
//!
//! - `std` (default): thread-local plan caches, environment configuration,
//!   `std::error::Error` impls
//! - `single-precision`: use `f32` as [`Real`] instead of `f64`
//! - `internal-tests`: property tests inside the crate
//!
//! ## Configuration
//!
//! `DSPFFT_PLAN_CACHE_SIZE` sets the number of plans each cache keeps
//! (default 16, `0` disables caching). See [`config`].
//!
//! ## Examples
//!
//! ```
//! use dspfft::{fft, ifft, Cmplx};
//!
//! let x = [1.0, 2.0, 3.0, 4.0].map(|v| Cmplx::new(v, 0.0));
//! let y = fft(&x).unwrap();
//! assert!((y[0].re - 10.0).abs() < 1e-9);
//! let back = ifft(&y).unwrap();
//! assert!((back[3].re - 4.0).abs() < 1e-9);
//! ```

#![no_std]
extern crate alloc;
#[cfg(any(feature = "std", test))]
extern crate std;

/// Scalar trait and complex numbers
pub mod num;

/// Prime tests, factorization and power-of-two helpers
pub mod primes;

/// Bounded LRU map backing the plan caches
pub mod cache;

/// Twiddle and bit-reversal tables shared between plans
pub mod tables;

/// Closed-form transforms for 2, 3, 4, 5 and 8 points
pub mod fft_kernels;

pub mod radix2;
pub mod mixed_radix;
pub mod prime;
pub mod czt;

/// Plans, plan factory and the thread-local convenience API
pub mod fft;

/// Real-input forward and inverse plans
pub mod rfft;

pub mod config;

/// Overlap-add FFT filters
pub mod fft_filter;

pub mod window;
pub mod fir;

/// Polyphase resampling
pub mod resample;

/// DFT analysis and synthesis filter banks
pub mod subband;

pub use czt::{czt, CztPlan};
pub use fft::{FftEngine, FftError, FftPlan, FftPlanner};
#[cfg(feature = "std")]
pub use fft::{fft, fft_n, ifft, irfft, irfft_n, make_fft_plan, make_ifft_plan, rfft, rfft_n};
pub use fft_filter::{FftFilter, RealFftFilter};
pub use num::{Cmplx, Complex, Complex32, Complex64, Float, Real};
pub use resample::{resample, FirResampler, ResampleError, Resampler};
pub use rfft::{RealFftPlan, RealIfftPlan};
pub use subband::{ChannelSynthesizer, Channelizer};
