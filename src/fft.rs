//! Complex FFT plans and the plan factory.
//!
//! A transform length is classified once into one of four classes and mapped
//! to an engine: closed-form kernels for 1, 2, 4 and 8 points, iterative
//! radix-2 for other powers of two, the prime engine for prime lengths and
//! the mixed-radix tree for everything else.
//!
//! [`FftPlanner`] is an explicit context owning the shared tables and the
//! bounded plan caches. With the `std` feature the free functions [`fft`],
//! [`ifft`], [`rfft`] and [`irfft`] run on a thread-local planner.

use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use log::{debug, trace};

use crate::cache::LruCache;
use crate::config::PlannerConfig;
use crate::czt::CztPlan;
use crate::fft_kernels::fft_small;
use crate::mixed_radix::MixedRadixFft;
use crate::num::{Complex, Float};
use crate::prime::PrimeFft;
use crate::primes::is_prime;
use crate::radix2::Radix2Fft;
use crate::rfft::{RealFftPlan, RealIfftPlan};
use crate::tables::TableCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftError {
    EmptyInput,
    MismatchedLengths { expected: usize, actual: usize },
    NonPowerOfTwo(usize),
    InvalidLength(usize),
    InvalidParameter(&'static str),
}

impl core::fmt::Display for FftError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FftError::EmptyInput => write!(f, "input is empty"),
            FftError::MismatchedLengths { expected, actual } => {
                write!(f, "length mismatch: expected {}, got {}", expected, actual)
            }
            FftError::NonPowerOfTwo(n) => write!(f, "length {} is not a power of two", n),
            FftError::InvalidLength(n) => write!(f, "invalid transform length {}", n),
            FftError::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FftError {}

/// Length class of a transform size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthClass {
    PowerOfTwo,
    Prime,
    EvenComposite,
    OddComposite,
}

/// Classify a transform length. `1` counts as a power of two.
pub fn classify(n: usize) -> Result<LengthClass, FftError> {
    if n == 0 {
        return Err(FftError::EmptyInput);
    }
    Ok(if n.is_power_of_two() {
        LengthClass::PowerOfTwo
    } else if is_prime(n) {
        LengthClass::Prime
    } else if n % 2 == 0 {
        LengthClass::EvenComposite
    } else {
        LengthClass::OddComposite
    })
}

/// Lengths served by the hand-unrolled kernels.
pub fn is_small_size(n: usize) -> bool {
    matches!(n, 1 | 2 | 4 | 8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Small,
    Radix2,
    MixedRadix,
    Prime,
}

/// Forward transform engine for one fixed length.
#[derive(Debug, Clone)]
pub enum FftEngine<T: Float> {
    Small(usize),
    Radix2(Radix2Fft<T>),
    MixedRadix(MixedRadixFft<T>),
    Prime(PrimeFft<T>),
}

impl<T: Float> FftEngine<T> {
    pub fn new(n: usize, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        if is_small_size(n) {
            return Ok(FftEngine::Small(n));
        }
        Ok(match classify(n)? {
            LengthClass::PowerOfTwo => FftEngine::Radix2(Radix2Fft::new(n, tables)?),
            LengthClass::Prime => FftEngine::Prime(PrimeFft::new(n, tables)?),
            LengthClass::EvenComposite | LengthClass::OddComposite => {
                FftEngine::MixedRadix(MixedRadixFft::new(n, tables)?)
            }
        })
    }

    pub fn len(&self) -> usize {
        match self {
            FftEngine::Small(n) => *n,
            FftEngine::Radix2(e) => e.len(),
            FftEngine::MixedRadix(e) => e.len(),
            FftEngine::Prime(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> EngineKind {
        match self {
            FftEngine::Small(_) => EngineKind::Small,
            FftEngine::Radix2(_) => EngineKind::Radix2,
            FftEngine::MixedRadix(_) => EngineKind::MixedRadix,
            FftEngine::Prime(_) => EngineKind::Prime,
        }
    }

    /// Forward transform of `x` into `y`; both have the engine length.
    pub fn solve(&mut self, x: &[Complex<T>], y: &mut [Complex<T>]) {
        match self {
            FftEngine::Small(_) => {
                y.copy_from_slice(x);
                fft_small(y);
            }
            FftEngine::Radix2(e) => e.solve(x, y),
            FftEngine::MixedRadix(e) => e.solve(x, y),
            FftEngine::Prime(e) => e.solve(x, y),
        }
    }
}

/// Complex-to-complex plan bound to one length and one direction.
///
/// The inverse is computed as `conj(fft(conj(x))) / n`.
#[derive(Debug, Clone)]
pub struct FftPlan<T: Float> {
    n: usize,
    inverse: bool,
    engine: FftEngine<T>,
    work: Vec<Complex<T>>,
}

impl<T: Float> FftPlan<T> {
    pub fn new(n: usize, inverse: bool, tables: &mut TableCache<T>) -> Result<Self, FftError> {
        let engine = FftEngine::new(n, tables)?;
        debug!(
            "fft plan n={} engine={:?} inverse={}",
            n,
            engine.kind(),
            inverse
        );
        Ok(Self {
            n,
            inverse,
            engine,
            work: vec![Complex::zero(); n],
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn is_inverse(&self) -> bool {
        self.inverse
    }

    pub fn kind(&self) -> EngineKind {
        self.engine.kind()
    }

    fn check(&self, len: usize) -> Result<(), FftError> {
        if len != self.n {
            return Err(FftError::MismatchedLengths {
                expected: self.n,
                actual: len,
            });
        }
        Ok(())
    }

    /// Transform `x` into `y` without allocating.
    pub fn solve(&mut self, x: &[Complex<T>], y: &mut [Complex<T>]) -> Result<(), FftError> {
        self.check(x.len())?;
        self.check(y.len())?;
        if !self.inverse {
            self.engine.solve(x, y);
            return Ok(());
        }
        for (w, v) in self.work.iter_mut().zip(x) {
            *w = v.conj();
        }
        self.engine.solve(&self.work, y);
        let scale = T::one() / T::from_usize(self.n);
        for v in y.iter_mut() {
            *v = v.conj().scale(scale);
        }
        Ok(())
    }

    /// Transform `data` in place.
    pub fn solve_inplace(&mut self, data: &mut [Complex<T>]) -> Result<(), FftError> {
        self.check(data.len())?;
        if self.inverse {
            for (w, v) in self.work.iter_mut().zip(data.iter()) {
                *w = v.conj();
            }
        } else {
            self.work.copy_from_slice(data);
        }
        self.engine.solve(&self.work, data);
        if self.inverse {
            let scale = T::one() / T::from_usize(self.n);
            for v in data.iter_mut() {
                *v = v.conj().scale(scale);
            }
        }
        Ok(())
    }

    pub fn process(&mut self, x: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let mut y = vec![Complex::zero(); self.n];
        self.solve(x, &mut y)?;
        Ok(y)
    }
}

/// Shared handle to a cached plan.
pub type Shared<P> = Rc<RefCell<P>>;

fn cached<P, F>(cache: &mut LruCache<usize, Shared<P>>, n: usize, build: F) -> Result<Shared<P>, FftError>
where
    F: FnOnce() -> Result<P, FftError>,
{
    let bypass = is_small_size(n);
    if !bypass {
        if let Some(plan) = cache.get(&n) {
            return Ok(Rc::clone(plan));
        }
    }
    let plan = Rc::new(RefCell::new(build()?));
    if !bypass {
        if let Some(old) = cache.put(n, Rc::clone(&plan)) {
            trace!("plan cache evicted n={}", old);
        }
    }
    Ok(plan)
}

fn borrow<P>(plan: &Shared<P>) -> Result<core::cell::RefMut<'_, P>, FftError> {
    plan.try_borrow_mut()
        .map_err(|_| FftError::InvalidParameter("plan is already borrowed"))
}

/// Plan factory: shared twiddle/bit-reversal tables plus one bounded LRU
/// cache per plan domain and direction.
pub struct FftPlanner<T: Float> {
    tables: TableCache<T>,
    fft_cache: LruCache<usize, Shared<FftPlan<T>>>,
    ifft_cache: LruCache<usize, Shared<FftPlan<T>>>,
    rfft_cache: LruCache<usize, Shared<RealFftPlan<T>>>,
    irfft_cache: LruCache<usize, Shared<RealIfftPlan<T>>>,
}

impl<T: Float> Default for FftPlanner<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> FftPlanner<T> {
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        let cap = config.plan_cache_size;
        Self {
            tables: TableCache::new(),
            fft_cache: LruCache::new(cap),
            ifft_cache: LruCache::new(cap),
            rfft_cache: LruCache::new(cap),
            irfft_cache: LruCache::new(cap),
        }
    }

    /// Plans kept per cache.
    pub fn capacity(&self) -> usize {
        self.fft_cache.capacity()
    }

    /// Plans currently held across all caches.
    pub fn cached_plans(&self) -> usize {
        self.fft_cache.len() + self.ifft_cache.len() + self.rfft_cache.len() + self.irfft_cache.len()
    }

    pub fn tables(&self) -> &TableCache<T> {
        &self.tables
    }

    /// Drop every cached plan. Tables are kept.
    pub fn clear(&mut self) {
        self.fft_cache.clear();
        self.ifft_cache.clear();
        self.rfft_cache.clear();
        self.irfft_cache.clear();
    }

    pub fn plan_fft(&mut self, n: usize) -> Result<FftPlan<T>, FftError> {
        FftPlan::new(n, false, &mut self.tables)
    }

    pub fn plan_ifft(&mut self, n: usize) -> Result<FftPlan<T>, FftError> {
        FftPlan::new(n, true, &mut self.tables)
    }

    pub fn plan_rfft(&mut self, n: usize) -> Result<RealFftPlan<T>, FftError> {
        RealFftPlan::new(n, &mut self.tables)
    }

    pub fn plan_irfft(&mut self, n: usize) -> Result<RealIfftPlan<T>, FftError> {
        RealIfftPlan::new(n, &mut self.tables)
    }

    /// Chirp-Z plan sharing this planner's tables. Not cached.
    pub fn plan_czt(
        &mut self,
        n: usize,
        m: usize,
        w: Complex<T>,
        a: Complex<T>,
    ) -> Result<CztPlan<T>, FftError> {
        CztPlan::new(n, m, w, a, &mut self.tables)
    }

    pub fn fft_plan(&mut self, n: usize) -> Result<Shared<FftPlan<T>>, FftError> {
        let tables = &mut self.tables;
        cached(&mut self.fft_cache, n, || FftPlan::new(n, false, tables))
    }

    pub fn ifft_plan(&mut self, n: usize) -> Result<Shared<FftPlan<T>>, FftError> {
        let tables = &mut self.tables;
        cached(&mut self.ifft_cache, n, || FftPlan::new(n, true, tables))
    }

    pub fn rfft_plan(&mut self, n: usize) -> Result<Shared<RealFftPlan<T>>, FftError> {
        let tables = &mut self.tables;
        cached(&mut self.rfft_cache, n, || RealFftPlan::new(n, tables))
    }

    pub fn irfft_plan(&mut self, n: usize) -> Result<Shared<RealIfftPlan<T>>, FftError> {
        let tables = &mut self.tables;
        cached(&mut self.irfft_cache, n, || RealIfftPlan::new(n, tables))
    }

    pub fn fft(&mut self, x: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let plan = self.fft_plan(x.len())?;
        let mut plan = borrow(&plan)?;
        plan.process(x)
    }

    pub fn ifft(&mut self, x: &[Complex<T>]) -> Result<Vec<Complex<T>>, FftError> {
        let plan = self.ifft_plan(x.len())?;
        let mut plan = borrow(&plan)?;
        plan.process(x)
    }

    /// Full-length spectrum of a real signal.
    pub fn rfft(&mut self, x: &[T]) -> Result<Vec<Complex<T>>, FftError> {
        let plan = self.rfft_plan(x.len())?;
        let mut plan = borrow(&plan)?;
        plan.process(x)
    }

    /// `n` real samples from either `n` or `n/2 + 1` spectrum bins.
    pub fn irfft(&mut self, x: &[Complex<T>], n: usize) -> Result<Vec<T>, FftError> {
        let plan = self.irfft_plan(n)?;
        let mut plan = borrow(&plan)?;
        plan.process(x)
    }
}

#[cfg(feature = "std")]
mod local {
    use super::*;
    use crate::num::{Cmplx, Real};

    std::thread_local! {
        static PLANNER: RefCell<FftPlanner<Real>> = RefCell::new(FftPlanner::new());
        static LAST_FFT: RefCell<Option<Shared<FftPlan<Real>>>> = const { RefCell::new(None) };
        static LAST_IFFT: RefCell<Option<Shared<FftPlan<Real>>>> = const { RefCell::new(None) };
    }

    pub(super) fn with_planner<R>(f: impl FnOnce(&mut FftPlanner<Real>) -> R) -> R {
        PLANNER.with(|p| f(&mut p.borrow_mut()))
    }

    pub(super) fn run_last(inverse: bool, x: &[Cmplx]) -> Result<Vec<Cmplx>, FftError> {
        let n = x.len();
        let slot = if inverse { &LAST_IFFT } else { &LAST_FFT };
        let plan = slot.with(|last| -> Result<Shared<FftPlan<Real>>, FftError> {
            let mut last = last.borrow_mut();
            if let Some(plan) = last.as_ref() {
                if plan.borrow().len() == n {
                    return Ok(Rc::clone(plan));
                }
            }
            let plan = with_planner(|p| if inverse { p.ifft_plan(n) } else { p.fft_plan(n) })?;
            *last = Some(Rc::clone(&plan));
            Ok(plan)
        })?;
        let mut plan = borrow(&plan)?;
        plan.process(x)
    }

    pub(super) fn clear() {
        LAST_FFT.with(|l| *l.borrow_mut() = None);
        LAST_IFFT.with(|l| *l.borrow_mut() = None);
        with_planner(|p| p.clear());
    }
}

#[cfg(feature = "std")]
fn resized<V: Copy + Default>(x: &[V], n: usize) -> Vec<V> {
    let mut out = vec![V::default(); n];
    let keep = x.len().min(n);
    out[..keep].copy_from_slice(&x[..keep]);
    out
}

/// Forward transform on the calling thread's planner.
#[cfg(feature = "std")]
pub fn fft(x: &[crate::num::Cmplx]) -> Result<Vec<crate::num::Cmplx>, FftError> {
    local::run_last(false, x)
}

/// Inverse transform on the calling thread's planner, scaled by `1/n`.
#[cfg(feature = "std")]
pub fn ifft(x: &[crate::num::Cmplx]) -> Result<Vec<crate::num::Cmplx>, FftError> {
    local::run_last(true, x)
}

/// [`fft`] of `x` zero-padded or truncated to `n` points.
#[cfg(feature = "std")]
pub fn fft_n(x: &[crate::num::Cmplx], n: usize) -> Result<Vec<crate::num::Cmplx>, FftError> {
    fft(&resized(x, n))
}

/// Full-length spectrum of a real signal.
#[cfg(feature = "std")]
pub fn rfft(x: &[crate::num::Real]) -> Result<Vec<crate::num::Cmplx>, FftError> {
    local::with_planner(|p| p.rfft(x))
}

/// [`rfft`] of `x` zero-padded or truncated to `n` points.
#[cfg(feature = "std")]
pub fn rfft_n(x: &[crate::num::Real], n: usize) -> Result<Vec<crate::num::Cmplx>, FftError> {
    rfft(&resized(x, n))
}

/// Real inverse of a full-length, conjugate-symmetric spectrum.
#[cfg(feature = "std")]
pub fn irfft(x: &[crate::num::Cmplx]) -> Result<Vec<crate::num::Real>, FftError> {
    local::with_planner(|p| p.irfft(x, x.len()))
}

/// Real inverse producing `n` samples from `n` or `n/2 + 1` bins.
#[cfg(feature = "std")]
pub fn irfft_n(x: &[crate::num::Cmplx], n: usize) -> Result<Vec<crate::num::Real>, FftError> {
    local::with_planner(|p| p.irfft(x, n))
}

/// Reusable forward plan sharing the thread's tables.
#[cfg(feature = "std")]
pub fn make_fft_plan(n: usize) -> Result<FftPlan<crate::num::Real>, FftError> {
    local::with_planner(|p| p.plan_fft(n))
}

/// Reusable inverse plan sharing the thread's tables.
#[cfg(feature = "std")]
pub fn make_ifft_plan(n: usize) -> Result<FftPlan<crate::num::Real>, FftError> {
    local::with_planner(|p| p.plan_ifft(n))
}

/// Forget the calling thread's cached plans.
#[cfg(feature = "std")]
pub fn clear_thread_plans() {
    local::clear();
}


#[cfg(all(feature = "internal-tests", test))]
mod proptests {
    use super::*;
    use crate::num::Complex64;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_trip_any_length(data in proptest::collection::vec(-1.0e3f64..1.0e3, 1..200)) {
            let x: Vec<Complex64> = data.chunks(2)
                .map(|c| Complex64::new(c[0], *c.get(1).unwrap_or(&0.0)))
                .collect();
            let mut planner = FftPlanner::<f64>::new();
            let spectrum = planner.fft(&x).unwrap();
            let back = planner.ifft(&spectrum).unwrap();
            for (a, b) in back.iter().zip(x.iter()) {
                prop_assert!((*a - *b).norm() < 1e-7 * (1.0 + b.norm()));
            }
        }
    }
}
