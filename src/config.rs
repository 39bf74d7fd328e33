//! Runtime configuration of the plan factory.
//!
//! The plan cache capacity defaults to [`DEFAULT_PLAN_CACHE_SIZE`]. With the
//! `std` feature it can be set through the `DSPFFT_PLAN_CACHE_SIZE`
//! environment variable (read once per process), and
//! [`set_plan_cache_size`] overrides both for planners created afterwards.

use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "std")]
use std::sync::OnceLock;

/// Plans kept per cache when nothing else is configured.
pub const DEFAULT_PLAN_CACHE_SIZE: usize = 16;

/// Environment variable holding the plan cache capacity.
pub const PLAN_CACHE_SIZE_ENV: &str = "DSPFFT_PLAN_CACHE_SIZE";

/// `usize::MAX` means no override.
const NO_OVERRIDE: usize = usize::MAX;

static PLAN_CACHE_SIZE_OVERRIDE: AtomicUsize = AtomicUsize::new(NO_OVERRIDE);

#[cfg(feature = "std")]
static PLAN_CACHE_SIZE_FROM_ENV: OnceLock<usize> = OnceLock::new();

/// Settings applied when a planner is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Plans kept per plan kind; `0` disables caching.
    pub plan_cache_size: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            plan_cache_size: plan_cache_size(),
        }
    }
}

#[cfg(feature = "std")]
fn env_plan_cache_size() -> usize {
    *PLAN_CACHE_SIZE_FROM_ENV.get_or_init(|| match std::env::var(PLAN_CACHE_SIZE_ENV) {
        Ok(v) => v.trim().parse::<usize>().unwrap_or_else(|_| {
            log::warn!(
                "ignoring {}={:?}: not a non-negative integer",
                PLAN_CACHE_SIZE_ENV,
                v
            );
            DEFAULT_PLAN_CACHE_SIZE
        }),
        Err(_) => DEFAULT_PLAN_CACHE_SIZE,
    })
}

/// Effective plan cache capacity for new planners.
pub fn plan_cache_size() -> usize {
    let forced = PLAN_CACHE_SIZE_OVERRIDE.load(Ordering::Relaxed);
    if forced != NO_OVERRIDE {
        return forced;
    }
    #[cfg(feature = "std")]
    {
        env_plan_cache_size()
    }
    #[cfg(not(feature = "std"))]
    {
        DEFAULT_PLAN_CACHE_SIZE
    }
}

/// Force the plan cache capacity of planners created from now on.
///
/// Thread-local planners that already exist keep their capacity.
pub fn set_plan_cache_size(size: usize) {
    PLAN_CACHE_SIZE_OVERRIDE.store(size.min(NO_OVERRIDE - 1), Ordering::Relaxed);
}

/// Drop a previous [`set_plan_cache_size`] call.
pub fn clear_plan_cache_size_override() {
    PLAN_CACHE_SIZE_OVERRIDE.store(NO_OVERRIDE, Ordering::Relaxed);
}
