//! Primality and factorization helpers used to classify transform lengths.

use alloc::vec;
use alloc::vec::Vec;

/// Primes below 256, used as the first trial divisors.
pub const SMALL_PRIMES: [usize; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

const LARGEST_SMALL_PRIME: usize = 251;

/// Trial divisors: the cached table first, then `6k ± 1` candidates.
struct Divisors {
    idx: usize,
    next: usize,
    plus_two: bool,
}

impl Divisors {
    fn new() -> Self {
        Self {
            idx: 0,
            // first 6k-1 candidate above the table
            next: 257,
            plus_two: true,
        }
    }
}

impl Iterator for Divisors {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if let Some(&p) = SMALL_PRIMES.get(self.idx) {
            self.idx += 1;
            return Some(p);
        }
        let d = self.next;
        self.next += if self.plus_two { 2 } else { 4 };
        self.plus_two = !self.plus_two;
        Some(d)
    }
}

/// Deterministic trial-division primality test.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n > 5 && (n % 2 == 0 || n % 3 == 0 || n % 5 == 0) {
        return false;
    }
    if n <= LARGEST_SMALL_PRIME {
        return SMALL_PRIMES.binary_search(&n).is_ok();
    }
    for d in Divisors::new() {
        if d.saturating_mul(d) > n {
            break;
        }
        if n % d == 0 {
            return false;
        }
    }
    true
}

/// Prime factors of `n` in ascending order, with multiplicity.
///
/// For `n <= 3` the result is `[n]`.
pub fn factor(n: usize) -> Vec<usize> {
    if n <= 3 {
        return vec![n];
    }
    let mut rest = n;
    let mut out = Vec::new();
    for d in Divisors::new() {
        if d.saturating_mul(d) > rest {
            break;
        }
        while rest % d == 0 {
            out.push(d);
            rest /= d;
        }
    }
    if rest > 1 {
        out.push(rest);
    }
    out
}

/// Smallest prime `>= n`.
pub fn next_prime(n: usize) -> usize {
    let mut k = n.max(2);
    while !is_prime(k) {
        k += 1;
    }
    k
}

/// All primes `<= n`.
pub fn primes_up_to(n: usize) -> Vec<usize> {
    if n <= LARGEST_SMALL_PRIME {
        return SMALL_PRIMES.iter().copied().take_while(|&p| p <= n).collect();
    }
    let mut out: Vec<usize> = SMALL_PRIMES.to_vec();
    out.extend((LARGEST_SMALL_PRIME + 1..=n).filter(|&k| is_prime(k)));
    out
}

#[inline]
pub fn is_pow2(n: usize) -> bool {
    n.is_power_of_two()
}

/// Smallest power of two `>= n` (1 for `n == 0`).
#[inline]
pub fn next_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// `ceil(log2(n))`
#[inline]
pub fn log2_ceil(n: usize) -> u32 {
    next_pow2(n).trailing_zeros()
}


#[cfg(all(feature = "internal-tests", test))]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn factors_multiply_back(n in 4usize..200_000) {
            let f = factor(n);
            prop_assert_eq!(f.iter().product::<usize>(), n);
            prop_assert!(f.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(f.iter().all(|&p| is_prime(p)));
        }
    }
}
