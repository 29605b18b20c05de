//! The Prime Table: a monotone sequence of bin counts.
//!
//! [`PRIMES`] maps a *prime index* to a prime number of bins. Using a
//! prime bin count avoids modulo bias interacting with the periodicity of
//! [`crate::hash::full_avalanche`] and [`crate::hash::half_avalanche`].
//! Each entry is roughly `1.28x` the previous one, which bounds the number
//! of grow attempts the Resizer needs before it finds a size that fits.

use crate::bin::BIN_SIZE;

/// Monotone increasing bin counts, indexed by prime index.
///
/// Generated offline (see `DESIGN.md`) as the smallest prime at or above a
/// `1.28x` geometric progression starting at 7.
pub(crate) const PRIMES: &[u32] = &[
    7, 11, 17, 23, 31, 41, 59, 79, 103, 137, 179, 233, 307, 397, 521, 673, 863, 1109, 1423, 1823,
    2339, 2999, 3847, 4931, 6317, 8087, 10357, 13259, 16979, 21737, 27827, 35671, 45667, 58477,
    74857, 95819, 122651, 157007, 200971, 257249, 329281, 421483, 539501, 690583, 883963,
    1131479, 1448303, 1853857, 2372941, 3037369, 3887839, 4976437, 6369841, 8153399, 10436353,
    13358533, 17098931, 21886637, 28014913, 35859091, 45899639, 58751573, 75202027, 96258599,
    123211021, 157710121, 201868967, 258392287, 330742147, 423349973, 541887989, 693616657,
    887829329, 1136421551, 1454619587, 1861913111, 2383248821,
];

/// Returns `bins(i) = P[i]`, the number of bins at prime index `i`.
///
/// # Panics
///
/// Panics if `i` is out of range of the compiled-in prime table. In
/// practice this only happens if the table is asked to grow past roughly
/// `2^31` bins, which is already far beyond any realistic key count.
#[inline]
#[must_use]
pub(crate) fn bins(i: usize) -> u32 {
    PRIMES[i]
}

/// Returns the smallest prime index `i` such that `P[i] * BIN_SIZE >= n_keys`.
#[inline]
#[must_use]
pub(crate) fn prix_for(n_keys: u32) -> usize {
    let n_keys = u64::from(n_keys);
    for (i, &p) in PRIMES.iter().enumerate() {
        if u64::from(p) * (BIN_SIZE as u64) >= n_keys {
            return i;
        }
    }
    PRIMES.len() - 1
}

/// Number of prime indices available.
#[inline]
#[must_use]
pub(crate) fn len() -> usize {
    PRIMES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotone_increasing() {
        for w in PRIMES.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn prix_for_satisfies_bound() {
        for &n in &[0, 1, 16, 112, 1_000, 65_536, 1_000_000] {
            let i = prix_for(n);
            assert!(u64::from(bins(i)) * (BIN_SIZE as u64) >= u64::from(n));
        }
    }

    #[test]
    fn prix_for_is_minimal() {
        let i = prix_for(112);
        if i > 0 {
            assert!(u64::from(bins(i - 1)) * (BIN_SIZE as u64) < 112);
        }
    }
}
