//! Hash Pair: the two integer mixers used to compute a key's primary and
//! secondary bin.
//!
//! Both functions are Bob Jenkins's 32-bit integer avalanche mixers
//! (<http://burtleburtle.net/bob/hash/integer.html>), carried over bit for
//! bit. They are deliberately not `BuildHasher`/`Hasher` impls: the table
//! needs two independent, fixed mixers over a `u32` key, not a generic
//! hashing interface.

/// Full avalanche mix, used to compute a key's primary bin.
#[inline]
#[must_use]
pub(crate) fn full_avalanche(a: u32) -> u32 {
    let a = a.wrapping_add(0x7ed5_5d16).wrapping_add(a << 12);
    let a = (a ^ 0xc761_c23c) ^ (a >> 19);
    let a = a.wrapping_add(0x1656_67b1).wrapping_add(a << 5);
    let a = a.wrapping_add(0xd3a2_646c) ^ (a << 9);
    let a = a.wrapping_add(0xfd70_46c5).wrapping_add(a << 3);
    (a ^ 0xb55a_4f09) ^ (a >> 16)
}

/// Half avalanche mix, used to compute a key's secondary bin.
#[inline]
#[must_use]
pub(crate) fn half_avalanche(a: u32) -> u32 {
    let a = !a;
    let a = a.wrapping_add(0x479a_b41d).wrapping_add(a << 8);
    let a = (a ^ 0xe4aa_10ce) ^ (a >> 5);
    let a = a.wrapping_add(0x9942_f0a6).wrapping_sub(a << 14);
    let a = (a ^ 0x5aed_d67d) ^ (a >> 3);
    a.wrapping_add(0x17be_a992).wrapping_add(a << 7)
}

/// Computes a key's primary bin index, `full_avalanche(key) % bins`.
#[inline]
#[must_use]
pub(crate) fn primary_bin(key: u32, bins: u32) -> u32 {
    full_avalanche(key) % bins
}

/// Computes a key's secondary bin index, `half_avalanche(key) % bins`.
#[inline]
#[must_use]
pub(crate) fn secondary_bin(key: u32, bins: u32) -> u32 {
    half_avalanche(key) % bins
}
