//! Displacer: bounded-depth recursive cuckoo displacement.
//!
//! [`displace`] tries to seat `(key, data)` in one of its two candidate
//! bins. If both are full, it looks for a slot in either bin that is
//! occupied by an entry currently living in its *primary* (home) bin,
//! evicts that entry into the new key's place, and recurses to find the
//! evicted entry a new home, never touching an entry that is only
//! resident in a bin as its secondary choice, since relocating those
//! could not be undone symmetrically.

use crate::bin::{Bin, Storage, BIN_SIZE};
use crate::hash;
use crate::INF;

/// Attempts to insert `(key, data)` into `storage`, which has `bins` bins,
/// displacing at most `ttl` entries along the way.
///
/// Returns `true` and leaves `storage` with `key` inserted on success.
/// Returns `false` and leaves `storage` unchanged (every displacement
/// attempted along the way is rolled back) if no placement is found
/// within `ttl` recursive steps.
pub(crate) fn displace(storage: &mut Storage, bins: u32, key: u32, data: &[u32], ttl: u32) -> bool {
    if ttl == 0 {
        return false;
    }

    let base_full = hash::primary_bin(key, bins) as usize;
    if storage.bin_mut(base_full).keys[BIN_SIZE - 1] == INF {
        seat_in_tail(&mut storage.bin_mut(base_full), key, data);
        return true;
    }

    let base_half = hash::secondary_bin(key, bins) as usize;
    if storage.bin_mut(base_half).keys[BIN_SIZE - 1] == INF {
        seat_in_tail(&mut storage.bin_mut(base_half), key, data);
        return true;
    }

    if try_evict_from(storage, bins, base_full, key, data, ttl) {
        return true;
    }
    if try_evict_from(storage, bins, base_half, key, data, ttl) {
        return true;
    }

    false
}

#[inline]
fn seat_in_tail(bin: &mut Bin<'_>, key: u32, data: &[u32]) {
    bin.write(BIN_SIZE - 1, key, data);
    bin.roll_left(BIN_SIZE - 1);
}

/// Scans `base`'s slots for an entry whose primary bin is `base`, evicts
/// it in favor of `(key, data)`, and recurses. Restores `base` to its
/// prior state if the recursive placement of the evicted entry fails.
fn try_evict_from(
    storage: &mut Storage,
    bins: u32,
    base: usize,
    key: u32,
    data: &[u32],
    ttl: u32,
) -> bool {
    for offset in 0..BIN_SIZE {
        let cand_key = storage.bin_mut(base).keys[offset];
        if hash::primary_bin(cand_key, bins) as usize != base {
            continue;
        }

        let (_, cand_data) = storage.bin_mut(base).read(offset);
        let words = storage.words;
        let mut cand_offset = offset;
        {
            let mut bin = storage.bin_mut(base);
            bin.write(cand_offset, key, data);
            bin.adjust(&mut cand_offset);
        }

        if displace(storage, bins, cand_key, &cand_data[..words], ttl - 1) {
            return true;
        }

        let mut bin = storage.bin_mut(base);
        debug_assert_eq!(bin.keys[cand_offset], key);
        bin.write(cand_offset, cand_key, &cand_data[..words]);
        bin.adjust(&mut cand_offset);
        debug_assert_eq!(cand_offset, offset);
    }
    false
}
