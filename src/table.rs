//! Table Core: the public hash table type, and the Resizer that keeps it
//! sized to its load factor.

use rand::{Rng, RngCore};

use crate::alloc::{BlockAllocator, SystemAllocator};
use crate::bin::{count_keys, locate_key, Storage, BIN_SIZE};
use crate::config::Config;
use crate::displace::displace;
use crate::hash;
use crate::primes;
use crate::stats::Stats;
use crate::INF;

#[inline]
fn ttl_for(depth: u32, bins: u32) -> u32 {
    depth.min(bins)
}

/// A cache-line-bucketed cuckoo hash table mapping `u32` keys to fixed-width
/// `u32` data.
///
/// `Table` is generic over its bin storage via [`BlockAllocator`];
/// [`SystemAllocator`] is the default and is all most callers need, the
/// same way [`std::collections::HashMap`] defaults its hasher parameter.
///
/// The table tracks [`Table::min`] and [`Table::max`] as the smallest and
/// largest key seen *since the last rebuild* (construction counts as a
/// rebuild): once widened past the current table extent, a delete never
/// narrows them back, since doing so would require a full scan.
pub struct Table<A: BlockAllocator = SystemAllocator> {
    alloc: A,
    storage: Storage,
    bins: u32,
    prix: usize,
    keys: u32,
    min: u32,
    max: u32,
    version: u64,
    infdata: Option<Vec<u32>>,
    config: Config,
    rng: Box<dyn RngCore>,
}

impl<A: BlockAllocator + Default> Table<A> {
    /// Creates a table sized for `config.start` keys, using the default
    /// allocator and a thread-local random source.
    #[inline]
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, rand::thread_rng())
    }

    /// Like [`Table::new`], but with an explicit random source for the
    /// Resizer's grow-factor jitter. Intended for deterministic tests.
    #[must_use]
    pub fn with_rng(config: Config, rng: impl RngCore + 'static) -> Self {
        config.validate();
        let alloc = A::default();
        let words = config.data as usize;
        let prix = primes::prix_for(config.start);
        let bins = primes::bins(prix);
        let storage = Storage {
            keys: alloc.acquire_keys(bins as usize),
            data: alloc.acquire_data(bins as usize, words),
            words,
        };
        Table {
            alloc,
            storage,
            bins,
            prix,
            keys: 0,
            min: INF,
            max: 0,
            version: 0,
            infdata: None,
            config,
            rng: Box::new(rng),
        }
    }
}

impl<A: BlockAllocator> Table<A> {
    /// Current number of keys stored.
    #[inline]
    #[must_use]
    pub fn len(&self) -> u32 {
        self.keys
    }

    /// `true` if the table holds no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys == 0
    }

    /// Current number of bins. Multiply by [`crate::BIN_SIZE`] for total
    /// slot count.
    #[inline]
    #[must_use]
    pub fn bins(&self) -> u32 {
        self.bins
    }

    /// Smallest key present, or that has been present, since the last
    /// rebuild. `INF` if the table has never held a finite key since then.
    #[inline]
    #[must_use]
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Largest key present, or that has been present, since the last
    /// rebuild. `0` if the table has never held a finite key since then.
    #[inline]
    #[must_use]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Monotonically increasing counter bumped on every structural
    /// mutation (insert, delete, update, rebuild). Used by [`crate::iter`]
    /// to detect staleness.
    #[inline]
    #[must_use]
    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    #[inline]
    pub(crate) fn infdata(&self) -> Option<&[u32]> {
        self.infdata.as_deref()
    }

    /// Returns a cursor over every `(key, data)` pair currently stored.
    ///
    /// The cursor borrows the table: it cannot outlive it, and any
    /// mutation through this same borrow is rejected at compile time. See
    /// [`crate::iter::Iter`] for its staleness-detection behavior across
    /// resets.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> crate::iter::Iter<'_, A> {
        crate::iter::Iter::new(self)
    }

    fn locate_finite(&self, key: u32) -> Option<(usize, usize)> {
        debug_assert_ne!(key, INF);
        let base_full = hash::primary_bin(key, self.bins) as usize;
        if let Some(offset) = locate_key(self.storage.bin_keys(base_full), key) {
            return Some((base_full, offset));
        }
        let base_half = hash::secondary_bin(key, self.bins) as usize;
        if let Some(offset) = locate_key(self.storage.bin_keys(base_half), key) {
            return Some((base_half, offset));
        }
        None
    }

    /// Returns a copy of the data associated with `key`, if present.
    #[must_use]
    pub fn lookup(&self, key: u32) -> Option<Vec<u32>> {
        if key == INF {
            return self.infdata.clone();
        }
        let (base, offset) = self.locate_finite(key)?;
        Some(self.storage.entry_data(base, offset).to_vec())
    }

    /// `true` if `key` is present.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: u32) -> bool {
        if key == INF {
            return self.infdata.is_some();
        }
        self.locate_finite(key).is_some()
    }

    /// Inserts `(key, data)`. Returns `false` without modifying the table
    /// if `key` is already present.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not match the table's configured entry
    /// width (`config.data`).
    pub fn insert(&mut self, key: u32, data: &[u32]) -> bool {
        assert_eq!(
            data.len(),
            self.storage.words,
            "cfix: data length {} does not match configured entry width {}",
            data.len(),
            self.storage.words
        );

        if key == INF {
            if self.infdata.is_some() {
                return false;
            }
            self.infdata = Some(data.to_vec());
            self.keys += 1;
            self.version += 1;
            return true;
        }

        if self.locate_finite(key).is_some() {
            return false;
        }

        let fill_after =
            f64::from(self.keys + 1) / (f64::from(self.bins) * BIN_SIZE as f64);
        let seated = if fill_after > self.config.upper {
            false
        } else {
            let ttl = ttl_for(self.config.depth, self.bins);
            displace(&mut self.storage, self.bins, key, data, ttl)
        };

        if seated {
            if self.keys == 0 || key < self.min {
                self.min = key;
            }
            if self.keys == 0 || key > self.max {
                self.max = key;
            }
            self.keys += 1;
            self.version += 1;
        } else {
            self.grow_and_seat(key, data);
        }
        true
    }

    /// Removes `key`. Returns `false` if it was not present.
    pub fn delete(&mut self, key: u32) -> bool {
        if key == INF {
            if self.infdata.take().is_none() {
                return false;
            }
            self.keys -= 1;
            self.version += 1;
            return true;
        }

        let Some((base, offset)) = self.locate_finite(key) else {
            return false;
        };

        {
            let words = self.storage.words;
            let mut bin = self.storage.bin_mut(base);
            bin.write(offset, INF, &vec![crate::NODATA; words]);
            bin.roll_right(offset);
        }
        self.keys -= 1;
        self.version += 1;
        if self.keys == 0 {
            self.min = INF;
            self.max = 0;
        }

        if self.shrinkable() {
            self.shrink();
        }
        true
    }

    /// Replaces the data associated with `key`. Returns `false` if it was
    /// not present.
    ///
    /// # Panics
    ///
    /// Panics if `data.len()` does not match the table's configured entry
    /// width.
    pub fn update(&mut self, key: u32, data: &[u32]) -> bool {
        assert_eq!(
            data.len(),
            self.storage.words,
            "cfix: data length {} does not match configured entry width {}",
            data.len(),
            self.storage.words
        );

        if key == INF {
            let Some(slot) = self.infdata.as_mut() else {
                return false;
            };
            slot.copy_from_slice(data);
            self.version += 1;
            return true;
        }

        let Some((base, offset)) = self.locate_finite(key) else {
            return false;
        };
        self.storage.bin_mut(base).write(offset, key, data);
        self.version += 1;
        true
    }

    /// Invokes `f(key, data)` for every `(key, data)` pair currently
    /// stored, in bin-major order, with the infinite-key slot (if any)
    /// visited last.
    ///
    /// # Panics
    ///
    /// Panics if `f` mutates the table it is being applied to (detected
    /// via the version counter). `f` is meant to observe, not mutate.
    pub fn apply<F: FnMut(u32, &[u32])>(&self, mut f: F) {
        let version = self.version;
        'bins: for base in 0..self.bins as usize {
            for offset in 0..BIN_SIZE {
                let key = self.storage.bin_keys(base)[offset];
                if key == INF {
                    continue 'bins;
                }
                f(key, self.storage.entry_data(base, offset));
                assert_eq!(
                    version, self.version,
                    "cfix: apply callback mutated the table it was applied to"
                );
            }
        }
        if let Some(data) = &self.infdata {
            f(INF, data);
        }
    }

    /// Computes occupancy statistics over all bins.
    #[must_use]
    pub fn stats(&self) -> Stats {
        let mut stats = Stats::new();
        for base in 0..self.bins as usize {
            let keys = self.storage.bin_keys(base);
            let count = count_keys(keys);
            stats.hist[count] += 1;
            for offset in 0..count {
                if hash::primary_bin(keys[offset], self.bins) as usize == base {
                    stats.primary += 1;
                }
            }
        }
        stats
    }

    fn shrinkable(&self) -> bool {
        if self.keys <= BIN_SIZE as u32 {
            return false;
        }
        let fill = f64::from(self.keys) / (f64::from(self.bins) * BIN_SIZE as f64);
        fill < self.config.lower
    }

    /// Explicitly resizes the table to hold its current keys at `ratio`
    /// fill (`0.01 <= ratio <= 1.0`). A `ratio` near `1.0` minimizes bin
    /// count at the cost of more resize attempts; a low `ratio` is fast to
    /// compute and maximizes the share of keys reachable in their primary
    /// bin (see [`Table::stats`]).
    ///
    /// # Panics
    ///
    /// Panics if `ratio` is outside `[0.01, 1.0]`.
    pub fn rebuild(&mut self, ratio: f64) {
        assert!(
            (crate::config::RATIO_MIN..=1.0).contains(&ratio),
            "cfix: rebuild ratio must be within [{}, 1.0], got {}",
            crate::config::RATIO_MIN,
            ratio
        );

        let target_keys = (f64::from(self.keys) / ratio) as u32;
        let mut prix = primes::prix_for(target_keys);

        loop {
            let new_bins = primes::bins(prix);
            match self.try_rebuild_into(new_bins) {
                Some((storage, keys, min, max)) => {
                    self.storage = storage;
                    self.bins = new_bins;
                    self.prix = prix;
                    self.keys = keys;
                    self.min = min;
                    self.max = max;
                    self.version += 1;
                    return;
                }
                None => prix += 1,
            }
        }
    }

    /// Re-seats every current entry into a fresh table of `new_bins` bins.
    /// Returns `None` if any entry failed to find a home (caller should
    /// retry with a larger bin count).
    fn try_rebuild_into(&self, new_bins: u32) -> Option<(Storage, u32, u32, u32)> {
        let words = self.storage.words;
        let mut storage = Storage {
            keys: self.alloc.acquire_keys(new_bins as usize),
            data: self.alloc.acquire_data(new_bins as usize, words),
            words,
        };
        let ttl = ttl_for(self.config.depth, new_bins);

        let mut keys = u32::from(self.infdata.is_some());
        let mut min = INF;
        let mut max = 0;

        for base in 0..self.bins as usize {
            for offset in 0..BIN_SIZE {
                let k = self.storage.bin_keys(base)[offset];
                if k == INF {
                    break;
                }
                let data = self.storage.entry_data(base, offset);
                if !displace(&mut storage, new_bins, k, data, ttl) {
                    return None;
                }
                if keys == 0 || k < min {
                    min = k;
                }
                if keys == 0 || k > max {
                    max = k;
                }
                keys += 1;
            }
        }
        Some((storage, keys, min, max))
    }

    fn shrink(&mut self) {
        let target_keys =
            (((self.config.upper + self.config.lower) / 2.0)
                * f64::from(self.bins)
                * BIN_SIZE as f64) as u32;
        // Smallest prime index whose capacity still meets the midpoint
        // target, same search `primes::prix_for` does for an insert-sized
        // target; clamp below the current size since this is a shrink.
        let mut prix = primes::prix_for(target_keys).min(self.prix.saturating_sub(1));

        loop {
            if prix >= self.prix {
                // Cannot shrink below the current size; give up quietly.
                return;
            }
            let new_bins = primes::bins(prix);
            if let Some((storage, keys, min, max)) = self.try_rebuild_into(new_bins) {
                self.storage = storage;
                self.bins = new_bins;
                self.prix = prix;
                self.keys = keys;
                self.min = min;
                self.max = max;
                return;
            }
            prix += 1;
        }
    }

    fn grow_and_seat(&mut self, key: u32, data: &[u32]) {
        let words = self.storage.words;
        let old_bins = self.bins;
        let old_prix = self.prix;

        let mut attempt: u32 = 1;
        loop {
            let factor = self.config.growth
                + self.config.attempt * f64::from(attempt)
                + self.config.random * self.rng.gen::<f64>();
            let mut prix = (old_prix as f64 * factor) as usize;
            if prix < old_prix + attempt as usize {
                prix = old_prix + attempt as usize;
            }
            let new_bins = primes::bins(prix);
            let ttl = ttl_for(self.config.depth, new_bins);

            let mut storage = Storage {
                keys: self.alloc.acquire_keys(new_bins as usize),
                data: self.alloc.acquire_data(new_bins as usize, words),
                words,
            };

            let seated = displace(&mut storage, new_bins, key, data, ttl);
            assert!(
                seated,
                "cfix: failed to seat key immediately after growing the table"
            );

            let mut keys = u32::from(self.infdata.is_some()) + 1;
            let mut min = key;
            let mut max = key;
            let mut failed = false;

            'reinsert: for base in 0..old_bins as usize {
                for offset in 0..BIN_SIZE {
                    let k = self.storage.bin_keys(base)[offset];
                    if k == INF {
                        break;
                    }
                    let old_data = self.storage.entry_data(base, offset);
                    if displace(&mut storage, new_bins, k, old_data, ttl) {
                        if k < min {
                            min = k;
                        }
                        if k > max {
                            max = k;
                        }
                        keys += 1;
                    } else {
                        failed = true;
                        break 'reinsert;
                    }
                }
            }

            if failed {
                attempt += 1;
                continue;
            }

            self.storage = storage;
            self.bins = new_bins;
            self.prix = prix;
            self.keys = keys;
            self.min = min;
            self.max = max;
            self.version += 1;
            return;
        }
    }
}

impl<A: BlockAllocator + Clone> Clone for Table<A> {
    fn clone(&self) -> Self {
        Table {
            alloc: self.alloc.clone(),
            storage: Storage {
                keys: self.storage.keys.clone(),
                data: self.storage.data.clone(),
                words: self.storage.words,
            },
            bins: self.bins,
            prix: self.prix,
            keys: self.keys,
            min: self.min,
            max: self.max,
            version: self.version,
            infdata: self.infdata.clone(),
            config: self.config,
            rng: Box::new(rand::thread_rng()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_table() -> Table {
        Table::new(Config {
            start: 16,
            data: 1,
            ..Config::default()
        })
    }

    #[test]
    fn insert_lookup_delete_roundtrip() {
        let mut t = small_table();
        assert!(t.insert(42, &[7]));
        assert_eq!(t.lookup(42), Some(vec![7]));
        assert!(t.delete(42));
        assert_eq!(t.lookup(42), None);
    }

    #[test]
    fn duplicate_insert_fails() {
        let mut t = small_table();
        assert!(t.insert(1, &[0]));
        assert!(!t.insert(1, &[0]));
    }

    #[test]
    fn infinite_key_round_trips() {
        let mut t = small_table();
        assert!(t.insert(INF, &[9]));
        assert_eq!(t.lookup(INF), Some(vec![9]));
        assert!(!t.insert(INF, &[1]));
        assert!(t.update(INF, &[3]));
        assert_eq!(t.lookup(INF), Some(vec![3]));
        assert!(t.delete(INF));
        assert_eq!(t.lookup(INF), None);
    }

    #[test]
    fn update_changes_data_without_changing_presence() {
        let mut t = small_table();
        t.insert(5, &[1]);
        assert!(t.update(5, &[2]));
        assert_eq!(t.lookup(5), Some(vec![2]));
        assert!(!t.update(999, &[0]));
    }

    #[test]
    fn table_grows_past_initial_capacity() {
        let mut t = small_table();
        for k in 0..500u32 {
            assert!(t.insert(k, &[k]));
        }
        assert_eq!(t.len(), 500);
        for k in 0..500u32 {
            assert_eq!(t.lookup(k), Some(vec![k]));
        }
    }

    #[test]
    fn delete_below_lower_threshold_shrinks() {
        let mut t = Table::new(Config {
            start: 16,
            data: 1,
            lower: 0.5,
            upper: 1.0,
            ..Config::default()
        });
        for k in 0..200u32 {
            t.insert(k, &[0]);
        }
        let grown_bins = t.bins();
        for k in 0..190u32 {
            t.delete(k);
        }
        assert!(t.bins() <= grown_bins);
        for k in 190..200u32 {
            assert!(t.contains_key(k));
        }
    }

    #[test]
    fn min_max_track_since_last_rebuild() {
        let mut t = small_table();
        t.insert(10, &[0]);
        t.insert(5, &[0]);
        t.insert(20, &[0]);
        assert_eq!(t.min(), 5);
        assert_eq!(t.max(), 20);
        t.delete(5);
        // min/max only widen; deleting the extremum does not narrow them.
        assert_eq!(t.min(), 5);
        assert_eq!(t.max(), 20);
    }

    #[test]
    fn rebuild_preserves_contents() {
        let mut t = small_table();
        for k in 0..50u32 {
            t.insert(k, &[k]);
        }
        t.rebuild(0.9);
        assert_eq!(t.len(), 50);
        for k in 0..50u32 {
            assert_eq!(t.lookup(k), Some(vec![k]));
        }
    }

    #[test]
    fn apply_visits_every_pair_once() {
        let mut t = small_table();
        for k in 0..30u32 {
            t.insert(k, &[k * 2]);
        }
        t.insert(INF, &[999]);
        let mut seen = std::collections::HashSet::new();
        t.apply(|k, d| {
            seen.insert(k);
            if k != INF {
                assert_eq!(d[0], k * 2);
            }
        });
        assert_eq!(seen.len(), 31);
        assert!(seen.contains(&INF));
    }

    #[test]
    #[should_panic(expected = "data length")]
    fn insert_rejects_wrong_width_data() {
        let mut t = small_table();
        t.insert(1, &[1, 2]);
    }
}
