//! A cache-line-bucketed cuckoo hash table for 32-bit keys.
//!
//! Ordinary hash tables chase pointers: a lookup hashes the key, follows a
//! bucket head, then walks a chain or probe sequence, touching cache
//! lines in whatever order collisions happen to produce. This crate takes
//! the opposite stance: every bucket (a *bin*) is exactly one 64-byte
//! cache line holding 16 sorted keys, and a key lives in one of exactly
//! two bins, chosen by two independent hash mixers (a primary and a
//! secondary mix of the key). A lookup therefore touches at most two
//! cache lines, full stop, regardless of load factor.
//!
//! Keeping two candidate bins per key is what makes the table "cuckoo":
//! when both of a new key's bins are full, [`Table::insert`] evicts an
//! occupant from one of them into *its* other bin, recursively, up to a
//! bounded depth ([`Config::depth`]) before giving up and growing the
//! table. Insertion is the expensive operation here by design: lookup
//! stays cheap and bounded no matter how full the table gets.
//!
//! ```
//! use cfix::{Config, Table};
//!
//! let mut table: Table = Table::new(Config::default());
//! table.insert(42, &[100]);
//! assert_eq!(table.lookup(42), Some(vec![100]));
//! ```
//!
//! # Scope
//!
//! This crate implements the table itself: bin layout, the two-hash
//! displacement protocol, growth and shrink, and version-guarded
//! iteration. It does not implement a cache-line-aware pool allocator
//! beyond the minimal [`BlockAllocator`] seam, nor any CLI or statistics
//! reporting tooling; those are callers' concerns, not the table's.

mod bin;
mod displace;
mod hash;
mod primes;
mod table;

pub mod alloc;
pub mod config;
pub mod iter;
pub mod stats;

pub use alloc::{BlockAllocator, SystemAllocator};
pub use bin::BIN_SIZE;
pub use config::Config;
pub use iter::{Iter, IterStatus};
pub use stats::Stats;
pub use table::Table;

/// Sentinel key value. Reserved: it can still be inserted, looked up,
/// updated, and deleted like any other key, but it is never hashed or
/// placed in an ordinary bin: it lives in the table's Special Key Slot
/// instead, and bins use this same value to mark unused slots.
pub const INF: u32 = 0xffff_ffff;

/// Sentinel data word written into cleared slots, matching the upstream
/// table's debug-build poison value. Never observable through the public
/// API; only used to make an uninitialized-data bug visible under a
/// debugger.
pub(crate) const NODATA: u32 = 0xdead_babe;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inf_is_all_ones() {
        assert_eq!(INF, u32::MAX);
    }

    #[test]
    fn basic_crate_level_roundtrip() {
        let mut table: Table = Table::new(Config::default());
        assert!(table.insert(1, &[10]));
        assert!(table.insert(2, &[20]));
        assert_eq!(table.lookup(1), Some(vec![10]));
        assert_eq!(table.lookup(2), Some(vec![20]));
        assert!(table.delete(1));
        assert_eq!(table.lookup(1), None);
    }
}
