//! Iterator: a cursor over a table's `(key, data)` pairs that detects
//! staleness rather than racing ahead of structural mutation.
//!
//! Unlike the upstream C iterator (a heap handle outliving its table by
//! convention, torn down manually), [`Iter`] borrows the table it walks:
//! the borrow checker already guarantees it cannot outlive its table, so
//! there is no destroy/recycle step to port. What the borrow checker
//! cannot catch (a mutation through a *different* handle invalidating an
//! in-progress walk, which can't happen here since `&Table` blocks
//! `&mut Table` for its lifetime, but matters for the `apply` callback and
//! for API parity with the original) is still tracked via the table's
//! version counter.

use crate::alloc::{BlockAllocator, SystemAllocator};
use crate::bin::BIN_SIZE;
use crate::table::Table;
use crate::INF;

/// Outcome of [`Iter::current`] or [`Iter::forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterStatus {
    /// The cursor refers to a valid `(key, data)` pair.
    Ok,
    /// The cursor has moved past the last pair; there is nothing more.
    End,
    /// The table was mutated since this iterator was created or reset.
    Invalidated,
}

/// A cursor over a [`Table`]'s entries in bin-major order, with the
/// infinite-key slot (if occupied) visited last.
pub struct Iter<'a, A: BlockAllocator = SystemAllocator> {
    table: &'a Table<A>,
    version: u64,
    base: usize,
    offset: usize,
}

impl<'a, A: BlockAllocator> Iter<'a, A> {
    pub(crate) fn new(table: &'a Table<A>) -> Self {
        let mut iter = Iter {
            table,
            version: table.version(),
            base: 0,
            offset: 0,
        };
        iter.reset();
        iter
    }

    /// Rewinds the cursor to the first entry and re-synchronizes with the
    /// table's current version.
    pub fn reset(&mut self) {
        self.version = self.table.version();
        self.base = 0;
        self.offset = 0;
        if self.table.bins() == 0 {
            return;
        }
        if self.table.storage().bin_keys(0)[0] != INF {
            return;
        }
        self.forward();
    }

    /// Reports whether the cursor currently refers to a valid pair,
    /// without consuming it.
    #[must_use]
    pub fn current(&self) -> IterStatus {
        if self.version != self.table.version() {
            return IterStatus::Invalidated;
        }
        let bins = self.table.bins() as usize;
        if self.base >= bins {
            if self.offset == 0 && self.table.infdata().is_some() {
                return IterStatus::Ok;
            }
            return IterStatus::End;
        }
        if self.table.storage().bin_keys(self.base)[self.offset] == INF {
            return IterStatus::End;
        }
        IterStatus::Ok
    }

    /// Returns a copy of the pair the cursor currently refers to, or
    /// `None` if [`Iter::current`] would report anything but
    /// [`IterStatus::Ok`].
    #[must_use]
    pub fn get(&self) -> Option<(u32, Vec<u32>)> {
        match self.current() {
            IterStatus::Ok => {
                let bins = self.table.bins() as usize;
                if self.base >= bins {
                    Some((INF, self.table.infdata()?.to_vec()))
                } else {
                    let key = self.table.storage().bin_keys(self.base)[self.offset];
                    let data = self.table.storage().entry_data(self.base, self.offset).to_vec();
                    Some((key, data))
                }
            }
            IterStatus::End | IterStatus::Invalidated => None,
        }
    }

    /// Advances the cursor to the next occupied slot, skipping empty ones.
    pub fn forward(&mut self) -> IterStatus {
        if self.version != self.table.version() {
            return IterStatus::Invalidated;
        }
        let bins = self.table.bins() as usize;

        self.offset += 1;
        if self.offset == BIN_SIZE {
            self.offset = 0;
            self.base += 1;
        }

        loop {
            if self.base >= bins {
                break;
            }
            if self.table.storage().bin_keys(self.base)[self.offset] == INF {
                self.base += 1;
                self.offset = 0;
                continue;
            }
            break;
        }

        if self.base >= bins {
            if self.offset == 0 && self.table.infdata().is_some() {
                return IterStatus::Ok;
            }
            return IterStatus::End;
        }
        IterStatus::Ok
    }
}

impl<'a, A: BlockAllocator> Iterator for Iter<'a, A> {
    type Item = (u32, Vec<u32>);

    /// Yields pairs until the end of the table or until a mutation
    /// invalidates the cursor; in either case the iterator simply stops.
    /// Use [`Iter::current`] directly if distinguishing the two matters.
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.get()?;
        self.forward();
        Some(item)
    }
}
