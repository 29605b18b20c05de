//! Block Allocator boundary: the memory-supply contract a `Table` draws on
//! for its bin storage.
//!
//! The original implementation sourced bin storage from an external
//! cache-line-aware pool allocator; that allocator is out of scope here
//! (see crate docs). [`BlockAllocator`] models just the shape of that
//! contract: handing out cache-line-aligned key rows and flat data
//! buffers. [`SystemAllocator`] is the only implementation shipped, and is
//! the default for every `Table`.

/// One bin's worth of keys: 16 `u32` keys, cache-line aligned.
///
/// The alignment is what gives the table its cache behavior: a `locate`
/// call touches exactly one 64-byte line.
#[repr(align(64))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRow(pub [u32; crate::bin::BIN_SIZE]);

impl KeyRow {
    /// A key row with every slot set to [`crate::INF`].
    #[inline]
    #[must_use]
    pub(crate) const fn empty() -> Self {
        KeyRow([crate::INF; crate::bin::BIN_SIZE])
    }
}

impl Default for KeyRow {
    #[inline]
    fn default() -> Self {
        Self::empty()
    }
}

/// Supplies the backing storage for a `Table`'s bins.
///
/// An implementer may substitute any aligned allocation strategy (e.g. a
/// slab allocator reused across multiple tables) as long as the returned
/// buffers are sized and, for `acquire_keys`, aligned as documented.
pub trait BlockAllocator {
    /// Returns `bins` freshly allocated, cache-line-aligned key rows, each
    /// initialized to [`KeyRow::empty`].
    fn acquire_keys(&self, bins: usize) -> Vec<KeyRow>;

    /// Returns a flat data buffer of `bins * crate::bin::BIN_SIZE * words`
    /// `u32` words, initialized to [`crate::NODATA`].
    fn acquire_data(&self, bins: usize, words: usize) -> Vec<u32>;
}

/// The default [`BlockAllocator`]: plain `Vec` allocation.
///
/// `Vec<KeyRow>` is naturally aligned to 64 bytes because [`KeyRow`]
/// carries `#[repr(align(64))]`; no manual alignment bookkeeping is
/// needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl BlockAllocator for SystemAllocator {
    #[inline]
    fn acquire_keys(&self, bins: usize) -> Vec<KeyRow> {
        vec![KeyRow::empty(); bins]
    }

    #[inline]
    fn acquire_data(&self, bins: usize, words: usize) -> Vec<u32> {
        vec![crate::NODATA; bins * crate::bin::BIN_SIZE * words]
    }
}
