//! # statikv
//!
//! Static, read-only `i64` key→value lookup tables for the regime where the
//! key set is too big for L2 but fits in RAM.
//!
//! Three parallel layouts share one contract (`build` once, then `get`):
//!
//! 1. [`SortedTable`]: sorted array + lower-bound binary search. The
//!    baseline and correctness oracle.
//! 2. [`EytzingerTable`]: implicit BFS tree, branchless descent, software
//!    prefetch at arithmetically computed addresses. The production choice:
//!    lowest measured latency on random RAM-resident lookups.
//! 3. [`VebTable`]: recursive van Emde Boas blocks with explicit child
//!    links and dual prefetch. Cache-oblivious, but its prefetch addresses
//!    depend on in-flight loads, which costs it the race against Eytzinger.
//!
//! Tables are immutable after `build`: `get` allocates nothing, takes no
//! locks, and only reads table-owned memory, so a built table can be shared
//! freely across threads.
//!
//! ## Example
//!
//! ```rust
//! use statikv::EytzingerTable;
//!
//! let table = EytzingerTable::build(vec![(3, "three"), (1, "one"), (2, "two")]);
//! assert_eq!(table.get(2), Some(&"two"));
//! assert_eq!(table.get(7), None);
//! assert_eq!(table.len(), 3);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod eytzinger;
mod prefetch;
mod prepare;
pub mod sorted;
pub mod veb;

#[cfg(test)]
mod proptests;

pub use eytzinger::EytzingerTable;
pub use sorted::SortedTable;
pub use veb::VebTable;

use thiserror::Error;

/// Key type shared by every layout.
pub type Key = i64;

/// Error returned when a table cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The entry count would overflow the 32-bit node index space used by
    /// the vEB layout. Datasets of this scale should use [`EytzingerTable`],
    /// which has no limit beyond host memory.
    #[error("{entries} entries exceed the 32-bit vEB node index space")]
    CapacityExceeded {
        /// Number of distinct entries the build was asked to place.
        entries: usize,
    },
}

/// Heap usage of a built table.
#[derive(Debug, Clone, Default)]
pub struct MemoryStats {
    /// Bytes owned by the key or node array.
    pub node_bytes: usize,
    /// Bytes owned by the value array.
    pub value_bytes: usize,
    /// Number of distinct keys stored.
    pub num_keys: usize,
    /// Total owned bytes per stored key.
    pub bytes_per_key: f64,
}

impl MemoryStats {
    fn new(node_bytes: usize, value_bytes: usize, num_keys: usize) -> Self {
        let total = node_bytes + value_bytes;
        Self {
            node_bytes,
            value_bytes,
            num_keys,
            bytes_per_key: if num_keys > 0 {
                total as f64 / num_keys as f64
            } else {
                0.0
            },
        }
    }
}
