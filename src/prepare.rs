//! Input normalization shared by every `build`.
//!
//! All three layouts accept entries in any order and with repeated keys. The
//! pipeline stable-sorts by key and keeps the first occurrence of each key,
//! so duplicate semantics are identical across layouts: the value that
//! appeared first in the input wins.

use crate::Key;

/// Stable-sort `entries` by key ascending and drop all but the first
/// occurrence of each key.
///
/// O(n log n) time, O(n) transient memory (the sort's merge buffer); the
/// dedup is in place.
pub(crate) fn sort_dedup<V>(mut entries: Vec<(Key, V)>) -> Vec<(Key, V)> {
    entries.sort_by_key(|&(k, _)| k);
    entries.dedup_by_key(|&mut (k, _)| k);
    entries
}
