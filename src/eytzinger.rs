//! Eytzinger (implicit BFS) layout with a branchless, prefetching descent.
//!
//! Keys are stored in breadth-first order of an implicit binary search tree:
//! the root sits at index 1 and the children of node `i` at `2i` and `2i+1`.
//! The first four levels of the tree share a single cache line, so the top
//! of the tree is effectively always hot.
//!
//! The payoff is in the descent. `i = 2*i + (keys[i] < target)` folds the
//! comparison into address arithmetic, so there is no data-dependent branch
//! to mispredict, and the address of the next level is known before the
//! current level's load resolves. That lets a software prefetch for `keys[2i]`
//! issue every iteration, overlapping the memory latency of successive
//! levels. On RAM-resident tables this is the fastest layout in the family.

use crate::prefetch::prefetch_read;
use crate::prepare::sort_dedup;
use crate::{Key, MemoryStats};

/// Immutable lookup table in Eytzinger order.
///
/// Invariants: positions `1..=n` of `keys` hold a binary search tree whose
/// in-order traversal is the sorted key sequence; `vals[i - 1]` belongs to
/// `keys[i]`. Slot 0 of `keys` is dead padding that keeps the child
/// arithmetic `2i`/`2i+1` free of index adjustments.
pub struct EytzingerTable<V> {
    keys: Vec<Key>,
    /// Values in tree order, shifted down by one so no dead slot 0 value is
    /// ever constructed.
    vals: Vec<V>,
    n: usize,
}

impl<V> EytzingerTable<V> {
    /// Build a table from entries in any order.
    ///
    /// Duplicate keys keep the value that appeared first in the input.
    pub fn build(entries: Vec<(Key, V)>) -> Self {
        let entries = sort_dedup(entries);
        let n = entries.len();
        if n == 0 {
            return Self {
                keys: Vec::new(),
                vals: Vec::new(),
                n: 0,
            };
        }

        let mut keys: Vec<Key> = vec![0; n + 1];
        let mut slots: Vec<Option<V>> = Vec::with_capacity(n + 1);
        slots.resize_with(n + 1, || None);

        let mut sorted = entries.into_iter();
        fill_inorder(&mut keys, &mut slots, &mut sorted, 1);
        debug_assert!(sorted.next().is_none());

        let vals = slots
            .into_iter()
            .skip(1)
            .map(|slot| slot.expect("in-order fill visits every tree slot"))
            .collect();

        Self { keys, vals, n }
    }

    /// Look up `target`, returning a reference to its value.
    pub fn get(&self, target: Key) -> Option<&V> {
        if self.n == 0 {
            return None;
        }

        let mut i = 1usize;
        while i <= self.n {
            prefetch_read(&self.keys, 2 * i);
            // SAFETY: 1 <= i <= n and keys.len() == n + 1.
            let less = unsafe { *self.keys.get_unchecked(i) } < target;
            i = 2 * i + usize::from(less);
        }

        // i is one step past a leaf. Its trailing one bits record the final
        // run of right-descents; shifting them (and one more) off lands on
        // the deepest ancestor where the descent went left, which is the
        // lower bound. All trailing bits set would make the shift 65 and is
        // unreachable for any n that fits in memory.
        debug_assert!(i != usize::MAX);
        i >>= i.trailing_ones() + 1;

        if i == 0 {
            // Every step went right: target is greater than every key.
            return None;
        }
        // SAFETY: the recovered i is a node visited during the descent, so
        // 1 <= i <= n.
        if unsafe { *self.keys.get_unchecked(i) } != target {
            return None;
        }
        Some(&self.vals[i - 1])
    }

    /// Number of distinct keys stored.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the table stores no keys.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Heap usage of the table's two allocations.
    pub fn memory_stats(&self) -> MemoryStats {
        MemoryStats::new(
            self.keys.capacity() * std::mem::size_of::<Key>(),
            self.vals.capacity() * std::mem::size_of::<V>(),
            self.n,
        )
    }
}

/// Fill BFS position `i` and its subtrees from the sorted stream, so that an
/// in-order walk of positions `1..=n` replays the stream.
///
/// Recursion depth is the tree height, at most ~33 for any table that fits
/// in memory.
fn fill_inorder<V>(
    keys: &mut [Key],
    slots: &mut [Option<V>],
    sorted: &mut std::vec::IntoIter<(Key, V)>,
    i: usize,
) {
    if i >= keys.len() {
        return;
    }
    fill_inorder(keys, slots, sorted, 2 * i);
    let (k, v) = sorted
        .next()
        .expect("sorted input has one entry per tree position");
    keys[i] = k;
    slots[i] = Some(v);
    fill_inorder(keys, slots, sorted, 2 * i + 1);
}
