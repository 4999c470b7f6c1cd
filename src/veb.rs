//! van Emde Boas (vEB) layout with explicit child links and dual prefetch.
//!
//! The complete binary tree over the sorted keys is split recursively at
//! mid-height into a top subtree and its bottom subtrees, and each block is
//! laid out contiguously. The layout is cache-oblivious: near-optimal block
//! transfers for any line size without being parameterized by one.
//!
//! Unlike the Eytzinger layout the tree is not implicit. Each node packs its
//! key and two `u32` child slots into one 16-byte aligned record, so a node
//! never straddles more than two cache lines and both children can be
//! prefetched per step. The catch, and the reason this layout loses to
//! Eytzinger on RAM-resident tables, is that those prefetch addresses come
//! out of the current node's load: the prefetches cannot issue until the
//! node arrives, so memory latency is hidden one level at best. The explicit
//! links also roughly double the working set per key.

use crate::prefetch::prefetch_read;
use crate::prepare::sort_dedup;
use crate::{BuildError, Key, MemoryStats};

/// One tree node: key plus left/right child slots, `0` meaning absent.
///
/// The children sit in an array so the descent can index with the comparison
/// result instead of branching.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, Default)]
struct VebNode {
    key: Key,
    children: [u32; 2],
}

/// Immutable lookup table in van Emde Boas order.
///
/// Invariants: slot 0 is a null sentinel; every slot in `1..=n` is reachable
/// from `root`; keys in a node's left subtree are `<=` its key and keys in
/// the right subtree are `>`; each recursive top/bottom block occupies a
/// contiguous slot range; `vals[slot - 1]` belongs to `tree[slot]`.
pub struct VebTable<V> {
    tree: Vec<VebNode>,
    /// Values parallel to `tree`, shifted down by one so the sentinel slot
    /// holds no value.
    vals: Vec<V>,
    n: usize,
    root: u32,
}

impl<V> VebTable<V> {
    /// Build a table from entries in any order.
    ///
    /// Duplicate keys keep the value that appeared first in the input.
    /// Fails with [`BuildError::CapacityExceeded`] when the node count would
    /// overflow the `u32` slot index space.
    pub fn build(entries: Vec<(Key, V)>) -> Result<Self, BuildError> {
        let entries = sort_dedup(entries);
        let n = entries.len();
        if n == 0 {
            return Ok(Self {
                tree: Vec::new(),
                vals: Vec::new(),
                n: 0,
                root: 0,
            });
        }
        if n + 1 > u32::MAX as usize {
            return Err(BuildError::CapacityExceeded { entries: n });
        }

        // Height of the complete tree containing BFS positions 1..=n.
        let h = usize::BITS - n.leading_zeros();

        // vEB permutation of the in-range BFS indices: slot of bfs index
        // veb_order[p] is p + 1 (slot 0 stays the sentinel).
        let mut veb_order = Vec::with_capacity(n);
        push_veb_order(1, h, n, &mut veb_order);
        debug_assert_eq!(veb_order.len(), n);

        let mut bfs_to_veb = vec![0u32; n + 1];
        for (pos, &bfs) in veb_order.iter().enumerate() {
            bfs_to_veb[bfs] = (pos + 1) as u32;
        }

        // In-order rank of each BFS index, i.e. its position in the sorted
        // input.
        let mut inorder = Vec::with_capacity(n);
        push_inorder(1, n, &mut inorder);
        let mut bfs_to_sorted = vec![0usize; n + 1];
        for (pos, &bfs) in inorder.iter().enumerate() {
            bfs_to_sorted[bfs] = pos;
        }

        let (sorted_keys, mut sorted_vals): (Vec<Key>, Vec<Option<V>>) =
            entries.into_iter().map(|(k, v)| (k, Some(v))).unzip();

        let mut tree = vec![VebNode::default(); n + 1];
        let mut slots: Vec<Option<V>> = Vec::with_capacity(n + 1);
        slots.resize_with(n + 1, || None);

        for bfs in 1..=n {
            let slot = bfs_to_veb[bfs] as usize;
            let sorted = bfs_to_sorted[bfs];
            let left = 2 * bfs;
            let right = 2 * bfs + 1;
            tree[slot] = VebNode {
                key: sorted_keys[sorted],
                children: [
                    if left <= n { bfs_to_veb[left] } else { 0 },
                    if right <= n { bfs_to_veb[right] } else { 0 },
                ],
            };
            slots[slot] = sorted_vals[sorted].take();
        }

        let vals = slots
            .into_iter()
            .skip(1)
            .map(|slot| slot.expect("every vEB slot receives exactly one entry"))
            .collect();

        Ok(Self {
            tree,
            vals,
            n,
            root: bfs_to_veb[1],
        })
    }

    /// Look up `target`, returning a reference to its value.
    pub fn get(&self, target: Key) -> Option<&V> {
        if self.n == 0 {
            return None;
        }

        let mut curr = self.root as usize;
        // Deepest node so far whose key is >= target; 0 until one is seen.
        let mut candidate = 0usize;

        while curr != 0 {
            // SAFETY: curr is either the root or a child link, and build
            // only writes links in 1..=n; tree.len() == n + 1.
            let node = unsafe { self.tree.get_unchecked(curr) };
            prefetch_read(&self.tree, node.children[0] as usize);
            prefetch_read(&self.tree, node.children[1] as usize);
            let key = node.key;
            candidate = if target <= key { curr } else { candidate };
            curr = node.children[usize::from(key < target)] as usize;
        }

        if candidate == 0 {
            return None;
        }
        // SAFETY: candidate was assigned from a visited slot in 1..=n.
        if unsafe { self.tree.get_unchecked(candidate) }.key != target {
            return None;
        }
        Some(&self.vals[candidate - 1])
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
            self.tree.capacity() * std::mem::size_of::<VebNode>(),
            self.vals.capacity() * std::mem::size_of::<V>(),
            self.n,
        )
    }
}

/// Emit the in-range BFS indices of the complete tree of height `h` rooted
/// at `bfs` in vEB order: the top half-height subtree first, then each
/// bottom subtree left to right.
///
/// Recursion depth is log2 of the height, single digits for any real table.
fn push_veb_order(bfs: usize, h: u32, n: usize, out: &mut Vec<usize>) {
    if h == 0 || bfs > n {
        return;
    }
    if h == 1 {
        out.push(bfs);
        return;
    }
    let bottom_h = h / 2;
    let top_h = h - bottom_h;

    push_veb_order(bfs, top_h, n, out);

    // The top subtree's leaves hang 2^top_h bottom subtrees; their roots
    // occupy consecutive BFS positions starting at bfs << top_h.
    let first = bfs << top_h;
    for i in 0..(1usize << top_h) {
        if first + i > n {
            break;
        }
        push_veb_order(first + i, bottom_h, n, out);
    }
}

/// Emit the in-range BFS indices in in-order (left, root, right).
fn push_inorder(bfs: usize, n: usize, out: &mut Vec<usize>) {
    if bfs > n {
        return;
    }
    push_inorder(2 * bfs, n, out);
    out.push(bfs);
    push_inorder(2 * bfs + 1, n, out);
}
