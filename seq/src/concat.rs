//! Concatenation of sequences.
//!
//! Concatenating two trees walks down the right spine of the left tree and
//! the left spine of the right tree at the same time. Once the leaves are
//! reached, everything in between (the left suffix and the right prefix)
//! becomes a few new leaves. On the way back up, the nodes of each level are
//! merged and, if they ended up with too many underfull nodes, redistributed
//! so that the level has at most `EXTRA_NODES` nodes more than the optimum.
//! Every node that gets rebuilt this way is relaxed.

use std::rc::Rc;

use imbl_sized_chunks::Chunk;
use log::trace;

use crate::{
    node::{Children, Leaf, Node},
    sequence::Sequence,
    BITS, BRANCHING, EXTRA_NODES,
};

impl<T: Clone> Sequence<T> {
    /// Returns the concatenation of this sequence and `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let left: Sequence<u32> = (0..1000).collect();
    /// let right: Sequence<u32> = (1000..2500).collect();
    /// let both = left.concat(&right);
    /// assert_eq!(both.len(), 2500);
    /// assert!(both.iter().copied().eq(0..2500));
    /// ```
    pub fn concat(&self, other: &Self) -> Self {
        let mut seq = self.clone();
        seq.append_all(other.clone());
        seq
    }

    /// Appends all of `other` at the end of this sequence, in place.
    pub fn append_all(&mut self, mut other: Self) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }

        let total = self.length + other.length;
        if other.root.is_none() {
            self.append_affixes(&other);
        } else {
            self.settle_offset();
            other.settle_offset();
            self.join(other);
        }
        self.length = total;
    }

    /// Appends a sequence without a tree by pushing its elements as leaves.
    fn append_affixes(&mut self, other: &Self) {
        let mut pending = Rc::unwrap_or_clone(std::mem::take(&mut self.suffix));
        self.descriptor = self.descriptor.with_suffix_len(0);
        for value in other.prefix.iter().rev().chain(other.suffix.iter()) {
            if pending.is_full() {
                self.push_leaf_back(std::mem::take(&mut pending));
            }
            pending.push_back(value.clone());
        }
        self.descriptor = self.descriptor.with_suffix_len(pending.len());
        self.suffix = Rc::new(pending);
    }

    /// Rewrites the nodes of the left spine so that the offset becomes zero.
    ///
    /// The dense nodes that held the offset are turned into relaxed nodes
    /// with exact size tables.
    pub(crate) fn settle_offset(&mut self) {
        let offset = self.offset;
        let depth = self.depth();
        let Some(root) = self.root.as_mut() else {
            return;
        };
        if offset == 0 {
            return;
        }
        trace!("settling an offset of {offset} at depth {depth}");

        let mut node = Rc::make_mut(root);
        let mut height = depth;
        while node.is_relaxed() {
            let Node::Branch { children, .. } = node else {
                unreachable!();
            };
            node = Rc::make_mut(&mut children[0]);
            height -= 1;
        }

        let mut offset = offset;
        loop {
            let Node::Branch { sizes, children } = node else {
                unreachable!("an offset is always held by an interior node");
            };
            let first_offset = offset & ((1 << (BITS * height)) - 1);
            let mut table = Chunk::new();
            let mut total = 0;
            for (i, child) in children.iter().enumerate() {
                total += child.len(height - 1, if i == 0 { first_offset } else { 0 });
                table.push_back(total);
            }
            *sizes = Some(table);
            if first_offset == 0 {
                break;
            }
            offset = first_offset;
            node = Rc::make_mut(&mut children[0]);
            height -= 1;
        }
        self.offset = 0;
    }

    /// Joins `other`, which has a tree, at the end of this sequence. Both
    /// sequences must be non-empty and have a zero offset.
    fn join(&mut self, other: Self) {
        let mut middle: Vec<T> = Vec::with_capacity(2 * BRANCHING);
        let left = match self.root.take() {
            Some(root) => {
                middle.extend(self.suffix.iter().cloned());
                Some((root, self.depth()))
            }
            None if self.prefix_len() == 0 => {
                // Everything is in the suffix, so it can become the prefix.
                let mut prefix = Rc::unwrap_or_clone(std::mem::take(&mut self.suffix));
                prefix.reverse();
                self.descriptor = self.descriptor.with_prefix_len(prefix.len());
                self.prefix = Rc::new(prefix);
                None
            }
            None => {
                middle.extend(self.suffix.iter().cloned());
                None
            }
        };
        middle.extend(other.prefix.iter().rev().cloned());
        let middle = leaves(middle);

        let Some(right) = other.root.as_ref() else {
            unreachable!("joining requires a tree on the right");
        };
        let right = (right, other.depth());
        let left = left.as_ref().map(|(root, depth)| (root, *depth));

        let height = left.map_or(right.1, |(_, depth)| depth.max(right.1));
        let mut nodes = merge(left, &middle, right);
        let mut height = height;
        if height == 0 {
            nodes = rebalance(nodes, 1);
            height = 1;
        }

        let root = if nodes.len() == 1 {
            nodes.remove(0)
        } else {
            height += 1;
            Rc::new(Node::relaxed(nodes.into_iter().collect(), height, 0))
        };

        self.root = Some(root);
        self.offset = 0;
        self.descriptor = self
            .descriptor
            .with_depth(height)
            .with_suffix_len(other.suffix_len());
        self.suffix = Rc::clone(&other.suffix);
        self.collapse_root();
    }
}

/// Cuts elements into leaves of at most `BRANCHING` elements.
fn leaves<T: Clone>(elements: Vec<T>) -> Vec<Rc<Node<T>>> {
    elements
        .chunks(BRANCHING)
        .map(|chunk| Node::leaf(chunk.iter().cloned().collect()))
        .collect()
}

type Tree<'a, T> = (&'a Rc<Node<T>>, usize);

/// Merges two trees of heights `hl` and `hr` (or no tree at all on the left)
/// with the `middle` leaves in between.
///
/// Returns the sequence of nodes at height `max(hl, hr)` that replace both
/// trees. There are at most three of them.
fn merge<T: Clone>(
    left: Option<Tree<'_, T>>,
    middle: &[Rc<Node<T>>],
    right: Tree<'_, T>,
) -> Vec<Rc<Node<T>>> {
    let (right_node, right_height) = right;
    match left {
        Some((left_node, left_height)) if left_height > right_height => {
            let children = left_node.children();
            let (last, init) = split_last(children);
            let sub = merge(Some((last, left_height - 1)), middle, right);
            let merged = init.iter().cloned().chain(sub).collect();
            rebalance(merged, left_height)
        }
        Some((left_node, 0)) if right_height == 0 => {
            let mut merged = Vec::with_capacity(middle.len() + 2);
            merged.push(Rc::clone(left_node));
            merged.extend(middle.iter().cloned());
            merged.push(Rc::clone(right_node));
            merged
        }
        Some((left_node, left_height)) if left_height == right_height => {
            let (last, init) = split_last(left_node.children());
            let (first, tail) = split_first(right_node.children());
            let sub = merge(
                Some((last, left_height - 1)),
                middle,
                (first, right_height - 1),
            );
            let merged = init
                .iter()
                .cloned()
                .chain(sub)
                .chain(tail.iter().cloned())
                .collect();
            rebalance(merged, left_height)
        }
        None if right_height == 0 => {
            let mut merged = Vec::with_capacity(middle.len() + 1);
            merged.extend(middle.iter().cloned());
            merged.push(Rc::clone(right_node));
            merged
        }
        // There is no tree on the left, or it is shorter than the right one.
        _ => {
            let (first, tail) = split_first(right_node.children());
            let sub = merge(left, middle, (first, right_height - 1));
            let merged = sub.into_iter().chain(tail.iter().cloned()).collect();
            rebalance(merged, right_height)
        }
    }
}

fn split_last<T>(children: &Children<T>) -> (&Rc<Node<T>>, &[Rc<Node<T>>]) {
    children
        .as_slice()
        .split_last()
        .expect("empty interior node")
}

fn split_first<T>(children: &Children<T>) -> (&Rc<Node<T>>, &[Rc<Node<T>>]) {
    children
        .as_slice()
        .split_first()
        .expect("empty interior node")
}

/// Packs `merged`, a row of nodes at height `height - 1`, into relaxed nodes
/// at `height`, redistributing their content first if the row has too many
/// underfull nodes.
fn rebalance<T: Clone>(merged: Vec<Rc<Node<T>>>, height: usize) -> Vec<Rc<Node<T>>> {
    let widths: Vec<usize> = merged.iter().map(|node| node.width()).collect();
    let merged = match concat_plan(&widths) {
        Some(plan) => {
            trace!(
                "rebalancing {} nodes into {} at height {}",
                widths.len(),
                plan.len(),
                height - 1
            );
            execute_plan(&merged, &plan, height - 1)
        }
        None => merged,
    };
    merged
        .chunks(BRANCHING)
        .map(|group| Rc::new(Node::relaxed(group.iter().cloned().collect(), height, 0)))
        .collect()
}

/// Decides how many items each node of a row should hold after
/// redistribution, or returns `None` if the row is balanced enough.
///
/// Going from left to right, the first node with fewer than
/// `BRANCHING - EXTRA_NODES / 2` items has its content spread over the
/// following nodes, each of which is filled up to `BRANCHING` before moving
/// on. This repeats until the row is within `EXTRA_NODES` of the optimum.
pub(crate) fn concat_plan(widths: &[usize]) -> Option<Vec<usize>> {
    let total: usize = widths.iter().sum();
    let optimal = total.div_ceil(BRANCHING);
    if optimal + EXTRA_NODES >= widths.len() {
        return None;
    }

    let mut plan = widths.to_vec();
    let mut i = 0;
    while optimal + EXTRA_NODES < plan.len() {
        while i < plan.len() && plan[i] > BRANCHING - EXTRA_NODES / 2 {
            i += 1;
        }
        if i >= plan.len() {
            break;
        }

        let mut remaining = plan[i];
        loop {
            if i + 1 == plan.len() {
                // Nothing left to spread over; the carried items stay here.
                plan[i] = remaining;
                return Some(plan);
            }
            let size = (remaining + plan[i + 1]).min(BRANCHING);
            remaining = remaining + plan[i + 1] - size;
            plan[i] = size;
            i += 1;
            if remaining == 0 {
                break;
            }
        }
        // The node at `i` was absorbed by the ones before it.
        plan.remove(i);
        i = i.saturating_sub(1);
    }
    Some(plan)
}

/// Rebuilds a row of nodes at `height` so that the node widths follow `plan`.
/// Nodes that already have the right width at the right place are reused.
fn execute_plan<T: Clone>(
    merged: &[Rc<Node<T>>],
    plan: &[usize],
    height: usize,
) -> Vec<Rc<Node<T>>> {
    let mut result = Vec::with_capacity(plan.len());
    let mut source = 0;
    let mut used = 0;
    for &target in plan {
        if used == 0 && merged[source].width() == target {
            result.push(Rc::clone(&merged[source]));
            source += 1;
            continue;
        }

        let node = if height == 0 {
            let items_of = move |i: usize| match merged[i].as_ref() {
                Node::Leaf { data } => data.as_slice(),
                Node::Branch { .. } => unreachable!("interior node in a row of leaves"),
            };
            let data: Leaf<T> = gather(target, &mut source, &mut used, items_of);
            Node::Leaf { data }
        } else {
            let children_of = move |i: usize| merged[i].children().as_slice();
            let children = gather(target, &mut source, &mut used, children_of);
            Node::relaxed(children, height, 0)
        };
        result.push(Rc::new(node));
    }
    result
}

/// Copies `target` items out of consecutive source nodes into a new chunk,
/// starting at item `used` of node `source`.
fn gather<'a, A: Clone + 'a>(
    target: usize,
    source: &mut usize,
    used: &mut usize,
    items: impl Fn(usize) -> &'a [A],
) -> Chunk<A, BRANCHING> {
    let mut chunk = Chunk::new();
    while chunk.len() < target {
        let available = &items(*source)[*used..];
        let take = available.len().min(target - chunk.len());
        chunk.extend(available[..take].iter().cloned());
        if take == available.len() {
            *source += 1;
            *used = 0;
        } else {
            *used += take;
        }
    }
    chunk
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plan_leaves_balanced_rows_alone() {
        assert_eq!(concat_plan(&[32, 32, 32]), None);
        assert_eq!(concat_plan(&[1, 1, 1]), None);
        assert_eq!(concat_plan(&[31, 31, 31, 31, 31]), None);
    }

    #[test]
    fn plan_redistributes_short_nodes() {
        let plan = concat_plan(&[10, 10, 10, 10, 10, 10]).unwrap();
        assert_eq!(plan.iter().sum::<usize>(), 60);
        assert!(plan.len() <= 2 + EXTRA_NODES);

        let widths = [32, 5, 32, 32, 3, 32, 1, 32, 2];
        let plan = concat_plan(&widths).unwrap();
        assert_eq!(plan.iter().sum::<usize>(), widths.iter().sum::<usize>());
        let optimal = widths.iter().sum::<usize>().div_ceil(BRANCHING);
        assert!(plan.len() <= optimal + EXTRA_NODES);
        assert!(plan.iter().all(|&w| w > 0 && w <= BRANCHING));
    }

    #[test]
    fn concat_small() {
        let left = Sequence::from(vec![1, 2, 3]);
        let right = Sequence::from(vec![4, 5]);
        let both = left.concat(&right);
        both.check_invariants();
        assert!(both.iter().copied().eq([1, 2, 3, 4, 5]));
        assert_eq!(left.len(), 3);
        assert_eq!(right.len(), 2);
    }

    #[test]
    fn concat_with_empty() {
        let seq: Sequence<u32> = (0..100).collect();
        let empty = Sequence::new();
        assert_eq!(seq.concat(&empty), seq);
        assert_eq!(empty.concat(&seq), seq);
        assert!(empty.concat(&empty).is_empty());
    }

    #[test]
    fn concat_large() {
        let left: Sequence<usize> = (0..5000).collect();
        let right: Sequence<usize> = (5000..8000).collect();
        let both = left.concat(&right);
        both.check_invariants();
        assert_eq!(both.len(), 8000);
        for i in (0..8000).step_by(13) {
            assert_eq!(both[i], i);
        }
    }

    #[test]
    fn concat_after_prepends() {
        let mut left = Sequence::new();
        for i in (0..2000).rev() {
            left.push_front(i);
        }
        let mut right = Sequence::new();
        for i in (2000..4000).rev() {
            right.push_front(i);
        }
        assert!(left.offset != 0 && right.offset != 0);
        let both = left.concat(&right);
        both.check_invariants();
        assert!(both.iter().copied().eq(0..4000));
    }

    #[test]
    fn repeated_concat_stays_shallow() {
        let piece: Sequence<usize> = (0..45).collect();
        let mut seq = Sequence::new();
        for _ in 0..500 {
            seq = seq.concat(&piece);
        }
        seq.check_invariants();
        assert_eq!(seq.len(), 45 * 500);
        assert!(seq.depth() <= 4);
        assert_eq!(seq[45 * 499 + 44], 44);
    }

    #[test]
    fn prepend_after_concat() {
        let left: Sequence<usize> = (1..1500).collect();
        let right: Sequence<usize> = (1500..3000).collect();
        let mut both = left.concat(&right);
        for i in 0..1000 {
            both.push_front(i);
            both.push_back(i);
        }
        both.check_invariants();
        assert_eq!(both.len(), 4999);
        assert_eq!(both[999], 0);
        assert_eq!(both[1000], 1);
        assert_eq!(both[3998], 2999);
        assert_eq!(both[4998], 999);
    }
}
