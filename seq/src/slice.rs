//! Slicing.
//!
//! A slice keeps whole subtrees where it can and only rebuilds the nodes on
//! the paths to its two ends. The partial leaves at the ends are moved out
//! of the tree and become the new affixes, so the tree of a slice always
//! starts and ends on a leaf boundary. Cutting leaves away at the front of a
//! dense node is recorded as an offset instead of shifting its children.

use std::rc::Rc;

use imbl_sized_chunks::Chunk;

use crate::{
    descriptor::Descriptor,
    node::{Children, Leaf, Node, Sizes},
    sequence::Sequence,
    BITS,
};

impl<T: Clone> Sequence<T> {
    /// Returns the elements from index `from` (inclusive) to index `to`
    /// (exclusive).
    ///
    /// Negative bounds count from the end of the sequence and out of range
    /// bounds are clamped, so this never fails. An empty or reversed range
    /// gives the empty sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let seq = Sequence::from(vec![0, 1, 2, 3, 4, 5]);
    /// assert_eq!(seq.slice(1, 4), Sequence::from(vec![1, 2, 3]));
    /// assert_eq!(seq.slice(-2, 100), Sequence::from(vec![4, 5]));
    /// assert!(seq.slice(4, 1).is_empty());
    /// ```
    pub fn slice(&self, from: isize, to: isize) -> Self {
        let mut seq = self.clone();
        seq.slice_in_place(from, to);
        seq
    }

    /// Like [`Sequence::slice`], but in place.
    pub fn slice_in_place(&mut self, from: isize, to: isize) {
        let resolve = |bound: isize| {
            if bound < 0 {
                self.length.saturating_sub(bound.unsigned_abs())
            } else {
                (bound as usize).min(self.length)
            }
        };
        let (from, to) = (resolve(from), resolve(to));
        self.restrict(from, to);
    }

    /// The first `count` elements.
    pub fn take(&self, count: usize) -> Self {
        self.between(0, count)
    }

    /// The last `count` elements.
    pub fn take_last(&self, count: usize) -> Self {
        self.between(self.length.saturating_sub(count), self.length)
    }

    /// Everything but the first `count` elements.
    pub fn skip(&self, count: usize) -> Self {
        self.between(count, self.length)
    }

    /// Everything but the last `count` elements.
    pub fn skip_last(&self, count: usize) -> Self {
        self.between(0, self.length.saturating_sub(count))
    }

    /// Splits the sequence in two at `index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let (left, right) = Sequence::from(vec![1, 2, 3]).split_at(1);
    /// assert_eq!(left, Sequence::from(vec![1]));
    /// assert_eq!(right, Sequence::from(vec![2, 3]));
    /// ```
    pub fn split_at(&self, index: usize) -> (Self, Self) {
        (self.take(index), self.skip(index))
    }

    /// Everything but the first element.
    pub fn tail(&self) -> Self {
        self.skip(1)
    }

    /// Everything but the last element.
    pub fn init(&self) -> Self {
        self.skip_last(1)
    }

    fn between(&self, from: usize, to: usize) -> Self {
        let mut seq = self.clone();
        seq.restrict(from.min(self.length), to.min(self.length));
        seq
    }

    /// Keeps only the elements in `from..to`. Both bounds must be at most
    /// the length.
    fn restrict(&mut self, from: usize, to: usize) {
        if from >= to {
            *self = Sequence::new();
            return;
        }
        if from == 0 && to == self.length {
            return;
        }

        let prefix_len = self.prefix_len();
        let tree_end = self.length - self.suffix_len();
        if to <= prefix_len {
            let prefix = self.prefix.as_slice()[prefix_len - to..prefix_len - from]
                .iter()
                .cloned()
                .collect();
            *self = Sequence::from_affixes(prefix, Chunk::new());
            return;
        }
        if from >= tree_end {
            let suffix = self.suffix.as_slice()[from - tree_end..to - tree_end]
                .iter()
                .cloned()
                .collect();
            *self = Sequence::from_affixes(Chunk::new(), suffix);
            return;
        }

        let depth = self.depth();
        let offset = self.offset;
        match (from < prefix_len, to > tree_end) {
            (true, true) => {
                Rc::make_mut(&mut self.prefix).drop_right(prefix_len - from);
                Rc::make_mut(&mut self.suffix).drop_right(to - tree_end);
            }
            (true, false) => {
                let Some(root) = self.root.take() else {
                    unreachable!("the end of the slice is in the tree");
                };
                Rc::make_mut(&mut self.prefix).drop_right(prefix_len - from);
                let (tree, suffix) = split_right(&root, depth, offset, to - 1 - prefix_len);
                self.root = tree;
                self.suffix = Rc::new(suffix);
            }
            (false, true) => {
                let Some(root) = self.root.take() else {
                    unreachable!("the start of the slice is in the tree");
                };
                let (mut prefix, tree, offset) =
                    split_left(&root, depth, offset, from - prefix_len);
                prefix.reverse();
                self.prefix = Rc::new(prefix);
                self.root = tree;
                self.offset = offset;
                Rc::make_mut(&mut self.suffix).drop_right(to - tree_end);
            }
            (false, false) => self.slice_tree(from - prefix_len, to - 1 - prefix_len),
        }

        self.length = to - from;
        self.descriptor = Descriptor::new(self.depth(), self.prefix.len(), self.suffix.len());
        self.collapse_root();
    }

    /// Restricts the sequence to the tree elements from `first` to `last`
    /// (both inclusive), dropping both affixes.
    fn slice_tree(&mut self, mut first: usize, mut last: usize) {
        let Some(mut node) = self.root.take() else {
            unreachable!("slicing the tree of a sequence without one");
        };
        let mut height = self.depth();
        let mut offset = self.offset;

        // While both ends are in the same child, the nodes above are not
        // part of the slice at all.
        loop {
            if let Node::Leaf { data } = node.as_ref() {
                self.prefix = Rc::new(Chunk::new());
                self.suffix = Rc::new(data.as_slice()[first..=last].iter().cloned().collect());
                self.offset = 0;
                self.descriptor = self.descriptor.with_depth(0);
                return;
            }
            let start = node.locate(height, first, offset);
            let end = node.locate(height, last, offset);
            if start.slot != end.slot {
                break;
            }
            let child = Rc::clone(&node.children()[start.slot]);
            node = child;
            height -= 1;
            first = start.index;
            last = end.index;
            offset = start.offset;
        }

        let (Some(tree), suffix) = split_right(&node, height, offset, last) else {
            unreachable!("the start of the slice is in an earlier child");
        };
        let (mut prefix, tree, offset) = split_left(&tree, height, offset, first);
        prefix.reverse();
        self.prefix = Rc::new(prefix);
        self.root = tree;
        self.offset = offset;
        self.suffix = Rc::new(suffix);
        self.descriptor = self.descriptor.with_depth(height);
    }

    /// Replaces a root with a single child by that child, as many times as
    /// possible.
    pub(crate) fn collapse_root(&mut self) {
        let mut depth = self.depth();
        while let Some(root) = &self.root {
            let Node::Branch { sizes, children } = root.as_ref() else {
                break;
            };
            if children.len() != 1 {
                break;
            }
            if sizes.is_none() {
                self.offset &= (1 << (BITS * depth)) - 1;
            }
            let child = Rc::clone(&children[0]);
            self.root = Some(child);
            depth -= 1;
        }
        if self.root.is_none() {
            depth = 0;
            self.offset = 0;
        }
        self.descriptor = self.descriptor.with_depth(depth);
    }
}

/// Cuts a subtree after its element at `last`.
///
/// Returns what remains of the subtree, if anything, and the elements of the
/// leaf holding `last` up to and including it.
fn split_right<T: Clone>(
    node: &Rc<Node<T>>,
    height: usize,
    offset: usize,
    last: usize,
) -> (Option<Rc<Node<T>>>, Leaf<T>) {
    let (sizes, children) = match node.as_ref() {
        Node::Leaf { data } => return (None, data.iter().take(last + 1).cloned().collect()),
        Node::Branch { sizes, children } => (sizes, children),
    };

    let loc = node.locate(height, last, offset);
    let (child, hoisted) = split_right(&children[loc.slot], height - 1, loc.offset, loc.index);

    let mut kept: Children<T> = children.iter().take(loc.slot).cloned().collect();
    let child_len = child
        .as_ref()
        .map(|child| child.len(height - 1, loc.offset));
    kept.extend(child);
    if kept.is_empty() {
        return (None, hoisted);
    }

    let sizes = sizes.as_ref().map(|sizes| {
        let mut table: Sizes = sizes.iter().take(loc.slot).copied().collect();
        if let Some(child_len) = child_len {
            let before = table.last().copied().unwrap_or(0);
            table.push_back(before + child_len);
        }
        table
    });
    let node = Node::Branch {
        sizes,
        children: kept,
    };
    (Some(Rc::new(node)), hoisted)
}

/// Cuts a subtree before its element at `first`.
///
/// Returns the elements of the leaf holding `first` from it onwards, what
/// remains of the subtree, if anything, and the offset that applies to it.
fn split_left<T: Clone>(
    node: &Rc<Node<T>>,
    height: usize,
    offset: usize,
    first: usize,
) -> (Leaf<T>, Option<Rc<Node<T>>>, usize) {
    let (sizes, children) = match node.as_ref() {
        Node::Leaf { data } => return (data.iter().skip(first).cloned().collect(), None, 0),
        Node::Branch { sizes, children } => (sizes, children),
    };

    let loc = node.locate(height, first, offset);
    let (hoisted, child, child_offset) =
        split_left(&children[loc.slot], height - 1, loc.offset, loc.index);

    let child_len = child
        .as_ref()
        .map(|child| child.len(height - 1, child_offset));
    let mut kept: Children<T> = child.into_iter().collect();
    kept.extend(children.iter().skip(loc.slot + 1).cloned());
    if kept.is_empty() {
        return (hoisted, None, 0);
    }

    let (sizes, offset) = match sizes {
        Some(sizes) => {
            // Everything before the first kept element goes away.
            let removed = sizes[loc.slot] - child_len.unwrap_or(0);
            let start = if child_len.is_some() {
                loc.slot
            } else {
                loc.slot + 1
            };
            let table: Sizes = sizes
                .iter()
                .skip(start)
                .map(|size| size - removed)
                .collect();
            (Some(table), if child_len.is_some() { child_offset } else { 0 })
        }
        None => {
            // The children keep their physical positions; the ones cut away
            // become part of the offset.
            let shift = BITS * height;
            let slot = loc.slot + (offset >> shift);
            let offset = match child_len {
                Some(_) => (slot << shift) | child_offset,
                None => (slot + 1) << shift,
            };
            (None, offset)
        }
    };
    (
        hoisted,
        Some(Rc::new(Node::Branch {
            sizes,
            children: kept,
        })),
        offset,
    )
}
