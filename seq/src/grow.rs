//! Pushing elements at both ends of a sequence.
//!
//! Elements first go into the affix on their side. When an affix is full, it
//! is turned into a leaf and moved into the tree, and the new element starts
//! a fresh affix.

use std::rc::Rc;

use imbl_sized_chunks::Chunk;
use log::trace;

use crate::{
    node::{capacity, chain, Leaf, Node},
    sequence::Sequence,
    BRANCHING,
};

impl<T: Clone> Sequence<T> {
    /// Adds an element at the end of this sequence, in place.
    pub fn push_back(&mut self, value: T) {
        if self.suffix_len() < BRANCHING {
            Rc::make_mut(&mut self.suffix).push_back(value);
            self.descriptor = self.descriptor.with_suffix_len(self.suffix_len() + 1);
        } else {
            let full = std::mem::replace(&mut self.suffix, Rc::new(Chunk::unit(value)));
            self.descriptor = self.descriptor.with_suffix_len(1);
            self.push_leaf_back(Rc::unwrap_or_clone(full));
        }
        self.length += 1;
    }

    /// Adds an element at the start of this sequence, in place.
    pub fn push_front(&mut self, value: T) {
        if self.prefix_len() < BRANCHING {
            Rc::make_mut(&mut self.prefix).push_back(value);
            self.descriptor = self.descriptor.with_prefix_len(self.prefix_len() + 1);
        } else {
            let full = std::mem::replace(&mut self.prefix, Rc::new(Chunk::unit(value)));
            self.descriptor = self.descriptor.with_prefix_len(1);
            let mut leaf = Rc::unwrap_or_clone(full);
            leaf.reverse();
            self.push_leaf_front(leaf);
        }
        self.length += 1;
    }

    /// Returns a copy of this sequence with `value` added at the end.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let seq = Sequence::from(vec![1, 2]);
    /// assert_eq!(seq.append(3), Sequence::from(vec![1, 2, 3]));
    /// assert_eq!(seq.len(), 2);
    /// ```
    pub fn append(&self, value: T) -> Self {
        let mut seq = self.clone();
        seq.push_back(value);
        seq
    }

    /// Returns a copy of this sequence with `value` added at the start.
    pub fn prepend(&self, value: T) -> Self {
        let mut seq = self.clone();
        seq.push_front(value);
        seq
    }

    /// Moves `leaf` after every element of the prefix and the tree. The
    /// suffix is left alone, and the length is not updated.
    pub(crate) fn push_leaf_back(&mut self, mut leaf: Leaf<T>) {
        let depth = self.depth();
        let offset = self.offset;
        let leaf_len = leaf.len();

        let Some(root) = self.root.as_mut() else {
            if self.prefix_len() == 0 {
                leaf.reverse();
                self.descriptor = self.descriptor.with_prefix_len(leaf_len);
                self.prefix = Rc::new(leaf);
            } else {
                self.root = Some(Node::leaf(leaf));
            }
            return;
        };

        if let Some(target) = root.room_back(depth, offset) {
            Rc::make_mut(root).push_leaf_back(depth, offset, target, Node::leaf(leaf), leaf_len);
            return;
        }

        trace!("growing the tree to depth {} at the back", depth + 1);
        let old = Rc::clone(root);
        let new = chain(depth, Node::leaf(leaf));
        // A dense root keeps the offset where it is, since the old root
        // becomes its first child.
        *root = Rc::new(if old.is_full(depth, offset) {
            Node::Branch {
                sizes: None,
                children: Chunk::pair(old, new),
            }
        } else {
            let old_len = old.len(depth, offset);
            Node::Branch {
                sizes: Some(Chunk::pair(old_len, old_len + leaf_len)),
                children: Chunk::pair(old, new),
            }
        });
        self.descriptor = self.descriptor.with_depth(depth + 1);
    }

    /// Moves a full `leaf` (in order) before every element of the tree and
    /// the suffix. The prefix is left alone, and the length is not updated.
    pub(crate) fn push_leaf_front(&mut self, leaf: Leaf<T>) {
        debug_assert_eq!(leaf.len(), BRANCHING);
        let depth = self.depth();
        let offset = self.offset;

        let Some(root) = self.root.as_mut() else {
            if self.suffix_len() == 0 {
                self.descriptor = self.descriptor.with_suffix_len(leaf.len());
                self.suffix = Rc::new(leaf);
            } else {
                self.root = Some(Node::leaf(leaf));
            }
            return;
        };

        // Walk the relaxed nodes at the top of the left spine, remembering
        // the lowest one that still has a free slot.
        let mut relaxed = 0;
        let mut lowest_with_room = None;
        let mut node: &Node<T> = root;
        while let Node::Branch {
            sizes: Some(_),
            children,
        } = node
        {
            if children.len() < BRANCHING {
                lowest_with_room = Some(relaxed);
            }
            relaxed += 1;
            node = children[0].as_ref();
        }
        let leaf = Node::leaf(leaf);

        if offset != 0 {
            // The topmost dense node on the spine has free slots at its front.
            Rc::make_mut(root)
                .left_spine_mut(relaxed, BRANCHING)
                .push_leaf_front_dense(depth - relaxed, offset, leaf);
            self.offset = offset - BRANCHING;
            return;
        }

        match (relaxed, lowest_with_room) {
            (0, _) => {
                if depth > 0 && root.width() < BRANCHING {
                    let Node::Branch { children, .. } = Rc::make_mut(root) else {
                        unreachable!();
                    };
                    children.push_front(chain(depth - 1, leaf));
                    self.offset = capacity(depth - 1) - BRANCHING;
                } else {
                    self.grow_front(leaf, false);
                }
            }
            (_, None) => self.grow_front(leaf, true),
            (_, Some(level)) => {
                let height = depth - level;
                let target = Rc::make_mut(root).left_spine_mut(level, BRANCHING);
                let Node::Branch {
                    sizes: Some(sizes),
                    children,
                } = target
                else {
                    unreachable!("the node with room is relaxed");
                };
                for size in sizes.iter_mut() {
                    *size += BRANCHING;
                }
                sizes.push_front(BRANCHING);
                children.push_front(chain(height - 1, leaf));
                self.offset = capacity(height - 1) - BRANCHING;
            }
        }
    }

    /// Puts a new root above the current one, with `leaf` at the bottom of
    /// a fresh left spine.
    fn grow_front(&mut self, leaf: Rc<Node<T>>, relaxed: bool) {
        let depth = self.depth();
        let Some(old) = self.root.take() else {
            unreachable!("growing an empty tree");
        };
        trace!("growing the tree to depth {} at the front", depth + 1);
        let sizes = relaxed.then(|| {
            let old_len = old.len(depth, 0);
            Chunk::pair(BRANCHING, BRANCHING + old_len)
        });
        self.root = Some(Rc::new(Node::Branch {
            sizes,
            children: Chunk::pair(chain(depth, leaf), old),
        }));
        self.offset = capacity(depth) - BRANCHING;
        self.descriptor = self.descriptor.with_depth(depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affixes_fill_first() {
        let mut seq = Sequence::new();
        for i in 0..BRANCHING {
            seq.push_back(i);
            seq.push_front(i);
        }
        assert!(seq.root.is_none());
        assert_eq!(seq.prefix_len(), BRANCHING);
        assert_eq!(seq.suffix_len(), BRANCHING);
        seq.check_invariants();

        seq.push_back(100);
        seq.check_invariants();
        assert!(seq.root.is_some());
        assert_eq!(seq.suffix_len(), 1);
    }

    #[test]
    fn full_suffix_without_prefix_becomes_prefix() {
        let mut seq = Sequence::new();
        for i in 0..=BRANCHING {
            seq.push_back(i);
        }
        seq.check_invariants();
        assert!(seq.root.is_none());
        assert_eq!(seq.prefix_len(), BRANCHING);
        assert_eq!(seq.suffix_len(), 1);
        assert_eq!(seq.get(0), Some(&0));
    }

    #[test]
    fn front_growth_uses_offset() {
        let mut seq = Sequence::new();
        for i in 0..(35 * BRANCHING) {
            seq.push_front(i);
            seq.check_invariants();
        }
        assert_eq!(seq.depth(), 2);
        assert!(seq.offset > 0);
        let n = seq.len();
        assert_eq!(seq.get(n - 1), Some(&0));
        assert_eq!(seq.get(0), Some(&(n - 1)));
    }

    #[test]
    fn back_growth_after_front_growth() {
        let mut seq = Sequence::new();
        for i in 0..3000 {
            seq.push_front(i);
        }
        for i in 0..3000 {
            seq.push_back(i);
        }
        seq.check_invariants();
        assert_eq!(seq.shape().relaxed_nodes, 0);
        assert_eq!(seq[2999], 0);
        assert_eq!(seq[3000], 0);
        assert_eq!(seq[5999], 2999);
    }
}
