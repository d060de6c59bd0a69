//! Bulk construction of sequences.

use std::rc::Rc;

use imbl_sized_chunks::Chunk;
use log::trace;

use crate::{
    node::{capacity, chain, Node},
    sequence::Sequence,
    BITS, BRANCHING, MASK,
};

/// Builds a sequence by pushing elements at the end.
///
/// The sequence under construction is owned exclusively by the builder, so
/// none of its nodes are ever shared and pushing never copies a node. Since
/// elements only arrive at the back of an initially empty sequence, the tree
/// stays dense with every leaf full, and the position of a new leaf follows
/// directly from the number of elements already in the tree.
///
/// # Examples
///
/// ```
/// use rrb_seq::Builder;
///
/// let mut builder = Builder::new();
/// for i in 0..1000 {
///     builder.push(i);
/// }
/// let seq = builder.build();
/// assert_eq!(seq.len(), 1000);
/// assert_eq!(seq[999], 999);
/// ```
pub struct Builder<T> {
    seq: Sequence<T>,
}

impl<T> Default for Builder<T> {
    fn default() -> Self {
        Builder {
            seq: Sequence::new(),
        }
    }
}

impl<T> Builder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn build(self) -> Sequence<T> {
        self.seq
    }
}

impl<T: Clone> Builder<T> {
    pub fn push(&mut self, value: T) {
        let seq = &mut self.seq;
        if seq.length == 0 {
            // Starting with the prefix keeps the first element out of the tree
            // and satisfies the non-empty prefix requirement once a tree exists.
            seq.prefix = Rc::new(Chunk::unit(value));
            seq.descriptor = seq.descriptor.with_prefix_len(1);
        } else if seq.suffix_len() < BRANCHING {
            Rc::make_mut(&mut seq.suffix).push_back(value);
            seq.descriptor = seq.descriptor.with_suffix_len(seq.suffix_len() + 1);
        } else {
            let tree_len = seq.tree_len();
            let full = std::mem::replace(&mut seq.suffix, Rc::new(Chunk::unit(value)));
            seq.descriptor = seq.descriptor.with_suffix_len(1);
            let leaf = Node::leaf(Rc::unwrap_or_clone(full));
            self.push_leaf(leaf, tree_len);
        }
        self.seq.length += 1;
    }

    /// Adds a full leaf whose first element lands at `index` in the tree.
    fn push_leaf(&mut self, leaf: Rc<Node<T>>, index: usize) {
        let seq = &mut self.seq;
        let depth = seq.depth();
        let Some(root) = seq.root.as_mut() else {
            seq.root = Some(leaf);
            return;
        };

        if index >= capacity(depth) {
            trace!("builder growing the tree to depth {}", depth + 1);
            let old = Rc::clone(root);
            *root = Rc::new(Node::Branch {
                sizes: None,
                children: Chunk::pair(old, chain(depth, leaf)),
            });
            seq.descriptor = seq.descriptor.with_depth(depth + 1);
            return;
        }

        let mut node = Rc::make_mut(root);
        let mut height = depth;
        loop {
            let slot = (index >> (BITS * height)) & MASK;
            let Node::Branch { children, .. } = node else {
                unreachable!("the builder never descends into a leaf");
            };
            if slot == children.len() {
                children.push_back(chain(height - 1, leaf));
                return;
            }
            node = Rc::make_mut(&mut children[slot]);
            height -= 1;
        }
    }
}

impl<T: Clone> Extend<T> for Builder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_and_packed() {
        for n in [0, 1, 2, 33, 34, 65, 1024, 1057, 1090, 40_000] {
            let mut builder = Builder::new();
            builder.extend(0..n);
            assert_eq!(builder.len(), n);
            let seq = builder.build();
            seq.check_invariants();
            let shape = seq.shape();
            assert_eq!(shape.relaxed_nodes, 0);
            assert_eq!(shape.offset, 0);
            assert!(seq.iter().copied().eq(0..n));
        }
    }

    #[test]
    fn builder_output_is_persistent() {
        let seq: Sequence<u32> = (0..500).collect();
        let pushed = seq.append(500);
        assert_eq!(seq.len(), 500);
        assert_eq!(pushed.len(), 501);
        assert_eq!(pushed[500], 500);
        assert_eq!(seq.last(), Some(&499));
    }
}
