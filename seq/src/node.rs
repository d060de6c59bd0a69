//! Tree nodes and index resolution.
//!
//! Heights are counted from the leaves, which sit at height zero. A node at
//! height `h` has room for `1 << (BITS * (h + 1))` elements, and each of its
//! children for `1 << (BITS * h)`.
//!
//! A *dense* interior node has no size table. All of its descendants are
//! dense too, and every child except the last one is full. The only
//! exception is the left spine of the tree: the topmost dense node on the
//! left spine may be missing elements at its front. The number of missing
//! elements is the sequence's *offset*, and it is always a multiple of
//! `BRANCHING` since whole leaves are missing. When we walk into the first
//! child of a dense node, the low bits of the offset go along with it; any
//! other child sees an offset of zero.
//!
//! A *relaxed* interior node stores the cumulative sizes of its children and
//! places no constraint on them. It passes the offset unchanged to its first
//! child, so that the offset always belongs to the topmost dense node on the
//! left spine.

use std::rc::Rc;

use imbl_sized_chunks::Chunk;

use crate::{BITS, BRANCHING};

pub(crate) type Leaf<T> = Chunk<T, BRANCHING>;
pub(crate) type Children<T> = Chunk<Rc<Node<T>>, BRANCHING>;
pub(crate) type Sizes = Chunk<usize, BRANCHING>;

#[derive(Debug)]
pub(crate) enum Node<T> {
    Leaf {
        data: Leaf<T>,
    },
    Branch {
        /// Cumulative sizes of the children, or `None` for a dense node.
        sizes: Option<Sizes>,
        children: Children<T>,
    },
}

impl<T: Clone> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Leaf { data } => Node::Leaf { data: data.clone() },
            Node::Branch { sizes, children } => Node::Branch {
                sizes: sizes.clone(),
                children: children.clone(),
            },
        }
    }
}

/// The number of elements that a node at `height` can hold.
pub(crate) fn capacity(height: usize) -> usize {
    1 << (BITS * (height + 1))
}

fn low_bits(height: usize) -> usize {
    (1 << (BITS * height)) - 1
}

/// Builds a path of single-child dense nodes from `height` down to `leaf`.
pub(crate) fn chain<T>(height: usize, leaf: Rc<Node<T>>) -> Rc<Node<T>> {
    (0..height).fold(leaf, |node, _| {
        Rc::new(Node::Branch {
            sizes: None,
            children: Chunk::unit(node),
        })
    })
}

/// Where an index lands among the children of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Located {
    /// Position of the child in the node's child list.
    pub slot: usize,
    /// The index, relative to the child.
    pub index: usize,
    /// The offset that applies to the child.
    pub offset: usize,
}

impl<T> Node<T> {
    pub(crate) fn leaf(data: Leaf<T>) -> Rc<Self> {
        Rc::new(Node::Leaf { data })
    }

    /// Creates a relaxed node at `height`, computing its size table.
    ///
    /// `first_offset` is the offset that applies to the first child.
    pub(crate) fn relaxed(children: Children<T>, height: usize, first_offset: usize) -> Self {
        let mut sizes = Sizes::new();
        let mut total = 0;
        for (i, child) in children.iter().enumerate() {
            total += child.len(height - 1, if i == 0 { first_offset } else { 0 });
            sizes.push_back(total);
        }
        Node::Branch {
            sizes: Some(sizes),
            children,
        }
    }

    pub(crate) fn is_relaxed(&self) -> bool {
        matches!(self, Node::Branch { sizes: Some(_), .. })
    }

    /// Number of elements in a leaf, or of children in an interior node.
    pub(crate) fn width(&self) -> usize {
        match self {
            Node::Leaf { data } => data.len(),
            Node::Branch { children, .. } => children.len(),
        }
    }

    pub(crate) fn children(&self) -> &Children<T> {
        match self {
            Node::Branch { children, .. } => children,
            Node::Leaf { .. } => unreachable!("leaves have no children"),
        }
    }

    /// The number of elements in this subtree, given the offset that applies to it.
    pub(crate) fn len(&self, height: usize, offset: usize) -> usize {
        match self {
            Node::Leaf { data } => data.len(),
            Node::Branch {
                sizes: Some(sizes), ..
            } => sizes.last().copied().unwrap_or(0),
            Node::Branch {
                sizes: None,
                children,
            } => {
                let first_offset = offset & low_bits(height);
                let last = children.last().expect("empty interior node");
                if children.len() == 1 {
                    last.len(height - 1, first_offset)
                } else {
                    ((children.len() - 1) << (BITS * height)) - first_offset
                        + last.len(height - 1, 0)
                }
            }
        }
    }

    /// Finds the child that holds `index`. Must not be called on a leaf.
    pub(crate) fn locate(&self, height: usize, index: usize, offset: usize) -> Located {
        let shift = BITS * height;
        match self {
            Node::Branch { sizes: None, .. } => {
                let physical = index + offset;
                let slot = (physical >> shift) - (offset >> shift);
                if slot == 0 {
                    Located {
                        slot,
                        index,
                        offset: offset & low_bits(height),
                    }
                } else {
                    Located {
                        slot,
                        index: physical & low_bits(height),
                        offset: 0,
                    }
                }
            }
            Node::Branch {
                sizes: Some(sizes), ..
            } => {
                // Children hold at most `1 << shift` elements each, so this is a lower bound.
                let mut slot = (index >> shift).min(sizes.len() - 1);
                while sizes[slot] <= index && slot + 1 < sizes.len() {
                    slot += 1;
                }
                if slot == 0 {
                    Located {
                        slot,
                        index,
                        offset,
                    }
                } else {
                    Located {
                        slot,
                        index: index - sizes[slot - 1],
                        offset: 0,
                    }
                }
            }
            Node::Leaf { .. } => unreachable!("cannot locate a child of a leaf"),
        }
    }

    /// If this node is at height `height`, get the element at the given index.
    ///
    /// The index must be in range.
    pub(crate) fn get(&self, mut height: usize, mut index: usize, mut offset: usize) -> &T {
        let mut node = self;
        loop {
            match node {
                Node::Leaf { data } => return &data[index],
                Node::Branch { children, .. } => {
                    let loc = node.locate(height, index, offset);
                    node = children[loc.slot].as_ref();
                    height -= 1;
                    index = loc.index;
                    offset = loc.offset;
                }
            }
        }
    }

    /// Whether this node could hold all its elements without an offset and
    /// without a single free slot.
    pub(crate) fn is_full(&self, height: usize, offset: usize) -> bool {
        match self {
            Node::Leaf { data } => data.is_full(),
            Node::Branch { sizes: Some(_), .. } => false,
            Node::Branch { sizes: None, .. } => {
                self.len(height, offset) + offset == capacity(height)
            }
        }
    }

    /// If a full leaf can be appended somewhere below this node without
    /// adding a level to the tree, the height of the node that takes it in.
    ///
    /// A dense subtree with room reports its own height, since it finds its
    /// way down from its length alone.
    pub(crate) fn room_back(&self, height: usize, offset: usize) -> Option<usize> {
        match self {
            Node::Leaf { .. } => None,
            Node::Branch {
                sizes: Some(_),
                children,
            } => {
                let last_offset = if children.len() == 1 { offset } else { 0 };
                children[children.len() - 1]
                    .room_back(height - 1, last_offset)
                    .or((children.len() < BRANCHING).then_some(height))
            }
            Node::Branch { sizes: None, .. } => {
                let physical = self.len(height, offset) + offset;
                (physical < capacity(height) && physical % BRANCHING == 0).then_some(height)
            }
        }
    }
}

impl<T: Clone> Node<T> {
    /// Set the element at the given index, which must be in range.
    pub(crate) fn set(&mut self, height: usize, index: usize, offset: usize, value: T) {
        if let Node::Leaf { data } = self {
            data[index] = value;
            return;
        }
        let loc = self.locate(height, index, offset);
        let Node::Branch { children, .. } = self else {
            unreachable!();
        };
        Rc::make_mut(&mut children[loc.slot]).set(height - 1, loc.index, loc.offset, value);
    }

    /// Appends `leaf` after the last leaf of this subtree. `target` is the
    /// height returned by [`Node::room_back`].
    pub(crate) fn push_leaf_back(
        &mut self,
        height: usize,
        offset: usize,
        target: usize,
        leaf: Rc<Node<T>>,
        leaf_len: usize,
    ) {
        match self {
            Node::Leaf { .. } => unreachable!("cannot push a leaf into a leaf"),
            Node::Branch {
                sizes: Some(sizes),
                children,
            } => {
                let last = children.len() - 1;
                if target < height {
                    let last_offset = if last == 0 { offset } else { 0 };
                    Rc::make_mut(&mut children[last]).push_leaf_back(
                        height - 1,
                        last_offset,
                        target,
                        leaf,
                        leaf_len,
                    );
                    sizes[last] += leaf_len;
                } else {
                    let total = sizes[last];
                    children.push_back(chain(height - 1, leaf));
                    sizes.push_back(total + leaf_len);
                }
            }
            Node::Branch { sizes: None, .. } => {
                let physical = self.len(height, offset) + offset;
                self.push_leaf_back_dense(height, offset, physical, leaf);
            }
        }
    }

    /// `physical` is the length of this dense subtree plus its offset.
    fn push_leaf_back_dense(
        &mut self,
        height: usize,
        offset: usize,
        physical: usize,
        leaf: Rc<Node<T>>,
    ) {
        let Node::Branch {
            sizes: None,
            children,
        } = self
        else {
            unreachable!("dense nodes only have dense children");
        };

        let shift = BITS * height;
        let slot = (physical >> shift) - (offset >> shift);
        if slot < children.len() {
            let child_offset = if slot == 0 {
                offset & low_bits(height)
            } else {
                0
            };
            Rc::make_mut(&mut children[slot]).push_leaf_back_dense(
                height - 1,
                child_offset,
                physical & low_bits(height),
                leaf,
            );
        } else {
            children.push_back(chain(height - 1, leaf));
        }
    }

    /// Inserts `leaf` just before the first element of a dense subtree whose
    /// offset is non-zero.
    pub(crate) fn push_leaf_front_dense(
        &mut self,
        height: usize,
        offset: usize,
        leaf: Rc<Node<T>>,
    ) {
        debug_assert!(offset != 0 && offset % BRANCHING == 0);
        let Node::Branch {
            sizes: None,
            children,
        } = self
        else {
            unreachable!("only dense interior nodes carry an offset");
        };

        let below = offset & low_bits(height);
        if below == 0 {
            // The first child is full, so the free slot is at this level.
            children.push_front(chain(height - 1, leaf));
        } else {
            Rc::make_mut(&mut children[0]).push_leaf_front_dense(height - 1, below, leaf);
        }
    }

    /// Walks `levels` nodes down the left spine, adding `added` to every entry
    /// of the size tables along the way, and returns the node it ends on.
    pub(crate) fn left_spine_mut(&mut self, levels: usize, added: usize) -> &mut Self {
        let mut node = self;
        for _ in 0..levels {
            node = match node {
                Node::Branch { sizes, children } => {
                    if let Some(sizes) = sizes {
                        for size in sizes.iter_mut() {
                            *size += added;
                        }
                    }
                    Rc::make_mut(&mut children[0])
                }
                Node::Leaf { .. } => unreachable!("the left spine is shorter than expected"),
            };
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_leaf(start: usize) -> Rc<Node<usize>> {
        Node::leaf((start..start + BRANCHING).collect())
    }

    fn dense(children: Vec<Rc<Node<usize>>>) -> Node<usize> {
        Node::Branch {
            sizes: None,
            children: children.into_iter().collect(),
        }
    }

    #[test]
    fn dense_locate_with_offset() {
        // Physical leaf slots 30 and 31 are present; 0 through 29 are missing.
        let node = dense(vec![full_leaf(0), full_leaf(32)]);
        let offset = 30 * BRANCHING;
        assert_eq!(node.len(1, offset), 64);
        assert_eq!(
            node.locate(1, 0, offset),
            Located {
                slot: 0,
                index: 0,
                offset: 0
            }
        );
        assert_eq!(
            node.locate(1, 33, offset),
            Located {
                slot: 1,
                index: 1,
                offset: 0
            }
        );
        assert_eq!(*node.get(1, 40, offset), 40);
        assert!(node.is_full(1, offset));
        assert_eq!(node.room_back(1, offset), None);
    }

    #[test]
    fn relaxed_locate() {
        let short: Rc<Node<usize>> = Node::leaf((0..10).collect());
        let node = Node::relaxed(
            [short, full_leaf(10), full_leaf(42)].into_iter().collect(),
            1,
            0,
        );
        assert_eq!(node.len(1, 0), 74);
        assert_eq!(node.locate(1, 9, 0).slot, 0);
        assert_eq!(
            node.locate(1, 10, 0),
            Located {
                slot: 1,
                index: 0,
                offset: 0
            }
        );
        assert_eq!(*node.get(1, 73, 0), 73);
        assert_eq!(node.room_back(1, 0), Some(1));
    }

    #[test]
    fn chain_and_push_back() {
        let mut node = dense(vec![full_leaf(0)]);
        assert_eq!(node.room_back(1, 0), Some(1));
        node.push_leaf_back(1, 0, 1, full_leaf(32), BRANCHING);
        assert_eq!(node.len(1, 0), 64);
        assert_eq!(*node.get(1, 63, 0), 63);

        let deep = chain(3, full_leaf(0));
        assert_eq!(deep.len(3, 0), BRANCHING);
        assert_eq!(*deep.get(3, 5, 0), 5);
    }

    #[test]
    fn push_back_below_a_relaxed_node() {
        let short: Rc<Node<usize>> = Node::leaf((0..10).collect());
        let right = Rc::new(dense(vec![full_leaf(10)]));
        let mut node = Node::relaxed(
            [Rc::new(dense(vec![short])), right].into_iter().collect(),
            2,
            0,
        );
        assert_eq!(node.room_back(2, 0), Some(1));
        node.push_leaf_back(2, 0, 1, full_leaf(42), BRANCHING);
        assert_eq!(node.width(), 2);
        assert_eq!(node.children()[1].width(), 2);
        assert_eq!(node.len(2, 0), 74);
        assert_eq!(*node.get(2, 73, 0), 73);

        // A full dense child leaves the new leaf to the relaxed node itself.
        let leaves = (0..BRANCHING).map(|i| full_leaf(i * BRANCHING)).collect();
        let node = Node::relaxed([Rc::new(dense(leaves))].into_iter().collect(), 2, 0);
        assert_eq!(node.room_back(2, 0), Some(2));
    }

    #[test]
    fn push_back_through_dense_levels() {
        let mut node = dense(vec![Rc::new(dense(vec![full_leaf(0)]))]);
        assert_eq!(node.room_back(2, 0), Some(2));
        node.push_leaf_back(2, 0, 2, full_leaf(32), BRANCHING);
        assert_eq!(node.width(), 1);
        assert_eq!(node.children()[0].width(), 2);
        assert_eq!(*node.get(2, 63, 0), 63);

        // With an offset the first child is physically full, so the new leaf
        // opens a second one.
        let offset = 30 * BRANCHING;
        let mut node = dense(vec![Rc::new(dense(vec![full_leaf(0), full_leaf(32)]))]);
        assert_eq!(node.room_back(2, offset), Some(2));
        node.push_leaf_back(2, offset, 2, full_leaf(64), BRANCHING);
        assert_eq!(node.width(), 2);
        assert_eq!(node.len(2, offset), 96);
        assert_eq!(*node.get(2, 95, offset), 95);
    }

    #[test]
    fn push_front_into_offset() {
        let mut node = dense(vec![full_leaf(32)]);
        node.push_leaf_front_dense(1, BRANCHING, full_leaf(0));
        assert_eq!(node.width(), 2);
        assert_eq!(node.len(1, 0), 64);
        assert_eq!(*node.get(1, 0, 0), 0);
    }
}
