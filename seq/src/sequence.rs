//! The persistent sequence type and its element-level operations.

use std::{
    fmt,
    hash::{Hash, Hasher},
    ops::Index,
    rc::Rc,
};

use imbl_sized_chunks::Chunk;
use serde::{Deserialize, Serialize};

use crate::{
    builder::Builder,
    descriptor::Descriptor,
    error::{Error, Result},
    node::{Leaf, Node},
    BITS, BRANCHING,
};

/// A persistent sequence.
///
/// Cloning a sequence is cheap: it only bumps a few reference counts. The
/// value-style methods (those taking `&self` and returning `Self`) leave the
/// receiver untouched. The in-place methods (those taking `&mut self`) only
/// copy the nodes that are shared with other sequences.
///
/// # Examples
///
/// ```
/// use rrb_seq::Sequence;
///
/// let numbers: Sequence<u32> = (0..100).collect();
/// let more = numbers.append(100).prepend(1000);
/// assert_eq!(numbers.len(), 100);
/// assert_eq!(more.len(), 102);
/// assert_eq!(more.first(), Some(&1000));
/// assert_eq!(more.last(), Some(&100));
/// ```
pub struct Sequence<T> {
    pub(crate) descriptor: Descriptor,
    /// Number of elements missing at the front of the topmost dense node on
    /// the tree's left spine. Always a multiple of `BRANCHING`.
    pub(crate) offset: usize,
    pub(crate) length: usize,
    /// The first elements of the sequence, stored back to front so that
    /// prepending pushes at the end of the chunk.
    pub(crate) prefix: Rc<Leaf<T>>,
    pub(crate) root: Option<Rc<Node<T>>>,
    /// The last elements of the sequence, in order.
    pub(crate) suffix: Rc<Leaf<T>>,
}

/// Structural statistics about a sequence, mostly useful for debugging and
/// for checking how well concatenation keeps the tree balanced.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Shape {
    pub length: usize,
    pub depth: usize,
    pub prefix_len: usize,
    pub suffix_len: usize,
    pub offset: usize,
    pub leaves: usize,
    pub dense_nodes: usize,
    pub relaxed_nodes: usize,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Sequence {
            descriptor: self.descriptor,
            offset: self.offset,
            length: self.length,
            prefix: Rc::clone(&self.prefix),
            root: self.root.clone(),
            suffix: Rc::clone(&self.suffix),
        }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Sequence {
            descriptor: Descriptor::EMPTY,
            offset: 0,
            length: 0,
            prefix: Rc::new(Chunk::new()),
            root: None,
            suffix: Rc::new(Chunk::new()),
        }
    }
}

impl<T> Sequence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sequence without a tree. The prefix is in stored order, last element first.
    pub(crate) fn from_affixes(prefix: Leaf<T>, suffix: Leaf<T>) -> Self {
        Sequence {
            descriptor: Descriptor::new(0, prefix.len(), suffix.len()),
            offset: 0,
            length: prefix.len() + suffix.len(),
            prefix: Rc::new(prefix),
            root: None,
            suffix: Rc::new(suffix),
        }
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub(crate) fn prefix_len(&self) -> usize {
        self.descriptor.prefix_len()
    }

    pub(crate) fn suffix_len(&self) -> usize {
        self.descriptor.suffix_len()
    }

    pub(crate) fn depth(&self) -> usize {
        self.descriptor.depth()
    }

    /// The number of elements stored in the tree, between the affixes.
    pub(crate) fn tree_len(&self) -> usize {
        self.length - self.prefix_len() - self.suffix_len()
    }

    /// Returns the element at `index`, or `None` if the index is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let seq = Sequence::from(vec!['a', 'b', 'c']);
    /// assert_eq!(seq.get(1), Some(&'b'));
    /// assert_eq!(seq.get(3), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.length {
            return None;
        }
        let prefix_len = self.prefix_len();
        if index < prefix_len {
            return Some(&self.prefix[prefix_len - 1 - index]);
        }
        let index = index - prefix_len;
        let tree_len = self.tree_len();
        if index >= tree_len {
            return Some(&self.suffix[index - tree_len]);
        }
        // The affixes absorb everything when there is no tree, so the index
        // can only land here if there is one.
        let root = self.root.as_ref()?;
        Some(root.get(self.depth(), index, self.offset))
    }

    /// Like [`Sequence::get`], but reports an error for indices that are out of range.
    pub fn try_get(&self, index: usize) -> Result<&T> {
        self.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.length,
        })
    }

    pub fn first(&self) -> Option<&T> {
        if self.prefix_len() > 0 {
            self.prefix.last()
        } else {
            self.suffix.first()
        }
    }

    pub fn last(&self) -> Option<&T> {
        if self.suffix_len() > 0 {
            self.suffix.last()
        } else {
            self.prefix.first()
        }
    }

    /// Checks the structural invariants of the sequence, panicking if any of
    /// them is violated.
    pub fn check_invariants(&self) {
        let prefix_len = self.prefix_len();
        let suffix_len = self.suffix_len();
        assert_eq!(prefix_len, self.prefix.len());
        assert_eq!(suffix_len, self.suffix.len());
        assert!(prefix_len <= BRANCHING && suffix_len <= BRANCHING);
        assert_eq!(self.offset % BRANCHING, 0);

        let tree_len = match &self.root {
            None => {
                assert_eq!(self.depth(), 0);
                assert_eq!(self.offset, 0);
                0
            }
            Some(root) => {
                assert!(prefix_len > 0, "a tree requires a non-empty prefix");
                assert!(suffix_len > 0, "a tree requires a non-empty suffix");
                check_node(root, self.depth(), self.offset, true)
            }
        };
        assert_eq!(self.length, prefix_len + tree_len + suffix_len);
    }

    /// Collects structural statistics about this sequence.
    pub fn shape(&self) -> Shape {
        fn visit<T>(node: &Node<T>, shape: &mut Shape) {
            match node {
                Node::Leaf { .. } => shape.leaves += 1,
                Node::Branch { sizes, children } => {
                    if sizes.is_some() {
                        shape.relaxed_nodes += 1;
                    } else {
                        shape.dense_nodes += 1;
                    }
                    for child in children.iter() {
                        visit(child, shape);
                    }
                }
            }
        }

        let mut shape = Shape {
            length: self.length,
            depth: self.depth(),
            prefix_len: self.prefix_len(),
            suffix_len: self.suffix_len(),
            offset: self.offset,
            ..Shape::default()
        };
        if let Some(root) = &self.root {
            visit(root, &mut shape);
        }
        shape
    }

    /// Compares two sequences element by element with a custom equality.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let words = Sequence::from(vec!["Foo", "BAR"]);
    /// let lower = Sequence::from(vec!["foo", "bar"]);
    /// assert!(words.equals_with(&lower, |a, b| a.eq_ignore_ascii_case(b)));
    /// ```
    pub fn equals_with<U>(&self, other: &Sequence<U>, mut eq: impl FnMut(&T, &U) -> bool) -> bool {
        if self.length != other.length {
            return false;
        }
        let mut others = other.iter();
        self.every(|x| others.next().is_some_and(|y| eq(x, y)))
    }
}

/// Checks the invariants of the subtree at `node` and returns the number of
/// elements it actually holds.
///
/// `on_spine` is true while we are walking down the left spine through
/// relaxed nodes, which is the only place where an offset may be passed
/// through a relaxed node.
fn check_node<T>(node: &Node<T>, height: usize, offset: usize, on_spine: bool) -> usize {
    let count = match node {
        Node::Leaf { data } => {
            assert_eq!(height, 0, "leaves must all be at height zero");
            assert!(!data.is_empty(), "empty leaf");
            assert_eq!(offset, 0, "an offset must be held by a dense interior node");
            data.len()
        }
        Node::Branch { sizes, children } => {
            assert!(height > 0, "interior node at height zero");
            assert!(!children.is_empty(), "empty interior node");
            match sizes {
                Some(sizes) => {
                    assert!(on_spine || offset == 0);
                    assert_eq!(sizes.len(), children.len());
                    let mut total = 0;
                    for (i, child) in children.iter().enumerate() {
                        let child_offset = if i == 0 { offset } else { 0 };
                        total += check_node(child, height - 1, child_offset, on_spine && i == 0);
                        assert_eq!(sizes[i], total, "stale size table");
                    }
                    total
                }
                None => {
                    let shift = BITS * height;
                    let child_capacity = 1 << shift;
                    assert!(
                        (offset >> shift) + children.len() <= BRANCHING,
                        "offset overflows a dense node"
                    );
                    let mut total = 0;
                    for (i, child) in children.iter().enumerate() {
                        assert!(!child.is_relaxed(), "relaxed node below a dense node");
                        let child_offset = if i == 0 {
                            offset & (child_capacity - 1)
                        } else {
                            0
                        };
                        let count = check_node(child, height - 1, child_offset, false);
                        if i + 1 < children.len() {
                            assert_eq!(
                                count + child_offset,
                                child_capacity,
                                "non-full child before the end of a dense node"
                            );
                        }
                        total += count;
                    }
                    total
                }
            }
        }
    };
    assert_eq!(node.len(height, offset), count, "computed length is wrong");
    count
}

impl<T: Clone> Sequence<T> {
    /// A sequence holding a single element.
    pub fn singleton(value: T) -> Self {
        let mut seq = Sequence::new();
        seq.push_back(value);
        seq
    }

    pub fn pair(first: T, second: T) -> Self {
        let mut seq = Sequence::singleton(first);
        seq.push_back(second);
        seq
    }

    pub fn from_slice(values: &[T]) -> Self {
        values.iter().cloned().collect()
    }

    /// A sequence holding `count` copies of `value`.
    pub fn repeat(value: T, count: usize) -> Self {
        std::iter::repeat(value).take(count).collect()
    }

    /// A sequence holding `f(0), f(1), ..., f(count - 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let squares = Sequence::times(5, |i| i * i);
    /// assert_eq!(squares, Sequence::from(vec![0, 1, 4, 9, 16]));
    /// ```
    pub fn times(count: usize, f: impl FnMut(usize) -> T) -> Self {
        (0..count).map(f).collect()
    }

    /// A sequence holding the values in `start..end`.
    pub fn range(start: T, end: T) -> Self
    where
        std::ops::Range<T>: Iterator<Item = T>,
    {
        (start..end).collect()
    }

    /// Replaces the element at `index` in place. Out of range indices leave
    /// the sequence unchanged.
    pub fn set(&mut self, index: usize, value: T) {
        if index >= self.length {
            return;
        }
        let prefix_len = self.prefix_len();
        if index < prefix_len {
            Rc::make_mut(&mut self.prefix)[prefix_len - 1 - index] = value;
            return;
        }
        let index = index - prefix_len;
        let tree_len = self.tree_len();
        if index >= tree_len {
            Rc::make_mut(&mut self.suffix)[index - tree_len] = value;
            return;
        }
        let depth = self.depth();
        let offset = self.offset;
        if let Some(root) = self.root.as_mut() {
            Rc::make_mut(root).set(depth, index, offset, value);
        }
    }

    /// Returns a copy of this sequence with the element at `index` replaced.
    /// Out of range indices return an unchanged copy.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let seq: Sequence<u32> = (0..100).collect();
    /// let updated = seq.update(50, 0);
    /// assert_eq!(updated.get(50), Some(&0));
    /// assert_eq!(seq.get(50), Some(&50));
    /// assert_eq!(seq.update(100, 0), seq);
    /// ```
    pub fn update(&self, index: usize, value: T) -> Self {
        let mut seq = self.clone();
        seq.set(index, value);
        seq
    }

    /// Like [`Sequence::update`], but reports an error for indices that are out of range.
    pub fn try_update(&self, index: usize, value: T) -> Result<Self> {
        if index >= self.length {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.length,
            });
        }
        Ok(self.update(index, value))
    }

    /// Returns a copy of this sequence with `f` applied to the element at `index`.
    pub fn adjust(&self, index: usize, f: impl FnOnce(&T) -> T) -> Self {
        match self.get(index) {
            Some(value) => self.update(index, f(value)),
            None => self.clone(),
        }
    }

    /// Returns a copy of this sequence with `value` inserted before `index`.
    /// Indices past the end append.
    pub fn insert(&self, index: usize, value: T) -> Self {
        self.take(index).append(value).concat(&self.skip(index))
    }

    /// Returns a copy of this sequence with all of `values` inserted before `index`.
    pub fn insert_all(&self, index: usize, values: &Self) -> Self {
        self.take(index).concat(values).concat(&self.skip(index))
    }

    /// Returns a copy of this sequence without the `count` elements starting at `from`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let seq = Sequence::from(vec![0, 1, 2, 3, 4]);
    /// assert_eq!(seq.remove(1, 3), Sequence::from(vec![0, 4]));
    /// ```
    pub fn remove(&self, from: usize, count: usize) -> Self {
        self.take(from)
            .concat(&self.skip(from.saturating_add(count)))
    }

    /// Returns the elements in reverse order.
    pub fn reverse(&self) -> Self {
        self.fold_left(Sequence::new(), |mut acc, value| {
            acc.push_front(value.clone());
            acc
        })
    }
}

impl<T> Index<usize> for Sequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index).expect("index out of range")
    }
}

impl<T: PartialEq> PartialEq for Sequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equals_with(other, |x, y| x == y)
    }
}

impl<T: Eq> Eq for Sequence<T> {}

impl<T: Hash> Hash for Sequence<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        for value in self.iter() {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Clone> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut builder = Builder::new();
        builder.extend(iter);
        builder.build()
    }
}

impl<T: Clone> Extend<T> for Sequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T: Clone> From<Vec<T>> for Sequence<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone, const N: usize> From<[T; N]> for Sequence<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Clone> From<&[T]> for Sequence<T> {
    fn from(values: &[T]) -> Self {
        Sequence::from_slice(values)
    }
}

impl<T: Serialize> Serialize for Sequence<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for elt in self.iter() {
            seq.serialize_element(elt)?;
        }
        seq.end()
    }
}

impl<'de, T: Deserialize<'de> + Clone> Deserialize<'de> for Sequence<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let vec: Vec<T> = Vec::deserialize(deserializer)?;
        Ok(vec.into_iter().collect())
    }
}
