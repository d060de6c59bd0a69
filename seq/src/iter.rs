//! Iteration over the elements of a sequence, from first to last.

use std::{iter::Rev, rc::Rc};

use crate::{node::Node, sequence::Sequence, BRANCHING};

type ChunkIter<T> = imbl_sized_chunks::sized_chunk::Iter<T, BRANCHING>;

/// Opens up a node on the way down the tree, either by reference or by value.
trait Unpack: Sized {
    type Children: Iterator<Item = Self>;
    type Leaf: Iterator;

    fn unpack(self) -> Result<Self::Children, Self::Leaf>;
}

impl<'a, T> Unpack for &'a Rc<Node<T>> {
    type Children = std::slice::Iter<'a, Rc<Node<T>>>;
    type Leaf = std::slice::Iter<'a, T>;

    fn unpack(self) -> Result<Self::Children, Self::Leaf> {
        match self.as_ref() {
            Node::Branch { children, .. } => Ok(children.iter()),
            Node::Leaf { data } => Err(data.iter()),
        }
    }
}

// Nodes that are not shared with other sequences are taken apart instead of
// cloned.
impl<T: Clone> Unpack for Rc<Node<T>> {
    type Children = ChunkIter<Rc<Node<T>>>;
    type Leaf = ChunkIter<T>;

    fn unpack(self) -> Result<Self::Children, Self::Leaf> {
        match Rc::unwrap_or_clone(self) {
            Node::Branch { children, .. } => Ok(children.into_iter()),
            Node::Leaf { data } => Err(data.into_iter()),
        }
    }
}

/// Walks the elements of a tree from left to right. The stack holds the
/// unvisited children of every interior node on the path to the current leaf.
struct Walk<N: Unpack> {
    root: Option<N>,
    stack: Vec<N::Children>,
    leaf: Option<N::Leaf>,
}

impl<N: Unpack> Walk<N> {
    fn new(root: Option<N>, depth: usize) -> Self {
        Walk {
            root,
            stack: Vec::with_capacity(depth),
            leaf: None,
        }
    }

    fn next_leaf(&mut self) -> Option<N::Leaf> {
        let mut node = match self.root.take() {
            Some(root) => root,
            None => loop {
                let iter = self.stack.last_mut()?;
                match iter.next() {
                    Some(next) => break next,
                    None => {
                        self.stack.pop();
                    }
                }
            },
        };

        loop {
            match node.unpack() {
                Ok(mut children) => {
                    node = children.next().expect("empty interior node");
                    self.stack.push(children);
                }
                Err(leaf) => return Some(leaf),
            }
        }
    }
}

impl<N: Unpack> Iterator for Walk<N> {
    type Item = <N::Leaf as Iterator>::Item;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.leaf.as_mut().and_then(Iterator::next) {
                return Some(item);
            }
            self.leaf = Some(self.next_leaf()?);
        }
    }
}

impl<N> Clone for Walk<N>
where
    N: Unpack + Clone,
    N::Children: Clone,
    N::Leaf: Clone,
{
    fn clone(&self) -> Self {
        Walk {
            root: self.root.clone(),
            stack: self.stack.clone(),
            leaf: self.leaf.clone(),
        }
    }
}

/// A borrowing iterator over a sequence.
///
/// It walks the prefix backwards (since it is stored back to front), then
/// the leaves of the tree from left to right, then the suffix.
pub struct Iter<'a, T> {
    prefix: Rev<std::slice::Iter<'a, T>>,
    tree: Walk<&'a Rc<Node<T>>>,
    suffix: std::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let ret = self
            .prefix
            .next()
            .or_else(|| self.tree.next())
            .or_else(|| self.suffix.next());
        if ret.is_some() {
            self.remaining -= 1;
        }
        ret
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> std::iter::FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            prefix: self.prefix.clone(),
            tree: self.tree.clone(),
            suffix: self.suffix.clone(),
            remaining: self.remaining,
        }
    }
}

/// An owning iterator over a sequence.
pub struct IntoIter<T: Clone> {
    prefix: ChunkIter<T>,
    tree: Walk<Rc<Node<T>>>,
    suffix: ChunkIter<T>,
    remaining: usize,
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let ret = self
            .prefix
            .next()
            .or_else(|| self.tree.next())
            .or_else(|| self.suffix.next());
        if ret.is_some() {
            self.remaining -= 1;
        }
        ret
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T: Clone> ExactSizeIterator for IntoIter<T> {}

impl<T> Sequence<T> {
    /// Iterates over references to the elements, from first to last.
    pub fn iter(&self) -> Iter<'_, T> {
        self.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Sequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            prefix: self.prefix.iter().rev(),
            tree: Walk::new(self.root.as_ref(), self.depth()),
            suffix: self.suffix.iter(),
            remaining: self.length,
        }
    }
}

impl<T: Clone> IntoIterator for Sequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let mut prefix = Rc::unwrap_or_clone(self.prefix);
        prefix.reverse();

        IntoIter {
            prefix: prefix.into_iter(),
            tree: Walk::new(self.root, self.descriptor.depth()),
            suffix: Rc::unwrap_or_clone(self.suffix).into_iter(),
            remaining: self.length,
        }
    }
}
