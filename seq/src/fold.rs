//! Folds and the consumers built on top of them.
//!
//! Folding walks the nodes recursively instead of going through [`Iter`], so
//! it doesn't need to keep a stack of child iterators around. The early-exit
//! variants stop as soon as the callback returns [`ControlFlow::Break`].
//!
//! [`Iter`]: crate::Iter

use std::{convert::Infallible, ops::ControlFlow};

use crate::{node::Node, sequence::Sequence};

fn fold_slice<'a, T, B, R, F>(
    items: impl Iterator<Item = &'a T>,
    mut acc: B,
    f: &mut F,
) -> ControlFlow<R, B>
where
    T: 'a,
    F: FnMut(B, &'a T) -> ControlFlow<R, B>,
{
    for item in items {
        match f(acc, item) {
            ControlFlow::Continue(next) => acc = next,
            ControlFlow::Break(ret) => return ControlFlow::Break(ret),
        }
    }
    ControlFlow::Continue(acc)
}

fn fold_node_left<'a, T, B, R, F>(node: &'a Node<T>, mut acc: B, f: &mut F) -> ControlFlow<R, B>
where
    F: FnMut(B, &'a T) -> ControlFlow<R, B>,
{
    match node {
        Node::Leaf { data } => fold_slice(data.iter(), acc, f),
        Node::Branch { children, .. } => {
            for child in children.iter() {
                match fold_node_left(child, acc, f) {
                    ControlFlow::Continue(next) => acc = next,
                    ControlFlow::Break(ret) => return ControlFlow::Break(ret),
                }
            }
            ControlFlow::Continue(acc)
        }
    }
}

fn fold_node_right<'a, T, B, R, F>(node: &'a Node<T>, mut acc: B, f: &mut F) -> ControlFlow<R, B>
where
    F: FnMut(B, &'a T) -> ControlFlow<R, B>,
{
    match node {
        Node::Leaf { data } => fold_slice(data.iter().rev(), acc, f),
        Node::Branch { children, .. } => {
            for child in children.iter().rev() {
                match fold_node_right(child, acc, f) {
                    ControlFlow::Continue(next) => acc = next,
                    ControlFlow::Break(ret) => return ControlFlow::Break(ret),
                }
            }
            ControlFlow::Continue(acc)
        }
    }
}

fn never<B>(flow: ControlFlow<Infallible, B>) -> B {
    match flow {
        ControlFlow::Continue(acc) => acc,
        ControlFlow::Break(impossible) => match impossible {},
    }
}

impl<T> Sequence<T> {
    /// Folds the elements from first to last, stopping early if `f` breaks.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::ControlFlow;
    /// use rrb_seq::Sequence;
    ///
    /// let seq: Sequence<u32> = (1..100).collect();
    /// let sum_below_10 = seq.try_fold_left(0, |acc, x| {
    ///     if *x < 10 {
    ///         ControlFlow::Continue(acc + x)
    ///     } else {
    ///         ControlFlow::Break(acc)
    ///     }
    /// });
    /// assert_eq!(sum_below_10, ControlFlow::Break(45));
    /// ```
    pub fn try_fold_left<'a, B, R>(
        &'a self,
        init: B,
        mut f: impl FnMut(B, &'a T) -> ControlFlow<R, B>,
    ) -> ControlFlow<R, B> {
        let mut acc = match fold_slice(self.prefix.iter().rev(), init, &mut f) {
            ControlFlow::Continue(acc) => acc,
            brk => return brk,
        };
        if let Some(root) = &self.root {
            acc = match fold_node_left(root, acc, &mut f) {
                ControlFlow::Continue(acc) => acc,
                brk => return brk,
            };
        }
        fold_slice(self.suffix.iter(), acc, &mut f)
    }

    /// Folds the elements from last to first, stopping early if `f` breaks.
    pub fn try_fold_right<'a, B, R>(
        &'a self,
        init: B,
        mut f: impl FnMut(B, &'a T) -> ControlFlow<R, B>,
    ) -> ControlFlow<R, B> {
        let mut acc = match fold_slice(self.suffix.iter().rev(), init, &mut f) {
            ControlFlow::Continue(acc) => acc,
            brk => return brk,
        };
        if let Some(root) = &self.root {
            acc = match fold_node_right(root, acc, &mut f) {
                ControlFlow::Continue(acc) => acc,
                brk => return brk,
            };
        }
        fold_slice(self.prefix.iter(), acc, &mut f)
    }

    /// Folds the elements from first to last.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let seq = Sequence::from(vec!["a", "b", "c"]);
    /// assert_eq!(seq.fold_left(String::new(), |acc, s| acc + *s), "abc");
    /// assert_eq!(seq.fold_right(String::new(), |acc, s| acc + *s), "cba");
    /// ```
    pub fn fold_left<'a, B>(&'a self, init: B, mut f: impl FnMut(B, &'a T) -> B) -> B {
        never(self.try_fold_left(init, |acc, x| ControlFlow::Continue(f(acc, x))))
    }

    /// Folds the elements from last to first.
    pub fn fold_right<'a, B>(&'a self, init: B, mut f: impl FnMut(B, &'a T) -> B) -> B {
        never(self.try_fold_right(init, |acc, x| ControlFlow::Continue(f(acc, x))))
    }

    /// The first element satisfying `pred`.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        match self.try_fold_left((), |(), x| {
            if pred(x) {
                ControlFlow::Break(x)
            } else {
                ControlFlow::Continue(())
            }
        }) {
            ControlFlow::Break(x) => Some(x),
            ControlFlow::Continue(()) => None,
        }
    }

    /// The last element satisfying `pred`.
    pub fn find_last(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        match self.try_fold_right((), |(), x| {
            if pred(x) {
                ControlFlow::Break(x)
            } else {
                ControlFlow::Continue(())
            }
        }) {
            ControlFlow::Break(x) => Some(x),
            ControlFlow::Continue(()) => None,
        }
    }

    /// The index of the first element satisfying `pred`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rrb_seq::Sequence;
    ///
    /// let seq: Sequence<u32> = (0..100).map(|x| x * 3).collect();
    /// assert_eq!(seq.position(|x| *x > 100), Some(34));
    /// assert_eq!(seq.position(|x| *x == 1), None);
    /// ```
    pub fn position(&self, mut pred: impl FnMut(&T) -> bool) -> Option<usize> {
        match self.try_fold_left(0, |index, x| {
            if pred(x) {
                ControlFlow::Break(index)
            } else {
                ControlFlow::Continue(index + 1)
            }
        }) {
            ControlFlow::Break(index) => Some(index),
            ControlFlow::Continue(_) => None,
        }
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.some(|x| x == value)
    }

    /// Whether every element satisfies `pred`. True for the empty sequence.
    pub fn every(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.try_fold_left((), |(), x| {
            if pred(x) {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        })
        .is_continue()
    }

    /// Whether some element satisfies `pred`. False for the empty sequence.
    pub fn some(&self, mut pred: impl FnMut(&T) -> bool) -> bool {
        self.try_fold_left((), |(), x| {
            if pred(x) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed(n: usize) -> Sequence<usize> {
        // Pushes on both sides and a concatenation, so that every kind of node shows up.
        let mut left = Sequence::new();
        for i in (0..n / 2).rev() {
            left.push_front(i);
        }
        let right: Sequence<usize> = (n / 2..n).collect();
        left.concat(&right)
    }

    #[test]
    fn folds_visit_everything_in_order() {
        let seq = mixed(3000);
        let forward = seq.fold_left(Vec::new(), |mut acc, x| {
            acc.push(*x);
            acc
        });
        assert_eq!(forward, (0..3000).collect::<Vec<_>>());

        let backward = seq.fold_right(Vec::new(), |mut acc, x| {
            acc.push(*x);
            acc
        });
        assert_eq!(backward, (0..3000).rev().collect::<Vec<_>>());
    }

    #[test]
    fn early_exit() {
        let seq = mixed(3000);
        let mut visited = 0;
        let flow = seq.try_fold_left(0, |acc, x| {
            visited += 1;
            if *x == 1234 {
                ControlFlow::Break(acc)
            } else {
                ControlFlow::Continue(acc + 1)
            }
        });
        assert_eq!(flow, ControlFlow::Break(1234));
        assert_eq!(visited, 1235);

        let last_even_below = seq.try_fold_right((), |(), x| {
            if *x < 2000 && x % 2 == 0 {
                ControlFlow::Break(*x)
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(last_even_below, ControlFlow::Break(1998));
    }

    #[test]
    fn consumers() {
        let seq = mixed(500);
        assert_eq!(seq.find(|x| x % 7 == 6), Some(&6));
        assert_eq!(seq.find_last(|x| x % 7 == 6), Some(&496));
        assert_eq!(seq.find(|x| *x > 1000), None);
        assert_eq!(seq.position(|x| *x == 321), Some(321));
        assert!(seq.contains(&499));
        assert!(!seq.contains(&500));
        assert!(seq.every(|x| *x < 500));
        assert!(!seq.every(|x| *x < 499));
        assert!(seq.some(|x| *x == 0));
        assert!(!seq.some(|x| *x > 499));

        let empty: Sequence<usize> = Sequence::new();
        assert!(empty.every(|_| false));
        assert!(!empty.some(|_| true));
        assert_eq!(empty.fold_left(7, |acc, _| acc + 1), 7);
    }
}
