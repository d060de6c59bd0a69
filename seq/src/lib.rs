//! Persistent sequences backed by relaxed radix balanced trees (RRB-trees).
//!
//! A [`Sequence`] is an immutable, ordered collection with cheap clones. All
//! modifications produce new sequences that share most of their structure
//! with the original, which stays valid and unchanged. Access and update by
//! index take logarithmic time, pushing at either end is amortized constant
//! time, and [`Sequence::concat`] and [`Sequence::slice`] are logarithmic.
//!
//! The elements at the two ends of a sequence are kept out of the tree in
//! small buffers (the "prefix" and the "suffix"), which is what makes pushes
//! at the ends cheap. The tree in between is a radix tree with a branching
//! factor of 32 whose nodes are either *dense* (every child but the last is
//! full, so positions are computed with bit arithmetic) or *relaxed* (they
//! carry a table of cumulative child sizes). Relaxed nodes appear after
//! concatenation; dense nodes appear everywhere else.
//!
//! For bulk construction, [`Builder`] fills a dense tree without ever copying
//! a node.

mod concat;
mod descriptor;
mod fold;
mod grow;
mod node;
mod slice;

pub mod builder;
pub mod error;
pub mod iter;
pub mod sequence;

/// The number of children of a full interior node, and the number of
/// elements in a full leaf or affix.
pub const BRANCHING: usize = 32;

/// `log2(BRANCHING)`: the number of index bits consumed at each tree level.
pub const BITS: usize = 5;

pub(crate) const MASK: usize = BRANCHING - 1;

/// How many more nodes than strictly necessary a rebalanced level may keep
/// after concatenation. Larger values make concatenation cheaper and lookups
/// in relaxed nodes a bit slower.
pub(crate) const EXTRA_NODES: usize = 2;

pub use builder::Builder;
pub use error::{Error, Result};
pub use iter::{IntoIter, Iter};
pub use sequence::{Sequence, Shape};
