//! The packed header of a sequence.
//!
//! The affix lengths and the tree depth are read on every access, so we keep
//! them together in a single word: the suffix length in the low 6 bits, the
//! prefix length in the next 6 bits and the depth of the tree above that.

use std::fmt;

use crate::BRANCHING;

const AFFIX_BITS: u32 = 6;
const AFFIX_MASK: u32 = (1 << AFFIX_BITS) - 1;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct Descriptor(u32);

impl Descriptor {
    pub(crate) const EMPTY: Descriptor = Descriptor(0);

    pub(crate) fn new(depth: usize, prefix_len: usize, suffix_len: usize) -> Self {
        Descriptor::EMPTY
            .with_depth(depth)
            .with_prefix_len(prefix_len)
            .with_suffix_len(suffix_len)
    }

    pub(crate) fn suffix_len(self) -> usize {
        (self.0 & AFFIX_MASK) as usize
    }

    pub(crate) fn prefix_len(self) -> usize {
        ((self.0 >> AFFIX_BITS) & AFFIX_MASK) as usize
    }

    pub(crate) fn depth(self) -> usize {
        (self.0 >> (2 * AFFIX_BITS)) as usize
    }

    pub(crate) fn with_suffix_len(self, len: usize) -> Self {
        // The field could hold up to 63, but an affix never holds more than a leaf.
        assert!(len <= BRANCHING);
        Descriptor((self.0 & !AFFIX_MASK) | len as u32)
    }

    pub(crate) fn with_prefix_len(self, len: usize) -> Self {
        assert!(len <= BRANCHING);
        let cleared = self.0 & !(AFFIX_MASK << AFFIX_BITS);
        Descriptor(cleared | ((len as u32) << AFFIX_BITS))
    }

    pub(crate) fn with_depth(self, depth: usize) -> Self {
        let affixes = self.0 & ((1 << (2 * AFFIX_BITS)) - 1);
        Descriptor(affixes | ((depth as u32) << (2 * AFFIX_BITS)))
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("depth", &self.depth())
            .field("prefix_len", &self.prefix_len())
            .field("suffix_len", &self.suffix_len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_independent() {
        let d = Descriptor::new(3, 32, 7);
        assert_eq!(d.depth(), 3);
        assert_eq!(d.prefix_len(), 32);
        assert_eq!(d.suffix_len(), 7);

        let d = d.with_prefix_len(1);
        assert_eq!((d.depth(), d.prefix_len(), d.suffix_len()), (3, 1, 7));

        let d = d.with_suffix_len(32).with_depth(0);
        assert_eq!((d.depth(), d.prefix_len(), d.suffix_len()), (0, 1, 32));
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(Descriptor::EMPTY, Descriptor::new(0, 0, 0));
        assert_eq!(Descriptor::default(), Descriptor::EMPTY);
    }

    #[test]
    #[should_panic]
    fn affix_length_is_capped() {
        Descriptor::EMPTY.with_suffix_len(BRANCHING + 1);
    }
}
