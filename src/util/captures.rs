/*!
Provides types for dealing with capturing groups.
*/

use alloc::boxed::Box;

use crate::util::search::Span;

/// The resolved offsets of the capturing groups of a successful match.
///
/// A value of this type is produced by
/// [`execute`](crate::nfa::pure::backtrack::Backtracker::execute) when a
/// match was found. Group `0` always corresponds to the overall match, with
/// explicit capturing groups in a pattern starting at group `1`.
///
/// Internally, the offsets are stored as the engine's flat slot array: two
/// `i32` slots per group (start, then end), with `-1` marking a slot that
/// was never written during the winning run. [`Captures::get_group`] decodes
/// a slot pair into a [`Span`].
///
/// Offsets are in code units of the haystack, as decided by the `compact`
/// hint the search ran with.
#[derive(Clone, Eq, PartialEq)]
pub struct Captures {
    slots: Box<[i32]>,
}

impl Captures {
    /// Wrap a raw slot array produced by a finished search.
    pub(crate) fn new(slots: Box<[i32]>) -> Captures {
        Captures { slots }
    }

    /// Returns the span of the given capturing group, or `None` when the
    /// group did not participate in the match.
    ///
    /// An invalid group index also returns `None`.
    #[inline]
    pub fn get_group(&self, index: usize) -> Option<Span> {
        let start = *self.slots.get(index * 2)?;
        let end = *self.slots.get(index * 2 + 1)?;
        if start < 0 || end < 0 {
            return None;
        }
        Some(Span { start: start as usize, end: end as usize })
    }

    /// Returns the total number of capturing groups, counting group `0`.
    #[inline]
    pub fn group_len(&self) -> usize {
        self.slots.len() / 2
    }

    /// Returns an iterator over the spans of all capturing groups, in group
    /// order. Groups that did not participate in the match yield `None`.
    pub fn iter(&self) -> CapturesIter<'_> {
        CapturesIter { caps: self, group: 0 }
    }

    /// Returns the underlying slot array.
    ///
    /// The slot at `2 * i` is the start of group `i` and the slot at
    /// `2 * i + 1` is its end. A slot is `-1` when it was never written.
    #[inline]
    pub fn slots(&self) -> &[i32] {
        &self.slots
    }
}

impl core::fmt::Debug for Captures {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut dbg = f.debug_tuple("Captures");
        for group in self.iter() {
            dbg.field(&group);
        }
        dbg.finish()
    }
}

/// An iterator over the group spans of a `Captures` value.
///
/// This is created by [`Captures::iter`].
#[derive(Clone, Debug)]
pub struct CapturesIter<'a> {
    caps: &'a Captures,
    group: usize,
}

impl<'a> Iterator for CapturesIter<'a> {
    type Item = Option<Span>;

    fn next(&mut self) -> Option<Option<Span>> {
        if self.group >= self.caps.group_len() {
            return None;
        }
        let span = self.caps.get_group(self.group);
        self.group += 1;
        Some(span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_group_decodes_slot_pairs() {
        let caps = Captures::new(Box::from([0, 7, 2, 5, -1, -1]));
        assert_eq!(3, caps.group_len());
        assert_eq!(Some(Span::from(0..7)), caps.get_group(0));
        assert_eq!(Some(Span::from(2..5)), caps.get_group(1));
        assert_eq!(None, caps.get_group(2));
        assert_eq!(None, caps.get_group(3));
    }

    #[test]
    fn iter_yields_every_group() {
        let caps = Captures::new(Box::from([1, 3, -1, -1]));
        let groups: alloc::vec::Vec<Option<Span>> = caps.iter().collect();
        assert_eq!(
            groups,
            alloc::vec![Some(Span::from(1..3)), None],
        );
    }
}
