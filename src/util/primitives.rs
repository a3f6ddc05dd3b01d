/*!
Lower level primitive types that are useful in a variety of circumstances.
*/

use core::convert::TryFrom;

/// A type that represents a "small" index.
///
/// The main idea of this type is to provide something that can index memory,
/// but uses less memory than `usize` on 64-bit systems. Specifically, its
/// representation is always a `u32` and has `repr(transparent)` enabled. (So
/// it is safe to transmute between a `u32` and a `SmallIndex`.)
///
/// A small index is typically useful in cases where there is no practical way
/// that the index will overflow a 32-bit integer. A good example of this is
/// an NFA state. If you have an NFA with more than 2^30 states, then the NFA
/// is unlikely to fit in memory anyway.
///
/// A small index is also guaranteed to fit into an `i32`, which means that
/// values derived from it can live in the same signed integer domain that
/// the matcher uses for its frames, where `-1` serves as the "unset"
/// sentinel.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord,
)]
#[repr(transparent)]
pub struct SmallIndex(u32);

impl SmallIndex {
    /// The maximum index value.
    pub const MAX: SmallIndex =
        SmallIndex::new_unchecked(core::i32::MAX as usize - 1);

    /// The total number of values that can be represented as a small index.
    pub const LIMIT: usize = SmallIndex::MAX.as_usize() + 1;

    /// The zero index value.
    pub const ZERO: SmallIndex = SmallIndex::new_unchecked(0);

    /// The number of bytes that a single small index uses in memory.
    pub const SIZE: usize = core::mem::size_of::<SmallIndex>();

    /// Create a new small index.
    ///
    /// If the given index exceeds [`SmallIndex::MAX`], then this returns
    /// an error.
    #[inline]
    pub fn new(index: usize) -> Result<SmallIndex, SmallIndexError> {
        SmallIndex::try_from(index)
    }

    /// Create a new small index without checking whether the given value
    /// exceeds [`SmallIndex::MAX`].
    ///
    /// Using this routine with an invalid index value will result in
    /// unspecified behavior, but *not* undefined behavior. In particular, an
    /// invalid index value is likely to cause panics or possibly even silent
    /// logical errors.
    ///
    /// Callers must never rely on a `SmallIndex` to be within a certain range
    /// for memory safety.
    #[inline]
    pub const fn new_unchecked(index: usize) -> SmallIndex {
        SmallIndex(index as u32)
    }

    /// Like [`SmallIndex::new`], but panics if the given index is not valid.
    #[inline]
    pub fn must(index: usize) -> SmallIndex {
        SmallIndex::new(index).expect("invalid small index")
    }

    /// Return this small index as a `usize`. This is guaranteed to never
    /// overflow `usize`.
    #[inline]
    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }

    /// Return the internal `u32` of this small index. This is guaranteed to
    /// never overflow `u32`.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Return the internal `u32` of this small index represented as an `i32`.
    /// This is guaranteed to never overflow an `i32`.
    #[inline]
    pub const fn as_i32(&self) -> i32 {
        self.0 as i32
    }

    /// Returns one more than this small index as a usize.
    ///
    /// Since a small index has constraints on its maximum value, adding `1` to
    /// it will always fit in a `usize`, `u32` and a `i32`.
    #[inline]
    pub fn one_more(&self) -> usize {
        self.0 as usize + 1
    }

    /// Returns an iterator over all small indices from 0 up to and not
    /// including the given length.
    ///
    /// If the given length exceeds [`SmallIndex::LIMIT`], then this panics.
    pub(crate) fn iter(len: usize) -> SmallIndexIter {
        SmallIndexIter::new(len)
    }
}

impl<T> core::ops::Index<SmallIndex> for [T] {
    type Output = T;

    #[inline]
    fn index(&self, index: SmallIndex) -> &T {
        &self[index.as_usize()]
    }
}

impl<T> core::ops::IndexMut<SmallIndex> for [T] {
    #[inline]
    fn index_mut(&mut self, index: SmallIndex) -> &mut T {
        &mut self[index.as_usize()]
    }
}

impl From<u8> for SmallIndex {
    fn from(index: u8) -> SmallIndex {
        SmallIndex::new_unchecked(index as usize)
    }
}

impl TryFrom<u32> for SmallIndex {
    type Error = SmallIndexError;

    fn try_from(index: u32) -> Result<SmallIndex, SmallIndexError> {
        if index > SmallIndex::MAX.as_u32() {
            return Err(SmallIndexError { attempted: index as u64 });
        }
        Ok(SmallIndex::new_unchecked(index as usize))
    }
}

impl TryFrom<usize> for SmallIndex {
    type Error = SmallIndexError;

    fn try_from(index: usize) -> Result<SmallIndex, SmallIndexError> {
        if index > SmallIndex::MAX.as_usize() {
            return Err(SmallIndexError { attempted: index as u64 });
        }
        Ok(SmallIndex::new_unchecked(index))
    }
}

/// This error occurs when a small index could not be constructed.
///
/// This occurs when given an integer exceeding the maximum small index value.
///
/// When the `std` feature is enabled, this implements the `Error` trait.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SmallIndexError {
    attempted: u64,
}

impl SmallIndexError {
    /// Returns the value that could not be converted to a small index.
    pub fn attempted(&self) -> u64 {
        self.attempted
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SmallIndexError {}

impl core::fmt::Display for SmallIndexError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "failed to create small index from {:?}, which exceeds {:?}",
            self.attempted(),
            SmallIndex::MAX,
        )
    }
}

#[derive(Clone, Debug)]
pub(crate) struct SmallIndexIter {
    rng: core::ops::Range<usize>,
}

impl SmallIndexIter {
    fn new(len: usize) -> SmallIndexIter {
        assert!(
            len <= SmallIndex::LIMIT,
            "cannot create iterator with small indices when number of \
             elements exceed {:?}",
            SmallIndex::LIMIT,
        );
        SmallIndexIter { rng: 0..len }
    }
}

impl Iterator for SmallIndexIter {
    type Item = SmallIndex;

    fn next(&mut self) -> Option<SmallIndex> {
        if self.rng.start >= self.rng.end {
            return None;
        }
        let next_id = self.rng.start + 1;
        let id = core::mem::replace(&mut self.rng.start, next_id);
        // new_unchecked is OK since we asserted that the number of
        // elements in this iterator will fit in an ID at construction.
        Some(SmallIndex::new_unchecked(id))
    }
}

/// The identifier of an NFA state.
///
/// An identifier is guaranteed to be no bigger than `i32::MAX - 1`, which
/// means a state identifier always round-trips through the `i32` program
/// counter slot of a saved frame without loss.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord,
)]
#[repr(transparent)]
pub struct StateID(SmallIndex);

impl StateID {
    /// The maximum value.
    pub const MAX: StateID = StateID(SmallIndex::MAX);

    /// The total number of values that can be represented.
    pub const LIMIT: usize = SmallIndex::LIMIT;

    /// The zero value.
    pub const ZERO: StateID = StateID(SmallIndex::ZERO);

    /// Create a new state identifier.
    ///
    /// If the given index exceeds [`StateID::MAX`], then this returns an
    /// error.
    #[inline]
    pub fn new(value: usize) -> Result<StateID, StateIDError> {
        SmallIndex::new(value).map(StateID).map_err(StateIDError)
    }

    /// Create a new state identifier without checking whether the given
    /// argument exceeds the maximum.
    ///
    /// Using this routine with an invalid value will result in unspecified
    /// behavior, but *not* undefined behavior. In particular, an invalid ID
    /// value is likely to cause panics or possibly even silent logical
    /// errors.
    ///
    /// Callers must never rely on this type to be within a certain range for
    /// memory safety.
    #[inline]
    pub const fn new_unchecked(value: usize) -> StateID {
        StateID(SmallIndex::new_unchecked(value))
    }

    /// Like [`StateID::new`], but panics if the given value is not valid.
    #[inline]
    pub fn must(value: usize) -> StateID {
        StateID::new(value).expect("invalid StateID value")
    }

    /// Return the internal value as a `usize`. This is guaranteed to never
    /// overflow `usize`.
    #[inline]
    pub const fn as_usize(&self) -> usize {
        self.0.as_usize()
    }

    /// Return the internal value as a `i32`. This is guaranteed to never
    /// overflow an `i32`.
    #[inline]
    pub const fn as_i32(&self) -> i32 {
        self.0.as_i32()
    }

    /// Returns an iterator over all state identifiers from 0 up to and not
    /// including the given length.
    ///
    /// If the given length exceeds [`StateID::LIMIT`], then this panics.
    pub(crate) fn iter(len: usize) -> StateIDIter {
        StateIDIter(SmallIndex::iter(len))
    }
}

impl<T> core::ops::Index<StateID> for [T] {
    type Output = T;

    #[inline]
    fn index(&self, index: StateID) -> &T {
        &self[index.as_usize()]
    }
}

impl<T> core::ops::IndexMut<StateID> for [T] {
    #[inline]
    fn index_mut(&mut self, index: StateID) -> &mut T {
        &mut self[index.as_usize()]
    }
}

impl<T> core::ops::Index<StateID> for alloc::vec::Vec<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: StateID) -> &T {
        &self[index.as_usize()]
    }
}

impl<T> core::ops::IndexMut<StateID> for alloc::vec::Vec<T> {
    #[inline]
    fn index_mut(&mut self, index: StateID) -> &mut T {
        &mut self[index.as_usize()]
    }
}

/// This error occurs when a state ID could not be constructed.
///
/// This occurs when given an integer exceeding the maximum state ID value.
///
/// When the `std` feature is enabled, this implements the `Error` trait.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateIDError(SmallIndexError);

impl StateIDError {
    /// Returns the value that could not be converted to an ID.
    pub fn attempted(&self) -> u64 {
        self.0.attempted()
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StateIDError {}

impl core::fmt::Display for StateIDError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "failed to create StateID from {:?}, which exceeds {:?}",
            self.attempted(),
            StateID::MAX,
        )
    }
}

#[derive(Clone, Debug)]
pub(crate) struct StateIDIter(SmallIndexIter);

impl Iterator for StateIDIter {
    type Item = StateID;

    fn next(&mut self) -> Option<StateID> {
        self.0.next().map(StateID)
    }
}

/// An iterator adapter that is like std::iter::Enumerate, but attaches state
/// identifiers instead. It requires `ExactSizeIterator`. At construction, it
/// ensures that the index of each element in the iterator is representable
/// by a state identifier.
#[derive(Clone, Debug)]
pub(crate) struct WithStateIDIter<I> {
    it: I,
    ids: StateIDIter,
}

impl<I: Iterator + ExactSizeIterator> Iterator for WithStateIDIter<I> {
    type Item = (StateID, I::Item);

    fn next(&mut self) -> Option<(StateID, I::Item)> {
        let item = self.it.next()?;
        // Number of elements in this iterator must match, according
        // to contract of ExactSizeIterator.
        let id = self.ids.next().unwrap();
        Some((id, item))
    }
}

/// A utility trait that defines an adapter for making it convenient to
/// access indices as state identifiers. We require ExactSizeIterator so
/// that iterator construction can do a single check to make sure the index
/// of each element is representable by a state identifier.
pub(crate) trait IteratorIndexExt: Iterator {
    fn with_state_ids(self) -> WithStateIDIter<Self>
    where
        Self: Sized + ExactSizeIterator,
    {
        let ids = StateID::iter(self.len());
        WithStateIDIter { it: self, ids }
    }
}

impl<I: Iterator> IteratorIndexExt for I {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_index_bounds() {
        assert!(SmallIndex::new(SmallIndex::MAX.as_usize()).is_ok());
        assert!(SmallIndex::new(SmallIndex::MAX.as_usize() + 1).is_err());
    }

    #[test]
    fn state_id_round_trips_through_i32() {
        let sid = StateID::must(12345);
        assert_eq!(12345, sid.as_i32());
        assert_eq!(sid, StateID::must(sid.as_i32() as usize));
    }
}
