use core::fmt;

use alloc::{boxed::Box, format, string::String, sync::Arc, vec, vec::Vec};

use crate::util::primitives::{IteratorIndexExt, StateID};

/// A "pure" non-deterministic finite automaton.
///
/// A pure NFA is an explicit graph of states connected by prioritized
/// transitions, where each state is classified by a semantic
/// [`StateKind`]: a character class, a look-around, a backreference, an
/// empty-match marker or an initial/final endpoint. This is in contrast to
/// a byte-code oriented NFA, whose states encode lower level instructions.
/// The classification is what lets a backtracking executor interpret the
/// graph directly, including the pieces that have no DFA equivalent.
///
/// An NFA is immutable once built. Use a [`Builder`](crate::nfa::pure::Builder)
/// to assemble one.
///
/// # Transition priority
///
/// Each state's outgoing transitions form an ordered list, and the order is
/// meaningful: earlier transitions are preferred. This is how greedy and
/// reluctant quantifiers are expressed without any explicit priority field.
/// A greedy `a+` lists its loop before its exit; a reluctant `a+?` lists
/// its exit before its loop.
///
/// # Directions
///
/// Every state carries two transition lists: its successors for a forward
/// scan and its successors for a backward scan (the reverse edges). A
/// backward scan is used for lookbehind, where the same graph is executed
/// right-to-left and the roles of initial and final states swap. All
/// direction-sensitive accessors take a `forward` flag.
///
/// # Cheap clones
///
/// Since an NFA is shared by the executor that owns it and by any parent
/// executor holding it as a look-around subtree, it uses reference counting
/// internally. Therefore, it is cheap to clone and it is encouraged to do
/// so.
#[derive(Clone)]
pub struct NFA(pub(super) Arc<Inner>);

impl NFA {
    /// Returns the state with the given identifier.
    ///
    /// # Panics
    ///
    /// When the identifier does not correspond to a state in this NFA.
    #[inline]
    pub fn state(&self, sid: StateID) -> &State {
        &self.0.states[sid]
    }

    /// Returns all states in this NFA, indexable by `StateID`.
    #[inline]
    pub fn states(&self) -> &[State] {
        &self.0.states
    }

    /// Returns the transition with the given index.
    #[inline]
    pub(crate) fn transition(&self, tid: u32) -> &Transition {
        &self.0.transitions[tid as usize]
    }

    /// Returns the identifier of the anchored initial state for the given
    /// scan direction.
    ///
    /// For a backward scan this is the anchored *final* state, since a
    /// backward run enters the graph through its forward exits.
    #[inline]
    pub fn anchored_initial_state(&self, forward: bool) -> StateID {
        if forward {
            self.0.anchored_init
        } else {
            self.0.anchored_fin
        }
    }

    /// Returns the identifier of the unanchored initial state for the given
    /// scan direction.
    #[inline]
    pub fn unanchored_initial_state(&self, forward: bool) -> StateID {
        if forward {
            self.0.unanchored_init
        } else {
            self.0.unanchored_fin
        }
    }

    /// Returns the number of capturing groups this NFA addresses, counting
    /// the implicit group `0` for the overall match.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.0.group_count
    }

    /// Returns the number of counter slots a frame for this NFA needs.
    #[inline]
    pub fn quantifier_count(&self) -> usize {
        self.0.quantifier_count
    }

    /// Returns the number of zero-width witness slots a frame for this NFA
    /// needs.
    #[inline]
    pub fn zero_width_count(&self) -> usize {
        self.0.zero_width_count
    }

    /// Returns one more than the largest look-around id referenced by any
    /// state in this NFA, i.e., the required size of the sub-executor
    /// registry.
    #[inline]
    pub fn look_around_count(&self) -> usize {
        self.0.facts.look_around_count
    }

    /// Returns true when some transition in this NFA updates or clears a
    /// boundary of an explicit capturing group (any group other than group
    /// `0`).
    ///
    /// A parent executor uses this to decide whether a positive look-around
    /// built from this NFA needs its capture results spliced back.
    #[inline]
    pub fn writes_capture_groups(&self) -> bool {
        self.0.facts.writes_capture_groups
    }

    /// Returns true when this NFA contains a backreference state. A front
    /// end typically consults this when deciding that an expression cannot
    /// be handled by any engine that forbids backtracking.
    #[inline]
    pub fn has_back_reference(&self) -> bool {
        self.0.facts.has_back_reference
    }
}

impl fmt::Debug for NFA {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The "inner" part of the NFA. We split this part out so that we can easily
/// wrap it in an `Arc` above in the definition of `NFA`.
///
/// See builder.rs for the code that actually builds this type. The builder
/// is the only place that mutates an `Inner`; after `build` hands out the
/// `Arc`, the graph is frozen.
#[derive(Default)]
pub(super) struct Inner {
    /// The state sequence, indexable by all state IDs appearing in the
    /// transitions.
    pub(super) states: Vec<State>,
    /// All transitions of the graph. States refer to these by index, in
    /// both their forward and backward successor lists.
    pub(super) transitions: Vec<Transition>,
    /// The four endpoint states. A backward run swaps the initial and final
    /// roles, which is handled by the accessors on `NFA`.
    pub(super) anchored_init: StateID,
    pub(super) unanchored_init: StateID,
    pub(super) anchored_fin: StateID,
    pub(super) unanchored_fin: StateID,
    /// The frame layout this graph was compiled against. Every executor in
    /// one family (a root and all of its look-around subtrees) shares these
    /// numbers, so that capture slots and counters can be spliced between
    /// frames.
    pub(super) group_count: usize,
    pub(super) quantifier_count: usize,
    pub(super) zero_width_count: usize,
    pub(super) facts: Facts,
}

impl fmt::Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pure::NFA(")?;
        for (sid, state) in self.states.iter().with_state_ids() {
            let status = if sid == self.anchored_init {
                '^'
            } else if sid == self.unanchored_init {
                '>'
            } else if sid == self.anchored_fin || sid == self.unanchored_fin
            {
                '$'
            } else {
                ' '
            };
            let succs = state
                .successors(true)
                .iter()
                .map(|&tid| {
                    let t = &self.transitions[tid as usize];
                    format!("{:?}", t.target(true).as_usize())
                })
                .collect::<Vec<String>>()
                .join(", ");
            writeln!(
                f,
                "{}{:06?}: {:?} => [{}]",
                status,
                sid.as_usize(),
                state.kind(),
                succs,
            )?;
        }
        writeln!(f, ")")?;
        Ok(())
    }
}

/// A collection of facts about an NFA.
///
/// These are computed once during `build` because the executor wants cheap
/// access to them, both for wiring validation and for the look-around
/// splicing decision.
#[derive(Clone, Copy, Debug, Default)]
pub(super) struct Facts {
    pub(super) writes_capture_groups: bool,
    pub(super) look_around_count: usize,
    pub(super) has_back_reference: bool,
}

/// A state in a pure NFA.
///
/// A state pairs its semantic [`StateKind`] with its prioritized successor
/// lists, one per scan direction. The executor never looks at anything
/// else: which transitions leave a state, in what order, and what entering
/// the state means for the cursor are all derived from these two pieces.
#[derive(Clone, Debug)]
pub struct State {
    pub(super) kind: StateKind,
    /// Outgoing transitions for a forward scan, in priority order.
    pub(super) successors: Box<[u32]>,
    /// Outgoing transitions for a backward scan (i.e. the reverse edges),
    /// in priority order.
    pub(super) predecessors: Box<[u32]>,
}

impl State {
    /// Returns the semantic classification of this state.
    #[inline]
    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    /// Returns the transition list to follow out of this state for the
    /// given scan direction, in priority order.
    #[inline]
    pub(crate) fn successors(&self, forward: bool) -> &[u32] {
        if forward {
            &self.successors
        } else {
            &self.predecessors
        }
    }

    /// Returns true when this state is an anchored initial state for the
    /// given scan direction.
    #[inline]
    pub fn is_anchored_initial(&self, forward: bool) -> bool {
        self.endpoints().map_or(false, |e| {
            if forward {
                e.anchored_initial
            } else {
                e.anchored_final
            }
        })
    }

    /// Returns true when this state is an unanchored initial state for the
    /// given scan direction.
    #[inline]
    pub fn is_unanchored_initial(&self, forward: bool) -> bool {
        self.endpoints().map_or(false, |e| {
            if forward {
                e.unanchored_initial
            } else {
                e.unanchored_final
            }
        })
    }

    /// Returns true when this state is an anchored final state for the
    /// given scan direction.
    #[inline]
    pub fn is_anchored_final(&self, forward: bool) -> bool {
        self.endpoints().map_or(false, |e| {
            if forward {
                e.anchored_final
            } else {
                e.anchored_initial
            }
        })
    }

    /// Returns true when this state is an unanchored final state for the
    /// given scan direction.
    #[inline]
    pub fn is_unanchored_final(&self, forward: bool) -> bool {
        self.endpoints().map_or(false, |e| {
            if forward {
                e.unanchored_final
            } else {
                e.unanchored_initial
            }
        })
    }

    /// Returns true when reaching this state completes a match for the
    /// given scan direction.
    #[inline]
    pub fn is_final(&self, forward: bool) -> bool {
        self.is_anchored_final(forward) || self.is_unanchored_final(forward)
    }

    #[inline]
    fn endpoints(&self) -> Option<&Endpoints> {
        match self.kind {
            StateKind::InitialOrFinal(ref e) => Some(e),
            _ => None,
        }
    }
}

/// The semantic classification of a [`State`].
///
/// The executor dispatches on this tag twice per transition: once to decide
/// whether the transition is admissible (does the current character belong
/// to the class, does the backreferenced region repeat here, does the
/// look-around subtree accept) and once to decide how entering the target
/// moves the cursor (character classes consume one unit, backreferences
/// consume the captured length, everything else stays put).
#[derive(Clone, Debug)]
pub enum StateKind {
    /// An endpoint of the graph. Which endpoint roles the state plays is
    /// recorded in its [`Endpoints`] flags; a backward scan swaps the
    /// initial and final roles.
    InitialOrFinal(Endpoints),
    /// A state entered by consuming one code unit that must be a member of
    /// the given set.
    CharClass(CharSet),
    /// A zero-width subtree assertion. `index` names a sub-executor in the
    /// registry held by the executor; `negated` flips acceptance.
    LookAround {
        /// The index of the sub-executor evaluating this assertion.
        index: usize,
        /// True for negative look-around (`(?!..)`, `(?<!..)`).
        negated: bool,
    },
    /// A state entered by consuming a repetition of what the given capture
    /// group matched. An unset or empty group consumes nothing and always
    /// admits.
    BackReference {
        /// The capture group whose text must repeat here.
        group: usize,
    },
    /// A zero-width junction that absorbs the empty iterations of a
    /// quantifier tail. Always admissible, never moves the cursor; the
    /// guards on its surrounding transitions do all the work.
    EmptyMatch,
}

/// The endpoint roles an [`StateKind::InitialOrFinal`] state plays.
///
/// A state may play several roles at once. In particular, graphs built for
/// patterns without anchors typically mark a single state as both their
/// anchored and unanchored endpoint.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Endpoints {
    /// The entry point used when a forward scan starts at position `0`.
    pub anchored_initial: bool,
    /// The entry point used when a forward scan starts anywhere else.
    pub unanchored_initial: bool,
    /// A forward exit that only accepts at the end of the haystack.
    pub anchored_final: bool,
    /// A forward exit that accepts anywhere.
    pub unanchored_final: bool,
}

/// A single prioritized transition between two states.
///
/// Besides its endpoints, a transition carries everything that has to
/// happen *on the way*: which capture-group boundaries to stamp with the
/// current position (or clear), whether the position must sit at the very
/// start (`caret`) or end (`dollar`) of the haystack, and the ordered
/// quantifier guards to test and apply.
#[derive(Clone, Debug)]
pub struct Transition {
    pub(super) source: StateID,
    pub(super) target: StateID,
    pub(super) boundaries: GroupBoundaries,
    pub(super) caret: bool,
    pub(super) dollar: bool,
    pub(super) guards: Box<[QuantifierGuard]>,
}

impl Transition {
    /// Returns the state this transition leads to for the given scan
    /// direction. For a backward scan that is the transition's source.
    #[inline]
    pub fn target(&self, forward: bool) -> StateID {
        if forward {
            self.target
        } else {
            self.source
        }
    }

    /// Returns the capture-group boundary updates of this transition.
    #[inline]
    pub fn boundaries(&self) -> &GroupBoundaries {
        &self.boundaries
    }

    /// Returns true when this transition requires the position to be `0`.
    #[inline]
    pub fn has_caret_guard(&self) -> bool {
        self.caret
    }

    /// Returns true when this transition requires the position to be the
    /// end of the haystack.
    #[inline]
    pub fn has_dollar_guard(&self) -> bool {
        self.dollar
    }

    /// Returns the quantifier guards of this transition, in forward order.
    #[inline]
    pub fn guards(&self) -> &[QuantifierGuard] {
        &self.guards
    }
}

/// The capture-group boundary effects of a transition.
///
/// A boundary slot is either *updated* (stamped with the position at which
/// the transition is taken) or *cleared* (reset to unset). Slot `2k` is the
/// start of group `k` and slot `2k + 1` is its end.
#[derive(Clone, Debug, Default)]
pub struct GroupBoundaries {
    updates: SlotSet,
    clears: SlotSet,
}

impl GroupBoundaries {
    /// A boundary spec that touches nothing.
    pub fn empty() -> GroupBoundaries {
        GroupBoundaries::default()
    }

    /// A boundary spec that stamps the given slots with the position and
    /// clears the given slots.
    pub fn new(updates: &[usize], clears: &[usize]) -> GroupBoundaries {
        GroupBoundaries {
            updates: SlotSet::from_indices(updates),
            clears: SlotSet::from_indices(clears),
        }
    }

    /// A boundary spec that stamps the given slots with the position.
    pub fn updates(updates: &[usize]) -> GroupBoundaries {
        GroupBoundaries::new(updates, &[])
    }

    /// Returns the set of slots this spec stamps.
    #[inline]
    pub fn update_indices(&self) -> &SlotSet {
        &self.updates
    }

    /// Returns the set of slots this spec clears.
    #[inline]
    pub fn clear_indices(&self) -> &SlotSet {
        &self.clears
    }

    /// Returns true when this spec touches no slots at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.clears.is_empty()
    }

    /// Write this spec into the given capture slots, stamping updates with
    /// `at` and clears with the unset sentinel.
    #[inline]
    pub(crate) fn apply(&self, slots: &mut [i32], at: i32) {
        for slot in self.updates.iter() {
            slots[slot] = at;
        }
        for slot in self.clears.iter() {
            slots[slot] = -1;
        }
    }
}

/// A small dense bit set over capture slot indices.
#[derive(Clone, Debug, Default)]
pub struct SlotSet {
    bits: Box<[u64]>,
}

impl SlotSet {
    /// Build a set holding exactly the given indices.
    pub fn from_indices(indices: &[usize]) -> SlotSet {
        let blocks = match indices.iter().max() {
            None => 0,
            Some(&max) => max / 64 + 1,
        };
        let mut bits = vec![0u64; blocks].into_boxed_slice();
        for &i in indices {
            bits[i / 64] |= 1 << (i % 64);
        }
        SlotSet { bits }
    }

    /// Returns true when the given slot index is in this set.
    #[inline]
    pub fn contains(&self, slot: usize) -> bool {
        self.bits
            .get(slot / 64)
            .map_or(false, |&block| block & (1 << (slot % 64)) != 0)
    }

    /// Returns true when this set contains no indices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&block| block == 0)
    }

    /// Returns an iterator over the indices in this set, ascending.
    pub fn iter(&self) -> SlotSetIter<'_> {
        SlotSetIter { set: self, slot: 0 }
    }
}

/// An iterator over the indices of a [`SlotSet`], ascending.
#[derive(Clone, Debug)]
pub struct SlotSetIter<'a> {
    set: &'a SlotSet,
    slot: usize,
}

impl<'a> Iterator for SlotSetIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.slot < self.set.bits.len() * 64 {
            let slot = self.slot;
            self.slot += 1;
            if self.set.contains(slot) {
                return Some(slot);
            }
        }
        None
    }
}

/// A set of code units, represented as sorted non-overlapping inclusive
/// ranges.
#[derive(Clone, Eq, PartialEq)]
pub struct CharSet {
    ranges: Box<[(u32, u32)]>,
}

impl CharSet {
    /// Build a set from the given inclusive ranges. The ranges are sorted
    /// and coalesced; empty ranges (`start > end`) are dropped.
    pub fn new<I: IntoIterator<Item = (u32, u32)>>(ranges: I) -> CharSet {
        let mut ranges: Vec<(u32, u32)> =
            ranges.into_iter().filter(|&(s, e)| s <= e).collect();
        ranges.sort();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(ranges.len());
        for (start, end) in ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => {
                    last.1 = core::cmp::max(last.1, end);
                }
                _ => merged.push((start, end)),
            }
        }
        CharSet { ranges: merged.into_boxed_slice() }
    }

    /// A set containing exactly one code unit.
    pub fn single(unit: u32) -> CharSet {
        CharSet::new([(unit, unit)])
    }

    /// A set containing the given inclusive range of code units.
    pub fn range(start: u32, end: u32) -> CharSet {
        CharSet::new([(start, end)])
    }

    /// A set containing every code unit.
    pub fn any() -> CharSet {
        CharSet::range(0, u32::MAX)
    }

    /// Returns true when the given code unit is in this set.
    #[inline]
    pub fn contains(&self, unit: u32) -> bool {
        for &(start, end) in self.ranges.iter() {
            if start > unit {
                break;
            } else if unit <= end {
                return true;
            }
        }
        false
    }
}

impl fmt::Debug for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharSet(")?;
        for (i, &(start, end)) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if start == end {
                write!(f, "{:X}", start)?;
            } else {
                write!(f, "{:X}-{:X}", start, end)?;
            }
        }
        write!(f, ")")
    }
}

/// A single bounded or unbounded quantifier.
///
/// A quantifier owns up to two frame slots: a counter slot (`index`) when
/// its bounds require counting iterations, and a zero-width witness slot
/// (`zero_width`) when its body can match the empty string and the engine
/// must detect non-progressing repetition. Either slot may be absent; a
/// plain `*` needs neither.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quantifier {
    /// The counter slot of this quantifier, if it counts.
    pub index: Option<usize>,
    /// The minimum number of iterations.
    pub min: u32,
    /// The maximum number of iterations, or `None` when unbounded.
    pub max: Option<u32>,
    /// The zero-width witness slot of this quantifier, if it needs one.
    pub zero_width: Option<usize>,
}

impl Quantifier {
    /// A quantifier with no counter and no zero-width witness, i.e. a plain
    /// `*` whose body always consumes input.
    pub fn uncounted() -> Quantifier {
        Quantifier { index: None, min: 0, max: None, zero_width: None }
    }

    /// A counting quantifier using the given counter slot, with the given
    /// bounds.
    pub fn counted(index: usize, min: u32, max: Option<u32>) -> Quantifier {
        Quantifier { index: Some(index), min, max, zero_width: None }
    }

    /// Attach a zero-width witness slot to this quantifier.
    pub fn with_zero_width(self, slot: usize) -> Quantifier {
        Quantifier { zero_width: Some(slot), ..self }
    }
}

/// A counter operation attached to a transition.
///
/// Guards are tested in order when deciding whether a transition is
/// admissible and applied in order when the transition is taken. A backward
/// scan processes them in reverse order and swaps each kind for its
/// [`GuardKind::reverse`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct QuantifierGuard {
    /// What the guard checks and does.
    pub kind: GuardKind,
    /// The quantifier the guard operates on.
    pub quantifier: Quantifier,
}

impl QuantifierGuard {
    /// Create a guard of the given kind over the given quantifier.
    pub fn new(kind: GuardKind, quantifier: Quantifier) -> QuantifierGuard {
        QuantifierGuard { kind, quantifier }
    }
}

/// The operation a [`QuantifierGuard`] performs.
///
/// Each kind has two halves: an admissibility test, evaluated before the
/// transition is taken, and an update, applied when it is. Kinds whose test
/// is trivial admit unconditionally; kinds whose update is trivial change
/// nothing.
///
/// | kind              | test                               | update            |
/// |-------------------|------------------------------------|-------------------|
/// | `Enter`           | counter below max                  | increment         |
/// | `EnterInc`        | (none)                             | increment         |
/// | `Loop`            | counter below max                  | increment         |
/// | `LoopInc`         | (none)                             | increment         |
/// | `Exit`            | counter at least min               | reset to 0        |
/// | `ExitReset`       | (none)                             | reset to 0        |
/// | `EnterZeroWidth`  | (none)                             | record position   |
/// | `ExitZeroWidth`   | progress since the recorded position, unless the counter still owes iterations | (none) |
/// | `EnterEmptyMatch` | counter below min                  | jump to min, or increment under an anchor guard |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GuardKind {
    /// Enter a quantifier, counting and bounded by max.
    Enter,
    /// Enter a quantifier, counting without testing max.
    EnterInc,
    /// Iterate a quantifier, counting and bounded by max.
    Loop,
    /// Iterate a quantifier, counting without testing max.
    LoopInc,
    /// Leave a quantifier, requiring at least min iterations.
    Exit,
    /// Leave a quantifier unconditionally, resetting its counter.
    ExitReset,
    /// Record the position at which an iteration of a possibly-empty body
    /// started.
    EnterZeroWidth,
    /// Refuse to complete an iteration that consumed nothing, unless the
    /// quantifier still owes mandatory iterations.
    ExitZeroWidth,
    /// Absorb the remaining mandatory iterations of a body that matched
    /// empty.
    EnterEmptyMatch,
}

impl GuardKind {
    /// Returns the guard kind to use in place of this one when the graph is
    /// scanned backward.
    #[inline]
    pub fn reverse(&self) -> GuardKind {
        use self::GuardKind::*;
        match *self {
            Enter => Exit,
            Exit => Enter,
            EnterInc => ExitReset,
            ExitReset => EnterInc,
            EnterZeroWidth => ExitZeroWidth,
            ExitZeroWidth => EnterZeroWidth,
            Loop => Loop,
            LoopInc => LoopInc,
            EnterEmptyMatch => EnterEmptyMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_set_membership() {
        let set = CharSet::new([('a' as u32, 'z' as u32), ('0' as u32, '9' as u32)]);
        assert!(set.contains('a' as u32));
        assert!(set.contains('m' as u32));
        assert!(set.contains('5' as u32));
        assert!(!set.contains('A' as u32));
        assert!(!set.contains(' ' as u32));
    }

    #[test]
    fn char_set_coalesces_adjacent_ranges() {
        let set = CharSet::new([(10, 20), (21, 30), (5, 12)]);
        assert_eq!(CharSet::new([(5, 30)]), set);
    }

    #[test]
    fn char_set_any() {
        assert!(CharSet::any().contains(0));
        assert!(CharSet::any().contains(0x10FFFF));
    }

    #[test]
    fn slot_set_round_trips() {
        let set = SlotSet::from_indices(&[0, 3, 64, 130]);
        assert!(set.contains(0));
        assert!(set.contains(3));
        assert!(set.contains(64));
        assert!(set.contains(130));
        assert!(!set.contains(1));
        assert!(!set.contains(63));
        assert!(!set.contains(131));
        let got: Vec<usize> = set.iter().collect();
        assert_eq!(vec![0, 3, 64, 130], got);
    }

    #[test]
    fn boundaries_apply_updates_then_clears() {
        let b = GroupBoundaries::new(&[2, 5], &[3]);
        let mut slots = [-1i32; 6];
        b.apply(&mut slots, 7);
        assert_eq!([-1, -1, 7, -1, -1, 7], slots);
        assert!(b.update_indices().contains(2));
        assert!(b.clear_indices().contains(3));
        assert!(!b.is_empty());
        assert!(GroupBoundaries::empty().is_empty());
    }

    #[test]
    fn guard_kind_reversal_is_an_involution() {
        use super::GuardKind::*;
        let all = [
            Enter,
            EnterInc,
            Loop,
            LoopInc,
            Exit,
            ExitReset,
            EnterZeroWidth,
            ExitZeroWidth,
            EnterEmptyMatch,
        ];
        for kind in all {
            assert_eq!(kind, kind.reverse().reverse());
        }
    }
}
