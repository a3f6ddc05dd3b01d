/*!
An NFA backed backtracking regex engine for pure NFAs.

This module provides a [`Backtracker`] that works by running a pure NFA
over a haystack with the classical backtracking strategy: at every state,
commit to the highest-priority admissible transition and remember the
alternatives; when a dead end is reached, restore the most recently
remembered alternative and continue from there.

Backtracking is strictly more powerful than the automaton-only engines:
it is the only strategy that can resolve backreferences, counted
quantifiers with capture-sensitive semantics and look-around that writes
captures. It is also strictly worse in its time guarantee, since its
worst case is exponential in the haystack length rather than linear. Use
it when the pattern leaves no choice.

# Frames

All mutable search state lives in a [`Frame`], created per match attempt
by [`Backtracker::create_frame`] and reusable across attempts via
[`Frame::reset`]. A frame holds the live attempt (position, capture
slots, quantifier counters, zero-width witnesses) together with the stack
of suspended alternatives, stored as flat `i32` blocks in one growable
arena so that saving and restoring an alternative is a bulk copy. The
engine itself is immutable during a search and can be shared freely
across threads, each running its own frame.
*/

use core::{
    cmp,
    sync::atomic::{AtomicBool, Ordering},
};

use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};

use crate::{
    nfa::pure::{
        error::BuildError,
        nfa::{GuardKind, QuantifierGuard, State, StateKind, Transition, NFA},
    },
    util::{
        captures::Captures,
        input::Input,
        primitives::{SmallIndex, StateID},
        search::MatchError,
    },
};

// The layout of one frame block in the arena: the suspended program
// counter, the position, and then the slot sections (capture boundaries,
// quantifier counters, zero-width witnesses) back to back.
const PC: usize = 0;
const INDEX: usize = 1;
const SLOTS: usize = 2;

/// The configuration used for building a [`Backtracker`].
///
/// A backtracker configuration is a simple Rust value: it can be passed
/// around and copied cheaply, and its setters follow the builder pattern.
#[derive(Clone, Debug, Default)]
pub struct Config {
    reverse: Option<bool>,
    ignore_case: Option<bool>,
    fold: Option<fn(u32, u32) -> bool>,
    cancelled: Option<Arc<AtomicBool>>,
}

impl Config {
    /// Return a new default backtracker configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Scan the haystack right-to-left instead of left-to-right.
    ///
    /// A reverse executor enters its graph through the forward final
    /// states and accepts in the forward initial states. This is how
    /// lookbehind subtrees are executed.
    pub fn reverse(mut self, yes: bool) -> Config {
        self.reverse = Some(yes);
        self
    }

    /// Compare backreferenced regions case-insensitively.
    ///
    /// When enabled, a backreference that fails its exact region
    /// comparison is retried unit by unit with the configured folding
    /// predicate.
    pub fn ignore_case(mut self, yes: bool) -> Config {
        self.ignore_case = Some(yes);
        self
    }

    /// Set the case-folding predicate used by case-insensitive
    /// backreference comparisons.
    ///
    /// The default predicate compares scalar values by their simple
    /// uppercase mappings and is only sensible for haystacks of Unicode
    /// scalar values. Front ends with their own folding tables should
    /// install a predicate here.
    pub fn fold(mut self, fold: fn(u32, u32) -> bool) -> Config {
        self.fold = Some(fold);
        self
    }

    /// Set the shared cancellation flag polled by the engine.
    ///
    /// The engine reads the flag once at the top of every dispatch step
    /// and stops with [`MatchError::cancelled`] when it is set. There is
    /// no timeout primitive in the engine; a caller that wants one sets
    /// this flag from a timer.
    pub fn cancelled(mut self, flag: Arc<AtomicBool>) -> Config {
        self.cancelled = Some(flag);
        self
    }

    /// Returns whether the haystack is scanned right-to-left.
    pub fn get_reverse(&self) -> bool {
        self.reverse.unwrap_or(false)
    }

    /// Returns whether backreference comparisons fold case.
    pub fn get_ignore_case(&self) -> bool {
        self.ignore_case.unwrap_or(false)
    }

    /// Returns the case-folding predicate.
    pub fn get_fold(&self) -> fn(u32, u32) -> bool {
        self.fold.unwrap_or(simple_fold_eq)
    }

    /// Returns the cancellation flag, if one was set.
    pub fn get_cancelled(&self) -> Option<&Arc<AtomicBool>> {
        self.cancelled.as_ref()
    }

    /// Overwrite the options in `self` with the options in `o` that were
    /// explicitly set.
    pub(crate) fn overwrite(&self, o: Config) -> Config {
        Config {
            reverse: o.reverse.or(self.reverse),
            ignore_case: o.ignore_case.or(self.ignore_case),
            fold: o.fold.or(self.fold),
            cancelled: o.cancelled.or_else(|| self.cancelled.clone()),
        }
    }
}

/// The default case-folding predicate: equality of simple uppercase
/// mappings, with non-scalar code units only equal to themselves.
fn simple_fold_eq(a: u32, b: u32) -> bool {
    if a == b {
        return true;
    }
    match (char::from_u32(a), char::from_u32(b)) {
        (Some(a), Some(b)) => a.to_uppercase().eq(b.to_uppercase()),
        _ => false,
    }
}

/// A builder for a backtracking executor.
///
/// The builder wires a configuration, a pure NFA and a registry of
/// look-around sub-executors into a [`Backtracker`], and checks that the
/// three agree with each other.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    /// Create a new backtracker builder with its default configuration.
    pub fn new() -> Builder {
        Builder { config: Config::default() }
    }

    /// Apply the given configuration, overwriting only the options that
    /// were explicitly set.
    pub fn configure(&mut self, config: Config) -> &mut Builder {
        self.config = self.config.overwrite(config);
        self
    }

    /// Build an executor for a graph without look-around states.
    pub fn build(&self, nfa: NFA) -> Result<Backtracker, BuildError> {
        self.build_with_look_arounds(nfa, Vec::new())
    }

    /// Build an executor for the given graph, with the given sub-executor
    /// registry resolving its look-around states.
    ///
    /// The registry is indexed by the `index` carried in every
    /// [`StateKind::LookAround`] state, so it must be at least as long as
    /// the largest such index plus one. Every registered sub-executor must
    /// share the parent's frame layout (capture, quantifier and
    /// zero-width counts), since the engine splices capture slots between
    /// parent and sub frames.
    pub fn build_with_look_arounds(
        &self,
        nfa: NFA,
        look_arounds: Vec<Backtracker>,
    ) -> Result<Backtracker, BuildError> {
        if nfa.look_around_count() > look_arounds.len() {
            return Err(BuildError::unknown_look_around(
                nfa.look_around_count() - 1,
            ));
        }
        for (i, sub) in look_arounds.iter().enumerate() {
            if sub.nfa.group_count() != nfa.group_count()
                || sub.nfa.quantifier_count() != nfa.quantifier_count()
                || sub.nfa.zero_width_count() != nfa.zero_width_count()
            {
                return Err(BuildError::look_around_layout(i));
            }
        }
        let caps_len = 2 * nfa.group_count();
        let counts_off = SLOTS + caps_len;
        let zw_off = counts_off + nfa.quantifier_count();
        let entry_len = zw_off + nfa.zero_width_count();
        Ok(Backtracker {
            config: self.config.clone(),
            forward: !self.config.get_reverse(),
            caps_len,
            counts_off,
            zw_off,
            entry_len,
            nfa,
            look_arounds: look_arounds.into_boxed_slice(),
        })
    }
}

/// A backtracking executor for one pure NFA.
///
/// An executor is built once per graph and is immutable afterwards; all
/// search state lives in the [`Frame`] passed to [`Backtracker::execute`].
/// Look-around subtrees are executors in their own right, held in a
/// registry and invoked re-entrantly with derived frames.
///
/// # Example
///
/// ```
/// use regex_backtrack::nfa::pure::{
///     backtrack::Backtracker, Builder, CharSet, GroupBoundaries, StateKind,
/// };
///
/// // The graph for the pattern `ab`, match offsets in group 0.
/// let mut builder = Builder::new();
/// builder.initial_loop_back(true);
/// let init = builder.add_initial_state()?;
/// let a = builder.add_state(StateKind::CharClass(CharSet::single('a' as u32)))?;
/// let b = builder.add_state(StateKind::CharClass(CharSet::single('b' as u32)))?;
/// let fin = builder.add_final_state()?;
/// builder.add_transition(init, a, GroupBoundaries::updates(&[0]));
/// builder.add_transition(a, b, GroupBoundaries::empty());
/// builder.add_transition(b, fin, GroupBoundaries::updates(&[1]));
///
/// let re = Backtracker::new(builder.build()?)?;
/// let haystack = b"xxab";
/// let mut frame = re.create_frame(haystack, 0, 0, haystack.len());
/// let caps = re.execute(&mut frame, true)?.expect("a match");
/// assert_eq!(Some(2..4), caps.get_group(0).map(|s| s.range()));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Backtracker {
    config: Config,
    nfa: NFA,
    look_arounds: Box<[Backtracker]>,
    forward: bool,
    caps_len: usize,
    counts_off: usize,
    zw_off: usize,
    entry_len: usize,
}

impl Backtracker {
    /// Build an executor for the given graph with the default
    /// configuration and no look-around registry.
    pub fn new(nfa: NFA) -> Result<Backtracker, BuildError> {
        Backtracker::builder().build(nfa)
    }

    /// Build an executor for the given graph with the default
    /// configuration and the given look-around registry.
    pub fn with_look_arounds(
        nfa: NFA,
        look_arounds: Vec<Backtracker>,
    ) -> Result<Backtracker, BuildError> {
        Backtracker::builder().build_with_look_arounds(nfa, look_arounds)
    }

    /// Return a default configuration. This is a convenience routine to
    /// avoid needing to import the [`Config`] type.
    pub fn config() -> Config {
        Config::new()
    }

    /// Return a builder for configuring the construction of a
    /// `Backtracker`.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Return the graph this executor runs.
    pub fn nfa(&self) -> &NFA {
        &self.nfa
    }

    /// Returns true when this executor scans left-to-right.
    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// Returns true when a successful run of this executor can write
    /// boundaries of explicit capture groups. A parent executor consults
    /// this to decide whether a positive look-around needs its capture
    /// results spliced back, and whether it may be inlined.
    pub fn writes_capture_groups(&self) -> bool {
        self.nfa.writes_capture_groups()
    }

    /// Allocate a frame for a match attempt over the given haystack,
    /// sized to this executor's capture, quantifier and zero-width
    /// counts.
    ///
    /// `from_index` is the origin of the overall match attempt,
    /// `start_index` the position at which this run begins (for a forward
    /// run usually equal to `from_index`; for a reverse run the right
    /// edge), and `max_index` the effective haystack length. All three
    /// are in code units of the decoding that `execute` will be called
    /// with, and `max_index` must not exceed the haystack's unit length.
    ///
    /// # Panics
    ///
    /// When the indices are out of order or do not fit the engine's
    /// signed 32-bit position domain.
    pub fn create_frame<'h>(
        &self,
        haystack: &'h [u8],
        from_index: usize,
        start_index: usize,
        max_index: usize,
    ) -> Frame<'h> {
        Frame::new(
            haystack,
            from_index,
            start_index,
            max_index,
            self.counts_off,
            self.zw_off,
            self.entry_len,
        )
    }

    /// Run this executor to completion on the given frame.
    ///
    /// Returns the resolved capture offsets of the best match reachable
    /// from the frame's starting position, or `None` when there is none.
    /// "Best" follows the classical backtracking order: the
    /// highest-priority path wins, and with the loop-back entry enabled
    /// the leftmost start position wins first.
    ///
    /// `compact` selects the haystack decoding: one byte per code unit
    /// when true, little-endian `u16` pairs otherwise. It affects nothing
    /// but unit extraction.
    ///
    /// This returns an error only when a cancellation flag was configured
    /// and set while the search ran.
    pub fn execute(
        &self,
        frame: &mut Frame<'_>,
        compact: bool,
    ) -> Result<Option<Captures>, MatchError> {
        let input = Input::new(frame.haystack, compact);
        trace!(
            "backtracking search: forward: {}, start: {}, max: {}",
            self.forward,
            frame.stack[INDEX],
            frame.max_index,
        );
        let result = self.run(frame, &input)?;
        trace!(
            "backtracking search finished: match: {}",
            result.is_some(),
        );
        Ok(result.map(Captures::new))
    }

    /// The actual search loop, shared between the public entry point and
    /// re-entrant sub-matcher runs.
    fn run(
        &self,
        frame: &mut Frame<'_>,
        input: &Input<'_>,
    ) -> Result<Option<Box<[i32]>>, MatchError> {
        let start = if self.at_begin(frame) {
            self.nfa.anchored_initial_state(self.forward)
        } else {
            self.nfa.unanchored_initial_state(self.forward)
        };
        frame.stack[PC] = start.as_i32();
        let mut pc = Some(start);
        while let Some(sid) = pc {
            if let Some(flag) = self.config.get_cancelled() {
                if flag.load(Ordering::Relaxed) {
                    let offset = cmp::max(0, frame.stack[INDEX]) as usize;
                    return Err(MatchError::cancelled(offset));
                }
            }
            pc = self.run_state(frame, input, sid)?;
        }
        Ok(frame.result.take())
    }

    /// Returns true when the frame sits at the absolute scan origin, in
    /// which case the run enters through the anchored initial state.
    fn at_begin(&self, frame: &Frame<'_>) -> bool {
        let origin = if self.forward { 0 } else { frame.max_index };
        frame.stack[INDEX] == origin
    }

    /// One dispatch step: resolve the state under `sid`, commit its
    /// highest-priority admissible transition and schedule the rest.
    ///
    /// Returns the next state to dispatch, or `None` when the run is
    /// over, either because a final state recorded a result or because
    /// every alternative is exhausted.
    #[inline(always)]
    fn run_state(
        &self,
        frame: &mut Frame<'_>,
        input: &Input<'_>,
        sid: StateID,
    ) -> Result<Option<StateID>, MatchError> {
        let state = self.nfa.state(sid);
        if state.is_final(self.forward) {
            self.push_result(frame, None);
            return Ok(None);
        }
        // A look-around that could not be folded into its incoming
        // transition is evaluated on entry, every time the state is
        // dispatched (including resumptions from the stack).
        if let StateKind::LookAround { index, negated } = *state.kind() {
            if !self.can_inline_look_around(state, index, negated) {
                let result =
                    self.run_sub_matcher(frame, input, index, None)?;
                if result.is_none() != negated {
                    return Ok(self.backtrack(frame));
                }
                if !negated
                    && self.look_arounds[index].writes_capture_groups()
                {
                    if let Some(sub_slots) = result {
                        // The splice happens after any alternatives were
                        // snapshotted, so abandoning this branch rolls the
                        // captures back with the rest of the frame.
                        frame.stack[SLOTS..SLOTS + self.caps_len]
                            .copy_from_slice(&sub_slots);
                    }
                }
            }
        }

        let at = frame.stack[INDEX];
        let at_end =
            if self.forward { at >= frame.max_index } else { at <= 0 };
        let c = if at_end {
            0
        } else if self.forward {
            input.char_at(at as usize)
        } else {
            input.char_at(at as usize - 1)
        };

        // Walk the successors from lowest to highest priority. Whenever a
        // better transition is found, the previously best one is demoted:
        // either queued as a result candidate (when it leads straight to
        // an unanchored final state) or applied to a duplicate of the
        // frame that goes on the stack. The transition left standing at
        // the end is the one the live frame commits to.
        let successors = state.successors(self.forward);
        let mut first_match: Option<usize> = None;
        for i in (0..successors.len()).rev() {
            let transition = self.nfa.transition(successors[i]);
            if !self.transition_matches(frame, input, transition, at_end, c)?
            {
                continue;
            }
            if let Some(prev) = first_match {
                let deferred = self.nfa.transition(successors[prev]);
                let target = deferred.target(self.forward);
                if self.nfa.state(target).is_unanchored_final(self.forward) {
                    self.push_result(frame, Some(deferred));
                } else {
                    frame.dup_frame();
                    let entry = frame.staged();
                    self.update_state(entry, deferred);
                    entry[PC] = target.as_i32();
                }
            }
            first_match = Some(i);
        }
        match first_match {
            None => Ok(self.backtrack(frame)),
            Some(i) => {
                let transition = self.nfa.transition(successors[i]);
                self.update_state(frame.live(), transition);
                Ok(Some(transition.target(self.forward)))
            }
        }
    }

    /// Tests whether the given transition is admissible from the live
    /// frame: anchor guards, quantifier guards, then the target-kind
    /// test. Short-circuits on the first failure.
    #[inline(always)]
    fn transition_matches(
        &self,
        frame: &Frame<'_>,
        input: &Input<'_>,
        transition: &Transition,
        at_end: bool,
        c: u32,
    ) -> Result<bool, MatchError> {
        let entry = &frame.stack[..self.entry_len];
        let at = entry[INDEX];
        if transition.has_caret_guard() && at != 0 {
            return Ok(false);
        }
        if transition.has_dollar_guard() && at < frame.max_index {
            return Ok(false);
        }
        let guards = transition.guards();
        for i in 0..guards.len() {
            let (guard, kind) = self.directed_guard(guards, i);
            let q = guard.quantifier;
            match kind {
                GuardKind::Enter | GuardKind::Loop => {
                    // Cannot iterate again once the counter hit max.
                    if let (Some(qi), Some(max)) = (q.index, q.max) {
                        if entry[self.counts_off + qi] as u32 == max {
                            return Ok(false);
                        }
                    }
                }
                GuardKind::Exit => {
                    // Cannot leave before the counter reached min.
                    if let Some(qi) = q.index {
                        if (entry[self.counts_off + qi] as u32) < q.min {
                            return Ok(false);
                        }
                    }
                }
                GuardKind::ExitZeroWidth => {
                    // Refuse an iteration that consumed nothing, unless
                    // the quantifier still owes mandatory iterations.
                    if let Some(zi) = q.zero_width {
                        let stalled = entry[self.zw_off + zi] == at;
                        let over_min = match q.index {
                            None => true,
                            Some(qi) => {
                                entry[self.counts_off + qi] as u32 > q.min
                            }
                        };
                        if stalled && over_min {
                            return Ok(false);
                        }
                    }
                }
                GuardKind::EnterEmptyMatch => {
                    // Only taken while the minimum is unmet.
                    let count = q.index.map_or(0, |qi| {
                        entry[self.counts_off + qi] as u32
                    });
                    if count >= q.min {
                        return Ok(false);
                    }
                }
                _ => {}
            }
        }
        let target_sid = transition.target(self.forward);
        let target = self.nfa.state(target_sid);
        match *target.kind() {
            StateKind::InitialOrFinal(_) => {
                Ok(if target.is_unanchored_initial(self.forward) {
                    !at_end
                } else if target.is_anchored_final(self.forward) {
                    at_end
                } else {
                    true
                })
            }
            StateKind::CharClass(ref set) => Ok(!at_end && set.contains(c)),
            StateKind::LookAround { index, negated } => {
                if self.can_inline_look_around(target, index, negated) {
                    let result = self
                        .run_sub_matcher(frame, input, index, Some(transition))?;
                    Ok(result.is_none() == negated)
                } else {
                    Ok(true)
                }
            }
            StateKind::BackReference { group } => {
                let start =
                    self.back_ref_boundary(entry, transition, group * 2);
                let end =
                    self.back_ref_boundary(entry, transition, group * 2 + 1);
                let len = end - start;
                if start < 0 || len <= 0 {
                    // An unset or empty group repeats trivially.
                    return Ok(true);
                }
                let fits = if self.forward {
                    at + len <= frame.max_index
                } else {
                    at - len >= 0
                };
                if !fits {
                    return Ok(false);
                }
                let here = if self.forward { at } else { at - len };
                Ok(self.region_matches(
                    input,
                    start as usize,
                    here as usize,
                    len as usize,
                ))
            }
            StateKind::EmptyMatch => Ok(true),
        }
    }

    /// Resolve one boundary of a backreferenced group as seen *through*
    /// the given transition: its boundary spec may stamp or clear the slot
    /// before the capture array proper is consulted.
    #[inline(always)]
    fn back_ref_boundary(
        &self,
        entry: &[i32],
        transition: &Transition,
        slot: usize,
    ) -> i32 {
        if transition.boundaries().update_indices().contains(slot) {
            entry[INDEX]
        } else if transition.boundaries().clear_indices().contains(slot) {
            -1
        } else {
            entry[SLOTS + slot]
        }
    }

    /// Apply an admitted transition to the given frame block: stamp its
    /// boundary spec, process its guards in directed order, then move the
    /// position according to the target's kind.
    #[inline(always)]
    fn update_state(&self, entry: &mut [i32], transition: &Transition) {
        let at = entry[INDEX];
        transition
            .boundaries()
            .apply(&mut entry[SLOTS..SLOTS + self.caps_len], at);
        let guards = transition.guards();
        for i in 0..guards.len() {
            let (guard, kind) = self.directed_guard(guards, i);
            let q = guard.quantifier;
            match kind {
                GuardKind::Enter
                | GuardKind::EnterInc
                | GuardKind::Loop
                | GuardKind::LoopInc => {
                    if let Some(qi) = q.index {
                        entry[self.counts_off + qi] += 1;
                    }
                }
                GuardKind::Exit | GuardKind::ExitReset => {
                    if let Some(qi) = q.index {
                        entry[self.counts_off + qi] = 0;
                    }
                }
                GuardKind::EnterZeroWidth => {
                    if let Some(zi) = q.zero_width {
                        entry[self.zw_off + zi] = at;
                    }
                }
                GuardKind::EnterEmptyMatch => {
                    if let Some(qi) = q.index {
                        if !transition.has_caret_guard()
                            && !transition.has_dollar_guard()
                        {
                            // The remaining mandatory iterations would all
                            // match empty here, so take them in one jump.
                            entry[self.counts_off + qi] = q.min as i32;
                        } else {
                            entry[self.counts_off + qi] += 1;
                        }
                    }
                }
                GuardKind::ExitZeroWidth => {}
            }
        }
        entry[INDEX] = self.new_index(entry, transition.target(self.forward));
    }

    /// Compute the position after entering the given target state.
    #[inline(always)]
    fn new_index(&self, entry: &[i32], target_sid: StateID) -> i32 {
        let at = entry[INDEX];
        match *self.nfa.state(target_sid).kind() {
            StateKind::InitialOrFinal(_) | StateKind::CharClass(_) => {
                if self.forward {
                    at + 1
                } else {
                    at - 1
                }
            }
            StateKind::LookAround { .. } | StateKind::EmptyMatch => at,
            StateKind::BackReference { group } => {
                let start = entry[SLOTS + group * 2];
                let end = entry[SLOTS + group * 2 + 1];
                if start < 0 || end < 0 {
                    return at;
                }
                let len = end - start;
                if self.forward {
                    at + len
                } else {
                    at - len
                }
            }
        }
    }

    /// Yields the `i`th guard to process for the scan direction: forward
    /// scans take them in order as written, backward scans in reverse
    /// order with each kind swapped for its reverse.
    #[inline(always)]
    fn directed_guard<'a>(
        &self,
        guards: &'a [QuantifierGuard],
        i: usize,
    ) -> (&'a QuantifierGuard, GuardKind) {
        if self.forward {
            let guard = &guards[i];
            (guard, guard.kind)
        } else {
            let guard = &guards[guards.len() - 1 - i];
            (guard, guard.kind.reverse())
        }
    }

    /// A look-around state can be folded into its incoming transition
    /// when that transition is the only way in and the evaluation cannot
    /// leak capture writes: either the assertion is negated or its
    /// subtree writes no captures.
    #[inline(always)]
    fn can_inline_look_around(
        &self,
        state: &State,
        index: usize,
        negated: bool,
    ) -> bool {
        state.successors(!self.forward).len() == 1
            && (negated || !self.look_arounds[index].writes_capture_groups())
    }

    /// Run the sub-executor with the given index on a frame derived from
    /// the live one. The sub frame starts at the current position, sees
    /// the current captures (with the incoming transition's boundary
    /// overlay applied, for inlined evaluation) and counts its
    /// quantifiers afresh.
    fn run_sub_matcher(
        &self,
        frame: &Frame<'_>,
        input: &Input<'_>,
        index: usize,
        overlay: Option<&Transition>,
    ) -> Result<Option<Box<[i32]>>, MatchError> {
        let sub = &self.look_arounds[index];
        let at = frame.stack[INDEX];
        let mut sub_frame = Frame::new(
            frame.haystack,
            frame.from_index as usize,
            at as usize,
            frame.max_index as usize,
            self.counts_off,
            self.zw_off,
            self.entry_len,
        );
        sub_frame.stack[SLOTS..SLOTS + self.caps_len]
            .copy_from_slice(&frame.stack[SLOTS..SLOTS + self.caps_len]);
        if let Some(transition) = overlay {
            transition.boundaries().apply(
                &mut sub_frame.stack[SLOTS..SLOTS + self.caps_len],
                at,
            );
        }
        sub.run(&mut sub_frame, input)
    }

    /// Queue the live frame's captures as the result candidate,
    /// overwriting any previously queued candidate. Every later candidate
    /// descends from a branch that won a priority tie against the stored
    /// one, so overwriting keeps the best match.
    fn push_result(&self, frame: &mut Frame<'_>, overlay: Option<&Transition>) {
        let mut caps: Box<[i32]> =
            Box::from(&frame.stack[SLOTS..SLOTS + self.caps_len]);
        if let Some(transition) = overlay {
            transition.boundaries().apply(&mut caps, frame.stack[INDEX]);
        }
        frame.result = Some(caps);
    }

    /// Give up on the live frame: when a result candidate is queued the
    /// run terminates with it (everything still on the stack lost a
    /// priority tie against it); otherwise the most recently suspended
    /// alternative resumes; otherwise the run fails.
    fn backtrack(&self, frame: &mut Frame<'_>) -> Option<StateID> {
        if frame.result.is_some() {
            None
        } else if frame.can_pop() {
            Some(frame.pop())
        } else {
            None
        }
    }

    /// Compare two regions of the haystack, retrying unit by unit with
    /// the folding predicate when case-insensitive matching is on and the
    /// exact comparison fails.
    fn region_matches(
        &self,
        input: &Input<'_>,
        start1: usize,
        start2: usize,
        len: usize,
    ) -> bool {
        if input.region_matches(start1, start2, len) {
            return true;
        }
        if !self.config.get_ignore_case() {
            return false;
        }
        let fold = self.config.get_fold();
        (0..len)
            .all(|i| fold(input.char_at(start1 + i), input.char_at(start2 + i)))
    }
}

/// The complete mutable state of one match attempt.
///
/// A frame owns the live attempt (position, capture slots, quantifier
/// counters, zero-width witnesses) together with the stack of suspended
/// alternatives and the queued result candidate. Both the live attempt
/// and every suspended alternative are flat `i32` blocks in one growable
/// arena, so suspending or restoring an alternative is a single bulk
/// copy. The block at the bottom of the arena is always the live frame.
///
/// Create one with [`Backtracker::create_frame`]. A frame is tied to the
/// executor layout it was created for and must not be passed to an
/// executor with a different layout.
#[derive(Clone, Debug)]
pub struct Frame<'h> {
    haystack: &'h [u8],
    from_index: i32,
    max_index: i32,
    counts_off: usize,
    zw_off: usize,
    entry_len: usize,
    /// The frame arena. `stack[..entry_len]` is the live frame; the rest
    /// are suspended alternatives, most recently suspended last.
    stack: Vec<i32>,
    /// The queued result candidate: capture slots only.
    result: Option<Box<[i32]>>,
}

impl<'h> Frame<'h> {
    fn new(
        haystack: &'h [u8],
        from_index: usize,
        start_index: usize,
        max_index: usize,
        counts_off: usize,
        zw_off: usize,
        entry_len: usize,
    ) -> Frame<'h> {
        let mut frame = Frame {
            haystack,
            from_index: 0,
            max_index: 0,
            counts_off,
            zw_off,
            entry_len,
            stack: vec![0; entry_len],
            result: None,
        };
        frame.reset(from_index, start_index, max_index);
        frame
    }

    /// Reinitialize this frame for a fresh match attempt over the same
    /// haystack, dropping any suspended alternatives and any queued
    /// result but keeping the arena's allocation.
    ///
    /// # Panics
    ///
    /// When the indices are out of order or do not fit the engine's
    /// signed 32-bit position domain.
    pub fn reset(
        &mut self,
        from_index: usize,
        start_index: usize,
        max_index: usize,
    ) {
        // Positions must stay strictly below the small index limit so
        // that stepping one unit past either end still fits in an i32.
        assert!(
            max_index < SmallIndex::LIMIT,
            "haystack lengths must be less than {}",
            SmallIndex::LIMIT,
        );
        assert!(from_index <= max_index && start_index <= max_index);
        self.from_index = from_index as i32;
        self.max_index = max_index as i32;
        self.stack.truncate(self.entry_len);
        self.stack[PC] = -1;
        self.stack[INDEX] = start_index as i32;
        for slot in &mut self.stack[SLOTS..self.counts_off] {
            *slot = -1;
        }
        for count in &mut self.stack[self.counts_off..self.zw_off] {
            *count = 0;
        }
        for witness in &mut self.stack[self.zw_off..self.entry_len] {
            *witness = -1;
        }
        self.result = None;
    }

    /// Return the haystack this frame searches.
    pub fn haystack(&self) -> &'h [u8] {
        self.haystack
    }

    /// The live frame block, at the bottom of the arena.
    #[inline(always)]
    fn live(&mut self) -> &mut [i32] {
        &mut self.stack[..self.entry_len]
    }

    /// Duplicate the live frame onto the top of the arena, where the
    /// caller turns it into a suspended alternative.
    #[inline(always)]
    fn dup_frame(&mut self) {
        self.stack.extend_from_within(..self.entry_len);
    }

    /// The most recently pushed block, i.e. the duplicate made by
    /// [`Frame::dup_frame`].
    #[inline(always)]
    fn staged(&mut self) -> &mut [i32] {
        let top = self.stack.len() - self.entry_len;
        &mut self.stack[top..]
    }

    /// Returns true when a suspended alternative is available.
    #[inline(always)]
    fn can_pop(&self) -> bool {
        self.stack.len() > self.entry_len
    }

    /// Restore the most recently suspended alternative into the live
    /// frame and return its suspended program counter.
    #[inline(always)]
    fn pop(&mut self) -> StateID {
        let top = self.stack.len() - self.entry_len;
        self.stack.copy_within(top.., 0);
        self.stack.truncate(top);
        // Suspended blocks always hold the ID of an existing state.
        StateID::new_unchecked(self.stack[PC] as usize)
    }
}
