use alloc::{sync::Arc, vec, vec::Vec};

use crate::{
    nfa::pure::{
        error::BuildError,
        nfa::{
            Endpoints, Facts, GroupBoundaries, Inner, QuantifierGuard,
            State, StateKind, Transition, NFA,
        },
    },
    util::primitives::StateID,
};

/// An abstraction for assembling a pure NFA graph by hand.
///
/// A front end lowers its pattern AST through this type: add the states,
/// then add the transitions between them in priority order, then call
/// [`Builder::build`]. The builder does no interpretation of its own; it
/// records exactly the graph it is given, validates every identifier the
/// graph mentions, derives the reverse edges needed for backward scans and
/// freezes the result into an immutable [`NFA`].
///
/// # Priority
///
/// Among transitions sharing a source, priority is insertion order: the
/// transition added first is preferred. The same applies per target for
/// the derived backward lists. There are no priority fields anywhere.
///
/// # The loop-back entry
///
/// When [`Builder::initial_loop_back`] is enabled, because the graph
/// belongs to an unanchored root pattern, `build` appends a
/// lowest-priority transition
/// from the unanchored initial state to itself, and one from the anchored
/// to the unanchored initial state when the two are distinct. Entering an
/// initial state consumes one unit, so these extra edges are what makes
/// the executor try every start position, without any outer driver loop.
///
/// # Example
///
/// This assembles the graph for `a` and checks its shape.
///
/// ```
/// use regex_backtrack::nfa::pure::{Builder, CharSet, GroupBoundaries, StateKind};
///
/// let mut builder = Builder::new();
/// let init = builder.add_initial_state()?;
/// let a = builder.add_state(StateKind::CharClass(CharSet::single('a' as u32)))?;
/// let fin = builder.add_final_state()?;
/// builder.add_transition(init, a, GroupBoundaries::updates(&[0]));
/// builder.add_transition(a, fin, GroupBoundaries::updates(&[1]));
/// let nfa = builder.build()?;
/// assert_eq!(init, nfa.anchored_initial_state(true));
/// assert_eq!(fin, nfa.anchored_initial_state(false));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Builder {
    kinds: Vec<StateKind>,
    transitions: Vec<Transition>,
    group_count: usize,
    quantifier_count: usize,
    zero_width_count: usize,
    initial_loop_back: bool,
}

impl Builder {
    /// Create a new builder for an empty graph.
    ///
    /// The builder starts with one capture group (the implicit group `0`),
    /// no quantifier or zero-width slots and no loop-back entry.
    pub fn new() -> Builder {
        Builder { group_count: 1, ..Builder::default() }
    }

    /// Declare the number of capture groups, counting the implicit group
    /// `0`. This fixes the capture slot domain at `2 * n`.
    pub fn group_count(&mut self, n: usize) -> &mut Builder {
        self.group_count = n;
        self
    }

    /// Declare the number of quantifier counter slots.
    pub fn quantifier_count(&mut self, n: usize) -> &mut Builder {
        self.quantifier_count = n;
        self
    }

    /// Declare the number of zero-width witness slots.
    pub fn zero_width_count(&mut self, n: usize) -> &mut Builder {
        self.zero_width_count = n;
        self
    }

    /// Enable or disable the loop-back entry appended by `build`. Enable
    /// this for the root graph of a pattern that is neither sticky nor
    /// anchored at its start.
    pub fn initial_loop_back(&mut self, yes: bool) -> &mut Builder {
        self.initial_loop_back = yes;
        self
    }

    /// Add a state of the given kind and return its identifier.
    ///
    /// This returns an error when the identifier space is exhausted.
    pub fn add_state(
        &mut self,
        kind: StateKind,
    ) -> Result<StateID, BuildError> {
        let id = StateID::new(self.kinds.len())
            .map_err(|_| BuildError::too_many_states(self.kinds.len() + 1))?;
        self.kinds.push(kind);
        Ok(id)
    }

    /// Add a state flagged as both the anchored and unanchored initial
    /// state. This is the common shape; graphs that distinguish the two
    /// can add two [`StateKind::InitialOrFinal`] states instead.
    pub fn add_initial_state(&mut self) -> Result<StateID, BuildError> {
        self.add_state(StateKind::InitialOrFinal(Endpoints {
            anchored_initial: true,
            unanchored_initial: true,
            ..Endpoints::default()
        }))
    }

    /// Add a state flagged as the unanchored final state, i.e. an exit
    /// that accepts at any position. Graphs for patterns anchored at
    /// their end use [`Builder::add_anchored_final_state`] instead; when
    /// a graph has no anchored final state at all, the unanchored one
    /// doubles as the backward entry point.
    pub fn add_final_state(&mut self) -> Result<StateID, BuildError> {
        self.add_state(StateKind::InitialOrFinal(Endpoints {
            unanchored_final: true,
            ..Endpoints::default()
        }))
    }

    /// Add a state flagged as the anchored final state only, i.e. an exit
    /// that accepts at the end of the haystack and nowhere else.
    pub fn add_anchored_final_state(&mut self) -> Result<StateID, BuildError> {
        self.add_state(StateKind::InitialOrFinal(Endpoints {
            anchored_final: true,
            ..Endpoints::default()
        }))
    }

    /// Add a transition from `from` to `to` carrying the given boundary
    /// spec and nothing else.
    ///
    /// Priority is insertion order among the transitions leaving `from`.
    pub fn add_transition(
        &mut self,
        from: StateID,
        to: StateID,
        boundaries: GroupBoundaries,
    ) {
        self.add_guarded_transition(from, to, boundaries, false, false, Vec::new())
    }

    /// Add a transition carrying anchor guards and quantifier guards in
    /// addition to its boundary spec.
    ///
    /// Guards are evaluated in the order given (and in reverse order, with
    /// each kind reversed, by a backward scan).
    pub fn add_guarded_transition(
        &mut self,
        from: StateID,
        to: StateID,
        boundaries: GroupBoundaries,
        caret: bool,
        dollar: bool,
        guards: Vec<QuantifierGuard>,
    ) {
        self.transitions.push(Transition {
            source: from,
            target: to,
            boundaries,
            caret,
            dollar,
            guards: guards.into_boxed_slice(),
        });
    }

    /// Validate the assembled graph and freeze it into an [`NFA`].
    ///
    /// Every identifier mentioned anywhere in the graph is checked here:
    /// transition endpoints, backreferenced groups, boundary slots and
    /// guard slots. A graph that builds successfully can be executed
    /// without tripping over any of them.
    pub fn build(&self) -> Result<NFA, BuildError> {
        let mut transitions = self.transitions.clone();
        self.check_states(&transitions)?;

        let anchored_init = self
            .find_endpoint(|e| e.anchored_initial)
            .or_else(|| self.find_endpoint(|e| e.unanchored_initial))
            .ok_or_else(BuildError::no_initial_state)?;
        let unanchored_init = self
            .find_endpoint(|e| e.unanchored_initial)
            .unwrap_or(anchored_init);
        let anchored_fin = self
            .find_endpoint(|e| e.anchored_final)
            .or_else(|| self.find_endpoint(|e| e.unanchored_final))
            .ok_or_else(BuildError::no_final_state)?;
        let unanchored_fin = self
            .find_endpoint(|e| e.unanchored_final)
            .unwrap_or(anchored_fin);

        if self.initial_loop_back {
            transitions.push(Transition {
                source: unanchored_init,
                target: unanchored_init,
                boundaries: GroupBoundaries::empty(),
                caret: false,
                dollar: false,
                guards: Vec::new().into_boxed_slice(),
            });
            if anchored_init != unanchored_init {
                transitions.push(Transition {
                    source: anchored_init,
                    target: unanchored_init,
                    boundaries: GroupBoundaries::empty(),
                    caret: false,
                    dollar: false,
                    guards: Vec::new().into_boxed_slice(),
                });
            }
        }

        // Derive the per-state transition lists, in both directions.
        // Insertion order within each list is what encodes priority.
        let mut successors: Vec<Vec<u32>> = vec![Vec::new(); self.kinds.len()];
        let mut predecessors: Vec<Vec<u32>> =
            vec![Vec::new(); self.kinds.len()];
        for (tid, t) in transitions.iter().enumerate() {
            successors[t.source].push(tid as u32);
            predecessors[t.target].push(tid as u32);
        }

        let states = self
            .kinds
            .iter()
            .zip(successors.into_iter().zip(predecessors.into_iter()))
            .map(|(kind, (succ, pred))| State {
                kind: kind.clone(),
                successors: succ.into_boxed_slice(),
                predecessors: pred.into_boxed_slice(),
            })
            .collect();

        let facts = self.facts(&transitions);
        let nfa = NFA(Arc::new(Inner {
            states,
            transitions,
            anchored_init,
            unanchored_init,
            anchored_fin,
            unanchored_fin,
            group_count: self.group_count,
            quantifier_count: self.quantifier_count,
            zero_width_count: self.zero_width_count,
            facts,
        }));
        debug!(
            "built pure NFA: {} states, {} transitions, {} groups, \
             {} quantifiers, {} zero-width, loop-back: {}",
            nfa.states().len(),
            nfa.0.transitions.len(),
            self.group_count,
            self.quantifier_count,
            self.zero_width_count,
            self.initial_loop_back,
        );
        Ok(nfa)
    }

    /// Check every identifier in the graph against its declared domain.
    fn check_states(
        &self,
        transitions: &[Transition],
    ) -> Result<(), BuildError> {
        let slot_count = 2 * self.group_count;
        for kind in self.kinds.iter() {
            if let StateKind::BackReference { group } = *kind {
                if group >= self.group_count {
                    return Err(BuildError::unknown_group(group));
                }
            }
        }
        for t in transitions.iter() {
            for sid in [t.source, t.target] {
                if sid.as_usize() >= self.kinds.len() {
                    return Err(BuildError::unknown_state(sid.as_usize()));
                }
            }
            for slot in t
                .boundaries
                .update_indices()
                .iter()
                .chain(t.boundaries.clear_indices().iter())
            {
                if slot >= slot_count {
                    return Err(BuildError::unknown_slot(slot));
                }
            }
            for guard in t.guards.iter() {
                if let Some(index) = guard.quantifier.index {
                    if index >= self.quantifier_count {
                        return Err(BuildError::unknown_quantifier(index));
                    }
                }
                if let Some(index) = guard.quantifier.zero_width {
                    if index >= self.zero_width_count {
                        return Err(BuildError::unknown_zero_width(index));
                    }
                }
            }
        }
        Ok(())
    }

    fn find_endpoint(
        &self,
        role: impl Fn(&Endpoints) -> bool,
    ) -> Option<StateID> {
        self.kinds.iter().position(|kind| match *kind {
            StateKind::InitialOrFinal(ref e) => role(e),
            _ => false,
        })
        // State indices were checked against the ID limit in add_state.
        .map(StateID::new_unchecked)
    }

    fn facts(&self, transitions: &[Transition]) -> Facts {
        let mut facts = Facts::default();
        for kind in self.kinds.iter() {
            match *kind {
                StateKind::LookAround { index, .. } => {
                    facts.look_around_count = core::cmp::max(
                        facts.look_around_count,
                        index + 1,
                    );
                }
                StateKind::BackReference { .. } => {
                    facts.has_back_reference = true;
                }
                _ => {}
            }
        }
        facts.writes_capture_groups = transitions.iter().any(|t| {
            t.boundaries
                .update_indices()
                .iter()
                .chain(t.boundaries.clear_indices().iter())
                .any(|slot| slot >= 2)
        });
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nfa::pure::nfa::CharSet;

    fn char_state(builder: &mut Builder, unit: char) -> StateID {
        builder
            .add_state(StateKind::CharClass(CharSet::single(unit as u32)))
            .unwrap()
    }

    #[test]
    fn rejects_dangling_transition_endpoint() {
        let mut builder = Builder::new();
        let init = builder.add_initial_state().unwrap();
        builder.add_transition(
            init,
            StateID::must(7),
            GroupBoundaries::empty(),
        );
        assert!(builder.build().is_err());
    }

    #[test]
    fn rejects_out_of_range_slot() {
        let mut builder = Builder::new();
        let init = builder.add_initial_state().unwrap();
        let fin = builder.add_final_state().unwrap();
        builder.add_transition(init, fin, GroupBoundaries::updates(&[4]));
        assert!(builder.build().is_err());
    }

    #[test]
    fn rejects_missing_endpoints() {
        let mut builder = Builder::new();
        let _ = char_state(&mut builder, 'a');
        assert!(builder.build().is_err());
    }

    #[test]
    fn loop_back_is_lowest_priority() {
        let mut builder = Builder::new();
        builder.initial_loop_back(true);
        let init = builder.add_initial_state().unwrap();
        let a = char_state(&mut builder, 'a');
        let fin = builder.add_final_state().unwrap();
        builder.add_transition(init, a, GroupBoundaries::updates(&[0]));
        builder.add_transition(a, fin, GroupBoundaries::updates(&[1]));
        let nfa = builder.build().unwrap();

        let succs = nfa.state(init).successors(true);
        assert_eq!(2, succs.len());
        // The appended loop-back self transition comes after the entry.
        assert_eq!(a, nfa.transition(succs[0]).target(true));
        assert_eq!(init, nfa.transition(succs[1]).target(true));
    }

    #[test]
    fn derives_backward_lists() {
        let mut builder = Builder::new();
        let init = builder.add_initial_state().unwrap();
        let a = char_state(&mut builder, 'a');
        let fin = builder.add_final_state().unwrap();
        builder.add_transition(init, a, GroupBoundaries::empty());
        builder.add_transition(a, a, GroupBoundaries::empty());
        builder.add_transition(a, fin, GroupBoundaries::empty());
        let nfa = builder.build().unwrap();

        // Backward successors of 'a' are the reverse edges: the ones whose
        // forward target is 'a'.
        let back = nfa.state(a).successors(false);
        assert_eq!(2, back.len());
        assert_eq!(init, nfa.transition(back[0]).target(false));
        assert_eq!(a, nfa.transition(back[1]).target(false));
    }

    #[test]
    fn writes_capture_groups_ignores_group_zero() {
        let mut builder = Builder::new();
        builder.group_count(2);
        let init = builder.add_initial_state().unwrap();
        let fin = builder.add_final_state().unwrap();
        builder.add_transition(init, fin, GroupBoundaries::updates(&[0, 1]));
        assert!(!builder.build().unwrap().writes_capture_groups());

        let mut builder = Builder::new();
        builder.group_count(2);
        let init = builder.add_initial_state().unwrap();
        let fin = builder.add_final_state().unwrap();
        builder.add_transition(init, fin, GroupBoundaries::updates(&[2, 3]));
        assert!(builder.build().unwrap().writes_capture_groups());
    }
}
