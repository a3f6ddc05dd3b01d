use crate::util::primitives::StateID;

/// An error that can occur during the construction of a pure NFA or of the
/// executor wired on top of one.
///
/// This error does not provide many introspection capabilities. There is
/// generally only one thing you can do with it: obtain a human readable
/// message via its `std::fmt::Display` impl.
///
/// Errors of this kind always indicate a malformed graph or a malformed
/// executor wiring, never a property of a haystack. Once `build` has
/// succeeded, a search can no longer trip over any of these conditions.
#[derive(Clone, Debug)]
pub struct BuildError {
    kind: BuildErrorKind,
}

/// The kind of error that occurred during the construction of a pure NFA.
#[derive(Clone, Debug)]
enum BuildErrorKind {
    /// An error that occurs if too many states are added to the graph.
    TooManyStates {
        /// The number of states requested, which exceeds the limit.
        given: usize,
        /// The limit on the number of states.
        limit: usize,
    },
    /// An error that occurs when a transition refers to a state that was
    /// never added.
    UnknownState {
        /// The invalid state identifier.
        id: usize,
    },
    /// An error that occurs when a backreference names a capture group
    /// beyond the declared group count.
    UnknownGroup {
        /// The invalid group number.
        group: usize,
    },
    /// An error that occurs when a transition's boundary spec touches a
    /// capture slot beyond the declared group count.
    UnknownSlot {
        /// The invalid slot index.
        slot: usize,
    },
    /// An error that occurs when a quantifier guard uses a counter slot
    /// beyond the declared quantifier count.
    UnknownQuantifier {
        /// The invalid counter slot.
        index: usize,
    },
    /// An error that occurs when a quantifier guard uses a zero-width
    /// witness slot beyond the declared count.
    UnknownZeroWidth {
        /// The invalid witness slot.
        index: usize,
    },
    /// An error that occurs when no state is flagged as an initial state.
    NoInitialState,
    /// An error that occurs when no state is flagged as a final state.
    NoFinalState,
    /// An error that occurs when a look-around state names a sub-executor
    /// that the registry given to the executor builder does not contain.
    UnknownLookAround {
        /// The invalid look-around index.
        index: usize,
    },
    /// An error that occurs when a registered sub-executor disagrees with
    /// its parent on the frame layout (capture, quantifier or zero-width
    /// counts). All executors of one family must share one layout so that
    /// frames can be spliced between them.
    LookAroundLayout {
        /// The look-around index of the offending sub-executor.
        index: usize,
    },
}

impl BuildError {
    fn kind(&self) -> &BuildErrorKind {
        &self.kind
    }

    pub(crate) fn too_many_states(given: usize) -> BuildError {
        let limit = StateID::LIMIT;
        BuildError { kind: BuildErrorKind::TooManyStates { given, limit } }
    }

    pub(crate) fn unknown_state(id: usize) -> BuildError {
        BuildError { kind: BuildErrorKind::UnknownState { id } }
    }

    pub(crate) fn unknown_group(group: usize) -> BuildError {
        BuildError { kind: BuildErrorKind::UnknownGroup { group } }
    }

    pub(crate) fn unknown_slot(slot: usize) -> BuildError {
        BuildError { kind: BuildErrorKind::UnknownSlot { slot } }
    }

    pub(crate) fn unknown_quantifier(index: usize) -> BuildError {
        BuildError { kind: BuildErrorKind::UnknownQuantifier { index } }
    }

    pub(crate) fn unknown_zero_width(index: usize) -> BuildError {
        BuildError { kind: BuildErrorKind::UnknownZeroWidth { index } }
    }

    pub(crate) fn no_initial_state() -> BuildError {
        BuildError { kind: BuildErrorKind::NoInitialState }
    }

    pub(crate) fn no_final_state() -> BuildError {
        BuildError { kind: BuildErrorKind::NoFinalState }
    }

    pub(crate) fn unknown_look_around(index: usize) -> BuildError {
        BuildError { kind: BuildErrorKind::UnknownLookAround { index } }
    }

    pub(crate) fn look_around_layout(index: usize) -> BuildError {
        BuildError { kind: BuildErrorKind::LookAroundLayout { index } }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BuildError {}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self.kind() {
            BuildErrorKind::TooManyStates { given, limit } => write!(
                f,
                "attempted to add {} NFA states, \
                 which exceeds the limit of {}",
                given, limit,
            ),
            BuildErrorKind::UnknownState { id } => write!(
                f,
                "transition refers to state {}, which does not exist",
                id,
            ),
            BuildErrorKind::UnknownGroup { group } => write!(
                f,
                "backreference refers to capture group {}, \
                 which exceeds the declared group count",
                group,
            ),
            BuildErrorKind::UnknownSlot { slot } => write!(
                f,
                "boundary spec touches capture slot {}, \
                 which exceeds the declared group count",
                slot,
            ),
            BuildErrorKind::UnknownQuantifier { index } => write!(
                f,
                "quantifier guard uses counter slot {}, \
                 which exceeds the declared quantifier count",
                index,
            ),
            BuildErrorKind::UnknownZeroWidth { index } => write!(
                f,
                "quantifier guard uses zero-width witness slot {}, \
                 which exceeds the declared count",
                index,
            ),
            BuildErrorKind::NoInitialState => {
                write!(f, "graph has no state flagged as an initial state")
            }
            BuildErrorKind::NoFinalState => {
                write!(f, "graph has no state flagged as a final state")
            }
            BuildErrorKind::UnknownLookAround { index } => write!(
                f,
                "look-around state refers to sub-executor {}, \
                 but no such executor was registered",
                index,
            ),
            BuildErrorKind::LookAroundLayout { index } => write!(
                f,
                "sub-executor {} disagrees with its parent on the frame \
                 layout (capture, quantifier or zero-width counts)",
                index,
            ),
        }
    }
}
