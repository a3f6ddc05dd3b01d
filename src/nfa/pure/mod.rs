/*!
Defines the pure NFA data model and its backtracking executor.

A pure NFA ([`NFA`]) is an immutable prioritized graph assembled through a
[`Builder`]. The [`backtrack`] module contains the
[`Backtracker`](backtrack::Backtracker), which executes such a graph over a
haystack with classical leftmost, priority-ordered backtracking semantics:
greedy and reluctant quantifiers fall out of transition order, counted
quantifiers out of the guards on transitions, and look-around out of
nested executor instances.

The split mirrors how the types are used: everything in this module is
built once per pattern and shared freely; everything a search mutates
lives in a [`Frame`](backtrack::Frame) created per match attempt.
*/

pub use self::{
    builder::Builder,
    error::BuildError,
    nfa::{
        CharSet, Endpoints, GroupBoundaries, GuardKind, Quantifier,
        QuantifierGuard, SlotSet, SlotSetIter, State, StateKind, Transition,
        NFA,
    },
};

pub mod backtrack;
mod builder;
mod error;
mod nfa;
