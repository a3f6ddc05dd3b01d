/*!
A backtracking executor for *pure* NFAs.

A pure NFA is an explicit state graph whose states are classified by
semantic kind (character class, look-around, backreference, empty match)
rather than by encoded byte opcodes. Backtracking over such a graph is the
strategy of last resort for a regex front end: it is what you run when an
expression cannot be compiled to a DFA because it contains backreferences,
counted quantifiers that need runtime counters, or look-around whose
acceptance depends on captured positions.

This crate owns only the execution half of that story. Building the graph
from a pattern, Unicode tables and the outer "find the next match" loop all
live with the caller. The caller hands an assembled [`nfa::pure::NFA`] to a
[`Backtracker`](nfa::pure::backtrack::Backtracker) and drives it through
[`create_frame`](nfa::pure::backtrack::Backtracker::create_frame) and
[`execute`](nfa::pure::backtrack::Backtracker::execute).

# Example

This builds a tiny graph for the pattern `(a+)(a+)` by hand and resolves
its capturing groups. (A real front end would lower its AST into the
builder instead.)

```
use regex_backtrack::{
    nfa::pure::{backtrack::Backtracker, Builder, CharSet, GroupBoundaries, StateKind},
    Span,
};

let mut builder = Builder::new();
builder.group_count(3);
let init = builder.add_initial_state()?;
let one = builder.add_state(StateKind::CharClass(CharSet::single('a' as u32)))?;
let two = builder.add_state(StateKind::CharClass(CharSet::single('a' as u32)))?;
let fin = builder.add_final_state()?;
// Priority is list order: for each state, the loop comes before the exit,
// which makes both groups greedy.
builder.add_transition(init, one, GroupBoundaries::updates(&[0, 2]));
builder.add_transition(one, one, GroupBoundaries::empty());
builder.add_transition(one, two, GroupBoundaries::updates(&[3, 4]));
builder.add_transition(two, two, GroupBoundaries::empty());
builder.add_transition(two, fin, GroupBoundaries::updates(&[5, 1]));
let nfa = builder.build()?;

let re = Backtracker::new(nfa)?;
let haystack = b"aaaa";
let mut frame = re.create_frame(haystack, 0, 0, haystack.len());
let caps = re.execute(&mut frame, true)?.unwrap();
assert_eq!(Some(Span::from(0..4)), caps.get_group(0));
assert_eq!(Some(Span::from(0..3)), caps.get_group(1));
assert_eq!(Some(Span::from(3..4)), caps.get_group(2));
# Ok::<(), Box<dyn std::error::Error>>(())
```

# Crate features

* **std** (enabled by default) - Adds `std::error::Error` impls for the
error types. The crate is otherwise `no_std` compatible (it does require
`alloc`).
* **logging** - Emits some trace messages via the `log` crate, mostly
around search entry and exit. There is intentionally no logging inside the
per-state dispatch loop.
*/

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]

extern crate alloc;

pub use crate::util::{
    captures::Captures,
    search::{MatchError, Span},
};

// Wrappers around the 'log' crate macros so that call sites don't need any
// cfg dance. When the 'logging' feature is disabled these compile to
// nothing, arguments unevaluated.
#[cfg(feature = "logging")]
macro_rules! debug {
    ($($tt:tt)*) => { log::debug!($($tt)*) }
}
#[cfg(not(feature = "logging"))]
macro_rules! debug {
    ($($tt:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! trace {
    ($($tt:tt)*) => { log::trace!($($tt)*) }
}
#[cfg(not(feature = "logging"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

pub mod nfa;
pub mod util;
