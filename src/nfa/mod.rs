/*!
Provides non-deterministic finite automata (NFA) and the regex engine that
executes them directly.

Only one NFA family lives here currently: the [`pure`] NFA, whose states
are classified semantically rather than encoded as byte instructions, and
its backtracking executor. The pure NFA is what a regex front end compiles
to when an expression cannot be handled by any automaton that forbids
backtracking, most prominently when the expression contains
backreferences.
*/

pub mod pure;
