/*!
A collection of modules that provide APIs that are useful across many regex
engines.

While one should explore the sub-modules directly to get a sense of what's
there, here are some highlights that tie the sub-modules to higher level
use cases:

* `util::input` is the cursor the matcher uses to read code units out of a
haystack without caring how they are stored.
* `util::captures` contains the [`Captures`](captures::Captures) type,
which represents the offsets of a match and its capturing groups.
* `util::primitives` contains the index newtypes used to address NFA
states.
* `util::search` contains [`Span`](search::Span) and
[`MatchError`](search::MatchError), the common vocabulary of every search
routine.
*/

pub mod captures;
pub mod input;
pub mod primitives;
pub mod search;
