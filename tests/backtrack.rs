/*!
End to end tests for the backtracking executor.

There is no pattern compiler in this crate, so every test assembles its
graph by hand through the builder, the way a front end would lower its
AST. Each helper below is named after the concrete pattern its graph
implements.
*/

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use regex_backtrack::{
    nfa::pure::{
        backtrack::{Backtracker, Config},
        Builder, CharSet, GroupBoundaries, GuardKind, Quantifier,
        QuantifierGuard, StateKind,
    },
    Captures, Span,
};

fn word() -> CharSet {
    CharSet::new([
        ('a' as u32, 'z' as u32),
        ('A' as u32, 'Z' as u32),
        ('0' as u32, '9' as u32),
        ('_' as u32, '_' as u32),
    ])
}

fn digit() -> CharSet {
    CharSet::range('0' as u32, '9' as u32)
}

fn ch(c: char) -> CharSet {
    CharSet::single(c as u32)
}

fn find(re: &Backtracker, haystack: &[u8]) -> Option<Captures> {
    let mut frame = re.create_frame(haystack, 0, 0, haystack.len());
    re.execute(&mut frame, true).unwrap()
}

fn spans(caps: &Captures) -> Vec<Option<(usize, usize)>> {
    caps.iter().map(|s| s.map(|s| (s.start, s.end))).collect()
}

/// The graph for `(a+)(a+)`: both groups greedy, so the first group takes
/// everything it can and gives back one unit for the second.
fn greedy_split() -> Backtracker {
    let mut builder = Builder::new();
    builder.group_count(3);
    let init = builder.add_initial_state().unwrap();
    let one = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let two = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, one, GroupBoundaries::updates(&[0, 2]));
    builder.add_transition(one, one, GroupBoundaries::empty());
    builder.add_transition(one, two, GroupBoundaries::updates(&[3, 4]));
    builder.add_transition(two, two, GroupBoundaries::empty());
    builder.add_transition(two, fin, GroupBoundaries::updates(&[5, 1]));
    Backtracker::new(builder.build().unwrap()).unwrap()
}

/// The graph for `(a+?)(a+)`: identical to `greedy_split` except the
/// first group lists its exit before its loop.
fn reluctant_split() -> Backtracker {
    let mut builder = Builder::new();
    builder.group_count(3);
    let init = builder.add_initial_state().unwrap();
    let one = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let two = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, one, GroupBoundaries::updates(&[0, 2]));
    builder.add_transition(one, two, GroupBoundaries::updates(&[3, 4]));
    builder.add_transition(one, one, GroupBoundaries::empty());
    builder.add_transition(two, two, GroupBoundaries::empty());
    builder.add_transition(two, fin, GroupBoundaries::updates(&[5, 1]));
    Backtracker::new(builder.build().unwrap()).unwrap()
}

/// The graph for `(\w+) \1`, unanchored.
fn word_backref(config: Config) -> Backtracker {
    let mut builder = Builder::new();
    builder.group_count(2).initial_loop_back(true);
    let init = builder.add_initial_state().unwrap();
    let w = builder.add_state(StateKind::CharClass(word())).unwrap();
    let sp = builder.add_state(StateKind::CharClass(ch(' '))).unwrap();
    let br =
        builder.add_state(StateKind::BackReference { group: 1 }).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, w, GroupBoundaries::updates(&[0, 2]));
    builder.add_transition(w, w, GroupBoundaries::empty());
    builder.add_transition(w, sp, GroupBoundaries::updates(&[3]));
    builder.add_transition(sp, br, GroupBoundaries::empty());
    builder.add_transition(br, fin, GroupBoundaries::updates(&[1]));
    Backtracker::builder()
        .configure(config)
        .build(builder.build().unwrap())
        .unwrap()
}

/// The graph for `(?=(\d+))\d`: a positive lookahead whose subtree writes
/// capture group 1.
fn lookahead_writes_captures() -> Backtracker {
    let mut sub = Builder::new();
    sub.group_count(2);
    let sinit = sub.add_initial_state().unwrap();
    let sd = sub.add_state(StateKind::CharClass(digit())).unwrap();
    let sfin = sub.add_final_state().unwrap();
    sub.add_transition(sinit, sd, GroupBoundaries::updates(&[2]));
    sub.add_transition(sd, sd, GroupBoundaries::empty());
    sub.add_transition(sd, sfin, GroupBoundaries::updates(&[3]));
    let sub = Backtracker::new(sub.build().unwrap()).unwrap();

    let mut builder = Builder::new();
    builder.group_count(2);
    let init = builder.add_initial_state().unwrap();
    let la = builder
        .add_state(StateKind::LookAround { index: 0, negated: false })
        .unwrap();
    let d = builder.add_state(StateKind::CharClass(digit())).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, la, GroupBoundaries::updates(&[0]));
    builder.add_transition(la, d, GroupBoundaries::empty());
    builder.add_transition(d, fin, GroupBoundaries::updates(&[1]));
    Backtracker::with_look_arounds(builder.build().unwrap(), vec![sub])
        .unwrap()
}

/// The graph for `a(?!b)`, unanchored.
fn negative_lookahead() -> Backtracker {
    let mut sub = Builder::new();
    let sinit = sub.add_initial_state().unwrap();
    let sb = sub.add_state(StateKind::CharClass(ch('b'))).unwrap();
    let sfin = sub.add_final_state().unwrap();
    sub.add_transition(sinit, sb, GroupBoundaries::empty());
    sub.add_transition(sb, sfin, GroupBoundaries::empty());
    let sub = Backtracker::new(sub.build().unwrap()).unwrap();

    let mut builder = Builder::new();
    builder.initial_loop_back(true);
    let init = builder.add_initial_state().unwrap();
    let a = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let la = builder
        .add_state(StateKind::LookAround { index: 0, negated: true })
        .unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, a, GroupBoundaries::updates(&[0]));
    builder.add_transition(a, la, GroupBoundaries::empty());
    builder.add_transition(la, fin, GroupBoundaries::updates(&[1]));
    Backtracker::with_look_arounds(builder.build().unwrap(), vec![sub])
        .unwrap()
}

/// The graph for `(?<=a)b`, unanchored: the lookbehind subtree runs as a
/// reverse executor.
fn lookbehind() -> Backtracker {
    let mut sub = Builder::new();
    let sinit = sub.add_initial_state().unwrap();
    let sa = sub.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let sfin = sub.add_final_state().unwrap();
    sub.add_transition(sinit, sa, GroupBoundaries::empty());
    sub.add_transition(sa, sfin, GroupBoundaries::empty());
    let sub = Backtracker::builder()
        .configure(Config::new().reverse(true))
        .build(sub.build().unwrap())
        .unwrap();

    let mut builder = Builder::new();
    builder.initial_loop_back(true);
    let init = builder.add_initial_state().unwrap();
    let la = builder
        .add_state(StateKind::LookAround { index: 0, negated: false })
        .unwrap();
    let b = builder.add_state(StateKind::CharClass(ch('b'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, la, GroupBoundaries::updates(&[0]));
    builder.add_transition(la, b, GroupBoundaries::empty());
    builder.add_transition(b, fin, GroupBoundaries::updates(&[1]));
    Backtracker::with_look_arounds(builder.build().unwrap(), vec![sub])
        .unwrap()
}

/// The graph for `(a){2,4}`: a counted quantifier over a capturing body.
fn counted(min: u32, max: u32) -> Backtracker {
    let q = Quantifier::counted(0, min, Some(max));
    let mut builder = Builder::new();
    builder.group_count(2).quantifier_count(1);
    let init = builder.add_initial_state().unwrap();
    let a = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_guarded_transition(
        init,
        a,
        GroupBoundaries::updates(&[0, 2]),
        false,
        false,
        vec![QuantifierGuard::new(GuardKind::Enter, q)],
    );
    builder.add_guarded_transition(
        a,
        a,
        GroupBoundaries::updates(&[3, 2]),
        false,
        false,
        vec![QuantifierGuard::new(GuardKind::Loop, q)],
    );
    builder.add_guarded_transition(
        a,
        fin,
        GroupBoundaries::updates(&[3, 1]),
        false,
        false,
        vec![QuantifierGuard::new(GuardKind::Exit, q)],
    );
    Backtracker::new(builder.build().unwrap()).unwrap()
}

/// The graph for `(a*)*b`: a star over a possibly-empty capturing body,
/// guarded by a zero-width witness so that empty iterations cannot loop.
fn star_star(loop_back: bool) -> Backtracker {
    let q = Quantifier::uncounted().with_zero_width(0);
    let enter = QuantifierGuard::new(GuardKind::EnterZeroWidth, q);
    let exit = QuantifierGuard::new(GuardKind::ExitZeroWidth, q);
    let mut builder = Builder::new();
    builder
        .group_count(2)
        .zero_width_count(1)
        .initial_loop_back(loop_back);
    let init = builder.add_initial_state().unwrap();
    let a = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let e = builder.add_state(StateKind::EmptyMatch).unwrap();
    let b = builder.add_state(StateKind::CharClass(ch('b'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    // Enter the star with a body that consumes, with an empty body, or
    // skip it entirely, in decreasing priority.
    builder.add_guarded_transition(
        init,
        a,
        GroupBoundaries::updates(&[0, 2]),
        false,
        false,
        vec![enter],
    );
    builder.add_guarded_transition(
        init,
        e,
        GroupBoundaries::updates(&[0, 2]),
        false,
        false,
        vec![enter],
    );
    builder.add_transition(init, b, GroupBoundaries::updates(&[0]));
    // The body loop and the junction closing one iteration.
    builder.add_transition(a, a, GroupBoundaries::empty());
    builder.add_transition(a, e, GroupBoundaries::empty());
    // Iterate again (consuming or empty) or leave the star.
    builder.add_guarded_transition(
        e,
        a,
        GroupBoundaries::updates(&[3, 2]),
        false,
        false,
        vec![exit, enter],
    );
    builder.add_guarded_transition(
        e,
        e,
        GroupBoundaries::updates(&[3, 2]),
        false,
        false,
        vec![exit, enter],
    );
    builder.add_guarded_transition(
        e,
        b,
        GroupBoundaries::updates(&[3]),
        false,
        false,
        vec![exit],
    );
    builder.add_transition(b, fin, GroupBoundaries::updates(&[1]));
    Backtracker::new(builder.build().unwrap()).unwrap()
}

/// A graph in the shape of `(?:^){2,}x`: a counted quantifier whose body
/// is a caret assertion, exercising the empty-match absorption rule. With
/// `caret` disabled the body is a plain empty match instead.
fn empty_match_min(caret: bool) -> Backtracker {
    let q = Quantifier::counted(0, 2, Some(4));
    let mut builder = Builder::new();
    builder.quantifier_count(1).initial_loop_back(true);
    let init = builder.add_initial_state().unwrap();
    let e = builder.add_state(StateKind::EmptyMatch).unwrap();
    let x = builder.add_state(StateKind::CharClass(ch('x'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_guarded_transition(
        init,
        e,
        GroupBoundaries::updates(&[0]),
        caret,
        false,
        vec![QuantifierGuard::new(GuardKind::EnterEmptyMatch, q)],
    );
    builder.add_guarded_transition(
        e,
        e,
        GroupBoundaries::empty(),
        caret,
        false,
        vec![QuantifierGuard::new(GuardKind::EnterEmptyMatch, q)],
    );
    builder.add_guarded_transition(
        e,
        x,
        GroupBoundaries::empty(),
        false,
        false,
        vec![QuantifierGuard::new(GuardKind::Exit, q)],
    );
    builder.add_transition(x, fin, GroupBoundaries::updates(&[1]));
    Backtracker::new(builder.build().unwrap()).unwrap()
}

/// The graph for `ab|a`: alternation priority decides ties.
fn alternation() -> Backtracker {
    let mut builder = Builder::new();
    let init = builder.add_initial_state().unwrap();
    let a1 = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let b1 = builder.add_state(StateKind::CharClass(ch('b'))).unwrap();
    let a2 = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, a1, GroupBoundaries::updates(&[0]));
    builder.add_transition(init, a2, GroupBoundaries::updates(&[0]));
    builder.add_transition(a1, b1, GroupBoundaries::empty());
    builder.add_transition(b1, fin, GroupBoundaries::updates(&[1]));
    builder.add_transition(a2, fin, GroupBoundaries::updates(&[1]));
    Backtracker::new(builder.build().unwrap()).unwrap()
}

/// The graph for `ab`, optionally unanchored.
fn literal_ab(loop_back: bool) -> Backtracker {
    let mut builder = Builder::new();
    builder.initial_loop_back(loop_back);
    let init = builder.add_initial_state().unwrap();
    let a = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let b = builder.add_state(StateKind::CharClass(ch('b'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, a, GroupBoundaries::updates(&[0]));
    builder.add_transition(a, b, GroupBoundaries::empty());
    builder.add_transition(b, fin, GroupBoundaries::updates(&[1]));
    Backtracker::new(builder.build().unwrap()).unwrap()
}

/// The graph for `(a)(?!\1)`: a backreference inside a look-around,
/// resolved against a group closed by the transition entering it.
fn capture_then_not_backref() -> Backtracker {
    let mut sub = Builder::new();
    sub.group_count(2);
    let sinit = sub.add_initial_state().unwrap();
    let sbr = sub.add_state(StateKind::BackReference { group: 1 }).unwrap();
    let sfin = sub.add_final_state().unwrap();
    sub.add_transition(sinit, sbr, GroupBoundaries::empty());
    sub.add_transition(sbr, sfin, GroupBoundaries::empty());
    let sub = Backtracker::new(sub.build().unwrap()).unwrap();

    let mut builder = Builder::new();
    builder.group_count(2).initial_loop_back(true);
    let init = builder.add_initial_state().unwrap();
    let a = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let la = builder
        .add_state(StateKind::LookAround { index: 0, negated: true })
        .unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, a, GroupBoundaries::updates(&[0, 2]));
    builder.add_transition(a, la, GroupBoundaries::updates(&[3]));
    builder.add_transition(la, fin, GroupBoundaries::updates(&[1]));
    Backtracker::with_look_arounds(builder.build().unwrap(), vec![sub])
        .unwrap()
}

/// A graph where a capture-writing lookahead guards a branch that can
/// die later, with a lower-priority branch behind it: `(?=(\d))\dy|1` in
/// spirit.
fn lookahead_then_dead_branch() -> Backtracker {
    let mut sub = Builder::new();
    sub.group_count(2);
    let sinit = sub.add_initial_state().unwrap();
    let sd = sub.add_state(StateKind::CharClass(digit())).unwrap();
    let sfin = sub.add_final_state().unwrap();
    sub.add_transition(sinit, sd, GroupBoundaries::updates(&[2]));
    sub.add_transition(sd, sfin, GroupBoundaries::updates(&[3]));
    let sub = Backtracker::new(sub.build().unwrap()).unwrap();

    let mut builder = Builder::new();
    builder.group_count(2);
    let init = builder.add_initial_state().unwrap();
    let la = builder
        .add_state(StateKind::LookAround { index: 0, negated: false })
        .unwrap();
    let d = builder.add_state(StateKind::CharClass(digit())).unwrap();
    let y = builder.add_state(StateKind::CharClass(ch('y'))).unwrap();
    let one = builder.add_state(StateKind::CharClass(ch('1'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, la, GroupBoundaries::updates(&[0]));
    builder.add_transition(init, one, GroupBoundaries::updates(&[0]));
    builder.add_transition(la, d, GroupBoundaries::empty());
    builder.add_transition(d, y, GroupBoundaries::empty());
    builder.add_transition(y, fin, GroupBoundaries::updates(&[1]));
    builder.add_transition(one, fin, GroupBoundaries::updates(&[1]));
    Backtracker::with_look_arounds(builder.build().unwrap(), vec![sub])
        .unwrap()
}

#[test]
fn greedy_split_prefers_long_first_group() {
    let caps = find(&greedy_split(), b"aaaa").unwrap();
    assert_eq!(
        vec![Some((0, 4)), Some((0, 3)), Some((3, 4))],
        spans(&caps),
    );
}

#[test]
fn reluctant_split_prefers_short_first_group() {
    let caps = find(&reluctant_split(), b"aaaa").unwrap();
    assert_eq!(
        vec![Some((0, 4)), Some((0, 1)), Some((1, 4))],
        spans(&caps),
    );
}

#[test]
fn greedy_split_needs_two_units() {
    assert!(find(&greedy_split(), b"a").is_none());
    assert!(find(&greedy_split(), b"").is_none());
    assert!(find(&reluctant_split(), b"aa").is_some());
}

#[test]
fn backref_repeats_captured_word() {
    let re = word_backref(Config::new());
    let caps = find(&re, b"foo foo").unwrap();
    assert_eq!(vec![Some((0, 7)), Some((0, 3))], spans(&caps));
    assert!(find(&re, b"foo bar").is_none());
}

#[test]
fn backref_finds_later_start_positions() {
    let re = word_backref(Config::new());
    // The leftmost viable start is inside the second word.
    let caps = find(&re, b"ab xy xy").unwrap();
    assert_eq!(vec![Some((3, 8)), Some((3, 5))], spans(&caps));
}

#[test]
fn backref_folds_case_when_asked() {
    let sensitive = word_backref(Config::new());
    assert!(find(&sensitive, b"foo FOO").is_none());

    let insensitive = word_backref(Config::new().ignore_case(true));
    let caps = find(&insensitive, b"foo FOO").unwrap();
    assert_eq!(vec![Some((0, 7)), Some((0, 3))], spans(&caps));
}

#[test]
fn backref_honors_custom_fold_predicate() {
    // A folding that identifies 'o' and '0' and nothing else.
    fn leet(a: u32, b: u32) -> bool {
        a == b || (a.min(b) == '0' as u32 && a.max(b) == 'o' as u32)
    }
    let re = word_backref(Config::new().ignore_case(true).fold(leet));
    let caps = find(&re, b"foo f00").unwrap();
    assert_eq!(vec![Some((0, 7)), Some((0, 3))], spans(&caps));
    assert!(find(&re, b"foo FOO").is_none());
}

#[test]
fn positive_lookahead_writes_capture() {
    let caps = find(&lookahead_writes_captures(), b"123").unwrap();
    assert_eq!(vec![Some((0, 1)), Some((0, 3))], spans(&caps));
}

#[test]
fn negative_lookahead_moves_past_rejected_position() {
    let caps = find(&negative_lookahead(), b"ab ac").unwrap();
    assert_eq!(vec![Some((3, 4))], spans(&caps));
    assert!(find(&negative_lookahead(), b"ab").is_none());
    // At the very end there is nothing to forbid.
    let caps = find(&negative_lookahead(), b"ba").unwrap();
    assert_eq!(vec![Some((1, 2))], spans(&caps));
}

#[test]
fn lookbehind_requires_preceding_unit() {
    let caps = find(&lookbehind(), b"ab").unwrap();
    assert_eq!(vec![Some((1, 2))], spans(&caps));
    assert!(find(&lookbehind(), b"b").is_none());
    assert!(find(&lookbehind(), b"cb").is_none());
    let caps = find(&lookbehind(), b"cbab").unwrap();
    assert_eq!(vec![Some((3, 4))], spans(&caps));
}

#[test]
fn counted_quantifier_respects_bounds() {
    let re = counted(2, 4);
    assert!(find(&re, b"a").is_none());
    let caps = find(&re, b"aaa").unwrap();
    assert_eq!(vec![Some((0, 3)), Some((2, 3))], spans(&caps));
    // Greedy, but capped at four iterations.
    let caps = find(&re, b"aaaaaa").unwrap();
    assert_eq!(vec![Some((0, 4)), Some((3, 4))], spans(&caps));
}

#[test]
fn star_over_empty_body_terminates() {
    let re = star_star(false);
    // The dangerous case: the star can iterate with an empty body, and a
    // naive engine loops forever here.
    assert!(find(&re, b"aaaac").is_none());
    assert!(find(&re, b"").is_none());

    let caps = find(&re, b"aaab").unwrap();
    assert_eq!(vec![Some((0, 4)), Some((0, 3))], spans(&caps));
    // On a bare "b" the skip branch wins and the group never matches.
    let caps = find(&re, b"b").unwrap();
    assert_eq!(vec![Some((0, 1)), None], spans(&caps));
}

#[test]
fn star_over_empty_body_is_linear_on_matches() {
    // A match runs straight through: the guard cuts the one empty
    // iteration the greedy path attempts at the end, and the deferred
    // alternatives are never popped.
    let n = 5_000;
    let mut haystack = vec![b'a'; n];
    haystack.push(b'b');
    let caps = find(&star_star(false), &haystack).unwrap();
    assert_eq!(vec![Some((0, n + 1)), Some((0, n))], spans(&caps));

    // A failing search still enumerates the ways of splitting the run
    // into iterations, so keep the run short here. The point is that it
    // terminates; without the guard it would not.
    let n = 16;
    let mut haystack = vec![b'a'; n];
    haystack.push(b'c');
    assert!(find(&star_star(true), &haystack).is_none());
}

#[test]
fn empty_match_absorption_jumps_to_min() {
    // Without an anchor guard the mandatory empty iterations are taken
    // in one step, so the pattern matches at any position.
    let re = empty_match_min(false);
    let caps = find(&re, b"yx").unwrap();
    assert_eq!(vec![Some((1, 2))], spans(&caps));

    // With a caret guard each iteration is counted one by one and the
    // guard pins them all to position zero.
    let re = empty_match_min(true);
    let caps = find(&re, b"x").unwrap();
    assert_eq!(vec![Some((0, 1))], spans(&caps));
    assert!(find(&re, b"yx").is_none());
}

#[test]
fn alternation_prefers_first_branch() {
    let caps = find(&alternation(), b"ab").unwrap();
    assert_eq!(vec![Some((0, 2))], spans(&caps));
    // The first branch dies at the end of input; the second wins.
    let caps = find(&alternation(), b"a").unwrap();
    assert_eq!(vec![Some((0, 1))], spans(&caps));
}

#[test]
fn loop_back_tries_each_start_position() {
    let re = literal_ab(true);
    let caps = find(&re, b"xxab").unwrap();
    assert_eq!(vec![Some((2, 4))], spans(&caps));

    // A later from_index skips earlier occurrences.
    let haystack = b"abab";
    let mut frame = re.create_frame(haystack, 1, 1, haystack.len());
    let caps = re.execute(&mut frame, true).unwrap().unwrap();
    assert_eq!(vec![Some((2, 4))], spans(&caps));
}

#[test]
fn no_loop_back_means_sticky() {
    let re = literal_ab(false);
    assert!(find(&re, b"xab").is_none());
    assert!(find(&re, b"ab").is_some());
}

#[test]
fn frame_reset_reuses_allocation() {
    let re = literal_ab(true);
    let haystack = b"ab xx ab";
    let mut frame = re.create_frame(haystack, 0, 0, haystack.len());
    let caps = re.execute(&mut frame, true).unwrap().unwrap();
    assert_eq!(Some(Span::from(0..2)), caps.get_group(0));

    frame.reset(2, 2, haystack.len());
    let caps = re.execute(&mut frame, true).unwrap().unwrap();
    assert_eq!(Some(Span::from(6..8)), caps.get_group(0));
}

#[test]
fn reverse_root_run_reports_forward_offsets() {
    // Execute the `ab` graph right-to-left from the right edge. The
    // boundary stamps land on the same offsets as a forward run.
    let mut builder = Builder::new();
    let init = builder.add_initial_state().unwrap();
    let a = builder.add_state(StateKind::CharClass(ch('a'))).unwrap();
    let b = builder.add_state(StateKind::CharClass(ch('b'))).unwrap();
    let fin = builder.add_final_state().unwrap();
    builder.add_transition(init, a, GroupBoundaries::updates(&[0]));
    builder.add_transition(a, b, GroupBoundaries::empty());
    builder.add_transition(b, fin, GroupBoundaries::updates(&[1]));
    let re = Backtracker::builder()
        .configure(Config::new().reverse(true))
        .build(builder.build().unwrap())
        .unwrap();

    let haystack = b"ab";
    let mut frame = re.create_frame(haystack, 0, haystack.len(), haystack.len());
    let caps = re.execute(&mut frame, true).unwrap().unwrap();
    assert_eq!(vec![Some((0, 2))], spans(&caps));
}

#[test]
fn backref_sees_boundary_overlay_of_inlined_lookahead() {
    let re = capture_then_not_backref();
    // `(a)(?!\1)` on "ab": group 1 is closed by the very transition that
    // enters the look-around, so the subtree must see its end boundary
    // through the overlay.
    let caps = find(&re, b"ab").unwrap();
    assert_eq!(vec![Some((0, 1)), Some((0, 1))], spans(&caps));
    // On "aa" the first position is rejected and the match happens at
    // the last 'a', where nothing can follow.
    let caps = find(&re, b"aa").unwrap();
    assert_eq!(vec![Some((1, 2)), Some((1, 2))], spans(&caps));
}

#[test]
fn abandoned_lookahead_branch_rolls_captures_back() {
    let re = lookahead_then_dead_branch();
    // On "1" the lookahead succeeds and splices group 1, but its branch
    // then dies looking for 'y'. The surviving branch must not see the
    // splice.
    let caps = find(&re, b"1").unwrap();
    assert_eq!(vec![Some((0, 1)), None], spans(&caps));
    // On "1y" the lookahead branch survives and group 1 stays spliced.
    let caps = find(&re, b"1y").unwrap();
    assert_eq!(vec![Some((0, 2)), Some((0, 1))], spans(&caps));
}

#[test]
fn wide_haystacks_use_u16_units() {
    // "ab" as little-endian UTF-16, with offsets in units.
    let re = literal_ab(true);
    let haystack = &[b'x', 0, b'a', 0, b'b', 0];
    let mut frame = re.create_frame(haystack, 0, 0, 3);
    let caps = re.execute(&mut frame, false).unwrap().unwrap();
    assert_eq!(vec![Some((1, 3))], spans(&caps));
}

#[test]
fn cancellation_stops_the_search() {
    let flag = Arc::new(AtomicBool::new(true));
    let re = word_backref(Config::new().cancelled(Arc::clone(&flag)));
    let haystack = b"foo foo";
    let mut frame = re.create_frame(haystack, 0, 0, haystack.len());
    let err = re.execute(&mut frame, true).unwrap_err();
    assert!(err.to_string().contains("cancelled"));

    // Clearing the flag lets the same frame run to completion.
    flag.store(false, Ordering::SeqCst);
    frame.reset(0, 0, haystack.len());
    assert!(re.execute(&mut frame, true).unwrap().is_some());
}

#[test]
fn capture_spans_are_well_formed() {
    fn well_formed(caps: &Captures, len: usize) -> bool {
        caps.iter().all(|span| match span {
            None => true,
            Some(s) => s.start <= s.end && s.end <= len,
        })
    }

    fn backref_prop(bytes: Vec<u8>) -> bool {
        let re = word_backref(Config::new());
        let mut frame = re.create_frame(&bytes, 0, 0, bytes.len());
        match re.execute(&mut frame, true).unwrap() {
            None => true,
            Some(caps) => well_formed(&caps, bytes.len()),
        }
    }

    fn star_star_prop(seed: Vec<bool>) -> bool {
        // Arbitrary short strings over {a, b}: the star graph must
        // terminate on all of them and match exactly when a 'b' occurs.
        // Failing searches are exponential in the trailing 'a' run, so
        // the length is capped.
        let bytes: Vec<u8> = seed
            .iter()
            .take(20)
            .map(|&b| if b { b'b' } else { b'a' })
            .collect();
        let re = star_star(true);
        let mut frame = re.create_frame(&bytes, 0, 0, bytes.len());
        let result = re.execute(&mut frame, true).unwrap();
        result.is_some() == bytes.contains(&b'b')
    }

    quickcheck::quickcheck(backref_prop as fn(Vec<u8>) -> bool);
    quickcheck::quickcheck(star_star_prop as fn(Vec<bool>) -> bool);
}
