//! Enumeration properties of the action-sequence counter.

use std::collections::HashSet;

use seekcheck::{Action, Sequence};

/// All duplicate-free sequences of length 1..=5 over 5 actions.
const EXPECTED_TOTAL: u64 = 5 + 20 + 60 + 120 + 120;

#[test]
fn analytic_total_matches_the_formula() {
    assert_eq!(Sequence::total_count(), EXPECTED_TOTAL);
}

#[test]
fn enumeration_is_complete_and_terminates() {
    let sequences: Vec<Sequence> = Sequence::iter_all().collect();
    assert_eq!(sequences.len() as u64, EXPECTED_TOTAL);

    // Exhaustion is final: the last sequence has no successor.
    let last = sequences.last().expect("enumeration is non-empty");
    assert!(last.next_sequence().is_none());
}

#[test]
fn every_sequence_is_visited_exactly_once() {
    let mut seen = HashSet::new();
    for sequence in Sequence::iter_all() {
        assert!(seen.insert(sequence), "sequence visited twice: {sequence}");
    }
    assert_eq!(seen.len() as u64, EXPECTED_TOTAL);
}

#[test]
fn no_sequence_contains_a_duplicate_action() {
    for sequence in Sequence::iter_all() {
        let mut actions = HashSet::new();
        for action in sequence.actions() {
            assert!(
                actions.insert(action),
                "action {} repeated in {sequence}",
                action.name()
            );
        }
        assert!(!sequence.is_empty());
        assert!(sequence.len() <= Action::COUNT);
    }
}

#[test]
fn enumeration_is_deterministic() {
    let first: Vec<Sequence> = Sequence::iter_all().collect();
    let second: Vec<Sequence> = Sequence::iter_all().collect();
    assert_eq!(first, second);
}

#[test]
fn iterator_is_fused() {
    let mut iter = Sequence::iter_all();
    for _ in 0..EXPECTED_TOTAL {
        assert!(iter.next().is_some());
    }
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
}

#[test]
fn single_action_sequences_come_first_in_declaration_order() {
    let head: Vec<Sequence> = Sequence::iter_all().take(10).collect();
    let expected = [
        Sequence::of(&[Action::Prefetch]),
        Sequence::of(&[Action::FetchInfo]),
        Sequence::of(&[Action::Start]),
        Sequence::of(&[Action::Middle]),
        Sequence::of(&[Action::End]),
        Sequence::of(&[Action::FetchInfo, Action::Prefetch]),
        Sequence::of(&[Action::Start, Action::Prefetch]),
        Sequence::of(&[Action::Middle, Action::Prefetch]),
        Sequence::of(&[Action::End, Action::Prefetch]),
        Sequence::of(&[Action::Prefetch, Action::FetchInfo]),
    ];
    assert_eq!(head, expected);
}

#[test]
fn lengths_grow_from_one_to_the_action_count() {
    let lengths: Vec<usize> = Sequence::iter_all().map(|s| s.len()).collect();
    assert_eq!(lengths.iter().copied().min(), Some(1));
    assert_eq!(lengths.iter().copied().max(), Some(Action::COUNT));

    // Count per length matches the number of partial permutations.
    for (length, expected) in [(1usize, 5usize), (2, 20), (3, 60), (4, 120), (5, 120)] {
        assert_eq!(
            lengths.iter().filter(|&&l| l == length).count(),
            expected,
            "wrong count for length {length}"
        );
    }
}

#[test]
fn next_sequence_is_a_pure_function() {
    let start = Sequence::of(&[Action::End, Action::Prefetch]);
    assert_eq!(start.next_sequence(), start.next_sequence());
}
