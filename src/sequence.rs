//! Probe-action sequences and their exhaustive enumeration.
//!
//! A [`Sequence`] is an ordered, duplicate-free list of up to
//! [`Action::COUNT`] probe actions. [`Sequence::next_sequence`] steps
//! through every such sequence in a canonical deterministic order — a pure
//! function of its input, so enumeration is reproducible and testable in
//! isolation from any player. [`SequenceIter`] wraps it as a fused
//! iterator.
//!
//! The order is that of a radix-style counter over the action alphabet:
//! positions are scanned left to right, a position past the last action
//! wraps back to the first and carries right, and any candidate containing
//! a duplicate action is skipped by repeating the increment. Carrying past
//! the last position signals exhaustion.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// One probe action exercised against a player session.
///
/// The variants form a small closed alphabet; their declaration order is
/// the enumeration order of the sequence counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Ask the player to start readying frames.
    Prefetch,
    /// Fetch stream info and check the reported dimensions.
    FetchInfo,
    /// Request and verify the frame at t=0.
    Start,
    /// Request overlapping and out-of-order frames mid-stream.
    Middle,
    /// Probe the end-of-stream saturation boundary.
    End,
}

impl Action {
    /// Number of distinct actions.
    pub const COUNT: usize = 5;

    /// All actions in enumeration order.
    pub const ALL: [Action; Action::COUNT] = [
        Action::Prefetch,
        Action::FetchInfo,
        Action::Start,
        Action::Middle,
        Action::End,
    ];

    /// Position of this action in the enumeration order.
    pub fn index(self) -> usize {
        match self {
            Action::Prefetch => 0,
            Action::FetchInfo => 1,
            Action::Start => 2,
            Action::Middle => 3,
            Action::End => 4,
        }
    }

    /// Short name used in sequence labels.
    pub fn name(self) -> &'static str {
        match self {
            Action::Prefetch => "prefetch",
            Action::FetchInfo => "fetchinfo",
            Action::Start => "start",
            Action::Middle => "middle",
            Action::End => "end",
        }
    }
}

/// An ordered, duplicate-free list of up to [`Action::COUNT`] actions.
///
/// Unused trailing slots are `None`; a `None` slot is never followed by a
/// populated one. The duplicate-free invariant is the enumerator's core
/// correctness property and holds for every sequence it emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Sequence {
    slots: [Option<Action>; Action::COUNT],
}

impl Sequence {
    /// The empty sequence — the canonical enumeration start state.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a sequence from actions, for tests and direct re-runs.
    ///
    /// # Panics
    ///
    /// Panics if more than [`Action::COUNT`] actions are given.
    pub fn of(actions: &[Action]) -> Self {
        assert!(actions.len() <= Action::COUNT, "too many actions");
        let mut slots = [None; Action::COUNT];
        for (slot, &action) in slots.iter_mut().zip(actions) {
            *slot = Some(action);
        }
        Self { slots }
    }

    /// Actions of this sequence in execution order.
    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.slots.iter().take_while(|s| s.is_some()).filter_map(|s| *s)
    }

    /// Number of actions in this sequence.
    pub fn len(&self) -> usize {
        self.actions().count()
    }

    /// Whether this sequence holds no actions.
    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    /// Total number of sequences the enumeration visits: all duplicate-free
    /// sequences of length 1..=K over K actions, `sum_{n=1..K} K!/(K-n)!`.
    pub fn total_count() -> u64 {
        let k = Action::COUNT as u64;
        let mut total = 0;
        let mut arrangements = 1;
        for n in 1..=k {
            arrangements *= k - n + 1;
            total += arrangements;
        }
        total
    }

    /// The sequence following `self` in enumeration order, or `None` once
    /// the enumeration is exhausted.
    ///
    /// Pure function: calling it twice on the same value yields the same
    /// result. Starting from [`Sequence::empty`] and chaining visits every
    /// duplicate-free sequence exactly once.
    pub fn next_sequence(&self) -> Option<Sequence> {
        let mut candidate = self.increment()?;
        // Candidates with repeated actions are not part of the enumeration;
        // keep incrementing until a duplicate-free one appears. The counter
        // is strictly increasing over a finite space, so this terminates.
        while candidate.has_duplicate() {
            candidate = candidate.increment()?;
        }
        Some(candidate)
    }

    /// Raw radix increment with carry, ignoring the duplicate-free rule.
    ///
    /// Slots are digits over the action alphabet, position 0 most
    /// significant for carry purposes. Returns `None` when the carry runs
    /// past the last slot.
    fn increment(&self) -> Option<Sequence> {
        let mut slots = [None; Action::COUNT];
        let mut carry = true;
        let mut i = 0;
        loop {
            if i == Action::COUNT {
                // A carry past the last slot would need a sequence longer
                // than the alphabet; that is exhaustion. Without a pending
                // carry the candidate is simply full-length.
                if carry {
                    return None;
                }
                break;
            }
            let current = self.slots[i];
            if current.is_none() && !carry {
                break;
            }
            let mut digit = current.map_or(0, |a| a.index() + 1);
            if carry {
                digit += 1;
                if digit > Action::COUNT {
                    digit = 1; // wrap to the first action, keep carrying
                } else {
                    carry = false;
                }
            }
            slots[i] = Some(Action::ALL[digit - 1]);
            i += 1;
        }
        Some(Sequence { slots })
    }

    /// Whether any action appears twice.
    fn has_duplicate(&self) -> bool {
        let mut seen = 0u8;
        for action in self.actions() {
            let bit = 1 << action.index();
            if seen & bit != 0 {
                return true;
            }
            seen |= bit;
        }
        false
    }

    /// Iterate every sequence in enumeration order.
    pub fn iter_all() -> SequenceIter {
        SequenceIter {
            current: Some(Sequence::empty()),
        }
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        for (i, action) in self.actions().enumerate() {
            if i > 0 {
                write!(f, "-")?;
            }
            write!(f, "{}", action.name())?;
        }
        Ok(())
    }
}

/// Fused iterator over the full enumeration, starting from the empty
/// sequence. Two independent iterators yield identical sequences in
/// identical order.
#[derive(Debug, Clone)]
pub struct SequenceIter {
    current: Option<Sequence>,
}

impl Iterator for SequenceIter {
    type Item = Sequence;

    fn next(&mut self) -> Option<Sequence> {
        let next = self.current.as_ref()?.next_sequence();
        self.current = next;
        next
    }
}

impl std::iter::FusedIterator for SequenceIter {}
