//! The probe actions exercised against a player session.
//!
//! Each [`Action`](crate::sequence::Action) is bound to a probe function in
//! an [`ActionRegistry`] — an explicit ordered table constructed once and
//! passed by reference to the executor. Every frame a probe acquires is an
//! owned [`Frame`](crate::player::Frame) and is released when it goes out
//! of scope, on success and failure paths alike.

use crate::error::SeekcheckError;
use crate::oracle::{FRAME_PERIOD, SweepFlags, check_frame};
use crate::player::{Frame, PlayerSession};
use crate::sequence::Action;

/// Width of the synthetic test clip.
pub const CLIP_WIDTH: u32 = 16;

/// Height of the synthetic test clip.
pub const CLIP_HEIGHT: u32 = 16;

/// A probe routine run against a session under the active sweep flags.
pub type ProbeFn = fn(&mut dyn PlayerSession, SweepFlags) -> Result<(), SeekcheckError>;

/// Binds one action to its probe routine.
#[derive(Debug, Clone, Copy)]
pub struct ProbeDescriptor {
    /// The action this descriptor implements.
    pub action: Action,
    /// The probe routine.
    pub run: ProbeFn,
}

impl ProbeDescriptor {
    /// Short name of the action, used in labels and logs.
    pub fn name(&self) -> &'static str {
        self.action.name()
    }
}

/// The fixed, ordered catalog of probe actions.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    probes: [ProbeDescriptor; Action::COUNT],
}

impl ActionRegistry {
    /// The standard registry: one probe per action, in enumeration order.
    pub fn standard() -> Self {
        Self {
            probes: [
                ProbeDescriptor {
                    action: Action::Prefetch,
                    run: probe_prefetch,
                },
                ProbeDescriptor {
                    action: Action::FetchInfo,
                    run: probe_fetch_info,
                },
                ProbeDescriptor {
                    action: Action::Start,
                    run: probe_start,
                },
                ProbeDescriptor {
                    action: Action::Middle,
                    run: probe_middle,
                },
                ProbeDescriptor {
                    action: Action::End,
                    run: probe_end,
                },
            ],
        }
    }

    /// Look up the descriptor for an action.
    pub fn get(&self, action: Action) -> &ProbeDescriptor {
        &self.probes[action.index()]
    }

    /// Descriptors in enumeration order.
    pub fn descriptors(&self) -> &[ProbeDescriptor] {
        &self.probes
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn expect_frame(
    session: &mut dyn PlayerSession,
    time: f64,
) -> Result<Frame, SeekcheckError> {
    session
        .frame_at(time)?
        .ok_or(SeekcheckError::MissingFrame { requested: time })
}

fn expect_next(
    session: &mut dyn PlayerSession,
    expected_time: f64,
) -> Result<Frame, SeekcheckError> {
    session
        .next_frame()?
        .ok_or(SeekcheckError::MissingFrame {
            requested: expected_time,
        })
}

fn probe_prefetch(
    session: &mut dyn PlayerSession,
    _flags: SweepFlags,
) -> Result<(), SeekcheckError> {
    session.prefetch()
}

fn probe_fetch_info(
    session: &mut dyn PlayerSession,
    _flags: SweepFlags,
) -> Result<(), SeekcheckError> {
    let info = session.info()?;
    if info.width != CLIP_WIDTH || info.height != CLIP_HEIGHT {
        return Err(SeekcheckError::InfoMismatch {
            expected_width: CLIP_WIDTH,
            expected_height: CLIP_HEIGHT,
            width: info.width,
            height: info.height,
        });
    }
    Ok(())
}

fn probe_start(
    session: &mut dyn PlayerSession,
    flags: SweepFlags,
) -> Result<(), SeekcheckError> {
    let frame = expect_frame(session, 0.0)?;
    check_frame(&frame, 0.0, flags)
}

/// Overlapping and out-of-order requests mid-stream, then sequential
/// next-frame delivery after the backward seek, then the exact-seek
/// non-redelivery rule: a request mapping to the source frame already
/// delivered must come back empty, while the near-duplicate direct seek is
/// accepted.
fn probe_middle(
    session: &mut dyn PlayerSession,
    flags: SweepFlags,
) -> Result<(), SeekcheckError> {
    let f0 = expect_frame(session, 30.0)?;
    let f1 = expect_frame(session, 30.1)?;
    let f2 = expect_frame(session, 30.2)?;
    let f3 = expect_frame(session, 15.0)?;
    let f4 = expect_next(session, 15.0 + FRAME_PERIOD)?;
    let f5 = expect_next(session, 15.0 + 2.0 * FRAME_PERIOD)?;

    check_frame(&f0, 30.0, flags)?;
    check_frame(&f1, 30.1, flags)?;
    check_frame(&f2, 30.2, flags)?;
    check_frame(&f3, 15.0, flags)?;
    check_frame(&f4, 15.0 + FRAME_PERIOD, flags)?;
    check_frame(&f5, 15.0 + 2.0 * FRAME_PERIOD, flags)?;

    drop((f0, f1, f2, f3, f4, f5));

    let f6 = expect_next(session, 15.0 + 3.0 * FRAME_PERIOD)?;
    check_frame(&f6, 15.0 + 3.0 * FRAME_PERIOD, flags)?;

    let f7 = expect_frame(session, 16.0)?;
    check_frame(&f7, 16.0, flags)?;

    // 16.001 maps to the source frame just delivered for 16.0.
    if let Some(f8) = session.frame_at(16.001)? {
        return Err(SeekcheckError::UnexpectedFrame {
            requested: 16.001,
            ts: f8.ts,
        });
    }

    Ok(())
}

/// End-of-stream saturation is bounded, not absolute: a request far past
/// the end still yields the terminal frame, but a second far-past request
/// maps to that same terminal frame and must come back empty.
fn probe_end(
    session: &mut dyn PlayerSession,
    _flags: SweepFlags,
) -> Result<(), SeekcheckError> {
    let last = expect_frame(session, 999_999.0)?;
    drop(last);

    if let Some(frame) = session.frame_at(99_999.0)? {
        return Err(SeekcheckError::UnexpectedFrame {
            requested: 99_999.0,
            ts: frame.ts,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_is_ordered_by_action() {
        let registry = ActionRegistry::standard();
        for action in Action::ALL {
            assert_eq!(registry.get(action).action, action);
        }
        let names: Vec<_> = registry.descriptors().iter().map(|d| d.name()).collect();
        assert_eq!(names, ["prefetch", "fetchinfo", "start", "middle", "end"]);
    }
}
