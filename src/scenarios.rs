//! Fixed-input smoke scenarios run before the combinatorial sweep.
//!
//! These exercise contract corners a sequence sweep can't reach: a
//! single-image source, a source that does not exist, and a full
//! sequential walk of the stream.

use crate::error::SeekcheckError;
use crate::player::{Player, PlayerSession, SessionOptions};

/// Open an image source, request a frame far past its (zero-length)
/// timeline — which must saturate to the only frame — and check the
/// reported dimensions.
pub fn image_probe<P: Player>(
    player: &P,
    source: &str,
    expected_width: u32,
    expected_height: u32,
) -> Result<(), SeekcheckError> {
    log::info!("image probe: {source}");
    let mut session = player.open(source, &SessionOptions::default())?;

    let frame = session
        .frame_at(53.0)?
        .ok_or(SeekcheckError::MissingFrame { requested: 53.0 })?;
    log::debug!("image frame: ts={:.3} {}x{}", frame.ts, frame.width, frame.height);
    drop(frame);

    let info = session.info()?;
    if info.width != expected_width || info.height != expected_height {
        return Err(SeekcheckError::InfoMismatch {
            expected_width,
            expected_height,
            width: info.width,
            height: info.height,
        });
    }
    Ok(())
}

/// Probe session lifecycle and logging against a source that does not
/// exist. A clean creation failure passes. A player that opens lazily may
/// hand out a session, but it must never materialize frames for an
/// unreadable source, including at negative and early times.
pub fn missing_source_probe<P: Player>(player: &P) -> Result<(), SeekcheckError> {
    let source = "/i/do/not/exist";
    match player.open(source, &SessionOptions::default()) {
        Err(error) => {
            log::info!("missing source rejected cleanly: {error}");
            Ok(())
        }
        Ok(mut session) => {
            for time in [-1.0, 1.0, 3.0] {
                if let Ok(Some(frame)) = session.frame_at(time) {
                    return Err(SeekcheckError::UnexpectedFrame {
                        requested: time,
                        ts: frame.ts,
                    });
                }
            }
            Ok(())
        }
    }
}

/// Walk the entire stream twice through next-frame calls only.
///
/// After end of stream returns nothing, a subsequent walk must start over
/// from the beginning, and both passes must yield the same frame count.
/// Returns that count.
pub fn next_frame_walk<P: Player>(player: &P, source: &str) -> Result<u64, SeekcheckError> {
    let mut session = player.open(source, &SessionOptions::default())?;
    let mut counts = [0u64; 2];

    for (pass, count) in counts.iter_mut().enumerate() {
        log::info!("next-frame walk, pass {}", pass + 1);
        while let Some(frame) = session.next_frame()? {
            log::debug!(
                "frame #{count} ts={:.3} {}x{}",
                frame.ts,
                frame.width,
                frame.height
            );
            *count += 1;
        }
    }

    if counts[0] != counts[1] {
        return Err(SeekcheckError::WalkMismatch {
            first: counts[0],
            second: counts[1],
        });
    }
    Ok(counts[0])
}
