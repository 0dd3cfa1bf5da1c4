//! The frame verification oracle.
//!
//! Given a requested playback time and the option flags active for the
//! current sweep configuration, [`check_frame`] computes the analytically
//! expected presentation time — and, for synthetic video, the expected
//! embedded frame identifier — and rejects any frame outside one
//! source-frame-period of tolerance.

use crate::error::SeekcheckError;
use crate::player::{Frame, SessionOptions, StreamSelect};

/// Nominal frame rate of the synthetic test video.
pub const SOURCE_FPS: f64 = 25.0;

/// One source-frame period; the verification tolerance for every timestamp
/// comparison.
pub const FRAME_PERIOD: f64 = 1.0 / SOURCE_FPS;

/// Skew applied when the skew flag is active.
pub const TEST_SKEW: f64 = 7.12;

/// Trim duration applied when the trim flag is active.
pub const TEST_TRIM_DURATION: f64 = 53.43;

/// The independent option modifiers of one sweep configuration.
///
/// The default sweep exercises the four skew × trim combinations on the
/// video stream; the audio variants are structurally supported but off by
/// default (audio frames skip identifier verification).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SweepFlags {
    /// Apply [`TEST_SKEW`] to expected timestamps.
    pub skew: bool,
    /// Clamp expected playback time to [`TEST_TRIM_DURATION`].
    pub trim: bool,
    /// Select the audio stream instead of video.
    pub audio: bool,
}

impl SweepFlags {
    /// The skew in effect under these flags.
    pub fn skew_value(self) -> f64 {
        if self.skew { TEST_SKEW } else { 0.0 }
    }

    /// The trim duration in effect under these flags.
    pub fn trim_value(self) -> Option<f64> {
        self.trim.then_some(TEST_TRIM_DURATION)
    }

    /// Ground-truth playback time for a request: the requested time clipped
    /// to `[0, trim_duration]` (unbounded when trim is off).
    pub fn expected_time(self, requested: f64) -> f64 {
        requested.clamp(0.0, self.trim_value().unwrap_or(f64::MAX))
    }

    /// Session options matching these flags.
    pub fn session_options(self) -> SessionOptions {
        SessionOptions {
            disable_hwaccel: true,
            skew: self.skew_value(),
            trim_duration: self.trim_value(),
            select: if self.audio {
                StreamSelect::Audio
            } else {
                StreamSelect::Video
            },
        }
    }

    /// Human-readable configuration label, e.g. `video-skew-trimdur`.
    pub fn label(self) -> String {
        let mut label = String::from(if self.audio { "audio" } else { "video" });
        if self.skew {
            label.push_str("-skew");
        }
        if self.trim {
            label.push_str("-trimdur");
        }
        label
    }

    /// The four configurations of the default sweep, in run order.
    pub fn default_sweep() -> [SweepFlags; 4] {
        [
            SweepFlags::default(),
            SweepFlags {
                skew: true,
                ..SweepFlags::default()
            },
            SweepFlags {
                trim: true,
                ..SweepFlags::default()
            },
            SweepFlags {
                skew: true,
                trim: true,
                ..SweepFlags::default()
            },
        ]
    }

    /// The audio-selected counterparts of the default sweep.
    pub fn audio_sweep() -> [SweepFlags; 4] {
        SweepFlags::default_sweep().map(|flags| SweepFlags {
            audio: true,
            ..flags
        })
    }
}

/// Verify a frame against the analytically expected values for a request at
/// `requested` seconds under `flags`.
///
/// Two independent checks must pass, in this order:
///
/// 1. for video, the frame identifier embedded in the first pixel must map
///    back (via [`SOURCE_FPS`] and the active skew) to within
///    [`FRAME_PERIOD`] of the clipped expected time;
/// 2. the frame's presentation timestamp must map back likewise.
///
/// Audio frames skip the identifier check — the pixel encoding is a
/// convention of the synthetic test video only. Either failure carries the
/// full set of observed and expected values.
pub fn check_frame(
    frame: &Frame,
    requested: f64,
    flags: SweepFlags,
) -> Result<(), SeekcheckError> {
    let playback = flags.expected_time(requested);
    let skew = flags.skew_value();

    if !flags.audio {
        let frame_id = frame
            .frame_id()
            .ok_or(SeekcheckError::MissingFrameData { requested })?;
        let video_ts = f64::from(frame_id) / SOURCE_FPS;
        let estimated = video_ts - skew;
        let diff = (playback - estimated).abs();
        if diff > FRAME_PERIOD {
            return Err(SeekcheckError::FrameIdMismatch {
                requested,
                playback,
                frame_id,
                video_ts,
                estimated,
                skew,
                diff,
            });
        }
    }

    let estimated = frame.ts - skew;
    let diff = (playback - estimated).abs();
    if diff > FRAME_PERIOD {
        return Err(SeekcheckError::TimestampMismatch {
            requested,
            playback,
            frame_ts: frame.ts,
            estimated,
            skew,
            diff,
        });
    }

    Ok(())
}
