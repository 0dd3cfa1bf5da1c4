//! Error types for the `seekcheck` crate.
//!
//! This module defines [`SeekcheckError`], the unified error type returned by
//! all fallible operations in the crate. Verification failures carry enough
//! context (requested time, clipped expected time, observed values, numeric
//! difference) to reproduce the failing case deterministically from the same
//! source file.

use std::io::Error as IoError;

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `seekcheck` operations.
///
/// Every public method that can fail returns `Result<T, SeekcheckError>`.
/// There is no retry anywhere in the crate: the harness is a correctness
/// oracle, and the first failure aborts the sequence, the configuration,
/// and the run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SeekcheckError {
    /// The media source could not be opened as a player session.
    #[error("failed to open media source {source_name}: {reason}")]
    SessionCreate {
        /// Source identifier the player was asked to open.
        source_name: String,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The source does not contain a video stream.
    #[error("no video stream found in source")]
    NoVideoStream,

    /// The source does not contain an audio stream.
    #[error("no audio stream found in source")]
    NoAudioStream,

    /// A frame could not be decoded.
    #[error("failed to decode frame: {0}")]
    Decode(String),

    /// A frame was expected at the requested time but none was returned.
    #[error("no frame returned for request at t={requested:.6}")]
    MissingFrame {
        /// Playback time that was requested.
        requested: f64,
    },

    /// A frame came back where the contract requires the player to return
    /// nothing (exact-seek redelivery, or a request too far past the end).
    #[error("got a frame (ts={ts:.6}) for request at t={requested:.6} where none was expected")]
    UnexpectedFrame {
        /// Playback time that was requested.
        requested: f64,
        /// Timestamp of the frame that should not have been delivered.
        ts: f64,
    },

    /// Stream info did not match the expected dimensions.
    #[error("stream reports {width}x{height}, expected {expected_width}x{expected_height}")]
    InfoMismatch {
        /// Expected frame width.
        expected_width: u32,
        /// Expected frame height.
        expected_height: u32,
        /// Width the player reported.
        width: u32,
        /// Height the player reported.
        height: u32,
    },

    /// The frame's presentation timestamp is outside tolerance of the
    /// analytically expected playback time.
    #[error(
        "requested t={requested:.6} (clipped to {playback:.6}), got frame ts={frame_ts:.6}, \
         corresponding to t={estimated:.6} (with skew={skew:.6}), diff={diff:.6}"
    )]
    TimestampMismatch {
        /// Playback time that was requested.
        requested: f64,
        /// Expected playback time after clipping to the trim duration.
        playback: f64,
        /// Timestamp the frame reported.
        frame_ts: f64,
        /// Playback time the frame timestamp maps back to.
        estimated: f64,
        /// Skew active for this configuration.
        skew: f64,
        /// Absolute difference between expected and estimated time.
        diff: f64,
    },

    /// The frame identifier embedded in the first pixel maps to a source
    /// timestamp outside tolerance of the expected playback time.
    #[error(
        "requested t={requested:.6} (clipped to {playback:.6}), got video ts={video_ts:.6} \
         (frame id #{frame_id}), corresponding to t={estimated:.6} (with skew={skew:.6}), \
         diff={diff:.6}"
    )]
    FrameIdMismatch {
        /// Playback time that was requested.
        requested: f64,
        /// Expected playback time after clipping to the trim duration.
        playback: f64,
        /// Frame identifier decoded from the first pixel.
        frame_id: u32,
        /// Source timestamp the frame identifier maps to.
        video_ts: f64,
        /// Playback time the decoded identifier maps back to.
        estimated: f64,
        /// Skew active for this configuration.
        skew: f64,
        /// Absolute difference between expected and estimated time.
        diff: f64,
    },

    /// A video frame carried no pixel data to decode an identifier from.
    #[error("video frame at t={requested:.6} carries no pixel data")]
    MissingFrameData {
        /// Playback time that was requested.
        requested: f64,
    },

    /// The two passes of the next-frame walk disagreed on frame count.
    #[error("next-frame walk yielded {second} frames on the second pass, expected {first}")]
    WalkMismatch {
        /// Frame count of the first pass.
        first: u64,
        /// Frame count of the second pass.
        second: u64,
    },

    /// A probe failed while executing an action sequence. Names the sweep
    /// configuration and the sequence so the case can be re-run directly.
    #[error("sequence '{sequence}' failed under configuration '{configuration}'")]
    SequenceFailed {
        /// Label of the option-flag configuration that was active.
        configuration: String,
        /// Label of the action sequence that was executing.
        sequence: String,
        /// The probe failure that aborted the sequence.
        #[source]
        source: Box<SeekcheckError>,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// An error from the `image` crate while saving a frame.
    #[error("image processing error: {0}")]
    Image(#[from] ImageError),
}

impl SeekcheckError {
    /// The requested playback time attached to this failure, if any.
    ///
    /// Unwraps [`SeekcheckError::SequenceFailed`] wrappers, so callers can
    /// re-fetch the offending frame for a failure surfaced by the sweep.
    pub fn requested_time(&self) -> Option<f64> {
        match self {
            SeekcheckError::MissingFrame { requested }
            | SeekcheckError::UnexpectedFrame { requested, .. }
            | SeekcheckError::TimestampMismatch { requested, .. }
            | SeekcheckError::FrameIdMismatch { requested, .. }
            | SeekcheckError::MissingFrameData { requested } => Some(*requested),
            SeekcheckError::SequenceFailed { source, .. } => source.requested_time(),
            _ => None,
        }
    }
}

impl From<FfmpegError> for SeekcheckError {
    fn from(error: FfmpegError) -> Self {
        SeekcheckError::Ffmpeg(error.to_string())
    }
}
