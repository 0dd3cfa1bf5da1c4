//! The abstract player-session contract the harness verifies.
//!
//! The harness never talks to a playback engine directly; it drives any
//! implementation of [`Player`] and [`PlayerSession`]. The crate ships two:
//! [`FfmpegPlayer`](crate::playback::FfmpegPlayer), backed by FFmpeg, and
//! [`ModelPlayer`](crate::model::ModelPlayer), an analytic in-memory player
//! used by the test suite.
//!
//! Frame release is expressed through ownership: a [`Frame`] is an owned
//! value, released exactly once when dropped, on every exit path. A session
//! is owned exclusively by one caller from creation to drop and is never
//! shared across action sequences.

use image::RgbImage;

use crate::error::SeekcheckError;

/// Which stream of the source a session decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamSelect {
    /// The best video stream (default).
    #[default]
    Video,
    /// The best audio stream.
    Audio,
}

/// Options applied to a session at creation time.
///
/// Mirrors the option surface of the playback engines this harness targets:
/// hardware acceleration opt-out, a constant time skew mapping playback time
/// to media time, an optional trim duration clamping playback, and stream
/// selection.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Force the software decode path. The harness always sets this so runs
    /// are reproducible across machines.
    pub disable_hwaccel: bool,
    /// Seconds added to every playback time before it is mapped to media
    /// time. Frame timestamps are reported in media time, so they come back
    /// shifted by this amount.
    pub skew: f64,
    /// Maximum playback time; requests beyond it are clamped. `None` leaves
    /// playback unbounded.
    pub trim_duration: Option<f64>,
    /// Stream to decode.
    pub select: StreamSelect,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            disable_hwaccel: true,
            skew: 0.0,
            trim_duration: None,
            select: StreamSelect::Video,
        }
    }
}

/// Source-level information reported by a session.
///
/// Dimensions and frame rate describe the source's video stream regardless
/// of which stream the session decodes (0 when the source has no video).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    /// Video frame width in pixels.
    pub width: u32,
    /// Video frame height in pixels.
    pub height: u32,
    /// Total duration of the source in seconds.
    pub duration: f64,
    /// Nominal frame rate of the video stream.
    pub frame_rate: f64,
}

/// The kind of media a frame was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// A video frame carrying packed RGB24 pixel data.
    Video,
    /// An audio frame; carries no pixel data.
    Audio,
}

/// A decoded frame handed out by a session.
///
/// The frame owns its pixel data; dropping it releases the frame. Video
/// frames carry tightly-packed RGB24 data (no row padding).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Presentation timestamp in seconds of media time.
    pub ts: f64,
    /// Whether this is a video or audio frame.
    pub kind: FrameKind,
    /// Frame width in pixels (0 for audio).
    pub width: u32,
    /// Frame height in pixels (0 for audio).
    pub height: u32,
    /// Packed RGB24 pixel data, row-major. Empty for audio frames.
    pub data: Vec<u8>,
}

impl Frame {
    /// Decode the per-frame identifier embedded in the first pixel of
    /// synthetic test video.
    ///
    /// The identifier is split across the high nibbles of the R, G, and B
    /// channels: `id = (r >> 4) << 8 | (g >> 4) << 4 | (b >> 4)`. Returns
    /// `None` for audio frames or frames without pixel data — the encoding
    /// is a test-fixture convention, not a general media property.
    pub fn frame_id(&self) -> Option<u32> {
        if self.kind != FrameKind::Video || self.data.len() < 3 {
            return None;
        }
        let r = u32::from(self.data[0] >> 4);
        let g = u32::from(self.data[1] >> 4);
        let b = u32::from(self.data[2] >> 4);
        Some(r << 8 | g << 4 | b)
    }

    /// Convert a video frame to an [`RgbImage`], e.g. to save a failing
    /// frame for inspection. Returns `None` for audio frames or when the
    /// pixel data does not match the declared dimensions.
    pub fn to_image(&self) -> Option<RgbImage> {
        if self.kind != FrameKind::Video {
            return None;
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }
}

/// Map a media time onto a frame grid running at `rate` frames per second.
///
/// The displayed frame is the one whose interval contains the time (floor),
/// with a small epsilon so times that are exact grid points in decimal but
/// sit a few ulps below them in binary still land on their own frame.
/// Players doing this mapping in stream time-base integers get that for
/// free; with `f64` seconds it has to be compensated.
pub(crate) fn media_index(media_time: f64, rate: f64) -> i64 {
    (media_time * rate + 1e-6).floor() as i64
}

/// One playback session over one source.
///
/// All calls are blocking; the harness treats them as synchronous requests
/// returning on completion. Implementations keep whatever decode state they
/// need between calls, but the observable contract is:
///
/// - [`frame_at`](PlayerSession::frame_at) returns the frame covering the
///   requested playback time under the active options, or `None` when that
///   frame is the one most recently delivered (exact-seek non-redelivery)
///   — which also bounds end-of-stream saturation;
/// - [`next_frame`](PlayerSession::next_frame) returns the source frame
///   immediately following the last delivered one, `None` at end of stream,
///   after which a subsequent walk starts over from the beginning.
pub trait PlayerSession {
    /// Ask the player to start readying frames. Advisory; a session must
    /// behave identically whether or not this was called.
    fn prefetch(&mut self) -> Result<(), SeekcheckError>;

    /// Fetch stream information.
    fn info(&mut self) -> Result<MediaInfo, SeekcheckError>;

    /// Request the frame at playback time `time` (seconds).
    fn frame_at(&mut self, time: f64) -> Result<Option<Frame>, SeekcheckError>;

    /// Request the frame immediately following the last delivered one.
    fn next_frame(&mut self) -> Result<Option<Frame>, SeekcheckError>;
}

/// A factory opening sessions on a source.
pub trait Player {
    /// The session type this player produces.
    type Session: PlayerSession;

    /// Open a session on `source` with the given options applied before any
    /// frame is served.
    fn open(&self, source: &str, options: &SessionOptions)
    -> Result<Self::Session, SeekcheckError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_frame(data: Vec<u8>) -> Frame {
        Frame {
            ts: 0.0,
            kind: FrameKind::Video,
            width: 1,
            height: 1,
            data,
        }
    }

    #[test]
    fn frame_id_unpacks_high_nibbles() {
        // id 0x2f5 -> nibbles 2, 15, 5 in the channel high nibbles.
        let frame = video_frame(vec![0x20, 0xf0, 0x50]);
        assert_eq!(frame.frame_id(), Some(0x2f5));
    }

    #[test]
    fn frame_id_ignores_low_nibbles() {
        let frame = video_frame(vec![0x2a, 0xfb, 0x5c]);
        assert_eq!(frame.frame_id(), Some(0x2f5));
    }

    #[test]
    fn media_index_compensates_for_binary_float_error() {
        // 16.0 + 7.12 is 577.9999999999999 grid units in f64; the mapping
        // must still land on frame 578, where 16.001 + 7.12 also lands.
        assert_eq!(media_index(16.0 + 7.12, 25.0), 578);
        assert_eq!(media_index(16.001 + 7.12, 25.0), 578);
        // Plain mid-interval times keep floor semantics.
        assert_eq!(media_index(30.1, 25.0), 752);
        assert_eq!(media_index(0.0, 25.0), 0);
    }

    #[test]
    fn frame_id_absent_for_audio_and_empty_frames() {
        let mut frame = video_frame(vec![]);
        assert_eq!(frame.frame_id(), None);
        frame.data = vec![0x10, 0x20, 0x30];
        frame.kind = FrameKind::Audio;
        assert_eq!(frame.frame_id(), None);
    }
}
