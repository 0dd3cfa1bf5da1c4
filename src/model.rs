//! An analytic model player for synthetic clips.
//!
//! [`ModelPlayer`] implements the player contract exactly as an ideal
//! seek-capable frame-extraction engine would behave for a described
//! synthetic clip: frames live on a fixed grid, the first pixel of every
//! video frame encodes the frame counter, and the session honors skew,
//! trim, exact-seek non-redelivery, and bounded end-of-stream saturation.
//!
//! The harness's own test suite runs against this player, so every
//! verification property is exercised hermetically, without media
//! fixtures. [`ClipSpec::ts_bias`] injects a timestamp fault to prove the
//! oracle actually rejects out-of-tolerance frames.

use crate::error::SeekcheckError;
use crate::player::{
    Frame, FrameKind, MediaInfo, Player, PlayerSession, SessionOptions, StreamSelect,
    media_index,
};

/// Shape of the synthetic clip a [`ModelPlayer`] serves.
#[derive(Debug, Clone)]
pub struct ClipSpec {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Video frame rate.
    pub frame_rate: f64,
    /// Total number of video frames.
    pub frame_count: u64,
    /// Duration of one synthetic audio frame in seconds. The default keeps
    /// the audio cadence aligned with the video frame grid.
    pub audio_frame_period: f64,
    /// Fault injection: a constant added to every reported timestamp.
    /// Leave at 0.0 for a well-behaved player.
    pub ts_bias: f64,
}

impl Default for ClipSpec {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            frame_rate: 25.0,
            frame_count: 1500,
            audio_frame_period: 1.0 / 25.0,
            ts_bias: 0.0,
        }
    }
}

impl ClipSpec {
    /// Clip duration in seconds.
    pub fn duration(&self) -> f64 {
        self.frame_count as f64 / self.frame_rate
    }
}

/// An in-memory player serving one synthetic clip under one source name.
///
/// Opening any other source fails with a session-creation error, mirroring
/// a real player handed an unreadable path.
#[derive(Debug, Clone)]
pub struct ModelPlayer {
    source: String,
    clip: ClipSpec,
}

impl ModelPlayer {
    /// A player serving `clip` under the given source name.
    pub fn new(source: impl Into<String>, clip: ClipSpec) -> Self {
        Self {
            source: source.into(),
            clip,
        }
    }

    /// The default synthetic clip under the source name
    /// [`ModelPlayer::SYNTHETIC_SOURCE`].
    pub fn synthetic() -> Self {
        Self::new(Self::SYNTHETIC_SOURCE, ClipSpec::default())
    }

    /// Source name served by [`ModelPlayer::synthetic`].
    pub const SYNTHETIC_SOURCE: &'static str = "synthetic:clip";
}

impl Player for ModelPlayer {
    type Session = ModelSession;

    fn open(
        &self,
        source: &str,
        options: &SessionOptions,
    ) -> Result<ModelSession, SeekcheckError> {
        if source != self.source {
            return Err(SeekcheckError::SessionCreate {
                source_name: source.to_string(),
                reason: "no such source".to_string(),
            });
        }
        log::debug!("model session on {source} ({:?})", options.select);
        Ok(ModelSession {
            clip: self.clip.clone(),
            options: options.clone(),
            last_delivered: None,
        })
    }
}

/// One session over a [`ModelPlayer`]'s clip.
#[derive(Debug)]
pub struct ModelSession {
    clip: ClipSpec,
    options: SessionOptions,
    /// Index of the most recently delivered frame on the selected stream's
    /// grid. Drives non-redelivery and next-frame positioning.
    last_delivered: Option<i64>,
}

impl ModelSession {
    /// Frames (or audio units) per second on the selected stream's grid.
    fn grid_rate(&self) -> f64 {
        match self.options.select {
            StreamSelect::Video => self.clip.frame_rate,
            StreamSelect::Audio => 1.0 / self.clip.audio_frame_period,
        }
    }

    /// Number of units on the selected stream's grid.
    fn grid_count(&self) -> i64 {
        let count = match self.options.select {
            StreamSelect::Video => self.clip.frame_count as f64,
            StreamSelect::Audio => (self.clip.duration() * self.grid_rate()).round(),
        };
        (count as i64).max(1)
    }

    /// Map a requested playback time to a grid index: clip to the trim
    /// window, apply skew, floor onto the grid, saturate at the ends.
    fn grid_index(&self, requested: f64) -> i64 {
        let trim = self.options.trim_duration.unwrap_or(f64::MAX);
        let playback = requested.clamp(0.0, trim);
        let media_time = playback + self.options.skew;
        media_index(media_time, self.grid_rate()).clamp(0, self.grid_count() - 1)
    }

    fn emit(&self, index: i64) -> Frame {
        let ts = index as f64 / self.grid_rate() + self.clip.ts_bias;
        match self.options.select {
            StreamSelect::Video => {
                let id = index as u32;
                let pixel = [
                    (((id >> 8) & 0xf) << 4) as u8,
                    (((id >> 4) & 0xf) << 4) as u8,
                    ((id & 0xf) << 4) as u8,
                ];
                let pixels = (self.clip.width * self.clip.height) as usize;
                Frame {
                    ts,
                    kind: FrameKind::Video,
                    width: self.clip.width,
                    height: self.clip.height,
                    data: pixel.repeat(pixels),
                }
            }
            StreamSelect::Audio => Frame {
                ts,
                kind: FrameKind::Audio,
                width: 0,
                height: 0,
                data: Vec::new(),
            },
        }
    }
}

impl PlayerSession for ModelSession {
    fn prefetch(&mut self) -> Result<(), SeekcheckError> {
        Ok(())
    }

    fn info(&mut self) -> Result<MediaInfo, SeekcheckError> {
        Ok(MediaInfo {
            width: self.clip.width,
            height: self.clip.height,
            duration: self.clip.duration(),
            frame_rate: self.clip.frame_rate,
        })
    }

    fn frame_at(&mut self, time: f64) -> Result<Option<Frame>, SeekcheckError> {
        let index = self.grid_index(time);
        if self.last_delivered == Some(index) {
            return Ok(None);
        }
        self.last_delivered = Some(index);
        Ok(Some(self.emit(index)))
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, SeekcheckError> {
        let index = self.last_delivered.map_or(0, |i| i + 1);
        if index >= self.grid_count() {
            // End of stream; a subsequent walk starts over.
            self.last_delivered = None;
            return Ok(None);
        }
        self.last_delivered = Some(index);
        Ok(Some(self.emit(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ModelSession {
        ModelPlayer::synthetic()
            .open(ModelPlayer::SYNTHETIC_SOURCE, &SessionOptions::default())
            .unwrap()
    }

    #[test]
    fn frame_id_round_trips_through_pixels() {
        let mut s = session();
        let frame = s.frame_at(30.1).unwrap().unwrap();
        // 30.1s lands on frame 752 of the 25 fps grid.
        assert_eq!(frame.frame_id(), Some(752));
        assert!((frame.ts - 30.08).abs() < 1e-9);
    }

    #[test]
    fn requests_floor_onto_the_frame_grid() {
        let mut s = session();
        assert_eq!(s.grid_index(0.0), 0);
        assert_eq!(s.grid_index(16.0), 400);
        assert_eq!(s.grid_index(16.001), 400);
        assert_eq!(s.grid_index(-5.0), 0);
        assert_eq!(s.grid_index(999_999.0), 1499);
    }

    #[test]
    fn skew_and_trim_shift_the_mapping() {
        let player = ModelPlayer::synthetic();
        let options = SessionOptions {
            skew: 7.12,
            trim_duration: Some(53.43),
            ..SessionOptions::default()
        };
        let s = player.open(ModelPlayer::SYNTHETIC_SOURCE, &options).unwrap();
        // 40s maps to media 47.12, frame 1178.
        assert_eq!(s.grid_index(40.0), 1178);
        // 0s maps to media 7.12, frame 178.
        assert_eq!(s.grid_index(0.0), 178);
        // 60s clips to 53.43, maps past the last frame, saturates.
        assert_eq!(s.grid_index(60.0), 1499);
    }

    #[test]
    fn opening_an_unknown_source_fails() {
        let player = ModelPlayer::synthetic();
        let result = player.open("/i/do/not/exist", &SessionOptions::default());
        assert!(matches!(
            result,
            Err(SeekcheckError::SessionCreate { .. })
        ));
    }
}
