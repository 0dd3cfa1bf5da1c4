//! FFmpeg-backed implementation of the player contract.
//!
//! [`FfmpegSession`] keeps one demuxer and one decoder alive for its whole
//! lifetime, seeks to the nearest keyframe before a target and decodes
//! forward, and converts video frames to packed RGB24. Targets close ahead
//! of the current decode position are reached by decoding forward without a
//! seek.
//!
//! The session implements the observable seek/time contract the harness
//! verifies: playback time is clipped to the trim window and shifted by the
//! skew before being mapped onto the source frame grid; a request mapping
//! to the most recently delivered source frame yields nothing; requests
//! past the end saturate to the terminal frame.

use std::path::Path;

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder,
    format::{self, Pixel, context::Input},
    frame::{Audio as AudioFrame, Video as VideoFrame},
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use ffmpeg_sys_next::AV_TIME_BASE;

use crate::error::SeekcheckError;
use crate::player::{
    Frame, FrameKind, MediaInfo, Player, PlayerSession, SessionOptions, StreamSelect,
    media_index,
};

/// Targets at most this many frames ahead are reached by decoding forward
/// instead of seeking.
const SEEK_AHEAD_FRAMES: i64 = 32;

/// Fallback frame rate for sources that report none (still images).
const FALLBACK_FPS: f64 = 25.0;

/// Opens [`FfmpegSession`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegPlayer;

impl Player for FfmpegPlayer {
    type Session = FfmpegSession;

    fn open(
        &self,
        source: &str,
        options: &SessionOptions,
    ) -> Result<FfmpegSession, SeekcheckError> {
        FfmpegSession::open(source, options)
    }
}

enum Pipeline {
    Video {
        decoder: decoder::Video,
        scaler: ScalingContext,
    },
    Audio {
        decoder: decoder::Audio,
        sample_rate: u32,
    },
}

/// One FFmpeg-backed playback session over one source.
pub struct FfmpegSession {
    input: Input,
    options: SessionOptions,
    pipeline: Pipeline,
    stream_index: usize,
    time_base: Rational,
    /// Source-level info, reported regardless of stream selection.
    info: MediaInfo,
    /// Frame rate of the selected video stream's grid.
    fps: f64,
    /// Dimensions of decoded video frames (0 for audio).
    frame_width: u32,
    frame_height: u32,
    /// Container duration in seconds (0 when unknown).
    duration: f64,
    /// Duration-derived estimate of the video frame count, corrected down
    /// if the stream turns out shorter.
    unit_count: i64,
    /// Next frame index the decoder is expected to produce; -1 after a
    /// seek, before the first frame pins it down.
    position: i64,
    /// Highest frame index decoded so far on this session.
    highest_seen: Option<i64>,
    /// Index of the most recently delivered video frame.
    last_video: Option<i64>,
    /// Time span `[start, end)` of the most recently delivered audio frame.
    last_audio_span: Option<(f64, f64)>,
    /// End of the most recently decoded audio frame; `None` after a seek.
    audio_clock: Option<f64>,
    /// Span of the last audio frame seen before end of stream.
    audio_terminal: Option<(f64, f64)>,
    eof_sent: bool,
}

/// Frame rate of a stream, preferring the average rate, with the raw rate
/// as fallback.
fn stream_frame_rate(stream: &ffmpeg_next::Stream) -> f64 {
    let average = stream.avg_frame_rate();
    if average.denominator() != 0 && average.numerator() != 0 {
        return f64::from(average.numerator()) / f64::from(average.denominator());
    }
    let rate = stream.rate();
    if rate.denominator() != 0 && rate.numerator() != 0 {
        f64::from(rate.numerator()) / f64::from(rate.denominator())
    } else {
        0.0
    }
}

/// Rescale a PTS value from stream time base to seconds.
fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * f64::from(time_base.numerator()) / f64::from(time_base.denominator())
}

/// Copy pixel data from a scaled frame into a tightly-packed RGB buffer,
/// stripping any per-row padding FFmpeg left in the plane.
fn packed_rgb(frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = frame.stride(0);
    let row = width as usize * 3;
    let data = frame.data(0);
    if stride == row {
        data[..row * height as usize].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row * height as usize);
        for y in 0..height as usize {
            let start = y * stride;
            buffer.extend_from_slice(&data[start..start + row]);
        }
        buffer
    }
}

enum ScanOutcome {
    Found(i64, Frame),
    Drained { highest: Option<i64> },
}

impl FfmpegSession {
    /// Open a session on `source` with `options` applied.
    pub fn open(source: &str, options: &SessionOptions) -> Result<Self, SeekcheckError> {
        ffmpeg_next::init().map_err(|error| SeekcheckError::SessionCreate {
            source_name: source.to_string(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let path = Path::new(source);
        let input = format::input(&path).map_err(|error| SeekcheckError::SessionCreate {
            source_name: source.to_string(),
            reason: error.to_string(),
        })?;

        if !options.disable_hwaccel {
            log::debug!("hardware acceleration requested; software decoding is always used");
        }

        let duration_raw = input.duration();
        let duration = if duration_raw > 0 {
            duration_raw as f64 / f64::from(AV_TIME_BASE)
        } else {
            0.0
        };

        // Source-level video info, gathered even for audio sessions.
        let (video_width, video_height, video_fps) = match input.streams().best(Type::Video) {
            Some(stream) => {
                let decoder = CodecContext::from_parameters(stream.parameters())?
                    .decoder()
                    .video()?;
                let fps = stream_frame_rate(&stream);
                let fps = if fps > 0.0 { fps } else { FALLBACK_FPS };
                (decoder.width(), decoder.height(), fps)
            }
            None => (0, 0, 0.0),
        };

        let (stream_index, time_base, pipeline, frame_width, frame_height) = match options.select
        {
            StreamSelect::Video => {
                let stream = input
                    .streams()
                    .best(Type::Video)
                    .ok_or(SeekcheckError::NoVideoStream)?;
                let index = stream.index();
                let time_base = stream.time_base();
                let decoder = CodecContext::from_parameters(stream.parameters())?
                    .decoder()
                    .video()?;
                let scaler = ScalingContext::get(
                    decoder.format(),
                    decoder.width(),
                    decoder.height(),
                    Pixel::RGB24,
                    decoder.width(),
                    decoder.height(),
                    ScalingFlags::BILINEAR,
                )?;
                let width = decoder.width();
                let height = decoder.height();
                (index, time_base, Pipeline::Video { decoder, scaler }, width, height)
            }
            StreamSelect::Audio => {
                let stream = input
                    .streams()
                    .best(Type::Audio)
                    .ok_or(SeekcheckError::NoAudioStream)?;
                let index = stream.index();
                let time_base = stream.time_base();
                let decoder = CodecContext::from_parameters(stream.parameters())?
                    .decoder()
                    .audio()?;
                let sample_rate = decoder.rate();
                (
                    index,
                    time_base,
                    Pipeline::Audio {
                        decoder,
                        sample_rate,
                    },
                    0,
                    0,
                )
            }
        };

        let unit_count = if duration > 0.0 && video_fps > 0.0 {
            ((duration * video_fps).round() as i64).max(1)
        } else {
            1
        };

        log::debug!(
            "session on {source}: {video_width}x{video_height} @ {video_fps:.3} fps, \
             {duration:.3}s (~{unit_count} frames)"
        );

        Ok(Self {
            input,
            options: options.clone(),
            pipeline,
            stream_index,
            time_base,
            info: MediaInfo {
                width: video_width,
                height: video_height,
                duration,
                frame_rate: video_fps,
            },
            fps: video_fps,
            frame_width,
            frame_height,
            duration,
            unit_count,
            position: 0,
            highest_seen: None,
            last_video: None,
            last_audio_span: None,
            audio_clock: None,
            audio_terminal: None,
            eof_sent: false,
        })
    }

    /// Requested playback time clipped to the trim window.
    fn playback_time(&self, requested: f64) -> f64 {
        let trim = self.options.trim_duration.unwrap_or(f64::MAX);
        requested.clamp(0.0, trim)
    }

    /// Seek the demuxer to the keyframe at or before `seconds` and reset
    /// decode state. A failed seek is soft: decoding continues from the
    /// current position and the index scan skips what it doesn't need.
    fn seek_to_seconds(&mut self, seconds: f64) {
        let clamped = seconds.max(0.0);
        let ts = (clamped * f64::from(AV_TIME_BASE)) as i64;
        if let Err(error) = self.input.seek(ts, ..ts) {
            log::warn!("seek to {clamped:.3}s failed: {error}");
        }
        match &mut self.pipeline {
            Pipeline::Video { decoder, .. } => decoder.flush(),
            Pipeline::Audio { decoder, .. } => decoder.flush(),
        }
        self.eof_sent = false;
        self.position = -1;
        self.audio_clock = None;
    }

    /// Decode forward until a video frame with index >= `target` appears.
    fn scan_video_until(&mut self, target: i64) -> Result<ScanOutcome, SeekcheckError> {
        let Self {
            input,
            pipeline,
            stream_index,
            time_base,
            fps,
            frame_width,
            frame_height,
            position,
            highest_seen,
            eof_sent,
            ..
        } = self;
        let Pipeline::Video { decoder, scaler } = pipeline else {
            return Err(SeekcheckError::NoVideoStream);
        };

        let mut decoded = VideoFrame::empty();
        let mut highest = None;
        loop {
            if decoder.receive_frame(&mut decoded).is_ok() {
                let seconds = pts_to_seconds(decoded.pts().unwrap_or(0), *time_base);
                let index = (seconds * *fps).round() as i64;
                *position = index + 1;
                highest = Some(highest.map_or(index, |h: i64| h.max(index)));
                *highest_seen = Some(highest_seen.map_or(index, |h| h.max(index)));
                if index >= target {
                    let mut rgb = VideoFrame::empty();
                    scaler.run(&decoded, &mut rgb)?;
                    let frame = Frame {
                        ts: seconds,
                        kind: FrameKind::Video,
                        width: *frame_width,
                        height: *frame_height,
                        data: packed_rgb(&rgb, *frame_width, *frame_height),
                    };
                    return Ok(ScanOutcome::Found(index, frame));
                }
                continue;
            }

            if *eof_sent {
                return Ok(ScanOutcome::Drained { highest });
            }

            let mut packet = Packet::empty();
            match packet.read(input) {
                Ok(()) => {
                    if packet.stream() == *stream_index {
                        decoder.send_packet(&packet)?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    decoder.send_eof()?;
                    *eof_sent = true;
                }
                Err(_) => {
                    // Transient read error; try the next packet.
                }
            }
        }
    }

    /// Fetch the video frame at `target`, seeking when the target is behind
    /// the decode position or too far ahead to scan to. If the stream ends
    /// short of the duration-derived estimate, re-aims once at the last
    /// real frame (end-of-stream saturation).
    fn fetch_video_frame(
        &mut self,
        mut target: i64,
    ) -> Result<Option<(i64, Frame)>, SeekcheckError> {
        let mut corrected = false;
        loop {
            let needs_seek = self.position < 0
                || target < self.position
                || target > self.position + SEEK_AHEAD_FRAMES;
            if needs_seek {
                self.seek_to_seconds(target as f64 / self.fps);
            }
            match self.scan_video_until(target)? {
                ScanOutcome::Found(index, frame) => return Ok(Some((index, frame))),
                ScanOutcome::Drained { highest } => {
                    let Some(highest) = highest.or(self.highest_seen) else {
                        return Ok(None);
                    };
                    if corrected || highest >= target {
                        return Ok(None);
                    }
                    self.unit_count = highest + 1;
                    corrected = true;
                    target = highest;
                }
            }
        }
    }

    fn video_frame_at(&mut self, requested: f64) -> Result<Option<Frame>, SeekcheckError> {
        let media_time = self.playback_time(requested) + self.options.skew;
        let target = media_index(media_time, self.fps).clamp(0, self.unit_count - 1);
        if self.last_video == Some(target) {
            return Ok(None);
        }
        match self.fetch_video_frame(target)? {
            Some((index, frame)) if self.last_video != Some(index) => {
                self.last_video = Some(index);
                Ok(Some(frame))
            }
            _ => Ok(None),
        }
    }

    fn next_video_frame(&mut self) -> Result<Option<Frame>, SeekcheckError> {
        let target = self.last_video.map_or(0, |index| index + 1);
        if target >= self.unit_count {
            // End of stream; a subsequent walk starts over.
            self.last_video = None;
            return Ok(None);
        }
        match self.fetch_video_frame(target)? {
            Some((index, frame)) if self.last_video != Some(index) => {
                self.last_video = Some(index);
                Ok(Some(frame))
            }
            _ => {
                self.last_video = None;
                Ok(None)
            }
        }
    }

    /// Decode forward until an audio frame whose span ends past
    /// `media_time` appears. Once drained, falls back to the terminal span.
    fn locate_audio_span(
        &mut self,
        media_time: f64,
    ) -> Result<Option<(f64, f64)>, SeekcheckError> {
        let needs_seek = self
            .audio_clock
            .map_or(media_time > 1.0, |clock| {
                media_time < clock || media_time > clock + 1.0
            });
        // Once drained, a target past the terminal span has nothing to seek
        // to; the scan falls back to the terminal span directly.
        let past_end = self.eof_sent
            && self
                .audio_terminal
                .is_some_and(|(_, end)| media_time >= end);
        if needs_seek && !past_end {
            self.seek_to_seconds(media_time);
        }

        let Self {
            input,
            pipeline,
            stream_index,
            time_base,
            audio_clock,
            audio_terminal,
            eof_sent,
            ..
        } = self;
        let Pipeline::Audio {
            decoder,
            sample_rate,
        } = pipeline
        else {
            return Err(SeekcheckError::NoAudioStream);
        };

        let mut decoded = AudioFrame::empty();
        loop {
            if decoder.receive_frame(&mut decoded).is_ok() {
                let ts = decoded
                    .pts()
                    .map(|pts| pts_to_seconds(pts, *time_base))
                    .unwrap_or_else(|| audio_clock.unwrap_or(0.0));
                let span = (ts, ts + decoded.samples() as f64 / f64::from(*sample_rate));
                *audio_clock = Some(span.1);
                *audio_terminal = Some(span);
                if span.1 > media_time {
                    return Ok(Some(span));
                }
                continue;
            }

            if *eof_sent {
                return Ok(*audio_terminal);
            }

            let mut packet = Packet::empty();
            match packet.read(input) {
                Ok(()) => {
                    if packet.stream() == *stream_index {
                        decoder.send_packet(&packet)?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    decoder.send_eof()?;
                    *eof_sent = true;
                }
                Err(_) => {}
            }
        }
    }

    fn audio_frame_at(&mut self, requested: f64) -> Result<Option<Frame>, SeekcheckError> {
        // The epsilon keeps decimal grid points from falling one span early
        // through binary float error, matching the video index mapping.
        let mut media_time = self.playback_time(requested) + self.options.skew + 1e-6;
        if self.duration > 0.0 {
            // Saturate far-past-end requests inside the stream.
            media_time = media_time.min(self.duration - 1e-6).max(0.0);
        }
        if let Some((start, end)) = self.last_audio_span {
            if media_time >= start && media_time < end {
                return Ok(None);
            }
        }
        match self.locate_audio_span(media_time)? {
            Some(span) if self.last_audio_span != Some(span) => {
                self.last_audio_span = Some(span);
                Ok(Some(audio_frame(span.0)))
            }
            _ => Ok(None),
        }
    }

    fn next_audio_frame(&mut self) -> Result<Option<Frame>, SeekcheckError> {
        let target = match self.last_audio_span {
            Some((_, end)) => end + 1e-6,
            None => 0.0,
        };
        if self.duration > 0.0 && target >= self.duration {
            self.last_audio_span = None;
            return Ok(None);
        }
        match self.locate_audio_span(target)? {
            Some(span) if self.last_audio_span != Some(span) => {
                self.last_audio_span = Some(span);
                Ok(Some(audio_frame(span.0)))
            }
            _ => {
                self.last_audio_span = None;
                Ok(None)
            }
        }
    }
}

fn audio_frame(ts: f64) -> Frame {
    Frame {
        ts,
        kind: FrameKind::Audio,
        width: 0,
        height: 0,
        data: Vec::new(),
    }
}

impl PlayerSession for FfmpegSession {
    fn prefetch(&mut self) -> Result<(), SeekcheckError> {
        // The demuxer and decoder are primed at open; nothing to ready.
        log::debug!("prefetch requested");
        Ok(())
    }

    fn info(&mut self) -> Result<MediaInfo, SeekcheckError> {
        Ok(self.info)
    }

    fn frame_at(&mut self, time: f64) -> Result<Option<Frame>, SeekcheckError> {
        match self.options.select {
            StreamSelect::Video => self.video_frame_at(time),
            StreamSelect::Audio => self.audio_frame_at(time),
        }
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, SeekcheckError> {
        match self.options.select {
            StreamSelect::Video => self.next_video_frame(),
            StreamSelect::Audio => self.next_audio_frame(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pts_rescales_through_the_time_base() {
        let time_base = Rational::new(1, 12_800);
        assert!((pts_to_seconds(12_800, time_base) - 1.0).abs() < 1e-12);
        assert!((pts_to_seconds(512, time_base) - 0.04).abs() < 1e-12);
    }
}
