//! # seekcheck
//!
//! Verify the seek/time contract of frame-extraction media players.
//!
//! `seekcheck` drives a playback engine through every short, duplicate-free
//! permutation of a fixed set of probe actions — prefetch, info fetch,
//! first-frame, out-of-order mid-stream seeks, end-of-stream probing —
//! under a sweep of option configurations (timestamp skew, duration trim,
//! stream selection), and checks every returned frame against analytically
//! expected values: the presentation timestamp, and for synthetic test
//! video, a per-frame identifier embedded in the first pixel's color
//! channels. Tolerance is one source-frame period.
//!
//! The playback engine is abstract: anything implementing [`Player`] and
//! [`PlayerSession`] can be verified. The crate ships an FFmpeg-backed
//! implementation ([`FfmpegPlayer`]) used by the `seekcheck` binary, and an
//! analytic in-memory one ([`ModelPlayer`]) used by the test suite.
//!
//! ## Quick start
//!
//! ```no_run
//! use seekcheck::{
//!     ActionRegistry, FfmpegPlayer, NoOpObserver, SweepFlags, run_full_sweep,
//! };
//!
//! let registry = ActionRegistry::standard();
//! let report = run_full_sweep(
//!     &FfmpegPlayer,
//!     "clip.mkv",
//!     &SweepFlags::default_sweep(),
//!     &registry,
//!     &mut NoOpObserver,
//! )
//! .unwrap();
//! println!("{} sequences passed", report.sequences);
//! ```
//!
//! ## Requirements
//!
//! The FFmpeg development libraries must be installed on your system for
//! the [`FfmpegPlayer`] backend; the harness itself has no runtime media
//! dependencies.

pub mod error;
pub mod ffmpeg;
pub mod model;
pub mod oracle;
pub mod playback;
pub mod player;
pub mod probes;
pub mod scenarios;
pub mod sequence;
pub mod sweep;

pub use error::SeekcheckError;
pub use ffmpeg::{PlaybackLogLevel, set_playback_log_level};
pub use model::{ClipSpec, ModelPlayer, ModelSession};
pub use oracle::{
    FRAME_PERIOD, SOURCE_FPS, SweepFlags, TEST_SKEW, TEST_TRIM_DURATION, check_frame,
};
pub use playback::{FfmpegPlayer, FfmpegSession};
pub use player::{
    Frame, FrameKind, MediaInfo, Player, PlayerSession, SessionOptions, StreamSelect,
};
pub use probes::{ActionRegistry, CLIP_HEIGHT, CLIP_WIDTH, ProbeDescriptor};
pub use scenarios::{image_probe, missing_source_probe, next_frame_walk};
pub use sequence::{Action, Sequence, SequenceIter};
pub use sweep::{
    NoOpObserver, SweepObserver, SweepReport, run_configuration, run_full_sweep, run_sequence,
};
