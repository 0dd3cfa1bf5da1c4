//! FFmpeg diagnostic verbosity control.
//!
//! FFmpeg logs to stderr through its own system, separate from the Rust
//! [`log`](https://crates.io/crates/log) facade the harness uses. This
//! module exposes that knob so a run can silence decoder chatter or turn it
//! up when chasing a failing case, without importing `ffmpeg-next`
//! directly.

use std::str::FromStr;

use ffmpeg_next::util::log::Level;

/// FFmpeg internal log verbosity, most quiet to most verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackLogLevel {
    /// No output at all.
    Quiet,
    /// Only conditions the process cannot recover from.
    Panic,
    /// Unrecoverable stream errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging output.
    Debug,
    /// Extremely verbose tracing.
    Trace,
}

impl From<PlaybackLogLevel> for Level {
    fn from(level: PlaybackLogLevel) -> Level {
        match level {
            PlaybackLogLevel::Quiet => Level::Quiet,
            PlaybackLogLevel::Panic => Level::Panic,
            PlaybackLogLevel::Fatal => Level::Fatal,
            PlaybackLogLevel::Error => Level::Error,
            PlaybackLogLevel::Warning => Level::Warning,
            PlaybackLogLevel::Info => Level::Info,
            PlaybackLogLevel::Verbose => Level::Verbose,
            PlaybackLogLevel::Debug => Level::Debug,
            PlaybackLogLevel::Trace => Level::Trace,
        }
    }
}

impl FromStr for PlaybackLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "quiet" => Ok(PlaybackLogLevel::Quiet),
            "panic" => Ok(PlaybackLogLevel::Panic),
            "fatal" => Ok(PlaybackLogLevel::Fatal),
            "error" => Ok(PlaybackLogLevel::Error),
            "warning" => Ok(PlaybackLogLevel::Warning),
            "info" => Ok(PlaybackLogLevel::Info),
            "verbose" => Ok(PlaybackLogLevel::Verbose),
            "debug" => Ok(PlaybackLogLevel::Debug),
            "trace" => Ok(PlaybackLogLevel::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Set FFmpeg's internal log verbosity. Does not affect the Rust-side
/// `log` facade output.
pub fn set_playback_log_level(level: PlaybackLogLevel) {
    ffmpeg_next::util::log::set_level(level.into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(
            "WARNING".parse::<PlaybackLogLevel>(),
            Ok(PlaybackLogLevel::Warning)
        );
        assert!("noisy".parse::<PlaybackLogLevel>().is_err());
    }
}
