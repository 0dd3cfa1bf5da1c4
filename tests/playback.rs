//! FFmpeg backend error paths that need no media fixtures.
//!
//! Contract-level behavior (seek mapping, non-redelivery, saturation) is
//! covered hermetically through the model player; these tests pin down the
//! FFmpeg adapter's session-creation failure modes.

use std::io::Write;

use seekcheck::{FfmpegPlayer, Player, SeekcheckError, SessionOptions, missing_source_probe};

#[test]
fn opening_a_nonexistent_path_fails_with_session_create() {
    let result = FfmpegPlayer.open("/i/do/not/exist", &SessionOptions::default());
    match result {
        Err(SeekcheckError::SessionCreate { source_name, .. }) => {
            assert_eq!(source_name, "/i/do/not/exist");
        }
        Ok(_) => panic!("opening a nonexistent path must fail"),
        Err(other) => panic!("expected a session-creation failure, got {other:?}"),
    }
}

#[test]
fn missing_source_scenario_passes_against_the_ffmpeg_backend() {
    missing_source_probe(&FfmpegPlayer).expect("clean open failure passes the scenario");
}

#[test]
fn opening_a_non_media_file_fails_cleanly() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"this is not a media container")
        .expect("write");
    let path = file.path().to_string_lossy().into_owned();

    let result = FfmpegPlayer.open(&path, &SessionOptions::default());
    assert!(
        result.is_err(),
        "plain text must not open as a media source"
    );
}
