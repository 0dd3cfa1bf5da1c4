//! Oracle tolerance, clamping, and skew behavior.

use seekcheck::{
    FRAME_PERIOD, Frame, FrameKind, SOURCE_FPS, SeekcheckError, SweepFlags, TEST_SKEW,
    TEST_TRIM_DURATION, check_frame,
};

/// A 1x1 video frame reporting `ts` and carrying `frame_id` in its pixel.
fn video_frame(ts: f64, frame_id: u32) -> Frame {
    let pixel = [
        (((frame_id >> 8) & 0xf) << 4) as u8,
        (((frame_id >> 4) & 0xf) << 4) as u8,
        ((frame_id & 0xf) << 4) as u8,
    ];
    Frame {
        ts,
        kind: FrameKind::Video,
        width: 1,
        height: 1,
        data: pixel.to_vec(),
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

/// Frame id a well-behaved 25 fps player delivers for media time `t`.
fn id_at(t: f64) -> u32 {
    (t * SOURCE_FPS).floor() as u32
}

#[test]
fn accepts_a_frame_within_one_frame_period() {
    let flags = SweepFlags::default();
    // Requested 30.1s: frame 752 at 30.08s is within 1/25s.
    let frame = video_frame(30.099, id_at(30.1));
    assert!(check_frame(&frame, 30.1, flags).is_ok());
}

#[test]
fn rejects_a_timestamp_outside_tolerance() {
    let flags = SweepFlags::default();
    // Consistent frame id, but the reported timestamp is 0.1s off.
    let frame = video_frame(30.2, id_at(30.08));
    let error = check_frame(&frame, 30.1, flags).unwrap_err();
    match error {
        SeekcheckError::TimestampMismatch {
            requested, diff, ..
        } => {
            assert_eq!(requested, 30.1);
            assert!(diff > FRAME_PERIOD);
        }
        other => panic!("expected a timestamp mismatch, got {other:?}"),
    }
}

#[test]
fn rejects_a_frame_id_outside_tolerance() {
    let flags = SweepFlags::default();
    // Timestamp looks right but the embedded id points 8 frames away.
    let frame = video_frame(30.08, id_at(30.08) + 8);
    let error = check_frame(&frame, 30.1, flags).unwrap_err();
    assert!(matches!(error, SeekcheckError::FrameIdMismatch { .. }));
}

#[test]
fn boundary_difference_is_accepted_not_rejected() {
    let flags = SweepFlags::default();
    // Exactly one frame period away passes; just beyond fails.
    let on_boundary = video_frame(FRAME_PERIOD, 1);
    assert!(check_frame(&on_boundary, 0.0, flags).is_ok());

    let past_boundary = video_frame(FRAME_PERIOD + 0.001, 1);
    assert!(check_frame(&past_boundary, 0.0, flags).is_err());
}

#[test]
fn trim_clamps_the_expected_time() {
    let flags = SweepFlags {
        skew: true,
        trim: true,
        ..SweepFlags::default()
    };
    // Requesting 60s must verify against 53.43s (clamped), shifted by the
    // skew when compared to the raw timestamp.
    let media_time = TEST_TRIM_DURATION + TEST_SKEW;
    let well_behaved = video_frame(media_time, id_at(media_time));
    assert!(check_frame(&well_behaved, 60.0, flags).is_ok());

    // A player that ignored the trim would return media time 60 + skew.
    let unclamped = video_frame(60.0 + TEST_SKEW, id_at(60.0 + TEST_SKEW));
    assert!(check_frame(&unclamped, 60.0, flags).is_err());
}

#[test]
fn skew_shifts_reported_timestamps() {
    let flags = SweepFlags {
        skew: true,
        ..SweepFlags::default()
    };
    // Playback 10s maps to media 17.12s under skew.
    let frame = video_frame(10.0 + TEST_SKEW, id_at(10.0 + TEST_SKEW));
    assert!(check_frame(&frame, 10.0, flags).is_ok());

    // The same frame without the skew applied fails.
    let unskewed = video_frame(10.0, id_at(10.0));
    assert!(check_frame(&unskewed, 10.0, flags).is_err());
}

#[test]
fn negative_requests_clip_to_zero() {
    let flags = SweepFlags::default();
    let first = video_frame(0.0, 0);
    assert!(check_frame(&first, -1.0, flags).is_ok());
}

#[test]
fn audio_frames_skip_identifier_verification() {
    let flags = SweepFlags {
        audio: true,
        ..SweepFlags::default()
    };
    // No pixel data at all; only the timestamp is checked.
    assert!(check_frame(&audio_frame(12.0), 12.0, flags).is_ok());
    assert!(check_frame(&audio_frame(12.5), 12.0, flags).is_err());
}

#[test]
fn video_frames_without_pixels_are_rejected() {
    let flags = SweepFlags::default();
    let mut frame = video_frame(1.0, 25);
    frame.data.clear();
    assert!(matches!(
        check_frame(&frame, 1.0, flags),
        Err(SeekcheckError::MissingFrameData { .. })
    ));
}

#[test]
fn mismatch_diagnostics_carry_reproduction_context() {
    let flags = SweepFlags {
        trim: true,
        ..SweepFlags::default()
    };
    let frame = video_frame(60.0, id_at(60.0));
    let error = check_frame(&frame, 60.0, flags).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("60.0"), "missing requested time: {message}");
    assert!(
        message.contains("53.43"),
        "missing clipped expected time: {message}"
    );
    assert_eq!(error.requested_time(), Some(60.0));
}
