//! Executor and sweep behavior, driven through the analytic model player.

use seekcheck::{
    Action, ActionRegistry, ClipSpec, ModelPlayer, NoOpObserver, Player, PlayerSession,
    SeekcheckError, Sequence, SweepFlags, SweepObserver, run_configuration, run_full_sweep,
    run_sequence,
};

const SOURCE: &str = ModelPlayer::SYNTHETIC_SOURCE;

fn biased_player(ts_bias: f64) -> ModelPlayer {
    ModelPlayer::new(
        SOURCE,
        ClipSpec {
            ts_bias,
            ..ClipSpec::default()
        },
    )
}

#[test]
fn default_sweep_passes_against_a_well_behaved_player() {
    let registry = ActionRegistry::standard();
    let report = run_full_sweep(
        &ModelPlayer::synthetic(),
        SOURCE,
        &SweepFlags::default_sweep(),
        &registry,
        &mut NoOpObserver,
    )
    .expect("well-behaved player must pass the sweep");

    assert_eq!(report.configurations, 4);
    assert_eq!(report.sequences, 4 * Sequence::total_count());
}

#[test]
fn audio_sweep_passes_against_a_well_behaved_player() {
    let registry = ActionRegistry::standard();
    let report = run_full_sweep(
        &ModelPlayer::synthetic(),
        SOURCE,
        &SweepFlags::audio_sweep(),
        &registry,
        &mut NoOpObserver,
    )
    .expect("audio sweep must pass");

    assert_eq!(report.configurations, 4);
}

#[test]
fn timestamp_bias_fails_the_sweep_and_names_the_case() {
    let registry = ActionRegistry::standard();
    let error = run_configuration(
        &biased_player(0.2),
        SOURCE,
        SweepFlags::default(),
        &registry,
        &mut NoOpObserver,
    )
    .expect_err("a 0.2s timestamp bias exceeds the tolerance");

    // The first frame-checking sequence is the lone 'start' probe; the
    // failure names both the configuration and the sequence.
    match error {
        SeekcheckError::SequenceFailed {
            configuration,
            sequence,
            source,
        } => {
            assert_eq!(configuration, "video");
            assert_eq!(sequence, "start");
            assert!(matches!(
                *source,
                SeekcheckError::TimestampMismatch { .. }
            ));
        }
        other => panic!("expected a sequence failure, got {other:?}"),
    }
}

#[test]
fn a_bias_within_tolerance_still_passes() {
    let registry = ActionRegistry::standard();
    run_configuration(
        &biased_player(0.01),
        SOURCE,
        SweepFlags::default(),
        &registry,
        &mut NoOpObserver,
    )
    .expect("a 10ms bias is inside the one-frame-period tolerance");
}

#[test]
fn wrong_dimensions_fail_at_the_info_probe() {
    let registry = ActionRegistry::standard();
    let player = ModelPlayer::new(
        SOURCE,
        ClipSpec {
            width: 17,
            ..ClipSpec::default()
        },
    );
    let error = run_configuration(
        &player,
        SOURCE,
        SweepFlags::default(),
        &registry,
        &mut NoOpObserver,
    )
    .expect_err("a 17-pixel-wide clip must fail the info probe");

    match error {
        SeekcheckError::SequenceFailed {
            sequence, source, ..
        } => {
            assert_eq!(sequence, "fetchinfo");
            assert!(matches!(*source, SeekcheckError::InfoMismatch { .. }));
        }
        other => panic!("expected a sequence failure, got {other:?}"),
    }
}

#[test]
fn run_sequence_stops_at_the_first_failing_probe() {
    let registry = ActionRegistry::standard();
    let player = biased_player(0.2);
    let mut session = player
        .open(SOURCE, &SweepFlags::default().session_options())
        .unwrap();

    // 'start' fails on the bias; 'end' would pass but must never run. If it
    // ran, it would leave delivery state this assertion would notice.
    let sequence = Sequence::of(&[Action::Start, Action::End]);
    let error = run_sequence(
        &mut session,
        &sequence,
        SweepFlags::default(),
        &registry,
    )
    .expect_err("the start probe fails on the biased clock");
    assert!(matches!(error, SeekcheckError::TimestampMismatch { .. }));

    // The end probe never ran: the far-past-end frame is still deliverable.
    assert!(session.frame_at(999_999.0).unwrap().is_some());
}

#[test]
fn observer_sees_sequences_in_enumeration_order() {
    struct Recorder {
        labels: Vec<String>,
        configurations: Vec<String>,
    }
    impl SweepObserver for Recorder {
        fn on_sequence(&mut self, configuration: &str, sequence: &str, index: u64) {
            assert_eq!(index as usize, self.labels.len());
            self.labels.push(sequence.to_string());
            self.configurations.push(configuration.to_string());
        }
    }

    let registry = ActionRegistry::standard();
    let mut recorder = Recorder {
        labels: Vec::new(),
        configurations: Vec::new(),
    };
    run_configuration(
        &ModelPlayer::synthetic(),
        SOURCE,
        SweepFlags {
            skew: true,
            ..SweepFlags::default()
        },
        &registry,
        &mut recorder,
    )
    .unwrap();

    assert_eq!(recorder.labels.len() as u64, Sequence::total_count());
    assert_eq!(recorder.labels[0], "prefetch");
    assert_eq!(recorder.labels[5], "fetchinfo-prefetch");
    assert!(recorder.configurations.iter().all(|c| c == "video-skew"));
}

// ── player contract corners the probes rely on ─────────────────────

#[test]
fn exact_seek_is_not_redelivered() {
    let player = ModelPlayer::synthetic();
    let mut session = player
        .open(SOURCE, &SweepFlags::default().session_options())
        .unwrap();

    let first = session.frame_at(16.0).unwrap();
    assert!(first.is_some());
    // A fractionally-later request maps to the same source frame.
    assert!(session.frame_at(16.001).unwrap().is_none());
    // A request a full frame later is a different source frame.
    assert!(session.frame_at(16.05).unwrap().is_some());
}

#[test]
fn end_of_stream_saturation_is_bounded() {
    let player = ModelPlayer::synthetic();
    let mut session = player
        .open(SOURCE, &SweepFlags::default().session_options())
        .unwrap();

    let terminal = session
        .frame_at(999_999.0)
        .unwrap()
        .expect("far-past-end requests saturate to the terminal frame");
    let clip = ClipSpec::default();
    let expected_ts = (clip.frame_count - 1) as f64 / clip.frame_rate;
    assert!((terminal.ts - expected_ts).abs() < 1e-9);

    // Any further far-past-end request maps to the same terminal frame.
    assert!(session.frame_at(99_999.0).unwrap().is_none());
}

#[test]
fn next_frame_continues_from_the_last_delivered_frame() {
    let player = ModelPlayer::synthetic();
    let mut session = player
        .open(SOURCE, &SweepFlags::default().session_options())
        .unwrap();

    session.frame_at(15.0).unwrap().expect("seek to 15s");
    let next = session.next_frame().unwrap().expect("successor frame");
    assert_eq!(next.frame_id(), Some(376));

    let after = session.next_frame().unwrap().expect("second successor");
    assert_eq!(after.frame_id(), Some(377));
}
