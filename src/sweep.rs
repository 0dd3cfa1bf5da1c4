//! Sequence execution and the option-flag sweep.
//!
//! [`run_sequence`] drives one session through one action sequence,
//! stopping at the first failing probe. [`run_configuration`] runs the full
//! enumeration for one [`SweepFlags`] configuration — a fresh session per
//! sequence, configured before execution and dropped after, never reused.
//! [`run_full_sweep`] iterates a configuration list and halts on the first
//! failure, which arrives wrapped with the configuration and sequence
//! labels.

use crate::error::SeekcheckError;
use crate::oracle::SweepFlags;
use crate::player::{Player, PlayerSession};
use crate::probes::ActionRegistry;
use crate::sequence::Sequence;

/// Receives a notification before each sequence executes.
///
/// Lets a caller render progress without the library depending on a
/// terminal. The default implementation ignores everything.
pub trait SweepObserver {
    /// Called before sequence `index` (0-based within its configuration)
    /// executes.
    fn on_sequence(&mut self, configuration: &str, sequence: &str, index: u64) {
        let _ = (configuration, sequence, index);
    }
}

/// An observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl SweepObserver for NoOpObserver {}

/// Totals from a completed sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Configurations that ran to completion.
    pub configurations: usize,
    /// Sequences executed across all configurations.
    pub sequences: u64,
}

/// Execute one action sequence against an already-configured session.
///
/// Probes run in sequence order; the first failure aborts the rest and is
/// propagated unchanged.
pub fn run_sequence(
    session: &mut dyn PlayerSession,
    sequence: &Sequence,
    flags: SweepFlags,
    registry: &ActionRegistry,
) -> Result<(), SeekcheckError> {
    for action in sequence.actions() {
        let probe = registry.get(action);
        log::debug!("probe '{}'", probe.name());
        (probe.run)(session, flags)?;
    }
    Ok(())
}

/// Run the full sequence enumeration under one flag configuration.
///
/// Each emitted sequence gets a fresh session opened with the matching
/// options; the session is dropped when the sequence finishes. Returns the
/// number of sequences executed, or the first failure wrapped with the
/// configuration and sequence labels.
pub fn run_configuration<P: Player>(
    player: &P,
    source: &str,
    flags: SweepFlags,
    registry: &ActionRegistry,
    observer: &mut dyn SweepObserver,
) -> Result<u64, SeekcheckError> {
    let configuration = flags.label();
    let options = flags.session_options();
    let mut executed = 0u64;

    for (index, sequence) in Sequence::iter_all().enumerate() {
        let label = sequence.to_string();
        observer.on_sequence(&configuration, &label, index as u64);
        log::info!("run {configuration} {label}");

        let mut session = player.open(source, &options)?;
        run_sequence(&mut session, &sequence, flags, registry).map_err(|error| {
            SeekcheckError::SequenceFailed {
                configuration: configuration.clone(),
                sequence: label,
                source: Box::new(error),
            }
        })?;
        executed += 1;
    }

    log::info!("configuration {configuration}: {executed} sequences passed");
    Ok(executed)
}

/// Run every configuration in `configurations` through the full
/// enumeration. Halts on the first failing sequence.
pub fn run_full_sweep<P: Player>(
    player: &P,
    source: &str,
    configurations: &[SweepFlags],
    registry: &ActionRegistry,
    observer: &mut dyn SweepObserver,
) -> Result<SweepReport, SeekcheckError> {
    let mut report = SweepReport::default();
    for &flags in configurations {
        report.sequences += run_configuration(player, source, flags, registry, observer)?;
        report.configurations += 1;
    }
    Ok(report)
}
