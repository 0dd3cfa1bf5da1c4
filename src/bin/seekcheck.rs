use std::error::Error as StdError;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use seekcheck::{
    ActionRegistry, FfmpegPlayer, Player, PlaybackLogLevel, PlayerSession, SeekcheckError,
    Sequence, SweepFlags, SweepObserver, SweepReport, image_probe, missing_source_probe,
    next_frame_walk, run_configuration, set_playback_log_level,
};

/// Expected dimensions of the still-image fixture.
const IMAGE_WIDTH: u32 = 480;
const IMAGE_HEIGHT: u32 = 640;

const CLI_AFTER_HELP: &str = "Examples:\n  seekcheck media.mkv image.jpg\n  seekcheck media.mkv image.jpg --progress --verbose\n  seekcheck media.mkv image.jpg --json --log-level quiet";

#[derive(Debug, Parser)]
#[command(
    name = "seekcheck",
    version,
    about = "Verify the seek/time contract of a frame-extraction media player",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Synthetic test media (16x16, 25 fps, frame ids baked into pixel color).
    #[arg(required_unless_present = "completions")]
    media: Option<PathBuf>,

    /// Still image fixture (480x640).
    #[arg(required_unless_present = "completions")]
    image: Option<PathBuf>,

    /// Print each sequence label as it runs.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar per sweep configuration.
    #[arg(long)]
    progress: bool,

    /// Additionally run the audio-selected sweep configurations.
    #[arg(long)]
    audio: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, default_value = "error")]
    log_level: String,

    /// On a verification failure, save the offending frame here as PNG.
    #[arg(long, value_name = "PATH")]
    dump_failed_frame: Option<PathBuf>,

    /// Print a machine-readable JSON summary on stdout.
    #[arg(long)]
    json: bool,

    /// Emit shell completions and exit.
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

/// Renders per-sequence progress for one sweep configuration.
struct CliObserver {
    bar: Option<ProgressBar>,
    verbose: bool,
}

impl SweepObserver for CliObserver {
    fn on_sequence(&mut self, configuration: &str, sequence: &str, index: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(index);
            bar.set_message(sequence.to_string());
        }
        if self.verbose {
            println!("{} {configuration} {sequence}", "::".dimmed());
        }
    }
}

/// Where a run failed, with enough context to re-fetch the frame.
struct Failure {
    flags: Option<SweepFlags>,
    error: SeekcheckError,
}

impl From<SeekcheckError> for Failure {
    fn from(error: SeekcheckError) -> Self {
        Failure { flags: None, error }
    }
}

struct RunSummary {
    walk_frames: u64,
    report: SweepReport,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "seekcheck", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    let (Some(media), Some(image)) = (cli.media.clone(), cli.image.clone()) else {
        // Unreachable: clap enforces the positionals unless --completions.
        return ExitCode::from(2);
    };

    let level = match cli.log_level.parse::<PlaybackLogLevel>() {
        Ok(level) => level,
        Err(reason) => {
            eprintln!("{} {reason}", "error:".red().bold());
            return ExitCode::from(2);
        }
    };
    set_playback_log_level(level);

    let media = media.to_string_lossy().into_owned();
    let image = image.to_string_lossy().into_owned();

    match run(&cli, &media, &image) {
        Ok(summary) => {
            println!("{}", "All tests OK".green().bold());
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "status": "ok",
                        "walk_frames": summary.walk_frames,
                        "configurations": summary.report.configurations,
                        "sequences": summary.report.sequences,
                    })
                );
            }
            ExitCode::SUCCESS
        }
        Err(failure) => {
            report_failure(&cli, &media, &failure);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, media: &str, image: &str) -> Result<RunSummary, Failure> {
    let player = FfmpegPlayer;

    image_probe(&player, image, IMAGE_WIDTH, IMAGE_HEIGHT)?;
    println!("{} image probe", "✓".green().bold());

    missing_source_probe(&player)?;
    println!("{} missing-source probe", "✓".green().bold());

    let walk_frames = next_frame_walk(&player, media)?;
    println!(
        "{} next-frame walk ({walk_frames} frames per pass)",
        "✓".green().bold()
    );

    let registry = ActionRegistry::standard();
    let mut configurations: Vec<SweepFlags> = SweepFlags::default_sweep().to_vec();
    if cli.audio {
        configurations.extend(SweepFlags::audio_sweep());
    }

    let mut report = SweepReport::default();
    for &flags in &configurations {
        let bar = cli.progress.then(|| {
            let style = ProgressStyle::with_template(
                "{prefix:>20} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .expect("progress template");
            ProgressBar::new(Sequence::total_count())
                .with_style(style)
                .with_prefix(flags.label())
        });

        let mut observer = CliObserver {
            bar: bar.clone(),
            verbose: cli.verbose,
        };
        let result = run_configuration(&player, media, flags, &registry, &mut observer);
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }

        match result {
            Ok(executed) => {
                println!(
                    "{} {} ({executed} sequences)",
                    "✓".green().bold(),
                    flags.label()
                );
                report.configurations += 1;
                report.sequences += executed;
            }
            Err(error) => {
                return Err(Failure {
                    flags: Some(flags),
                    error,
                });
            }
        }
    }

    Ok(RunSummary {
        walk_frames,
        report,
    })
}

fn report_failure(cli: &Cli, media: &str, failure: &Failure) {
    eprintln!("{} {}", "test failed:".red().bold(), failure.error);
    let mut source = failure.error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }

    if cli.json {
        println!(
            "{}",
            json!({
                "status": "failed",
                "error": failure.error.to_string(),
                "configuration": failure.flags.map(SweepFlags::label),
            })
        );
    }

    let (Some(path), Some(flags)) = (&cli.dump_failed_frame, failure.flags) else {
        return;
    };
    let Some(requested) = failure.error.requested_time() else {
        return;
    };
    match dump_frame(media, flags, requested, path) {
        Ok(true) => eprintln!("offending frame saved to {}", path.display()),
        Ok(false) => eprintln!("no frame available to dump for t={requested}"),
        Err(error) => eprintln!("could not dump frame: {error}"),
    }
}

/// Re-fetch the frame at `requested` under `flags` and save it as PNG.
/// Returns false when the player yields no frame or it carries no pixels.
fn dump_frame(
    media: &str,
    flags: SweepFlags,
    requested: f64,
    path: &std::path::Path,
) -> Result<bool, SeekcheckError> {
    let mut session = FfmpegPlayer.open(media, &flags.session_options())?;
    let Some(frame) = session.frame_at(requested)? else {
        return Ok(false);
    };
    let Some(image) = frame.to_image() else {
        return Ok(false);
    };
    image.save(path)?;
    Ok(true)
}
