//! CLI binary for crd2score.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, prints one status line per outcome on stdout, and
//! keeps the progress bar and logs on stderr.

use anyhow::{Context, Result};
use clap::Parser;
use crd2score::{
    config::{DEFAULT_CONVERTER, DEFAULT_RENDERER},
    convert_path, BatchOutput, ConversionConfig, ConversionProgressCallback, ConversionTarget,
    FileReport, ProgressCallback, Stage, StageError, ToolCommand,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}
fn paint_if(enabled: bool, f: fn(&str) -> String, s: &str) -> String {
    if enabled {
        f(s)
    } else {
        s.to_string()
    }
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints the per-stage status lines on stdout and drives a file-count
/// progress bar on stderr. Lines are printed through `ProgressBar::suspend`
/// so they never tear the bar when both streams share a terminal.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Only failures are printed when set.
    quiet: bool,
    /// Colour status lines (stdout is a terminal).
    color: bool,
    /// Colour the summary (stderr is a terminal).
    err_color: bool,
}

impl CliProgressCallback {
    fn new(show_bar: bool, quiet: bool) -> Arc<Self> {
        let bar = if show_bar {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        Arc::new(Self {
            bar,
            quiet,
            color: io::stdout().is_terminal(),
            err_color: io::stderr().is_terminal(),
        })
    }

    fn paint(&self, f: fn(&str) -> String, s: &str) -> String {
        paint_if(self.color, f, s)
    }

    fn paint_err(&self, f: fn(&str) -> String, s: &str) -> String {
        paint_if(self.err_color, f, s)
    }

    fn line(&self, msg: String) {
        self.bar.suspend(|| println!("{msg}"));
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total_files as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Converting");
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_stage_start(&self, target: &ConversionTarget, stage: Stage) {
        self.bar.set_message(target.file_name());
        if !self.quiet {
            self.line(format!(
                "Generating {stage} for '{}'...",
                target.file_name()
            ));
        }
    }

    fn on_stage_skipped(&self, target: &ConversionTarget, stage: Stage) {
        if !self.quiet {
            self.line(self.paint(
                dim,
                &format!(
                    "{stage} file for '{}' already exists. Skipping generation.",
                    target.file_name()
                ),
            ));
        }
    }

    fn on_stage_complete(&self, target: &ConversionTarget, stage: Stage) {
        if !self.quiet {
            self.line(format!(
                "{} Generated {stage} for '{}'",
                self.paint(green, "✓"),
                target.file_name()
            ));
        }
    }

    fn on_stage_error(&self, _target: &ConversionTarget, error: &StageError) {
        self.line(format!(
            "{} {}",
            self.paint(red, "✗"),
            self.paint(red, &error.to_string())
        ));
    }

    fn on_file_complete(&self, _report: &FileReport) {
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, failed_files: usize) {
        self.bar.finish_and_clear();
        if self.quiet {
            return;
        }
        if failed_files == 0 {
            eprintln!(
                "{} {} files converted successfully",
                self.paint_err(green, "✔"),
                self.paint_err(bold, &total_files.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed_files == total_files {
                    self.paint_err(red, "✘")
                } else {
                    self.paint_err(cyan, "⚠")
                },
                self.paint_err(bold, &(total_files - failed_files).to_string()),
                total_files,
                self.paint_err(red, &failed_files.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every .crd file in the current directory
  crd2score

  # Convert a directory (not recursive)
  crd2score ~/songs

  # Convert a single file
  crd2score ~/songs/blues.crd

  # Use a different renderer binary and limit to two files at a time
  crd2score --renderer musescore4 -j 2 ~/songs

  # Machine-readable report, non-zero exit if anything failed
  crd2score --json --fail-on-error ~/songs > report.json

OUTPUTS:
  song.crd  →  song.musicxml  →  song.pdf   (next to the source)
  Existing outputs are never regenerated; delete them to force a rebuild.

EXTERNAL TOOLS:
  txt2musicxml   reads chord text on stdin, writes MusicXML on stdout
  mscore         invoked as: mscore <song.musicxml> -o <song.pdf>
"#;

/// Convert chord-notation (.crd) files to MusicXML and PDF scores.
#[derive(Parser, Debug)]
#[command(
    name = "crd2score",
    version,
    about = "Convert chord-notation (.crd) files to MusicXML and PDF scores",
    long_about = "Convert chord-notation text files (.crd) to MusicXML with txt2musicxml, \
then render each MusicXML file to PDF with MuseScore. Outputs that already exist are skipped, \
so re-running over a directory only does the missing work.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory or .crd file to convert. Default: the current directory.
    path: Option<PathBuf>,

    /// Text-to-MusicXML converter program.
    #[arg(long, env = "CRD2SCORE_CONVERTER", default_value = DEFAULT_CONVERTER)]
    converter: String,

    /// Extra leading argument for the converter (repeatable).
    #[arg(long = "converter-arg", value_name = "ARG", allow_hyphen_values = true)]
    converter_args: Vec<String>,

    /// MusicXML-to-PDF renderer program.
    #[arg(long, env = "CRD2SCORE_RENDERER", default_value = DEFAULT_RENDERER)]
    renderer: String,

    /// Extra leading argument for the renderer (repeatable).
    #[arg(long = "renderer-arg", value_name = "ARG", allow_hyphen_values = true)]
    renderer_args: Vec<String>,

    /// Files converted at once. Default: number of CPUs.
    #[arg(short, long, env = "CRD2SCORE_JOBS")]
    jobs: Option<usize>,

    /// Kill an external tool that runs longer than this many seconds.
    #[arg(long, env = "CRD2SCORE_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Print a JSON report (BatchOutput) instead of status lines.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "CRD2SCORE_NO_PROGRESS")]
    no_progress: bool,

    /// Exit with status 1 if any file failed or the path could not be resolved.
    #[arg(long, env = "CRD2SCORE_FAIL_ON_ERROR")]
    fail_on_error: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Only print failures.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Status lines already report every outcome; library logs only matter
    // when debugging.
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if cli.json {
        None
    } else {
        let show_bar = !cli.quiet && !cli.no_progress;
        let cb = CliProgressCallback::new(show_bar, cli.quiet);
        Some(cb as Arc<dyn ConversionProgressCallback>)
    };
    let config = build_config(&cli, progress_cb)?;

    let base_dir = std::env::current_dir().context("Failed to determine current directory")?;

    // ── Run conversion ───────────────────────────────────────────────────
    match convert_path(cli.path.as_deref(), &base_dir, &config).await {
        Ok(output) => {
            if cli.json {
                print_json(&output)?;
            }
            if cli.fail_on_error && output.has_failures() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Err(e) if e.is_informational() => {
            if cli.json {
                print_json(&BatchOutput {
                    files: Vec::new(),
                    stats: Default::default(),
                })?;
            } else if !cli.quiet {
                println!("{e}");
            }
        }
        Err(e) => {
            // Reported like any other outcome; the exit status only changes
            // when the caller asked for it. Stdout stays pure JSON with --json.
            if cli.json {
                eprintln!("{e}");
            } else {
                println!("{e}");
            }
            if cli.fail_on_error {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .converter(ToolCommand::new(&cli.converter).args(&cli.converter_args))
        .renderer(ToolCommand::new(&cli.renderer).args(&cli.renderer_args));

    if let Some(jobs) = cli.jobs {
        builder = builder.concurrency(jobs);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.tool_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_json(output: &BatchOutput) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("Failed to serialise report")?;
    println!("{json}");
    Ok(())
}
