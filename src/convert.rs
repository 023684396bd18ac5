//! Batch conversion entry points.
//!
//! [`convert_file`] is the per-file state machine: two stages, each gated on
//! whether its output already exists. The output files are the only memory
//! between runs, so re-running over a finished directory launches no tools.
//!
//! [`convert_all`] and [`convert_path`] fan files out over
//! [`crate::stream::convert_stream`] and collect the reports.

use crate::config::ConversionConfig;
use crate::error::{Crd2ScoreError, StageError};
use crate::output::{BatchOutput, BatchStats, FileReport, StageOutcome};
use crate::pipeline::{musicxml, render, resolve};
use crate::progress::{ConversionProgressCallback, Stage};
use crate::stream::convert_stream;
use crate::target::ConversionTarget;
use futures::StreamExt;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert one `.crd` file to `.musicxml` and then `.pdf`.
///
/// Never fails: every outcome, including tool failures, is recorded in the
/// returned [`FileReport`] and emitted through the progress callback.
///
/// 1. `.musicxml` exists → skipped. Otherwise the converter runs; if it fails
///    the file is abandoned and the PDF stage is not attempted.
/// 2. `.pdf` exists → skipped. Otherwise, if `.musicxml` exists the renderer
///    runs; if it does not, the stage is blocked.
pub async fn convert_file(target: &ConversionTarget, config: &ConversionConfig) -> FileReport {
    let start = Instant::now();
    debug!("Converting {}", target);

    let musicxml = musicxml_stage(target, config).await;
    let pdf = if musicxml.is_failed() {
        None
    } else {
        Some(pdf_stage(target, config).await)
    };

    let report = FileReport {
        target: target.clone(),
        musicxml,
        pdf,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    emit(config, |cb| cb.on_file_complete(&report));
    report
}

/// Convert every target, at most `config.concurrency` at a time.
///
/// Reports are returned in completion order.
pub async fn convert_all(targets: Vec<ConversionTarget>, config: &ConversionConfig) -> BatchOutput {
    let start = Instant::now();
    let total = targets.len();
    info!(
        "Converting {} files with {} workers",
        total, config.concurrency
    );
    emit(config, |cb| cb.on_batch_start(total));

    let files: Vec<FileReport> = convert_stream(targets, config).collect().await;

    let mut stats = BatchStats::from_reports(&files);
    stats.total_duration_ms = start.elapsed().as_millis() as u64;

    info!(
        "Batch complete: {}/{} files ok, {}ms total",
        stats.total_files - stats.failed_files,
        stats.total_files,
        stats.total_duration_ms
    );
    emit(config, |cb| cb.on_batch_complete(total, stats.failed_files));

    BatchOutput { files, stats }
}

/// Resolve `target` against `base_dir` and convert everything it names.
///
/// # Errors
/// - [`Crd2ScoreError::PathNotFound`] / [`Crd2ScoreError::InvalidInputKind`]
///   when the target cannot be resolved; no tool is run.
/// - [`Crd2ScoreError::NoFilesFound`] when it resolves to zero files. This is
///   informational (see [`Crd2ScoreError::is_informational`]).
///
/// Per-file failures are not errors; check [`BatchOutput::has_failures`].
pub async fn convert_path(
    target: Option<&Path>,
    base_dir: &Path,
    config: &ConversionConfig,
) -> Result<BatchOutput, Crd2ScoreError> {
    let targets = resolve::resolve_targets(target, base_dir)?;
    if targets.is_empty() {
        let path = match target {
            Some(t) if t != Path::new(".") => base_dir.join(t),
            _ => base_dir.to_path_buf(),
        };
        return Err(Crd2ScoreError::NoFilesFound { path });
    }
    Ok(convert_all(targets, config).await)
}

/// Synchronous wrapper around [`convert_path`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    target: Option<&Path>,
    base_dir: &Path,
    config: &ConversionConfig,
) -> Result<BatchOutput, Crd2ScoreError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Crd2ScoreError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_path(target, base_dir, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn emit(config: &ConversionConfig, f: impl FnOnce(&dyn ConversionProgressCallback)) {
    if let Some(ref cb) = config.progress_callback {
        f(cb.as_ref());
    }
}

async fn musicxml_stage(target: &ConversionTarget, config: &ConversionConfig) -> StageOutcome {
    if target.musicxml_path().exists() {
        info!("{}: .musicxml already exists, skipping", target.file_name());
        emit(config, |cb| cb.on_stage_skipped(target, Stage::MusicXml));
        return StageOutcome::Skipped;
    }

    info!("{}: generating .musicxml", target.file_name());
    emit(config, |cb| cb.on_stage_start(target, Stage::MusicXml));

    match musicxml::generate_musicxml(target, config).await {
        Ok(()) => {
            emit(config, |cb| cb.on_stage_complete(target, Stage::MusicXml));
            StageOutcome::Generated
        }
        Err(e) => fail(
            target,
            config,
            StageError::MusicXmlGenerationFailed {
                file: target.file_name(),
                detail: e.to_string(),
            },
        ),
    }
}

async fn pdf_stage(target: &ConversionTarget, config: &ConversionConfig) -> StageOutcome {
    if target.pdf_path().exists() {
        info!("{}: .pdf already exists, skipping", target.file_name());
        emit(config, |cb| cb.on_stage_skipped(target, Stage::Pdf));
        return StageOutcome::Skipped;
    }

    if !target.musicxml_path().exists() {
        return fail(
            target,
            config,
            StageError::PdfBlocked {
                file: target.file_name(),
            },
        );
    }

    info!("{}: generating .pdf", target.file_name());
    emit(config, |cb| cb.on_stage_start(target, Stage::Pdf));

    match render::render_pdf(target, config).await {
        Ok(()) => {
            emit(config, |cb| cb.on_stage_complete(target, Stage::Pdf));
            StageOutcome::Generated
        }
        Err(e) => fail(
            target,
            config,
            StageError::PdfRenderFailed {
                file: target.file_name(),
                detail: e.to_string(),
            },
        ),
    }
}

fn fail(target: &ConversionTarget, config: &ConversionConfig, error: StageError) -> StageOutcome {
    warn!("{}", error);
    emit(config, |cb| cb.on_stage_error(target, &error));
    StageOutcome::Failed(error)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::ToolCommand;
    use std::fs;
    use tempfile::TempDir;

    fn config(converter: &str, renderer: &str) -> ConversionConfig {
        ConversionConfig::builder()
            .converter(ToolCommand::new("sh").args(["-c", converter]))
            .renderer(ToolCommand::new("sh").args(["-c", renderer, "render"]))
            .concurrency(2)
            .build()
            .unwrap()
    }

    fn target_in(dir: &TempDir, name: &str, body: &str) -> ConversionTarget {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        ConversionTarget::new(path).unwrap()
    }

    #[tokio::test]
    async fn generates_both_outputs() {
        let dir = TempDir::new().unwrap();
        let t = target_in(&dir, "a.crd", "C G Am F");
        // renderer: $1 = input, $2 = -o, $3 = output
        let cfg = config("cat", "cp \"$1\" \"$3\"");

        let report = convert_file(&t, &cfg).await;

        assert_eq!(report.musicxml, StageOutcome::Generated);
        assert_eq!(report.pdf, Some(StageOutcome::Generated));
        assert_eq!(fs::read_to_string(t.musicxml_path()).unwrap(), "C G Am F");
        assert_eq!(fs::read_to_string(t.pdf_path()).unwrap(), "C G Am F");
    }

    #[tokio::test]
    async fn failed_converter_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let t = target_in(&dir, "a.crd", "C G");
        let cfg = config("echo partial; exit 1", "cp \"$1\" \"$3\"");

        let report = convert_file(&t, &cfg).await;

        assert!(matches!(
            report.musicxml,
            StageOutcome::Failed(StageError::MusicXmlGenerationFailed { .. })
        ));
        assert!(report.pdf.is_none());
        assert!(!t.musicxml_path().exists());
        assert!(!t.pdf_path().exists());
        // only the source remains; no staging files either
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn empty_converter_output_is_a_failure() {
        let dir = TempDir::new().unwrap();
        let t = target_in(&dir, "a.crd", "C G");
        let cfg = config("cat > /dev/null", "cp \"$1\" \"$3\"");

        let report = convert_file(&t, &cfg).await;

        let err = report.error().expect("stage A should fail");
        assert!(err.to_string().contains("no output"), "got: {err}");
        assert!(!t.musicxml_path().exists());
    }

    #[tokio::test]
    async fn failed_renderer_keeps_musicxml() {
        let dir = TempDir::new().unwrap();
        let t = target_in(&dir, "a.crd", "C G");
        let cfg = config("cat", "echo 'cannot engrave' >&2; exit 2");

        let report = convert_file(&t, &cfg).await;

        assert_eq!(report.musicxml, StageOutcome::Generated);
        let err = report.error().expect("stage B should fail");
        assert!(matches!(err, StageError::PdfRenderFailed { .. }));
        assert!(err.to_string().contains("cannot engrave"));
        assert!(t.musicxml_path().exists());
        assert!(!t.pdf_path().exists());
    }

    #[tokio::test]
    async fn existing_outputs_are_skipped_without_running_tools() {
        let dir = TempDir::new().unwrap();
        let t = target_in(&dir, "a.crd", "C G");
        fs::write(t.musicxml_path(), "<score/>").unwrap();
        fs::write(t.pdf_path(), "%PDF").unwrap();
        // tools that would fail loudly if launched
        let cfg = config("exit 9", "exit 9");

        let report = convert_file(&t, &cfg).await;

        assert_eq!(report.musicxml, StageOutcome::Skipped);
        assert_eq!(report.pdf, Some(StageOutcome::Skipped));
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn convert_path_reports_no_files_found() {
        let dir = TempDir::new().unwrap();
        let cfg = config("cat", "cp \"$1\" \"$3\"");
        let err = convert_path(None, dir.path(), &cfg).await.unwrap_err();
        assert!(err.is_informational(), "{err:?}");
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }
}
