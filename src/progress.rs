//! Progress-callback trait for per-file conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline processes each file. The CLI uses it to print one
//! status line per outcome; library callers can forward events anywhere.
//!
//! # Example
//!
//! ```rust
//! use crd2score::{ConversionConfig, ConversionProgressCallback, ConversionTarget, Stage};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     generated: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_stage_complete(&self, _target: &ConversionTarget, _stage: Stage) {
//!         self.generated.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { generated: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::error::StageError;
use crate::output::FileReport;
use crate::target::ConversionTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The two conversion stages of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// `.crd` → `.musicxml` via the converter.
    MusicXml,
    /// `.musicxml` → `.pdf` via the renderer.
    Pdf,
}

impl Stage {
    /// Extension of the file this stage produces, with the leading dot.
    pub fn output_extension(self) -> &'static str {
        match self {
            Stage::MusicXml => ".musicxml",
            Stage::Pdf => ".pdf",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.output_extension())
    }
}

/// Called by the conversion pipeline as it processes each file.
///
/// Implementations must be `Send + Sync`: files are processed concurrently,
/// so every method may be called from several in-flight conversions at once.
/// Events for a single file arrive in order; events for different files
/// interleave arbitrarily. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any file is processed.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before an external tool is launched for a stage.
    fn on_stage_start(&self, target: &ConversionTarget, stage: Stage) {
        let _ = (target, stage);
    }

    /// Called when a stage's output already exists and the tool is not run.
    fn on_stage_skipped(&self, target: &ConversionTarget, stage: Stage) {
        let _ = (target, stage);
    }

    /// Called when a stage's output was produced and installed.
    fn on_stage_complete(&self, target: &ConversionTarget, stage: Stage) {
        let _ = (target, stage);
    }

    /// Called when a stage fails or is blocked.
    fn on_stage_error(&self, target: &ConversionTarget, error: &StageError) {
        let _ = (target, error);
    }

    /// Called once per file after both stages were attempted or skipped.
    fn on_file_complete(&self, report: &FileReport) {
        let _ = report;
    }

    /// Called once after every file has been attempted.
    fn on_batch_complete(&self, total_files: usize, failed_files: usize) {
        let _ = (total_files, failed_files);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
