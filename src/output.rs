//! Result types: what happened to each file, and to the batch as a whole.

use crate::error::StageError;
use crate::target::ConversionTarget;
use serde::{Deserialize, Serialize};

/// Outcome of one stage for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageOutcome {
    /// The output already existed; no tool was run.
    Skipped,
    /// The tool ran successfully and the output was installed.
    Generated,
    /// The tool failed, or the stage could not run.
    Failed(StageError),
}

impl StageOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&StageError> {
        match self {
            StageOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// What happened to a single `.crd` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub target: ConversionTarget,

    pub musicxml: StageOutcome,

    /// `None` when the MusicXML stage failed and the PDF stage never ran.
    pub pdf: Option<StageOutcome>,

    /// Wall-clock time spent on this file, including tool runtime.
    pub duration_ms: u64,
}

impl FileReport {
    /// `true` when neither stage failed.
    pub fn is_success(&self) -> bool {
        !self.musicxml.is_failed() && self.pdf.as_ref().is_some_and(|p| !p.is_failed())
    }

    /// The first stage error recorded for this file, if any.
    pub fn error(&self) -> Option<&StageError> {
        self.musicxml
            .error()
            .or_else(|| self.pdf.as_ref().and_then(StageOutcome::error))
    }
}

/// Counters over a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub total_files: usize,
    pub musicxml_generated: usize,
    pub musicxml_skipped: usize,
    pub pdf_generated: usize,
    pub pdf_skipped: usize,
    /// Files with at least one failed stage.
    pub failed_files: usize,
    pub total_duration_ms: u64,
}

impl BatchStats {
    /// Tally `reports`; `total_duration_ms` is left for the caller to fill.
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut stats = BatchStats {
            total_files: reports.len(),
            ..Default::default()
        };
        for r in reports {
            match r.musicxml {
                StageOutcome::Generated => stats.musicxml_generated += 1,
                StageOutcome::Skipped => stats.musicxml_skipped += 1,
                StageOutcome::Failed(_) => {}
            }
            match r.pdf {
                Some(StageOutcome::Generated) => stats.pdf_generated += 1,
                Some(StageOutcome::Skipped) => stats.pdf_skipped += 1,
                _ => {}
            }
            if !r.is_success() {
                stats.failed_files += 1;
            }
        }
        stats
    }
}

/// Everything a batch run produced, in completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    pub files: Vec<FileReport>,
    pub stats: BatchStats,
}

impl BatchOutput {
    pub fn has_failures(&self) -> bool {
        self.stats.failed_files > 0
    }
}
