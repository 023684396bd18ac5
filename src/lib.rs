//! # crd2score
//!
//! Batch-convert chord-notation text files (`.crd`) into MusicXML and
//! engraved PDF scores by driving two external tools.
//!
//! ## Pipeline Overview
//!
//! ```text
//! target path
//!  │
//!  ├─ 1. Resolve   directory listing / single file → .crd targets
//!  ├─ 2. MusicXML  txt2musicxml < song.crd > song.musicxml   (skipped if present)
//!  └─ 3. PDF       mscore song.musicxml -o song.pdf          (skipped if present)
//! ```
//!
//! Files are independent and run concurrently. The output files double as
//! the record of finished work: a second run over the same directory skips
//! everything and launches no tools. Outputs are staged in hidden temp files
//! and renamed into place only on success, so a failed tool never leaves a
//! file behind that a later run would skip.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crd2score::{convert_path, ConversionConfig};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert_path(None, Path::new("/home/me/songs"), &config).await?;
//!     for file in &output.files {
//!         if let Some(err) = file.error() {
//!             eprintln!("{err}");
//!         }
//!     }
//!     eprintln!("{} files, {} failed", output.stats.total_files, output.stats.failed_files);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `crd2score` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod target;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ToolCommand};
pub use convert::{convert_all, convert_file, convert_path, convert_sync};
pub use error::{Crd2ScoreError, StageError};
pub use output::{BatchOutput, BatchStats, FileReport, StageOutcome};
pub use pipeline::resolve::resolve_targets;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
pub use stream::{convert_stream, FileStream};
pub use target::ConversionTarget;
