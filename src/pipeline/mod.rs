//! Pipeline stages for CRD-to-score conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its own
//! and the orchestration in [`crate::convert`] stays a plain sequence of
//! existence checks.
//!
//! ## Data Flow
//!
//! ```text
//! resolve ──▶ musicxml ──▶ render
//! (path)      (.crd→.musicxml) (.musicxml→.pdf)
//! ```
//!
//! 1. [`resolve`] expands the user-supplied path into `.crd` targets.
//! 2. [`musicxml`] runs the converter: chord text on stdin, MusicXML on stdout.
//! 3. [`render`] runs the renderer: MusicXML path in, PDF path out.
//!
//! [`tool`] holds the child-process plumbing shared by stages 2 and 3.

pub mod musicxml;
pub mod render;
pub mod resolve;
pub mod tool;

use crate::target::ConversionTarget;
use std::io;
use tempfile::NamedTempFile;

/// Create a hidden staging file next to `target`, e.g. `.blues.Xa9c2f.pdf`.
///
/// Staging in the target directory keeps the final rename on one file
/// system. The leading dot and the suffix keep it out of `.crd` listings.
pub(crate) fn staging_file(target: &ConversionTarget, suffix: &str) -> io::Result<NamedTempFile> {
    let prefix = format!(".{}.", target.base_name());
    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(suffix);

    // tempfile defaults to 0600; installed outputs should read like any
    // other file the user creates.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }

    builder.tempfile_in(target.directory())
}
