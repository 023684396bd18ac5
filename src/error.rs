//! Error types for the crd2score library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Crd2ScoreError`] is **fatal**: the batch cannot proceed at all
//!   (target path missing, wrong kind of file, unreadable directory, bad
//!   configuration). Returned as `Err(Crd2ScoreError)` from the resolver and
//!   the top-level `convert_path*` functions.
//!
//! * [`StageError`] is **non-fatal**: one stage of one file failed (the
//!   converter exited non-zero, the renderer crashed) but every other file is
//!   unaffected. Stored inside [`crate::output::FileReport`] so callers can
//!   inspect partial success rather than losing the whole batch to one bad
//!   file.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the crd2score library.
///
/// Per-file failures use [`StageError`] and are stored in
/// [`crate::output::FileReport`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Crd2ScoreError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The target path does not exist.
    #[error("Path not found: '{}'\nCheck the path exists and is readable.", .path.display())]
    PathNotFound { path: PathBuf },

    /// The target exists but is neither a directory nor a `.crd` file.
    #[error("Invalid input '{}': expected a directory or a .crd file", .path.display())]
    InvalidInputKind { path: PathBuf },

    /// The target resolved to zero `.crd` files. Informational.
    #[error("No .crd files found in '{}'", .path.display())]
    NoFilesFound { path: PathBuf },

    /// Listing the target directory failed.
    #[error("Failed to read directory '{}': {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Crd2ScoreError {
    /// `true` for outcomes that are reported to the user but are not failures.
    pub fn is_informational(&self) -> bool {
        matches!(self, Crd2ScoreError::NoFilesFound { .. })
    }
}

/// A non-fatal error for a single stage of a single file.
///
/// `file` is the `.crd` file name as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum StageError {
    /// The text-to-MusicXML converter failed; the PDF stage is not attempted.
    #[error("Error generating .musicxml for '{file}': {detail}")]
    MusicXmlGenerationFailed { file: String, detail: String },

    /// The score renderer failed.
    #[error("Error generating .pdf for '{file}': {detail}")]
    PdfRenderFailed { file: String, detail: String },

    /// No MusicXML source exists to render from.
    #[error(".musicxml file for '{file}' was not created. Cannot generate .pdf.")]
    PdfBlocked { file: String },
}

impl StageError {
    /// The `.crd` file name this error belongs to.
    pub fn file(&self) -> &str {
        match self {
            StageError::MusicXmlGenerationFailed { file, .. }
            | StageError::PdfRenderFailed { file, .. }
            | StageError::PdfBlocked { file } => file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_not_found_display() {
        let e = Crd2ScoreError::PathNotFound {
            path: PathBuf::from("/nope/songs"),
        };
        assert!(e.to_string().contains("/nope/songs"), "got: {e}");
    }

    #[test]
    fn invalid_input_kind_display() {
        let e = Crd2ScoreError::InvalidInputKind {
            path: PathBuf::from("notes.txt"),
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.txt"));
        assert!(msg.contains(".crd"));
    }

    #[test]
    fn only_no_files_found_is_informational() {
        assert!(Crd2ScoreError::NoFilesFound {
            path: PathBuf::from(".")
        }
        .is_informational());
        assert!(!Crd2ScoreError::PathNotFound {
            path: PathBuf::from(".")
        }
        .is_informational());
        assert!(!Crd2ScoreError::InvalidConfig("x".into()).is_informational());
    }

    #[test]
    fn musicxml_failure_display_carries_detail() {
        let e = StageError::MusicXmlGenerationFailed {
            file: "blues.crd".into(),
            detail: "`txt2musicxml` exited with exit status: 2: parse error".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("'blues.crd'"));
        assert!(msg.contains("parse error"));
        assert_eq!(e.file(), "blues.crd");
    }

    #[test]
    fn pdf_blocked_display() {
        let e = StageError::PdfBlocked {
            file: "a.crd".into(),
        };
        assert_eq!(
            e.to_string(),
            ".musicxml file for 'a.crd' was not created. Cannot generate .pdf."
        );
    }

    #[test]
    fn stage_error_serialises() {
        let e = StageError::PdfRenderFailed {
            file: "a.crd".into(),
            detail: "boom".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("PdfRenderFailed"));
        let back: StageError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }
}
