//! The unit of work: one `.crd` file and the sibling paths derived from it.

use crate::error::Crd2ScoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Extension of chord-notation source files.
pub const CRD_EXTENSION: &str = "crd";
/// Extension of the intermediate MusicXML output.
pub const MUSICXML_EXTENSION: &str = "musicxml";
/// Extension of the rendered score.
pub const PDF_EXTENSION: &str = "pdf";

/// An absolute path to a `.crd` file, validated once at construction.
///
/// Outputs always land next to the source:
///
/// ```text
/// /songs/blues.crd  →  /songs/blues.musicxml  →  /songs/blues.pdf
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversionTarget {
    crd_path: PathBuf,
}

impl ConversionTarget {
    /// Wrap `path` as a target.
    ///
    /// Fails with [`Crd2ScoreError::InvalidInputKind`] when the path does not
    /// end in `.crd`, has no file stem, or has no parent directory. Existence
    /// is not checked here; that is the resolver's job.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, Crd2ScoreError> {
        let crd_path = path.into();
        let valid = has_crd_extension(&crd_path)
            && crd_path.file_stem().is_some()
            && crd_path.parent().is_some();
        if !valid {
            return Err(Crd2ScoreError::InvalidInputKind { path: crd_path });
        }
        Ok(Self { crd_path })
    }

    /// Path of the `.crd` source file.
    pub fn crd_path(&self) -> &Path {
        &self.crd_path
    }

    /// Directory holding the source and both outputs.
    pub fn directory(&self) -> &Path {
        self.crd_path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// File name without extension.
    pub fn base_name(&self) -> String {
        self.crd_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name with extension, as shown in status messages.
    pub fn file_name(&self) -> String {
        self.crd_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// `directory/base_name.musicxml`
    pub fn musicxml_path(&self) -> PathBuf {
        self.crd_path.with_extension(MUSICXML_EXTENSION)
    }

    /// `directory/base_name.pdf`
    pub fn pdf_path(&self) -> PathBuf {
        self.crd_path.with_extension(PDF_EXTENSION)
    }
}

impl fmt::Display for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.crd_path.display())
    }
}

/// Case-sensitive `.crd` check; `Song.CRD` is not picked up.
pub fn has_crd_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == CRD_EXTENSION)
}
