//! Target resolution: turn the user-supplied path into the list of `.crd`
//! files to convert.
//!
//! The working directory is never read here. Callers pass the directory that
//! "no target" and relative targets are resolved against, which keeps the
//! resolver deterministic under test.

use crate::error::Crd2ScoreError;
use crate::target::{has_crd_extension, ConversionTarget};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve `target` to the `.crd` files it names.
///
/// | `target`                 | result                                   |
/// |--------------------------|------------------------------------------|
/// | `None` or `"."`          | `.crd` files directly in `base_dir`      |
/// | a directory              | `.crd` files directly in that directory  |
/// | a `.crd` file            | that file                                |
/// | any other existing path  | [`Crd2ScoreError::InvalidInputKind`]     |
/// | a missing path           | [`Crd2ScoreError::PathNotFound`]         |
///
/// Targets are always absolute, even when `base_dir` is relative.
/// Listing is non-recursive and returned in directory order. An empty list
/// is `Ok`; deciding whether that is worth reporting is up to the caller.
pub fn resolve_targets(
    target: Option<&Path>,
    base_dir: &Path,
) -> Result<Vec<ConversionTarget>, Crd2ScoreError> {
    let joined = match target {
        None => base_dir.to_path_buf(),
        Some(t) if t == Path::new(".") => base_dir.to_path_buf(),
        Some(t) => base_dir.join(t),
    };
    // A relative base_dir still yields absolute targets.
    let path = match std::path::absolute(&joined) {
        Ok(p) => p,
        Err(_) => return Err(Crd2ScoreError::PathNotFound { path: joined }),
    };

    if !path.exists() {
        return Err(Crd2ScoreError::PathNotFound { path });
    }

    if path.is_dir() {
        return list_directory(&path);
    }

    if path.is_file() && has_crd_extension(&path) {
        debug!("Resolved single target: {}", path.display());
        return Ok(vec![ConversionTarget::new(path)?]);
    }

    Err(Crd2ScoreError::InvalidInputKind { path })
}

/// Every regular `.crd` file directly inside `dir`.
fn list_directory(dir: &Path) -> Result<Vec<ConversionTarget>, Crd2ScoreError> {
    let unreadable = |source| Crd2ScoreError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut targets = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path: PathBuf = entry.path();
        // is_file follows symlinks, so linked sources are picked up too
        if has_crd_extension(&path) && path.is_file() {
            if let Ok(t) = ConversionTarget::new(path) {
                targets.push(t);
            }
        }
    }

    debug!("Found {} .crd files in {}", targets.len(), dir.display());
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    fn names(targets: &[ConversionTarget]) -> BTreeSet<String> {
        targets.iter().map(ConversionTarget::file_name).collect()
    }

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.crd"), "C G Am F").unwrap();
        fs::write(dir.path().join("b.crd"), "Dm G C").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a chart").unwrap();
        dir
    }

    #[test]
    fn directory_yields_only_crd_files() {
        let dir = workspace();
        let targets = resolve_targets(Some(dir.path()), Path::new("/unused")).unwrap();
        assert_eq!(
            names(&targets),
            BTreeSet::from(["a.crd".to_string(), "b.crd".to_string()])
        );
    }

    #[test]
    fn no_target_and_dot_use_base_dir() {
        let dir = workspace();
        let none = resolve_targets(None, dir.path()).unwrap();
        let dot = resolve_targets(Some(Path::new(".")), dir.path()).unwrap();
        assert_eq!(names(&none), names(&dot));
        assert_eq!(none.len(), 2);
        assert!(none.iter().all(|t| t.directory() == dir.path()));
    }

    #[test]
    fn listing_is_not_recursive() {
        let dir = workspace();
        let sub = dir.path().join("nested");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("deep.crd"), "E A B").unwrap();
        // a directory that merely looks like a source file
        fs::create_dir(dir.path().join("folder.crd")).unwrap();

        let targets = resolve_targets(None, dir.path()).unwrap();
        assert_eq!(
            names(&targets),
            BTreeSet::from(["a.crd".to_string(), "b.crd".to_string()])
        );
    }

    #[test]
    fn single_crd_file_relative_to_base_dir() {
        let dir = workspace();
        let targets = resolve_targets(Some(Path::new("a.crd")), dir.path()).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].crd_path(), dir.path().join("a.crd"));
        assert!(targets[0].crd_path().is_absolute());
    }

    #[test]
    fn relative_base_dir_yields_absolute_targets() {
        let dir = tempfile::Builder::new().tempdir_in(".").unwrap();
        fs::write(dir.path().join("a.crd"), "C G").unwrap();
        let name = dir.path().file_name().unwrap();
        let relative = Path::new(".").join(name);

        let targets = resolve_targets(None, &relative).unwrap();

        assert_eq!(targets.len(), 1);
        assert!(targets[0].crd_path().is_absolute());
        let expected = std::env::current_dir().unwrap().join(name).join("a.crd");
        assert_eq!(targets[0].crd_path(), expected);
    }

    #[test]
    fn empty_base_dir_is_path_not_found() {
        let err = resolve_targets(None, Path::new("")).unwrap_err();
        assert!(matches!(err, Crd2ScoreError::PathNotFound { .. }), "{err:?}");
    }

    #[test]
    fn non_crd_file_is_invalid_input_kind() {
        let dir = workspace();
        let err = resolve_targets(Some(Path::new("notes.txt")), dir.path()).unwrap_err();
        assert!(matches!(err, Crd2ScoreError::InvalidInputKind { .. }), "{err:?}");
    }

    #[test]
    fn missing_path_is_path_not_found() {
        let dir = workspace();
        let err = resolve_targets(Some(Path::new("missing.crd")), dir.path()).unwrap_err();
        assert!(matches!(err, Crd2ScoreError::PathNotFound { .. }), "{err:?}");
    }

    #[test]
    fn empty_directory_is_ok_and_empty() {
        let dir = TempDir::new().unwrap();
        let targets = resolve_targets(None, dir.path()).unwrap();
        assert!(targets.is_empty());
    }
}
