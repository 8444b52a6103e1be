//! Shared helpers for locating configuration and preparing output paths.
//!
//! These functions are reused by the CLI subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::vocabulary::Vocabulary;

/// Gets the cross-platform default vocabulary path.
///
/// Returns the path as `{config_dir}/figtag/vocabulary.json` where `config_dir` is:
/// - Linux: `~/.config`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the config directory cannot be determined.
pub fn get_vocabulary_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;

    Ok(config_dir.join("figtag").join("vocabulary.json"))
}

/// Ensures the parent directory of an output file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_parent_directory(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Resolves the vocabulary for a run.
///
/// An explicit path must load. Without one, the default path is used if the
/// file exists, otherwise the built-in microscopy vocabulary.
///
/// # Errors
///
/// Returns an error if the chosen vocabulary file cannot be read or is invalid.
pub fn resolve_vocabulary(explicit: Option<&Path>) -> Result<Vocabulary> {
    if let Some(path) = explicit {
        return Vocabulary::load(path)
            .with_context(|| format!("Failed to load vocabulary {}", path.display()));
    }

    if let Ok(default_path) = get_vocabulary_path()
        && default_path.is_file()
    {
        debug!(path = %default_path.display(), "using vocabulary from config directory");
        return Vocabulary::load(&default_path)
            .with_context(|| format!("Failed to load vocabulary {}", default_path.display()));
    }

    debug!("using built-in vocabulary");
    Ok(Vocabulary::builtin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::VocabularyError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn vocabulary_path_is_under_figtag_config_dir() {
        let path = get_vocabulary_path().unwrap();
        assert!(path.ends_with("figtag/vocabulary.json"));
    }

    #[test]
    fn ensure_parent_directory_creates_nested_dirs() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("a").join("b").join("out.jsonl");

        ensure_parent_directory(&output).unwrap();
        assert!(output.parent().unwrap().is_dir());
    }

    #[test]
    fn ensure_parent_directory_accepts_bare_file_name() {
        ensure_parent_directory(Path::new("out.jsonl")).unwrap();
    }

    #[test]
    fn explicit_vocabulary_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        fs::write(&path, r#"{"tags": ["TEM", ["AFM", "atomic force"]]}"#).unwrap();

        let vocabulary = resolve_vocabulary(Some(&path)).unwrap();
        assert_eq!(vocabulary.definitions().len(), 2);
        assert!(vocabulary.retains("AFM"));
    }

    #[test]
    fn invalid_explicit_vocabulary_keeps_typed_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vocab.json");
        fs::write(&path, r#"{"tags": [42]}"#).unwrap();

        let err = resolve_vocabulary(Some(&path)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VocabularyError>(),
            Some(VocabularyError::InvalidTagDefinition { index: 0, .. })
        ));
    }
}
