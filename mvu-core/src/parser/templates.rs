//! Boilerplate text blocks inserted into converted programs.

use super::program::read_text_lines;
use crate::error::{ConvertError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Source of named boilerplate files.
pub trait BoilerplateSource {
    /// All lines of the named file. Missing or empty files are an error.
    fn lines(&self, name: &str) -> Result<Vec<String>>;

    /// The three instruction lines of a block template (line 0 is a header).
    fn block(&self, name: &str) -> Result<Vec<String>> {
        let lines = self.lines(name)?;
        if lines.len() < 4 {
            return Err(ConvertError::BoilerplateMissing {
                name: name.to_string(),
            });
        }
        Ok(lines[1..4].to_vec())
    }
}

/// Boilerplate files found anywhere below a directory.
#[derive(Debug, Clone)]
pub struct TemplateDir {
    root: PathBuf,
}

impl TemplateDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// First file below the root with exactly this name.
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .find(|e| e.file_type().is_file() && e.file_name() == name)
            .map(|e| e.into_path())
    }
}

impl BoilerplateSource for TemplateDir {
    fn lines(&self, name: &str) -> Result<Vec<String>> {
        let missing = || ConvertError::BoilerplateMissing {
            name: name.to_string(),
        };
        let path = self.find(name).ok_or_else(missing)?;
        debug!("Using boilerplate {}", path.display());
        match read_text_lines(&path) {
            Ok(lines) if !lines.is_empty() => Ok(lines),
            Ok(_) | Err(ConvertError::EmptyFile { .. }) => Err(missing()),
            Err(e) => Err(e),
        }
    }
}

/// In-memory boilerplate, keyed by file name.
impl BoilerplateSource for HashMap<String, Vec<String>> {
    fn lines(&self, name: &str) -> Result<Vec<String>> {
        self.get(name)
            .filter(|lines| !lines.is_empty())
            .cloned()
            .ok_or_else(|| ConvertError::BoilerplateMissing {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_template_dir_finds_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("site").join("blocks");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("TextKill_text.txt"), "header\nA\nB\nC\n").unwrap();

        let templates = TemplateDir::new(dir.path());
        assert_eq!(
            templates.block("TextKill_text.txt").unwrap(),
            vec!["A".to_string(), "B".to_string(), "C".to_string()]
        );
    }

    #[test]
    fn test_template_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TemplateDir::new(dir.path()).lines("prompt_text.txt").unwrap_err();
        assert_eq!(err.to_string(), "Can't find 'prompt_text.txt' file.");
    }

    #[test]
    fn test_template_dir_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prompt_text.txt"), "").unwrap();
        let err = TemplateDir::new(dir.path()).lines("prompt_text.txt").unwrap_err();
        assert!(matches!(err, ConvertError::BoilerplateMissing { .. }));
    }

    #[test]
    fn test_block_needs_four_lines() {
        let mut map = HashMap::new();
        map.insert("short.txt".to_string(), vec!["h".to_string(), "a".to_string()]);
        assert!(map.lines("short.txt").is_ok());
        assert!(matches!(
            map.block("short.txt"),
            Err(ConvertError::BoilerplateMissing { name }) if name == "short.txt"
        ));
    }
}
