//! Settings file loading.
//!
//! `Settings.ini` is read through the `config` crate's INI format and kept
//! as a two-level section/key table. Section and key lookups are
//! case-insensitive.

use crate::error::{ConvertError, Result};
use ::config::{Config, File, FileFormat};
use std::collections::HashMap;
use std::path::Path;

type Sections = HashMap<String, HashMap<String, String>>;

/// Parsed INI file: sections of key/value pairs.
#[derive(Debug, Clone, Default)]
pub struct IniFile {
    sections: Sections,
}

impl IniFile {
    /// Read and parse an INI file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConvertError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse INI content.
    ///
    /// Backslashes are literal (settings hold Windows paths), so they are
    /// escaped before the INI reader sees them.
    pub fn parse(content: &str) -> Result<Self> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let literal = content.replace('\\', "\\\\");

        let raw: Sections = Config::builder()
            .add_source(File::from_str(&literal, FileFormat::Ini))
            .build()
            .and_then(|config| config.try_deserialize::<Sections>())
            .map_err(|e| ConvertError::InvalidSetting {
                message: e.to_string(),
            })?;

        let sections = raw
            .into_iter()
            .map(|(section, entries)| {
                let entries = entries
                    .into_iter()
                    .map(|(key, value)| (key.to_lowercase(), value))
                    .collect();
                (section.to_lowercase(), entries)
            })
            .collect();
        Ok(Self { sections })
    }

    /// Look up a value.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_lowercase())?
            .get(&key.to_lowercase())
            .map(String::as_str)
    }

    /// Look up a value with a caller-supplied default.
    pub fn get_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key).unwrap_or(default).to_string()
    }

    /// Whether a section is present.
    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&section.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // ==================== IniFile tests ====================

    #[test]
    fn test_parse_sections() {
        let ini = IniFile::parse(
            "; settings\n[GlobalSettings]\ndimension_root = DIM\n\n[Paths]\nOutput_RootPath = D:\\Out\n",
        )
        .expect("should parse");
        assert!(ini.has_section("GlobalSettings"));
        assert!(ini.has_section("paths"));
        assert!(!ini.has_section("Location"));
        assert_eq!(ini.get("GlobalSettings", "dimension_root"), Some("DIM"));
        assert_eq!(ini.get("Paths", "output_rootpath"), Some("D:\\Out"));
        assert_eq!(ini.get("paths", "OUTPUT_ROOTPATH"), Some("D:\\Out"));
    }

    #[test]
    fn test_windows_paths_keep_backslashes() {
        let ini = IniFile::parse(
            "[Paths]\nreporting_root_path = R:\\Reports\\\nsmart_profile_exe_filepath = C:\\Program Files\\SP\\new.exe\n",
        )
        .expect("should parse");
        assert_eq!(ini.get("Paths", "reporting_root_path"), Some("R:\\Reports\\"));
        assert_eq!(
            ini.get("Paths", "smart_profile_exe_filepath"),
            Some("C:\\Program Files\\SP\\new.exe")
        );
    }

    #[test]
    fn test_get_or_default() {
        let ini = IniFile::parse("[Location]\nSite=CoonRapids\n").expect("should parse");
        assert_eq!(ini.get_or("Location", "Site", "Anoka"), "CoonRapids");
        assert_eq!(ini.get_or("Location", "Building", "1"), "1");
        assert_eq!(ini.get_or("Paths", "templates_dir", "templates"), "templates");
    }

    #[test]
    fn test_bom_is_ignored() {
        let ini = IniFile::parse("\u{feff}[A]\nk=1\n").expect("should parse");
        assert_eq!(ini.get("A", "k"), Some("1"));
    }

    #[test]
    fn test_empty_content() {
        let ini = IniFile::parse("").expect("should parse");
        assert_eq!(ini.get("Location", "Site"), None);
    }

    #[test]
    fn test_key_outside_section_is_error() {
        let err = IniFile::parse("k=1\n").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidSetting { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = IniFile::load(&dir.path().join("Settings.ini")).unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Settings.ini");
        std::fs::write(&path, "[Location]\nSite = CoonRapids\n").unwrap();
        let ini = IniFile::load(&path).unwrap();
        assert_eq!(ini.get("location", "site"), Some("CoonRapids"));
    }
}
