//! Configuration constants and settings for the converter.

use crate::error::Result;
use crate::parser::IniFile;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Export target for programs feeding the data-collection system.
pub const CURL_EXPORT_ROOT: &str = "C:\\Users\\Public\\CURL\\in\\";

/// Fixed export file for SmartProfile programs.
pub const SMARTPROFILE_EXPORT_FILE: &str = "C:\\TEXT\\OUTPUT.txt";

/// Export directory that marks a SmartProfile program.
pub const POINTCLOUD_EXPORT_DIR: &str = "C:\\MICROVU\\POINTCLOUDS\\";

/// Kill-file batch script called at program start.
pub const KILL_FILE_PATH: &str = "C:\\killFile.bat";

/// Kill-file script name, as found in any path form.
pub const KILL_FILE_NAME: &str = "killFile.bat";

/// Image shown by the "bring part to metrology" step.
pub const METROLOGY_PICTURE: &str = "Bring part to Metrology.JPG";

/// Executable name present in an existing SmartProfile call.
pub const SMARTPROFILE_EXE: &str = "SmartProfile.exe";

/// Line holding the export/report configuration nodes.
pub const EXPORT_ANCHOR: &str = "AutoExpFile";

/// Leading tag of the instruction count header line.
pub const INSTRUCTIONS_TAG: &str = "Instructions";

/// Node marking a feature name declaration.
pub const NAME_NODE: &str = "(Name ";

/// Node marking a measured feature.
pub const PROP_LABELS_NODE: &str = "(PropLabels ";

/// Operator prompts the converter replaces with its own.
pub const LEGACY_PROMPT_NAMES: &[&str] = &[
    "PT #",
    "Employee #",
    "Machine #",
    "PT#",
    "Employee#",
    "Machine#",
    "Run-Setup",
    "Job #",
    "Job#",
    "PT",
    "REV LETTER",
    "OPERATION",
    "EMPLOYEE",
    "JOB",
    "MACHINE",
    "IN PROCESS",
    "SEQUENCE",
    "SPFILENAME",
];

/// Operator prompts taken from the prompt template.
pub const PROMPT_NAMES: &[&str] = &[
    "IN PROCESS",
    "MACHINE",
    "JOB",
    "EMPLOYEE",
    "OPERATION",
    "REV LETTER",
    "PT",
    "SEQUENCE",
    "SPFILENAME",
];

/// Boilerplate text block file names.
pub mod templates {
    pub const PROMPTS: &str = "prompt_text.txt";
    pub const SMARTPROFILE_PROMPTS: &str = "sp_prompt_text.txt";
    pub const KILL_FILE: &str = "TextKill_text.txt";
    pub const METROLOGY_PICTURE: &str = "BringPartToMetrology_text.txt";
    pub const SMARTPROFILE_CALL: &str = "CallSmartProfile_text.txt";
}

/// Plant the converter runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Site {
    CoonRapids,
    #[default]
    Anoka,
}

impl Site {
    /// Parse the `[Location] Site` value. Anything but `CoonRapids` is Anoka.
    pub fn from_setting(s: &str) -> Self {
        if s.trim() == "CoonRapids" {
            Site::CoonRapids
        } else {
            Site::Anoka
        }
    }

    /// Whether prompts may go before the `START` instruction when the
    /// Created/Edited comment lines are missing.
    pub fn falls_back_to_start_anchor(&self) -> bool {
        matches!(self, Site::Anoka)
    }
}

impl std::fmt::Display for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Site::CoonRapids => write!(f, "CoonRapids"),
            Site::Anoka => write!(f, "Anoka"),
        }
    }
}

/// Converter settings, read from `Settings.ini`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub site: Site,
    /// Prefix placed in front of classified dimension names.
    pub dimension_root: String,
    /// Keep names as typed instead of classifying them.
    pub hand_edit_dimension_names: bool,
    /// Delete the source program after a successful write.
    pub allow_delete: bool,
    /// Mark every feature `DontMeasure` and add the metrology picture step.
    pub disable_on_convert: bool,
    pub output_rootpath: PathBuf,
    /// Windows directory prefix for PDF reports, concatenated verbatim.
    pub reporting_root_path: String,
    pub smart_profile_script_filepath: String,
    pub smart_profile_exe_filepath: String,
    /// Directory searched for boilerplate text blocks.
    pub templates_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site: Site::default(),
            dimension_root: String::new(),
            hand_edit_dimension_names: false,
            allow_delete: false,
            disable_on_convert: false,
            output_rootpath: PathBuf::from("output"),
            reporting_root_path: String::new(),
            smart_profile_script_filepath: String::new(),
            smart_profile_exe_filepath: String::new(),
            templates_dir: PathBuf::from("templates"),
        }
    }
}

impl Settings {
    /// Load settings from an INI file.
    pub fn load(path: &Path) -> Result<Self> {
        let ini = IniFile::load(path)?;
        Ok(Self::from_ini(&ini))
    }

    /// Build settings from a parsed INI file, falling back to defaults.
    pub fn from_ini(ini: &IniFile) -> Self {
        let defaults = Self::default();
        let flag = |key: &str| ini.get_or("GlobalSettings", key, "False") == "True";

        Self {
            site: Site::from_setting(&ini.get_or("Location", "Site", "Anoka")),
            dimension_root: ini.get_or("GlobalSettings", "dimension_root", ""),
            hand_edit_dimension_names: flag("hand_edit_dimension_names"),
            allow_delete: flag("allow_delete"),
            disable_on_convert: flag("disable_on_convert"),
            output_rootpath: ini
                .get("Paths", "output_rootpath")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_rootpath),
            reporting_root_path: ini.get_or("Paths", "reporting_root_path", ""),
            smart_profile_script_filepath: ini.get_or("Paths", "smart_profile_script_filepath", ""),
            smart_profile_exe_filepath: ini.get_or("Paths", "smart_profile_exe_filepath", ""),
            templates_dir: ini
                .get("Paths", "templates_dir")
                .map(PathBuf::from)
                .unwrap_or(defaults.templates_dir),
        }
    }
}
