//! One MicroVu inspection program and its derived properties.

use super::dimension::DimensionName;
use super::document::{LineDocument, TextEncoding};
use super::filename;
use super::node::{find_ignore_case, get_node_text, set_node_text, QUOTE};
use super::record::{line_tag, upsert_node};
use crate::config::{
    EXPORT_ANCHOR, INSTRUCTIONS_TAG, KILL_FILE_NAME, KILL_FILE_PATH, METROLOGY_PICTURE,
    NAME_NODE, POINTCLOUD_EXPORT_DIR, PROP_LABELS_NODE, SMARTPROFILE_EXE,
    SMARTPROFILE_EXPORT_FILE,
};
use crate::error::{ConvertError, Result};
use crate::parser::read_program_lines;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Job data entered by the operator for a program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramOptions {
    pub op_number: String,
    pub rev_number: String,
    pub smartprofile_projectname: String,
}

impl ProgramOptions {
    pub fn new(op_number: &str, rev_number: &str) -> Self {
        Self {
            op_number: op_number.to_string(),
            rev_number: rev_number.to_string(),
            smartprofile_projectname: String::new(),
        }
    }

    pub fn with_smartprofile_project(mut self, name: &str) -> Self {
        self.smartprofile_projectname = name.to_string();
        self
    }
}

/// A loaded inspection program.
#[derive(Debug, Clone)]
pub struct MicroVuProgram {
    path: PathBuf,
    document: LineDocument,
    encoding: TextEncoding,
    op_number: String,
    rev_number: String,
    smartprofile_projectname: String,
    is_smartprofile: bool,
    has_calculators: bool,
    manual_dimension_names: Vec<DimensionName>,
}

/// Serializable overview of a program (for debug output).
#[derive(Debug, Clone, Serialize)]
pub struct ProgramSummary {
    pub filename: String,
    pub part_number: String,
    pub view_name: String,
    pub op_number: String,
    pub rev_number: String,
    pub is_smartprofile: bool,
    pub has_calculators: bool,
    pub export_filepath: String,
    pub report_filepath: String,
    pub instruction_count: usize,
    pub dimension_names: Vec<DimensionName>,
}

impl MicroVuProgram {
    /// Read a program from disk.
    pub fn load(path: &Path, options: &ProgramOptions) -> Result<Self> {
        let (lines, encoding) = read_program_lines(path)?;
        Ok(Self::from_lines(path, lines, encoding, options))
    }

    /// Build a program from already decoded lines.
    pub fn from_lines(
        path: impl Into<PathBuf>,
        lines: Vec<String>,
        encoding: TextEncoding,
        options: &ProgramOptions,
    ) -> Self {
        let mut program = Self {
            path: path.into(),
            document: LineDocument::new(lines),
            encoding,
            op_number: options.op_number.to_uppercase(),
            rev_number: options.rev_number.to_uppercase(),
            smartprofile_projectname: options.smartprofile_projectname.clone(),
            is_smartprofile: false,
            has_calculators: false,
            manual_dimension_names: Vec::new(),
        };
        program.is_smartprofile = program.detect_smartprofile();
        program.has_calculators = program
            .document
            .lines()
            .iter()
            .any(|line| line_tag(line) == "Calc");
        program
    }

    fn detect_smartprofile(&self) -> bool {
        let Some(line) = self.export_line() else {
            return false;
        };
        let Ok(export) = get_node_text(line, EXPORT_ANCHOR, QUOTE, QUOTE) else {
            return false;
        };
        let export = export.replace('/', "\\").to_uppercase();
        filename::windows_stem(&export) == "OUTPUT" || export.contains(POINTCLOUD_EXPORT_DIR)
    }

    // ==================== Identity ====================

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name with extension.
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn part_number(&self) -> String {
        filename::part_number(&self.stem())
    }

    pub fn view_name(&self) -> String {
        filename::view_name(&self.stem())
    }

    pub fn op_number(&self) -> &str {
        &self.op_number
    }

    pub fn rev_number(&self) -> &str {
        &self.rev_number
    }

    pub fn smartprofile_projectname(&self) -> &str {
        &self.smartprofile_projectname
    }

    pub fn is_smartprofile(&self) -> bool {
        self.is_smartprofile
    }

    pub fn has_calculators(&self) -> bool {
        self.has_calculators
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn document(&self) -> &LineDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut LineDocument {
        &mut self.document
    }

    pub fn lines(&self) -> &[String] {
        self.document.lines()
    }

    // ==================== Anchors ====================

    /// Index of the line holding the export/report configuration.
    pub fn export_line_index(&self) -> Option<usize> {
        self.document.anchor(EXPORT_ANCHOR)
    }

    fn export_line(&self) -> Option<&str> {
        self.export_line_index().and_then(|i| self.document.line(i))
    }

    fn require_export_line(&self) -> Result<usize> {
        self.export_line_index().ok_or_else(|| {
            ConvertError::anchor(EXPORT_ANCHOR, "program has no export configuration line")
        })
    }

    /// Index of the `Instructions` count header.
    pub fn instructions_index(&self) -> Option<usize> {
        self.document.find_line_with_tag(INSTRUCTIONS_TAG)
    }

    /// Index of the first line calling the kill file, under any path.
    pub fn kill_file_call_index(&self) -> Option<usize> {
        self.document.position_of(KILL_FILE_NAME)
    }

    pub fn has_text_kill(&self) -> bool {
        self.document.contains_text(KILL_FILE_PATH)
    }

    pub fn has_metrology_picture(&self) -> bool {
        self.document.contains_text(METROLOGY_PICTURE)
    }

    /// Where the metrology picture is, or should go (three lines after the
    /// kill-file call).
    pub fn bring_part_to_metrology_index(&self) -> Option<usize> {
        self.document
            .position_of(METROLOGY_PICTURE)
            .or_else(|| self.kill_file_call_index().map(|i| i + 3))
    }

    /// Last of the `Created`/`Edited` comment lines, after which prompts go.
    pub fn prompt_insertion_index(&self) -> Option<usize> {
        let comment_line = |text: &str| {
            self.document
                .anchor(text)
                .filter(|&i| self.document.line(i).is_some_and(|l| line_tag(l) == "Txt"))
        };
        let created = comment_line("(Name \"Created")?;
        let edited = comment_line("(Name \"Edited")?;
        Some(created.max(edited))
    }

    /// The `START` instruction some programs open their prompt block with.
    pub fn start_anchor_index(&self) -> Option<usize> {
        self.document.anchor("(Name \"START")
    }

    /// Existing call to the SmartProfile executable.
    pub fn smartprofile_call_index(&self) -> Option<usize> {
        self.document.anchor(SMARTPROFILE_EXE)
    }

    /// Id of the last coordinate system referenced by the program.
    pub fn last_system_id(&self) -> Option<String> {
        let line = self
            .document
            .lines()
            .iter()
            .rev()
            .find(|l| find_ignore_case(l, "(SYS ", 0).is_some_and(|col| col > 1))?;
        let id = if line.starts_with("Sys 1") {
            get_node_text(line, "Sys 1", " ", " ")
        } else {
            get_node_text(line, "(Sys", " ", ")")
        };
        id.ok().filter(|s| !s.is_empty()).map(str::to_string)
    }

    // ==================== Export and report ====================

    pub fn export_filepath(&self) -> String {
        if self.is_smartprofile {
            return SMARTPROFILE_EXPORT_FILE.to_string();
        }
        self.export_line()
            .and_then(|line| get_node_text(line, EXPORT_ANCHOR, QUOTE, QUOTE).ok())
            .unwrap_or("")
            .to_string()
    }

    /// Point the export at `value`. SmartProfile programs always export to
    /// the fixed point-cloud output file.
    pub fn set_export_filepath(&mut self, value: &str) -> Result<()> {
        let value = if self.is_smartprofile {
            SMARTPROFILE_EXPORT_FILE
        } else {
            value
        };
        let idx = self.require_export_line()?;
        let line = self.document.lines()[idx].as_str();

        let mut updated = match set_node_text(line, "(ExpFile ", value, QUOTE, QUOTE) {
            Ok(updated) => updated,
            Err(_) => {
                debug!("No ExpFile node in {}", self.filename());
                line.to_string()
            }
        };
        updated = set_node_text(&updated, "(AutoExpFile ", value, QUOTE, QUOTE)?;
        updated = if self.is_smartprofile {
            updated.replace("(AutoExpFSApSt DT)", "(AutoExpFSApSt None)")
        } else {
            updated.replace("(AutoExpFSApSt None)", "(AutoExpFSApSt DT)")
        };
        updated = updated.replace("(FldDlm Tab)", "(FldDlm CrLf)");

        self.document.replace_line(idx, updated);
        Ok(())
    }

    /// Whether the export line already carries a full automatic report setup.
    pub fn has_auto_report(&self) -> bool {
        let Some(line) = self.export_line() else {
            return false;
        };
        line.contains("(AutoRptSortInstructionsByName 0)")
            && line.contains("(AutoRptTemplateName")
            && line.contains("(AutoRptAppendDateAndTime")
            && line.contains("(AutoRptFileName")
    }

    pub fn report_filepath(&self) -> String {
        if self.is_smartprofile {
            return String::new();
        }
        self.document
            .anchor("AutoRptFileName")
            .and_then(|i| self.document.line(i))
            .and_then(|line| get_node_text(line, "AutoRptFileName", QUOTE, QUOTE).ok())
            .unwrap_or("")
            .to_string()
    }

    /// Point the PDF report at `value`, adding the report nodes when the
    /// program has no automatic report yet.
    pub fn set_report_filepath(&mut self, value: &str) -> Result<()> {
        let value = if self.is_smartprofile { "" } else { value };

        if self.has_auto_report() {
            let Some(idx) = self.document.anchor("AutoRptFileName") else {
                return Ok(());
            };
            let updated = set_node_text(
                &self.document.lines()[idx],
                "(AutoRptFileName ",
                value,
                QUOTE,
                QUOTE,
            )?;
            self.document.replace_line(idx, updated);
            return Ok(());
        }

        let idx = self.require_export_line()?;
        let mut line = self.document.lines()[idx].clone();
        line = upsert_node(
            &line,
            "AutoRptSortInstructionsByName",
            "(AutoRptSortInstructionsByName 0)",
        );
        line = upsert_node(&line, "AutoRptTemplateName", "(AutoRptTemplateName \"Classic\")");
        line = upsert_node(&line, "AutoRptAppendDateAndTime", "(AutoRptAppendDateAndTime 1)");
        line = upsert_node(
            &line,
            "AutoRptFileName",
            &format!("(AutoRptFileName \"{}\")", value),
        );
        self.document.replace_line(idx, line);
        Ok(())
    }

    // ==================== Comment ====================

    fn edited_line_index(&self) -> Option<usize> {
        self.document.anchor("(Name \"Edited")
    }

    /// Text of the `Edited By` comment.
    pub fn comment(&self) -> String {
        self.edited_line_index()
            .and_then(|i| self.document.line(i))
            .filter(|line| line.contains(" (Txt "))
            .and_then(|line| get_node_text(line, "(Txt ", QUOTE, QUOTE).ok())
            .unwrap_or("")
            .to_string()
    }

    /// Set the `Edited By` comment, adding the Txt node when missing.
    ///
    /// A new node never starts with the `\r\n` separator.
    pub fn set_comment(&mut self, value: &str) -> Result<()> {
        let Some(idx) = self.edited_line_index() else {
            debug!("No Edited By line in {}", self.filename());
            return Ok(());
        };
        let line = self.document.lines()[idx].as_str();
        let updated = if line.contains(" (Txt ") {
            set_node_text(line, "(Txt ", value, QUOTE, QUOTE)?
        } else {
            let value = value.strip_prefix("\\r\\n").unwrap_or(value);
            format!("{} (Txt \"{}\")", line.trim_end(), value)
        };
        self.document.replace_line(idx, updated);
        Ok(())
    }

    // ==================== Dimension names ====================

    /// Feature names to classify, in line order.
    pub fn dimension_names(&self) -> Vec<DimensionName> {
        if self.is_smartprofile {
            return Vec::new();
        }
        if !self.manual_dimension_names.is_empty() {
            return self.manual_dimension_names.clone();
        }
        self.document
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| line.contains(PROP_LABELS_NODE))
            .filter(|(_, line)| !matches!(line_tag(line), "Calc" | "Prmt"))
            .filter_map(|(i, line)| {
                get_node_text(line, NAME_NODE, QUOTE, QUOTE)
                    .ok()
                    .map(|name| DimensionName::new(i, name))
            })
            .collect()
    }

    pub fn manual_dimension_names(&self) -> &[DimensionName] {
        &self.manual_dimension_names
    }

    /// Use operator-edited names instead of scanning the program.
    pub fn set_manual_dimension_names(&mut self, names: Vec<DimensionName>) {
        self.manual_dimension_names = names;
    }

    /// Whether some feature is already declared with this exact name.
    pub fn name_exists(&self, name: &str) -> bool {
        let declaration = format!("(Name \"{}\")", name);
        self.document
            .lines()
            .iter()
            .any(|line| line.find(&declaration).is_some_and(|col| col > 1))
    }

    /// Rename the feature declared on `index`.
    ///
    /// The quoted name is rewritten on the declaration line only; elsewhere
    /// just `""name""` expression references follow the rename. Returns
    /// `false` when the new name is already taken.
    pub fn update_feature_name(&mut self, index: usize, name: &str) -> Result<bool> {
        if self.name_exists(name) {
            return Ok(false);
        }
        let line = self.document.line(index).ok_or_else(|| {
            ConvertError::anchor(
                format!("line {}", index),
                "dimension line is past the end of the program",
            )
        })?;
        let current = get_node_text(line, NAME_NODE, QUOTE, QUOTE)?.to_string();
        let updated = set_node_text(line, NAME_NODE, name, QUOTE, QUOTE)?
            .replace(&format!("\"{}\"", current), &format!("\"{}\"", name));
        self.document.replace_line(index, updated);

        let references = self.document.replace_expression_references(&current, name);
        debug!("Renamed {} -> {} ({} other lines)", current, name, references);
        Ok(true)
    }

    // ==================== Derived counters ====================

    /// Number of lines declaring a named instruction.
    pub fn instruction_count(&self) -> usize {
        self.document
            .lines()
            .iter()
            .filter(|line| line.find(NAME_NODE).is_some_and(|col| col > 1))
            .count()
    }

    /// Write the instruction count into the `Instructions` header and the
    /// export line's `InsIdx` node.
    pub fn update_instruction_count(&mut self) -> Result<()> {
        let count = self.instruction_count().to_string();

        let export_idx = self.require_export_line()?;
        match set_node_text(
            &self.document.lines()[export_idx],
            "(InsIdx",
            &count,
            " ",
            ")",
        ) {
            Ok(updated) => {
                self.document.replace_line(export_idx, updated);
            }
            Err(_) => warn!("No InsIdx node in {}", self.filename()),
        }

        let header_idx = self.instructions_index().ok_or_else(|| {
            ConvertError::anchor(INSTRUCTIONS_TAG, "program has no instruction count line")
        })?;
        let updated = set_node_text(
            &self.document.lines()[header_idx],
            INSTRUCTIONS_TAG,
            &count,
            " ",
            " ",
        )?;
        self.document.replace_line(header_idx, updated);
        Ok(())
    }

    // ==================== Output ====================

    /// Output root joined with the name of the directory holding the source.
    pub fn output_directory(&self, output_root: &Path) -> PathBuf {
        match self.path.parent().and_then(|p| p.file_name()) {
            Some(parent) => output_root.join(parent),
            None => output_root.to_path_buf(),
        }
    }

    pub fn output_filepath(&self, output_root: &Path) -> PathBuf {
        self.output_directory(output_root).join(self.filename())
    }

    pub fn can_write_to_output_file(&self, output_root: &Path) -> bool {
        !self.output_filepath(output_root).exists()
    }

    pub fn summary(&self) -> ProgramSummary {
        ProgramSummary {
            filename: self.filename(),
            part_number: self.part_number(),
            view_name: self.view_name(),
            op_number: self.op_number.clone(),
            rev_number: self.rev_number.clone(),
            is_smartprofile: self.is_smartprofile,
            has_calculators: self.has_calculators,
            export_filepath: self.export_filepath(),
            report_filepath: self.report_filepath(),
            instruction_count: self.instruction_count(),
            dimension_names: self.dimension_names(),
        }
    }
}
