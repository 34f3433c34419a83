//! Pre-conversion checks on loaded programs.

use crate::config::Settings;
use crate::model::MicroVuProgram;
use crate::transform::names::parse_dimension_name;
use crate::transform::prompts::has_prompt_anchor;
use std::collections::HashMap;

/// Validation result with warnings.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Whether validation passed.
    pub passed: bool,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Error messages.
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// Create a passing result.
    pub fn ok() -> Self {
        Self {
            passed: true,
            ..Default::default()
        }
    }

    /// Create a failing result with an error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            errors: vec![message.into()],
            ..Default::default()
        }
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.passed = false;
    }

    /// Merge another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
        if !other.passed {
            self.passed = false;
        }
    }
}

/// Check every program of a run.
pub fn validate_programs(programs: &[MicroVuProgram], settings: &Settings) -> ValidationResult {
    if programs.is_empty() {
        return ValidationResult::error("No programs selected");
    }

    let mut result = ValidationResult::ok();
    for program in programs {
        result.merge(validate_program(program, settings));
    }
    result
}

/// Check that a program has the anchors conversion needs, and flag what
/// would be converted differently than the operator may expect.
pub fn validate_program(program: &MicroVuProgram, settings: &Settings) -> ValidationResult {
    let mut result = ValidationResult::ok();
    let name = program.filename();

    if program.export_line_index().is_none() {
        result.add_error(format!("{}: No AutoExpFile export line", name));
    }
    if program.instructions_index().is_none() {
        result.add_error(format!("{}: No Instructions line", name));
    }
    if !has_prompt_anchor(program, settings.site) {
        result.add_error(format!(
            "{}: No 'Edited By'/'Created By' lines to place prompts after",
            name
        ));
    }

    if program.has_calculators() {
        result.add_warning(format!(
            "{}: Contains calculators; check their references after conversion",
            name
        ));
    }
    if program.is_smartprofile() && program.smartprofile_call_index().is_none() && program.last_system_id().is_none() {
        result.add_warning(format!(
            "{}: SmartProfile program has no coordinate system; no SmartProfile call will be added",
            name
        ));
    }

    if !settings.hand_edit_dimension_names {
        for (new_name, originals) in name_collisions(program, &settings.dimension_root) {
            result.add_warning(format!(
                "{}: {} all classify as {}; only the first is renamed",
                name,
                originals.join(", "),
                new_name
            ));
        }
    }

    if !program.can_write_to_output_file(&settings.output_rootpath) {
        result.add_warning(format!(
            "{}: Output file {} already exists",
            name,
            program.output_filepath(&settings.output_rootpath).display()
        ));
    }

    result
}

/// Classified names shared by more than one dimension, in first-seen order.
fn name_collisions(program: &MicroVuProgram, root: &str) -> Vec<(String, Vec<String>)> {
    let mut order: Vec<String> = Vec::new();
    let mut by_name: HashMap<String, Vec<String>> = HashMap::new();
    for dimension in program.dimension_names() {
        let classified = parse_dimension_name(&dimension.name, root);
        let entry = by_name.entry(classified.clone()).or_default();
        if entry.is_empty() {
            order.push(classified);
        }
        entry.push(dimension.name);
    }
    order
        .into_iter()
        .filter_map(|name| {
            let originals = by_name.remove(&name)?;
            (originals.len() > 1).then_some((name, originals))
        })
        .collect()
}
