//! Conversion pipeline over one program or a batch of programs.

use super::annotate::{disable_dimensions, update_comments};
use super::inject::{inject_kill_file_call, inject_metrology_picture, inject_smartprofile_call};
use super::names::parse_dimension_name;
use super::paths::{replace_export_filepath, replace_report_filepath};
use super::prompts::replace_prompt_section;
use crate::config::Settings;
use crate::error::{ConvertError, Result};
use crate::generator::write_program;
use crate::model::{MicroVuProgram, ProgramOptions};
use crate::parser::{BoilerplateSource, TemplateDir};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Programs selected for one conversion run, in selection order.
#[derive(Debug, Default)]
pub struct ProgramBatch {
    programs: Vec<MicroVuProgram>,
}

impl ProgramBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every path, collecting read failures instead of stopping.
    pub fn load<P: AsRef<Path>>(paths: &[P], options: &ProgramOptions) -> (Self, Vec<ConvertError>) {
        let mut batch = Self::new();
        let mut failures = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match MicroVuProgram::load(path, options) {
                Ok(program) => batch.push(program),
                Err(e) => failures.push(e.in_program(path)),
            }
        }
        (batch, failures)
    }

    pub fn push(&mut self, program: MicroVuProgram) {
        self.programs.push(program);
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn clear(&mut self) {
        self.programs.clear();
    }

    pub fn programs(&self) -> &[MicroVuProgram] {
        &self.programs
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MicroVuProgram> {
        self.programs.iter_mut()
    }
}

impl FromIterator<MicroVuProgram> for ProgramBatch {
    fn from_iter<I: IntoIterator<Item = MicroVuProgram>>(iter: I) -> Self {
        Self {
            programs: iter.into_iter().collect(),
        }
    }
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written.
    pub converted: Vec<PathBuf>,
    /// One error per program that failed, tagged with its path.
    pub failures: Vec<ConvertError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Applies the conversion steps for one site configuration.
pub struct Processor<B: BoilerplateSource = TemplateDir> {
    settings: Settings,
    templates: B,
    user_initials: String,
    date: NaiveDate,
}

impl Processor<TemplateDir> {
    /// Processor reading boilerplate from the configured templates directory.
    pub fn from_settings(settings: Settings, user_initials: &str) -> Self {
        let templates = TemplateDir::new(settings.templates_dir.clone());
        Self::new(settings, templates, user_initials)
    }
}

impl<B: BoilerplateSource> Processor<B> {
    /// Create a processor stamping today's date into conversion comments.
    pub fn new(settings: Settings, templates: B, user_initials: &str) -> Self {
        Self {
            settings,
            templates,
            user_initials: user_initials.to_string(),
            date: chrono::Local::now().date_naive(),
        }
    }

    /// Use a fixed conversion date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn templates(&self) -> &B {
        &self.templates
    }

    /// Rewrite a program in memory.
    pub fn process(&self, program: &mut MicroVuProgram) -> Result<()> {
        debug!("Processing {}", program.path().display());

        replace_export_filepath(program)?;
        replace_report_filepath(program, &self.settings.reporting_root_path)?;

        if program.is_smartprofile() {
            inject_smartprofile_call(
                program,
                &self.templates,
                &self.settings.smart_profile_script_filepath,
                &self.settings.smart_profile_exe_filepath,
            )?;
        } else {
            self.replace_dimension_names(program)?;
        }

        replace_prompt_section(program, &self.templates, self.settings.site)?;

        if !program.has_text_kill() {
            inject_kill_file_call(program, &self.templates)?;
        }
        if self.settings.disable_on_convert && !program.has_metrology_picture() {
            inject_metrology_picture(program, &self.templates)?;
        }

        update_comments(program, &self.user_initials, self.date)?;

        if self.settings.disable_on_convert {
            let disabled = disable_dimensions(program);
            debug!("Disabled {} instructions", disabled);
        }

        program.update_instruction_count()
    }

    /// Rename every dimension. Returns how many names changed.
    pub fn replace_dimension_names(&self, program: &mut MicroVuProgram) -> Result<usize> {
        if program.is_smartprofile() {
            return Ok(0);
        }
        let mut renamed = 0;
        for dimension in program.dimension_names() {
            let name = if self.settings.hand_edit_dimension_names {
                dimension.name.clone()
            } else {
                parse_dimension_name(&dimension.name, &self.settings.dimension_root)
            };
            if program.update_feature_name(dimension.index, &name)? {
                renamed += 1;
            }
        }
        Ok(renamed)
    }

    /// Process a program and write it under the output root.
    ///
    /// Returns the written path. The source is deleted afterwards when the
    /// settings allow it.
    pub fn convert(&self, program: &mut MicroVuProgram) -> Result<PathBuf> {
        self.process(program)?;

        let output = program.output_filepath(&self.settings.output_rootpath);
        if output.exists() {
            return Err(ConvertError::OutputExists { path: output });
        }
        std::fs::create_dir_all(program.output_directory(&self.settings.output_rootpath))?;
        write_program(&output, program.lines(), program.encoding().has_bom())?;
        info!("Wrote {}", output.display());

        if self.settings.allow_delete {
            std::fs::remove_file(program.path())?;
            info!("Deleted {}", program.path().display());
        }
        Ok(output)
    }

    /// Convert every program. A failing program is reported and skipped.
    pub fn process_batch(&self, batch: &mut ProgramBatch) -> BatchReport {
        let mut report = BatchReport::default();
        for program in batch.iter_mut() {
            match self.convert(program) {
                Ok(path) => report.converted.push(path),
                Err(e) => {
                    let e = e.in_program(program.path());
                    error!("{}", e);
                    report.failures.push(e);
                }
            }
        }
        info!(
            "Converted {} of {} programs",
            report.converted.len(),
            report.converted.len() + report.failures.len()
        );
        report
    }
}
