//! mvu-core - Core library for converting MicroVu InSpec programs.
//!
//! This library rewrites MicroVu inspection programs so their results flow
//! into the factory quality system: export and report paths, feature names,
//! operator prompts and the kill-file call are brought to the plant standard.
//!
//! # Example
//!
//! ```no_run
//! use mvu_core::{convert_program_file, ProgramOptions, Settings};
//! use std::path::Path;
//!
//! let settings = Settings::load(Path::new("Settings.ini")).unwrap();
//! let options = ProgramOptions::new("20", "B");
//! let written = convert_program_file(Path::new("1234_TOP_REVB.iwp"), &options, &settings, "JQ").unwrap();
//! println!("{}", written.display());
//! ```

pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod transform;
pub mod validation;

// Re-exports for convenience
pub use config::{Settings, Site};
pub use error::{ClassificationDefect, ConvertError, ErrorCode, Result};
pub use generator::write_program;
pub use model::{DimensionName, LineDocument, MicroVuProgram, ProgramOptions, TextEncoding};
pub use parser::{BoilerplateSource, IniFile, TemplateDir};
pub use transform::{parse_dimension_name, BatchReport, Processor, ProgramBatch};
pub use validation::{validate_program, validate_programs, ValidationResult};

/// Convert one program file.
///
/// This is the main high-level function that performs the full conversion pipeline:
/// 1. Load the program
/// 2. Validate its anchors, stopping on errors
/// 3. Rewrite it
/// 4. Write it under the output root
///
/// # Returns
///
/// The path of the converted program.
pub fn convert_program_file(
    input_path: &std::path::Path,
    options: &ProgramOptions,
    settings: &Settings,
    user_initials: &str,
) -> Result<std::path::PathBuf> {
    let mut program = MicroVuProgram::load(input_path, options)?;

    let validation = validate_program(&program, settings);
    for warning in &validation.warnings {
        tracing::warn!("{}", warning);
    }
    for err in &validation.errors {
        tracing::error!("{}", err);
    }
    if !validation.passed {
        return Err(ConvertError::ValidationFailed {
            errors: validation.errors,
        }
        .in_program(input_path));
    }

    let processor = Processor::from_settings(settings.clone(), user_initials);
    processor
        .convert(&mut program)
        .map_err(|e| e.in_program(input_path))
}
