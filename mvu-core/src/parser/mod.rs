//! Readers for program files, settings and boilerplate.

pub mod ini;
mod program;
mod templates;

pub use ini::IniFile;
pub use program::{decode_text, read_program_lines, read_text_lines};
pub use templates::{BoilerplateSource, TemplateDir};
