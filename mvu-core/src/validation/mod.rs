//! Validation of programs before conversion.

mod validate;

pub use validate::{validate_program, validate_programs, ValidationResult};
