//! Program rewriting steps and the conversion pipeline.

pub mod annotate;
pub mod inject;
pub mod names;
pub mod paths;
mod processor;
pub mod prompts;

pub use names::parse_dimension_name;
pub use processor::{BatchReport, Processor, ProgramBatch};
