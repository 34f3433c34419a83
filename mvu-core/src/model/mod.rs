//! Data model types for MicroVu program conversion.

mod dimension;
mod document;
mod filename;
pub mod node;
mod program;
pub mod record;

pub use dimension::DimensionName;
pub use document::{LineDocument, TextEncoding};
pub use filename::{part_number, view_name, windows_stem};
pub use node::{get_node, get_node_text, set_node_text, QUOTE};
pub use program::{MicroVuProgram, ProgramOptions, ProgramSummary};
pub use record::{line_tag, replace_node, upsert_node, LineRecord, Node};
