//! Converted program output.

mod writer;

pub use writer::{encode_program, write_program};
