//! Config file handling: tokenizing and semantic validation.
//!
//! Every component of the pipeline reads its settings through the same two
//! steps: [`parser::read_token_lines`] turns a file into ordered token
//! lines, and the [`semantics`] layer turns those lines into a validated
//! key/value mapping (optionally extracting the declared module order).

pub mod parser;
pub mod semantics;

pub use parser::read_token_lines;
pub use semantics::{positive_int, validate, validate_with_order};
