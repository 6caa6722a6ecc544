//! Identifiers shared across Inkwell crates.

pub mod id;

pub use id::{CategoryId, ExportId, IdParseError, PostId, UserId};
