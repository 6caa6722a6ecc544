//! Inkwell domain model.
//!
//! Plain data types shared by the policy evaluator, the import pipeline and
//! the HTTP server, plus password hashing for stored credentials. With the `db` feature the record types derive
//! `sqlx::FromRow` so repositories can decode them directly.

pub mod calendar;
pub mod credentials;
pub mod model;

pub use calendar::{age_on, parse_date};
pub use credentials::{hash_password, verify_password, PasswordError};
pub use inkwell_common_core::{CategoryId, ExportId, PostId, UserId};
pub use model::{
    Category, ExportFormat, ExportKind, ExportRecord, NewPost, NewUser, Post, User,
};
