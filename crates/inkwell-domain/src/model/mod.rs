//! Entity records.

mod category;
mod export;
mod post;
mod user;

pub use category::Category;
pub use export::{ExportFormat, ExportKind, ExportRecord};
pub use post::{NewPost, Post};
pub use user::{NewUser, User};
