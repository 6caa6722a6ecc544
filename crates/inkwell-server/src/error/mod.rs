//! Error handling for the Inkwell API server.

pub mod context;
pub mod response;
pub mod types;

pub use context::ErrorContext;
pub use types::{ApiError, ApiResult};
