//! Request handlers, one module per resource.

pub mod auth;
pub mod categories;
pub mod exports;
pub mod health;
pub mod imports;
pub mod posts;
pub mod upload;
pub mod users;
