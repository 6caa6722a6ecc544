//! Middleware for the Inkwell API server.

pub mod actor;
pub mod auth;
pub mod authz;
pub mod logging;

pub use actor::resolve_actor;
pub use auth::{Auth, AuthLayer, AuthMiddleware, AuthUser, CurrentActor};
pub use authz::{guard, guard_adult, guard_record, AuthzLayer, AuthzMiddleware};
pub use logging::{LoggingLayer, LoggingMiddleware};
