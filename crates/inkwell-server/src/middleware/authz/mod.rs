//! Permission checks against the resolved [`Actor`](inkwell_policy::Actor).

pub mod audit;
pub mod guard;
pub mod layer;

pub use audit::{log_authz, AuthzAuditEvent};
pub use guard::{guard, guard_adult, guard_record};
pub use layer::{AuthzLayer, AuthzMiddleware};
