//! Authorization audit logging.

use chrono::{DateTime, Utc};
use inkwell_domain::UserId;
use inkwell_policy::{Action, Actor, Denied, ResourceKind};
use serde::Serialize;
use tracing::info;

/// One authorization decision.
#[derive(Debug, Serialize)]
pub struct AuthzAuditEvent {
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
    pub action: Action,
    pub resource: ResourceKind,
    pub record_id: Option<i64>,
    pub granted: bool,
    pub reason: Option<String>,
}

impl AuthzAuditEvent {
    pub fn new(
        actor: &Actor,
        action: Action,
        resource: ResourceKind,
        record_id: Option<i64>,
        outcome: Result<(), &Denied>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: actor.id(),
            action,
            resource,
            record_id,
            granted: outcome.is_ok(),
            reason: outcome.err().map(|denied| match denied {
                Denied::Underage { .. } => "underage".to_string(),
                Denied::MissingPermission { .. } => "missing_permission".to_string(),
            }),
        }
    }

    pub fn log(&self) {
        if self.granted {
            info!(
                event = "authz_granted",
                user_id = %self.user_id,
                action = %self.action,
                resource = %self.resource,
                record_id = ?self.record_id,
                "Authorization granted"
            );
        } else {
            info!(
                event = "authz_denied",
                user_id = %self.user_id,
                action = %self.action,
                resource = %self.resource,
                record_id = ?self.record_id,
                reason = ?self.reason,
                "Authorization denied"
            );
        }
    }
}

/// Log an authorization decision.
pub fn log_authz(
    actor: &Actor,
    action: Action,
    resource: ResourceKind,
    record_id: Option<i64>,
    outcome: Result<(), &Denied>,
) {
    AuthzAuditEvent::new(actor, action, resource, record_id, outcome).log();
}
