//! Audit records emitted for accepted lifecycle mutations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::Role;
use crate::status::RequestStatus;

/// One append-only audit entry: who did what to which request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub at: DateTime<Utc>,
    /// Actor id as resolved by the calling surface
    pub actor: String,
    pub role: Role,
    /// What happened: "create", "transition", "assign", "unassign"
    pub action: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_status: Option<RequestStatus>,
    /// Free-form context: technician, window, notes length
    #[serde(default)]
    pub detail: String,
}

impl AuditRecord {
    /// Start a record for one accepted action.
    pub fn new(
        actor: impl Into<String>,
        role: Role,
        action: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            at: Utc::now(),
            actor: actor.into(),
            role,
            action: action.into(),
            request_id: request_id.into(),
            from_status: None,
            to_status: None,
            detail: String::new(),
        }
    }

    /// Attach the observed status edge.
    pub fn statuses(mut self, from: RequestStatus, to: RequestStatus) -> Self {
        self.from_status = Some(from);
        self.to_status = Some(to);
        self
    }

    /// Attach free-form detail.
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}
