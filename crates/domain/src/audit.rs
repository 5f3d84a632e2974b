use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const REMINDER_SEND_FAILED: &str = "REMINDER_SEND_FAILED";

/// An append only audit record for a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: ID,
    pub workspace_id: ID,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub created_at: i64,
}

impl AuditEvent {
    pub fn reminder_send_failed(
        workspace_id: ID,
        reminder_event_id: &ID,
        error: &str,
        created_at: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            workspace_id,
            event_type: REMINDER_SEND_FAILED.into(),
            payload: json!({
                "reminderEventId": reminder_event_id.as_string(),
                "error": error,
            }),
            created_at,
        }
    }
}

impl Entity for AuditEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}
