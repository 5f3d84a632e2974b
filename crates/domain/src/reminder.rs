use crate::cadence::ReminderStage;
use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Delivery attempts after which a failed `ReminderEvent` is exhausted
/// and no longer retried automatically.
pub const MAX_SEND_ATTEMPTS: i64 = 5;

/// Exponential backoff before a failed send is retried: 2, 4, 8, 16, 32
/// minutes, capped at 60.
pub fn retry_backoff_minutes(attempts: i64) -> i64 {
    let exponent = attempts.clamp(1, 6);
    std::cmp::min(60, 1 << exponent)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderEventStatus {
    Queued,
    Sent,
    Failed,
    Skipped,
}

impl ReminderEventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderEventStatus::Queued => "QUEUED",
            ReminderEventStatus::Sent => "SENT",
            ReminderEventStatus::Failed => "FAILED",
            ReminderEventStatus::Skipped => "SKIPPED",
        }
    }
}

impl std::fmt::Display for ReminderEventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReminderEventStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(ReminderEventStatus::Queued),
            "SENT" => Ok(ReminderEventStatus::Sent),
            "FAILED" => Ok(ReminderEventStatus::Failed),
            "SKIPPED" => Ok(ReminderEventStatus::Skipped),
            _ => Err(()),
        }
    }
}

/// One reminder attempt for one `(invoice, stage)` pair. At most one
/// event ever exists per pair; the persistence layer enforces this with
/// a unique key and racing creators read back the surviving row.
///
/// Lifecycle: created QUEUED, then SENT (terminal) or FAILED by the
/// dispatcher; FAILED goes back to QUEUED with a new `scheduled_for`
/// through the retry pass until `MAX_SEND_ATTEMPTS` is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderEvent {
    pub id: ID,
    pub workspace_id: ID,
    pub invoice_id: ID,
    pub stage: ReminderStage,
    pub scheduled_for: i64,
    pub status: ReminderEventStatus,
    pub attempts: i64,
    pub recipient: String,
    pub subject: String,
    pub body_snapshot: String,
    pub sent_at: Option<i64>,
    pub provider_message_id: Option<String>,
    pub error_message: Option<String>,
    pub created_at: i64,
}

impl ReminderEvent {
    /// A freshly planned reminder. Subject and body stay empty until the
    /// dispatcher renders them; the snapshot on the event is whatever
    /// actually went out.
    pub fn new_queued(
        workspace_id: ID,
        invoice_id: ID,
        stage: ReminderStage,
        scheduled_for: i64,
        recipient: String,
        created_at: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            workspace_id,
            invoice_id,
            stage,
            scheduled_for,
            status: ReminderEventStatus::Queued,
            attempts: 0,
            recipient,
            subject: String::new(),
            body_snapshot: String::new(),
            sent_at: None,
            provider_message_id: None,
            error_message: None,
            created_at,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_SEND_ATTEMPTS
    }
}

impl Entity for ReminderEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}
