mod inmemory;
mod postgres;

pub use inmemory::InMemoryReminderEventRepo;
pub use postgres::PostgresReminderEventRepo;
use remmit_domain::{AuditEvent, ReminderEvent, ID};

/// Durable record of reminder attempts, unique per `(invoice, stage)`.
///
/// `insert_if_absent` is the idempotency primitive: racing creators for
/// the same pair resolve to a single surviving row which every caller
/// gets back. `mark_sent`/`mark_failed` apply the event transition and
/// its correlated write (invoice last reminder timestamp, audit record)
/// as one atomic unit.
#[async_trait::async_trait]
pub trait IReminderEventRepo: Send + Sync {
    async fn insert_if_absent(&self, event: &ReminderEvent) -> anyhow::Result<ReminderEvent>;
    async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<ReminderEvent>>;
    /// QUEUED events scheduled at or before `before`, oldest scheduled
    /// first, at most `limit`
    async fn find_due(&self, before: i64, limit: i64) -> anyhow::Result<Vec<ReminderEvent>>;
    /// FAILED events, oldest created first, at most `limit`
    async fn find_failed(&self, limit: i64) -> anyhow::Result<Vec<ReminderEvent>>;
    async fn save(&self, event: &ReminderEvent) -> anyhow::Result<()>;
    async fn mark_sent(&self, event: &ReminderEvent, last_reminder_at: i64) -> anyhow::Result<()>;
    async fn mark_failed(&self, event: &ReminderEvent, audit: &AuditEvent) -> anyhow::Result<()>;
}
