use super::IReminderEventRepo;
use remmit_domain::{AuditEvent, ReminderEvent, ReminderEventStatus, ReminderStage, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::str::FromStr;

pub struct PostgresReminderEventRepo {
    pool: PgPool,
}

impl PostgresReminderEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReminderEventRaw {
    reminder_event_uid: Uuid,
    workspace_uid: Uuid,
    invoice_uid: Uuid,
    stage: String,
    scheduled_for: i64,
    status: String,
    attempts: i64,
    recipient: String,
    subject: String,
    body_snapshot: String,
    sent_at: Option<i64>,
    provider_message_id: Option<String>,
    error_message: Option<String>,
    created_at: i64,
}

impl ReminderEventRaw {
    fn into_domain(self) -> anyhow::Result<ReminderEvent> {
        let stage = ReminderStage::from_str(&self.stage)
            .map_err(|_| anyhow::anyhow!("Invalid reminder stage stored: {}", self.stage))?;
        let status = ReminderEventStatus::from_str(&self.status)
            .map_err(|_| anyhow::anyhow!("Invalid reminder status stored: {}", self.status))?;
        Ok(ReminderEvent {
            id: self.reminder_event_uid.into(),
            workspace_id: self.workspace_uid.into(),
            invoice_id: self.invoice_uid.into(),
            stage,
            scheduled_for: self.scheduled_for,
            status,
            attempts: self.attempts,
            recipient: self.recipient,
            subject: self.subject,
            body_snapshot: self.body_snapshot,
            sent_at: self.sent_at,
            provider_message_id: self.provider_message_id,
            error_message: self.error_message,
            created_at: self.created_at,
        })
    }
}

fn bind_update<'a>(
    query: &'a str,
    event: &'a ReminderEvent,
) -> sqlx::query::Query<'a, sqlx::Postgres, sqlx::postgres::PgArguments> {
    sqlx::query(query)
        .bind(event.id.inner_ref())
        .bind(event.scheduled_for)
        .bind(event.status.as_str())
        .bind(event.attempts)
        .bind(&event.subject)
        .bind(&event.body_snapshot)
        .bind(event.sent_at)
        .bind(&event.provider_message_id)
        .bind(&event.error_message)
}

const UPDATE_EVENT: &str = r#"
    UPDATE reminder_events
    SET scheduled_for = $2, status = $3, attempts = $4, subject = $5,
        body_snapshot = $6, sent_at = $7, provider_message_id = $8,
        error_message = $9
    WHERE reminder_event_uid = $1
    "#;

#[async_trait::async_trait]
impl IReminderEventRepo for PostgresReminderEventRepo {
    async fn insert_if_absent(&self, event: &ReminderEvent) -> anyhow::Result<ReminderEvent> {
        // The unique index on (invoice_uid, stage) makes concurrent
        // inserts for the same pair collapse into one surviving row.
        sqlx::query(
            r#"
            INSERT INTO reminder_events
            (reminder_event_uid, workspace_uid, invoice_uid, stage, scheduled_for,
             status, attempts, recipient, subject, body_snapshot, sent_at,
             provider_message_id, error_message, created_at)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (invoice_uid, stage) DO NOTHING
            "#,
        )
        .bind(event.id.inner_ref())
        .bind(event.workspace_id.inner_ref())
        .bind(event.invoice_id.inner_ref())
        .bind(event.stage.as_str())
        .bind(event.scheduled_for)
        .bind(event.status.as_str())
        .bind(event.attempts)
        .bind(&event.recipient)
        .bind(&event.subject)
        .bind(&event.body_snapshot)
        .bind(event.sent_at)
        .bind(&event.provider_message_id)
        .bind(&event.error_message)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;

        let raw = sqlx::query_as::<_, ReminderEventRaw>(
            r#"
            SELECT * FROM reminder_events
            WHERE invoice_uid = $1 AND stage = $2
            "#,
        )
        .bind(event.invoice_id.inner_ref())
        .bind(event.stage.as_str())
        .fetch_one(&self.pool)
        .await?;
        raw.into_domain()
    }

    async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<ReminderEvent>> {
        sqlx::query_as::<_, ReminderEventRaw>(
            r#"
            SELECT * FROM reminder_events
            WHERE invoice_uid = $1
            ORDER BY scheduled_for ASC
            "#,
        )
        .bind(invoice_id.inner_ref())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|raw| raw.into_domain())
        .collect()
    }

    async fn find_due(&self, before: i64, limit: i64) -> anyhow::Result<Vec<ReminderEvent>> {
        sqlx::query_as::<_, ReminderEventRaw>(
            r#"
            SELECT * FROM reminder_events
            WHERE status = 'QUEUED' AND scheduled_for <= $1
            ORDER BY scheduled_for ASC
            LIMIT $2
            "#,
        )
        .bind(before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|raw| raw.into_domain())
        .collect()
    }

    async fn find_failed(&self, limit: i64) -> anyhow::Result<Vec<ReminderEvent>> {
        sqlx::query_as::<_, ReminderEventRaw>(
            r#"
            SELECT * FROM reminder_events
            WHERE status = 'FAILED'
            ORDER BY created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|raw| raw.into_domain())
        .collect()
    }

    async fn save(&self, event: &ReminderEvent) -> anyhow::Result<()> {
        bind_update(UPDATE_EVENT, event).execute(&self.pool).await?;
        Ok(())
    }

    async fn mark_sent(&self, event: &ReminderEvent, last_reminder_at: i64) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        bind_update(UPDATE_EVENT, event).execute(&mut tx).await?;
        sqlx::query(
            r#"
            UPDATE invoices
            SET last_reminder_at = $2
            WHERE invoice_uid = $1
            "#,
        )
        .bind(event.invoice_id.inner_ref())
        .bind(last_reminder_at)
        .execute(&mut tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn mark_failed(&self, event: &ReminderEvent, audit: &AuditEvent) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await?;
        bind_update(UPDATE_EVENT, event).execute(&mut tx).await?;
        sqlx::query(
            r#"
            INSERT INTO audit_events
            (audit_event_uid, workspace_uid, event_type, payload, created_at)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(audit.id.inner_ref())
        .bind(audit.workspace_id.inner_ref())
        .bind(&audit.event_type)
        .bind(&audit.payload)
        .bind(audit.created_at)
        .execute(&mut tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}
