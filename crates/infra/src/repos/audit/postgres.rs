use super::IAuditEventRepo;
use remmit_domain::{AuditEvent, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresAuditEventRepo {
    pool: PgPool,
}

impl PostgresAuditEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditEventRaw {
    audit_event_uid: Uuid,
    workspace_uid: Uuid,
    event_type: String,
    payload: serde_json::Value,
    created_at: i64,
}

impl AuditEventRaw {
    fn into_domain(self) -> AuditEvent {
        AuditEvent {
            id: self.audit_event_uid.into(),
            workspace_id: self.workspace_uid.into(),
            event_type: self.event_type,
            payload: self.payload,
            created_at: self.created_at,
        }
    }
}

#[async_trait::async_trait]
impl IAuditEventRepo for PostgresAuditEventRepo {
    async fn insert(&self, event: &AuditEvent) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_events
            (audit_event_uid, workspace_uid, event_type, payload, created_at)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(event.id.inner_ref())
        .bind(event.workspace_id.inner_ref())
        .bind(&event.event_type)
        .bind(&event.payload)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_workspace(&self, workspace_id: &ID) -> anyhow::Result<Vec<AuditEvent>> {
        let rows = sqlx::query_as::<_, AuditEventRaw>(
            r#"
            SELECT * FROM audit_events
            WHERE workspace_uid = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|raw| raw.into_domain()).collect())
    }
}
