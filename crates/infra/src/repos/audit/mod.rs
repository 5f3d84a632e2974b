mod inmemory;
mod postgres;

pub use inmemory::InMemoryAuditEventRepo;
pub use postgres::PostgresAuditEventRepo;
use remmit_domain::{AuditEvent, ID};

#[async_trait::async_trait]
pub trait IAuditEventRepo: Send + Sync {
    async fn insert(&self, event: &AuditEvent) -> anyhow::Result<()>;
    async fn find_by_workspace(&self, workspace_id: &ID) -> anyhow::Result<Vec<AuditEvent>>;
}
