use super::IAuditEventRepo;
use crate::repos::shared::inmemory_repo::*;
use remmit_domain::{AuditEvent, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryAuditEventRepo {
    // Shared with the reminder event repo, which appends failure records
    // as part of marking an event failed.
    audit_events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryAuditEventRepo {
    pub fn new(audit_events: Arc<Mutex<Vec<AuditEvent>>>) -> Self {
        Self { audit_events }
    }
}

#[async_trait::async_trait]
impl IAuditEventRepo for InMemoryAuditEventRepo {
    async fn insert(&self, event: &AuditEvent) -> anyhow::Result<()> {
        insert(event, &self.audit_events);
        Ok(())
    }

    async fn find_by_workspace(&self, workspace_id: &ID) -> anyhow::Result<Vec<AuditEvent>> {
        Ok(find_by(&self.audit_events, |e| {
            e.workspace_id == *workspace_id
        }))
    }
}
