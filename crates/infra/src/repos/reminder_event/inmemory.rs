use super::IReminderEventRepo;
use crate::repos::shared::inmemory_repo::*;
use remmit_domain::{AuditEvent, Invoice, ReminderEvent, ReminderEventStatus, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryReminderEventRepo {
    events: Mutex<Vec<ReminderEvent>>,
    // Shared collections so the sent/failed transitions can apply their
    // correlated writes in the same logical unit as the real store does
    // in one transaction.
    invoices: Arc<Mutex<Vec<Invoice>>>,
    audit_events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl InMemoryReminderEventRepo {
    pub fn new(
        invoices: Arc<Mutex<Vec<Invoice>>>,
        audit_events: Arc<Mutex<Vec<AuditEvent>>>,
    ) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            invoices,
            audit_events,
        }
    }
}

#[async_trait::async_trait]
impl IReminderEventRepo for InMemoryReminderEventRepo {
    async fn insert_if_absent(&self, event: &ReminderEvent) -> anyhow::Result<ReminderEvent> {
        let mut events = self.events.lock().unwrap();
        let existing = events
            .iter()
            .find(|e| e.invoice_id == event.invoice_id && e.stage == event.stage);
        if let Some(existing) = existing {
            return Ok(existing.clone());
        }
        events.push(event.clone());
        Ok(event.clone())
    }

    async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<ReminderEvent>> {
        Ok(find_by(&self.events, |e| e.invoice_id == *invoice_id))
    }

    async fn find_due(&self, before: i64, limit: i64) -> anyhow::Result<Vec<ReminderEvent>> {
        let mut due = find_by(&self.events, |e| {
            e.status == ReminderEventStatus::Queued && e.scheduled_for <= before
        });
        due.sort_by_key(|e| e.scheduled_for);
        due.truncate(limit as usize);
        Ok(due)
    }

    async fn find_failed(&self, limit: i64) -> anyhow::Result<Vec<ReminderEvent>> {
        let mut failed = find_by(&self.events, |e| e.status == ReminderEventStatus::Failed);
        failed.sort_by_key(|e| e.created_at);
        failed.truncate(limit as usize);
        Ok(failed)
    }

    async fn save(&self, event: &ReminderEvent) -> anyhow::Result<()> {
        save(event, &self.events);
        Ok(())
    }

    async fn mark_sent(&self, event: &ReminderEvent, last_reminder_at: i64) -> anyhow::Result<()> {
        save(event, &self.events);
        update_many(
            &self.invoices,
            |invoice| invoice.id == event.invoice_id,
            |invoice| invoice.last_reminder_at = Some(last_reminder_at),
        );
        Ok(())
    }

    async fn mark_failed(&self, event: &ReminderEvent, audit: &AuditEvent) -> anyhow::Result<()> {
        save(event, &self.events);
        insert(audit, &self.audit_events);
        Ok(())
    }
}
