use super::IInvoiceRepo;
use crate::repos::shared::inmemory_repo::*;
use remmit_domain::{Invoice, InvoiceStatus, ID};
use std::sync::{Arc, Mutex};

pub struct InMemoryInvoiceRepo {
    // Shared with the reminder event repo so that marking an event sent
    // can update the owning invoice in the same logical unit.
    invoices: Arc<Mutex<Vec<Invoice>>>,
}

impl InMemoryInvoiceRepo {
    pub fn new(invoices: Arc<Mutex<Vec<Invoice>>>) -> Self {
        Self { invoices }
    }
}

#[async_trait::async_trait]
impl IInvoiceRepo for InMemoryInvoiceRepo {
    async fn insert(&self, invoice: &Invoice) -> anyhow::Result<()> {
        insert(invoice, &self.invoices);
        Ok(())
    }

    async fn save(&self, invoice: &Invoice) -> anyhow::Result<()> {
        save(invoice, &self.invoices);
        Ok(())
    }

    async fn find(&self, invoice_id: &ID) -> Option<Invoice> {
        find(invoice_id, &self.invoices)
    }

    async fn find_active_by_workspace(&self, workspace_id: &ID) -> anyhow::Result<Vec<Invoice>> {
        Ok(find_by(&self.invoices, |invoice| {
            invoice.workspace_id == *workspace_id && invoice.status != InvoiceStatus::Recovered
        }))
    }
}
