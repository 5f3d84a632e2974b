mod inmemory;
mod postgres;

pub use inmemory::InMemoryInvoiceRepo;
pub use postgres::PostgresInvoiceRepo;
use remmit_domain::{Invoice, ID};

#[async_trait::async_trait]
pub trait IInvoiceRepo: Send + Sync {
    async fn insert(&self, invoice: &Invoice) -> anyhow::Result<()>;
    async fn save(&self, invoice: &Invoice) -> anyhow::Result<()>;
    async fn find(&self, invoice_id: &ID) -> Option<Invoice>;
    /// All invoices of a workspace that are not RECOVERED
    async fn find_active_by_workspace(&self, workspace_id: &ID) -> anyhow::Result<Vec<Invoice>>;
}
