mod inmemory;
mod postgres;

pub use inmemory::InMemoryPaymentLinkRepo;
pub use postgres::PostgresPaymentLinkRepo;
use remmit_domain::{PaymentLink, ID};

#[async_trait::async_trait]
pub trait IPaymentLinkRepo: Send + Sync {
    async fn insert(&self, link: &PaymentLink) -> anyhow::Result<()>;
    async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<PaymentLink>>;
}
