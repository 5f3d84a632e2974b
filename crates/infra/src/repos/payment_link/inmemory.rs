use super::IPaymentLinkRepo;
use crate::repos::shared::inmemory_repo::*;
use remmit_domain::{PaymentLink, ID};
use std::sync::Mutex;

pub struct InMemoryPaymentLinkRepo {
    links: Mutex<Vec<PaymentLink>>,
}

impl InMemoryPaymentLinkRepo {
    pub fn new() -> Self {
        Self {
            links: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IPaymentLinkRepo for InMemoryPaymentLinkRepo {
    async fn insert(&self, link: &PaymentLink) -> anyhow::Result<()> {
        insert(link, &self.links);
        Ok(())
    }

    async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<PaymentLink>> {
        Ok(find_by(&self.links, |l| l.invoice_id == *invoice_id))
    }
}
