mod inmemory;
mod postgres;

pub use inmemory::InMemoryTemplateRepo;
pub use postgres::PostgresTemplateRepo;
use remmit_domain::{ReminderStage, ReminderTemplate, ID};

#[async_trait::async_trait]
pub trait ITemplateRepo: Send + Sync {
    async fn insert(&self, template: &ReminderTemplate) -> anyhow::Result<()>;
    async fn find_by_workspace_and_stage(
        &self,
        workspace_id: &ID,
        stage: ReminderStage,
    ) -> Option<ReminderTemplate>;
}
