mod inmemory;
mod postgres;

pub use inmemory::InMemoryWorkspaceRepo;
pub use postgres::PostgresWorkspaceRepo;
use remmit_domain::{Workspace, ID};

#[async_trait::async_trait]
pub trait IWorkspaceRepo: Send + Sync {
    async fn insert(&self, workspace: &Workspace) -> anyhow::Result<()>;
    async fn save(&self, workspace: &Workspace) -> anyhow::Result<()>;
    async fn find(&self, workspace_id: &ID) -> Option<Workspace>;
    async fn find_all(&self) -> anyhow::Result<Vec<Workspace>>;
}
