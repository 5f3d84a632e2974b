use super::IWorkspaceRepo;
use crate::repos::shared::inmemory_repo::*;
use remmit_domain::{Workspace, ID};
use std::sync::Mutex;

pub struct InMemoryWorkspaceRepo {
    workspaces: Mutex<Vec<Workspace>>,
}

impl InMemoryWorkspaceRepo {
    pub fn new() -> Self {
        Self {
            workspaces: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IWorkspaceRepo for InMemoryWorkspaceRepo {
    async fn insert(&self, workspace: &Workspace) -> anyhow::Result<()> {
        insert(workspace, &self.workspaces);
        Ok(())
    }

    async fn save(&self, workspace: &Workspace) -> anyhow::Result<()> {
        save(workspace, &self.workspaces);
        Ok(())
    }

    async fn find(&self, workspace_id: &ID) -> Option<Workspace> {
        find(workspace_id, &self.workspaces)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Workspace>> {
        Ok(find_by(&self.workspaces, |_| true))
    }
}
