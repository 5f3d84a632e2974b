use super::ITemplateRepo;
use crate::repos::shared::inmemory_repo::*;
use remmit_domain::{ReminderStage, ReminderTemplate, ID};
use std::sync::Mutex;

pub struct InMemoryTemplateRepo {
    templates: Mutex<Vec<ReminderTemplate>>,
}

impl InMemoryTemplateRepo {
    pub fn new() -> Self {
        Self {
            templates: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ITemplateRepo for InMemoryTemplateRepo {
    async fn insert(&self, template: &ReminderTemplate) -> anyhow::Result<()> {
        insert(template, &self.templates);
        Ok(())
    }

    async fn find_by_workspace_and_stage(
        &self,
        workspace_id: &ID,
        stage: ReminderStage,
    ) -> Option<ReminderTemplate> {
        find_by(&self.templates, |t| {
            t.workspace_id == *workspace_id && t.stage == stage
        })
        .into_iter()
        .next()
    }
}
