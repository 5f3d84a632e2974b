use super::ITemplateRepo;
use remmit_domain::{ReminderStage, ReminderTemplate, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::str::FromStr;
use tracing::error;

pub struct PostgresTemplateRepo {
    pool: PgPool,
}

impl PostgresTemplateRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TemplateRaw {
    template_uid: Uuid,
    workspace_uid: Uuid,
    stage: String,
    subject_template: String,
    body_template: String,
}

impl TemplateRaw {
    fn into_domain(self) -> anyhow::Result<ReminderTemplate> {
        let stage = ReminderStage::from_str(&self.stage)
            .map_err(|_| anyhow::anyhow!("Invalid reminder stage stored: {}", self.stage))?;
        Ok(ReminderTemplate {
            id: self.template_uid.into(),
            workspace_id: self.workspace_uid.into(),
            stage,
            subject_template: self.subject_template,
            body_template: self.body_template,
        })
    }
}

#[async_trait::async_trait]
impl ITemplateRepo for PostgresTemplateRepo {
    async fn insert(&self, template: &ReminderTemplate) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reminder_templates
            (template_uid, workspace_uid, stage, subject_template, body_template)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(template.id.inner_ref())
        .bind(template.workspace_id.inner_ref())
        .bind(template.stage.as_str())
        .bind(&template.subject_template)
        .bind(&template.body_template)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_workspace_and_stage(
        &self,
        workspace_id: &ID,
        stage: ReminderStage,
    ) -> Option<ReminderTemplate> {
        let res = sqlx::query_as::<_, TemplateRaw>(
            r#"
            SELECT * FROM reminder_templates
            WHERE workspace_uid = $1 AND stage = $2
            "#,
        )
        .bind(workspace_id.inner_ref())
        .bind(stage.as_str())
        .fetch_optional(&self.pool)
        .await;

        match res {
            Ok(raw) => raw.and_then(|raw| match raw.into_domain() {
                Ok(template) => Some(template),
                Err(e) => {
                    error!(
                        "Unable to decode template for workspace {}: {:?}",
                        workspace_id, e
                    );
                    None
                }
            }),
            Err(e) => {
                error!(
                    "Unable to find template for workspace {}: {:?}",
                    workspace_id, e
                );
                None
            }
        }
    }
}
