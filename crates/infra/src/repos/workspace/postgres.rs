use super::IWorkspaceRepo;
use remmit_domain::{AutomationSettings, Workspace, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::str::FromStr;
use tracing::error;

pub struct PostgresWorkspaceRepo {
    pool: PgPool,
}

impl PostgresWorkspaceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct WorkspaceRaw {
    workspace_uid: Uuid,
    name: String,
    timezone: String,
    settings: Option<serde_json::Value>,
}

impl WorkspaceRaw {
    fn into_domain(self) -> anyhow::Result<Workspace> {
        let timezone = chrono_tz::Tz::from_str(&self.timezone)
            .map_err(|_| anyhow::anyhow!("Invalid timezone stored for workspace: {}", self.timezone))?;
        let settings = match self.settings {
            Some(settings) => Some(serde_json::from_value::<AutomationSettings>(settings)?),
            None => None,
        };
        Ok(Workspace {
            id: self.workspace_uid.into(),
            name: self.name,
            timezone,
            settings,
        })
    }
}

#[async_trait::async_trait]
impl IWorkspaceRepo for PostgresWorkspaceRepo {
    async fn insert(&self, workspace: &Workspace) -> anyhow::Result<()> {
        let settings = workspace
            .settings
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        sqlx::query(
            r#"
            INSERT INTO workspaces
            (workspace_uid, name, timezone, settings)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(workspace.id.inner_ref())
        .bind(&workspace.name)
        .bind(workspace.timezone.name())
        .bind(settings)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, workspace: &Workspace) -> anyhow::Result<()> {
        let settings = workspace
            .settings
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        sqlx::query(
            r#"
            UPDATE workspaces
            SET name = $2, timezone = $3, settings = $4
            WHERE workspace_uid = $1
            "#,
        )
        .bind(workspace.id.inner_ref())
        .bind(&workspace.name)
        .bind(workspace.timezone.name())
        .bind(settings)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, workspace_id: &ID) -> Option<Workspace> {
        let res = sqlx::query_as::<_, WorkspaceRaw>(
            r#"
            SELECT * FROM workspaces
            WHERE workspace_uid = $1
            "#,
        )
        .bind(workspace_id.inner_ref())
        .fetch_optional(&self.pool)
        .await;

        match res {
            Ok(raw) => raw.and_then(|raw| match raw.into_domain() {
                Ok(workspace) => Some(workspace),
                Err(e) => {
                    error!("Unable to decode workspace {}: {:?}", workspace_id, e);
                    None
                }
            }),
            Err(e) => {
                error!("Unable to find workspace {}: {:?}", workspace_id, e);
                None
            }
        }
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Workspace>> {
        sqlx::query_as::<_, WorkspaceRaw>(
            r#"
            SELECT * FROM workspaces
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|raw| raw.into_domain())
        .collect()
    }
}
