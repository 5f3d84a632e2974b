mod audit;
mod invoice;
mod payment_link;
mod reminder_event;
mod shared;
mod template;
mod workspace;

pub use audit::IAuditEventRepo;
pub use invoice::IInvoiceRepo;
pub use payment_link::IPaymentLinkRepo;
pub use reminder_event::IReminderEventRepo;
pub use template::ITemplateRepo;
pub use workspace::IWorkspaceRepo;

use audit::{InMemoryAuditEventRepo, PostgresAuditEventRepo};
use invoice::{InMemoryInvoiceRepo, PostgresInvoiceRepo};
use payment_link::{InMemoryPaymentLinkRepo, PostgresPaymentLinkRepo};
use reminder_event::{InMemoryReminderEventRepo, PostgresReminderEventRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::{Arc, Mutex};
use template::{InMemoryTemplateRepo, PostgresTemplateRepo};
use workspace::{InMemoryWorkspaceRepo, PostgresWorkspaceRepo};

#[derive(Clone)]
pub struct Repos {
    pub workspace_repo: Arc<dyn IWorkspaceRepo>,
    pub invoice_repo: Arc<dyn IInvoiceRepo>,
    pub reminder_event_repo: Arc<dyn IReminderEventRepo>,
    pub template_repo: Arc<dyn ITemplateRepo>,
    pub payment_link_repo: Arc<dyn IPaymentLinkRepo>,
    pub audit_event_repo: Arc<dyn IAuditEventRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;

        tracing::info!("DB CHECKING CONNECTION ...");
        sqlx::query("SELECT 1").execute(&pool).await?;
        tracing::info!("DB CHECKING CONNECTION ... [done]");

        sqlx::migrate!().run(&pool).await?;

        Ok(Self {
            workspace_repo: Arc::new(PostgresWorkspaceRepo::new(pool.clone())),
            invoice_repo: Arc::new(PostgresInvoiceRepo::new(pool.clone())),
            reminder_event_repo: Arc::new(PostgresReminderEventRepo::new(pool.clone())),
            template_repo: Arc::new(PostgresTemplateRepo::new(pool.clone())),
            payment_link_repo: Arc::new(PostgresPaymentLinkRepo::new(pool.clone())),
            audit_event_repo: Arc::new(PostgresAuditEventRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        // The invoice and audit collections are shared with the reminder
        // event repo, which writes to them when marking events sent or
        // failed.
        let invoices = Arc::new(Mutex::new(Vec::new()));
        let audit_events = Arc::new(Mutex::new(Vec::new()));

        Self {
            workspace_repo: Arc::new(InMemoryWorkspaceRepo::new()),
            invoice_repo: Arc::new(InMemoryInvoiceRepo::new(invoices.clone())),
            reminder_event_repo: Arc::new(InMemoryReminderEventRepo::new(
                invoices,
                audit_events.clone(),
            )),
            template_repo: Arc::new(InMemoryTemplateRepo::new()),
            payment_link_repo: Arc::new(InMemoryPaymentLinkRepo::new()),
            audit_event_repo: Arc::new(InMemoryAuditEventRepo::new(audit_events)),
        }
    }
}
