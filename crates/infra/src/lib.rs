mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
pub use repos::{
    IAuditEventRepo, IInvoiceRepo, IPaymentLinkRepo, IReminderEventRepo, ITemplateRepo,
    IWorkspaceRepo, Repos,
};
pub use services::{Email, IMailer, InMemoryMailer, ResendMailer};
use std::sync::Arc;
pub use system::{ISys, RealSys};

#[derive(Clone)]
pub struct RemmitContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub mailer: Arc<dyn IMailer>,
}

impl RemmitContext {
    fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            mailer: Arc::new(InMemoryMailer::new()),
        }
    }

    async fn create_postgres(connection_string: &str) -> Self {
        let repos = Repos::create_postgres(connection_string)
            .await
            .expect("Postgres connection string must be valid and the database reachable");
        let config = Config::new();
        let mailer = Arc::new(ResendMailer::new(
            config.resend_api_key.clone(),
            config.email_from.clone(),
        ));
        Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            mailer,
        }
    }
}

/// Will setup the correct infra context given the environment
pub async fn setup_context() -> RemmitContext {
    const DATABASE_URL: &str = "DATABASE_URL";

    let args: Vec<_> = std::env::args().collect();

    // cargo run inmemory
    let inmemory_arg_set = args.len() > 1 && args[1].eq("inmemory");
    if inmemory_arg_set {
        tracing::info!("Inmemory argument provided. Going to use inmemory infra.");
        return RemmitContext::create_inmemory();
    }

    match std::env::var(DATABASE_URL) {
        Ok(connection_string) => {
            tracing::info!("{} env var was provided. Going to use postgres.", DATABASE_URL);
            RemmitContext::create_postgres(&connection_string).await
        }
        Err(_) => {
            tracing::info!(
                "{} env var was not provided. Going to use inmemory infra.",
                DATABASE_URL
            );
            RemmitContext::create_inmemory()
        }
    }
}

/// Infra context backed entirely by in-memory stores, used by tests
pub fn setup_context_inmemory() -> RemmitContext {
    RemmitContext::create_inmemory()
}
