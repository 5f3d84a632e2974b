use crate::error::RemmitError;
use crate::reminder::delivery::{dispatch_reminder, DispatchOutcome};
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use remmit_infra::RemmitContext;
use serde::Serialize;
use tracing::error;

/// Upper bound on events handled per dispatch pass, the rest wait for
/// the next tick.
const DISPATCH_BATCH_SIZE: i64 = 100;

pub async fn send_due_reminders_controller(
    ctx: web::Data<RemmitContext>,
) -> Result<HttpResponse, RemmitError> {
    let usecase = SendDueRemindersUseCase {};
    execute(usecase, &ctx)
        .await
        .map(|report| HttpResponse::Ok().json(report))
        .map_err(RemmitError::from)
}

/// Takes a batch of QUEUED reminders whose scheduled time has passed and
/// dispatches each one: template rendering, payment link and the actual
/// send all happen here, not at queueing time.
#[derive(Debug)]
pub struct SendDueRemindersUseCase {}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub processed: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    StorageError,
}

impl From<UseCaseErrors> for RemmitError {
    fn from(e: UseCaseErrors) -> Self {
        match e {
            UseCaseErrors::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendDueRemindersUseCase {
    type Response = DispatchReport;
    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &RemmitContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let mut report = DispatchReport::default();

        let due = ctx
            .repos
            .reminder_event_repo
            .find_due(now, DISPATCH_BATCH_SIZE)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        for mut event in due {
            report.processed += 1;
            // A datastore hiccup on one event leaves it QUEUED for the
            // next pass and must not abort the rest of the batch
            match dispatch_reminder(&mut event, ctx).await {
                Ok(DispatchOutcome::Sent) => report.sent += 1,
                Ok(DispatchOutcome::Failed) => report.failed += 1,
                Ok(DispatchOutcome::Skipped) => report.skipped += 1,
                Err(e) => error!("Dispatching reminder {} failed: {:?}", event.id, e),
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::scan_invoices::ScanInvoicesUseCase;
    use crate::reminder::test_helpers::*;
    use remmit_domain::{
        PaymentLink, ReminderEventStatus, ReminderStage, ReminderTemplate, ID,
        REMINDER_SEND_FAILED,
    };
    use remmit_infra::{IPaymentLinkRepo, InMemoryMailer};
    use std::sync::Arc;

    #[actix_web::main]
    #[test]
    async fn sends_due_reminders_and_stamps_the_invoice() {
        let mut ctx = test_context(ts(2026, 3, 7, 12, 0));
        let mailer = Arc::new(InMemoryMailer::new());
        ctx.mailer = mailer.clone();
        let workspace = test_workspace(&ctx).await;
        let invoice = test_invoice(&ctx, &workspace, ts(2026, 3, 10, 0, 0)).await;

        execute(ScanInvoicesUseCase { workspace_filter: None }, &ctx).await.unwrap();
        let report = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        assert_eq!(report.processed, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(mailer.sent_count(), 1);

        let events = ctx
            .repos
            .reminder_event_repo
            .find_by_invoice(&invoice.id)
            .await
            .unwrap();
        assert_eq!(events[0].status, ReminderEventStatus::Sent);
        assert_eq!(events[0].attempts, 0);
        assert!(events[0].sent_at.is_some());
        assert!(events[0].provider_message_id.is_some());
        // The stored snapshot is exactly what went to the mailer
        assert!(!events[0].subject.is_empty());
        assert!(!events[0].body_snapshot.is_empty());

        let invoice = ctx.repos.invoice_repo.find(&invoice.id).await.unwrap();
        assert_eq!(invoice.last_reminder_at, Some(ts(2026, 3, 7, 12, 0)));
    }

    #[actix_web::main]
    #[test]
    async fn rendered_email_contains_invoice_facts() {
        let mut ctx = test_context(ts(2026, 3, 7, 12, 0));
        let mailer = Arc::new(InMemoryMailer::new());
        ctx.mailer = mailer.clone();
        let workspace = test_workspace(&ctx).await;
        test_invoice(&ctx, &workspace, ts(2026, 3, 10, 0, 0)).await;

        execute(ScanInvoicesUseCase { workspace_filter: None }, &ctx).await.unwrap();
        execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jordan@example.com");
        assert!(sent[0].subject.starts_with("[Friendly Reminder]"));
        assert!(sent[0].subject.contains("INV-1001"));
        assert!(sent[0].text.contains("Jordan Lee"));
        assert!(sent[0].text.contains("USD 1250.00"));
        assert!(sent[0].text.contains("2026-03-10"));
        assert!(sent[0].text.contains("/r/"));
    }

    #[actix_web::main]
    #[test]
    async fn provider_failure_marks_event_failed_and_audits() {
        let mut ctx = test_context(ts(2026, 3, 7, 12, 0));
        let mailer = Arc::new(InMemoryMailer::new());
        mailer.set_failing(true);
        ctx.mailer = mailer.clone();
        let workspace = test_workspace(&ctx).await;
        let invoice = test_invoice(&ctx, &workspace, ts(2026, 3, 10, 0, 0)).await;

        execute(ScanInvoicesUseCase { workspace_filter: None }, &ctx).await.unwrap();
        let report = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, 0);

        let events = ctx
            .repos
            .reminder_event_repo
            .find_by_invoice(&invoice.id)
            .await
            .unwrap();
        assert_eq!(events[0].status, ReminderEventStatus::Failed);
        assert_eq!(events[0].attempts, 1);
        assert!(events[0].error_message.is_some());

        let audits = ctx
            .repos
            .audit_event_repo
            .find_by_workspace(&workspace.id)
            .await
            .unwrap();
        assert_eq!(audits.len(), 1);
        assert_eq!(audits[0].event_type, REMINDER_SEND_FAILED);
    }

    #[actix_web::main]
    #[test]
    async fn skips_reminder_when_invoice_was_paid_after_queueing() {
        let mut ctx = test_context(ts(2026, 3, 7, 12, 0));
        let mailer = Arc::new(InMemoryMailer::new());
        ctx.mailer = mailer.clone();
        let workspace = test_workspace(&ctx).await;
        let mut invoice = test_invoice(&ctx, &workspace, ts(2026, 3, 10, 0, 0)).await;

        execute(ScanInvoicesUseCase { workspace_filter: None }, &ctx).await.unwrap();

        invoice.paid_at = Some(ts(2026, 3, 7, 13, 0));
        ctx.repos.invoice_repo.save(&invoice).await.unwrap();

        set_time(&mut ctx, ts(2026, 3, 7, 14, 0));
        let report = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.sent, 0);
        assert_eq!(mailer.sent_count(), 0);

        let events = ctx
            .repos
            .reminder_event_repo
            .find_by_invoice(&invoice.id)
            .await
            .unwrap();
        assert_eq!(events[0].status, ReminderEventStatus::Skipped);
        assert_eq!(
            events[0].error_message.as_deref(),
            Some("Invoice is already paid")
        );
    }

    #[actix_web::main]
    #[test]
    async fn skips_reminder_when_settings_were_removed_after_queueing() {
        let mut ctx = test_context(ts(2026, 3, 7, 12, 0));
        let mailer = Arc::new(InMemoryMailer::new());
        ctx.mailer = mailer.clone();
        let mut workspace = test_workspace(&ctx).await;
        let invoice = test_invoice(&ctx, &workspace, ts(2026, 3, 10, 0, 0)).await;

        execute(ScanInvoicesUseCase { workspace_filter: None }, &ctx).await.unwrap();

        workspace.settings = None;
        ctx.repos.workspace_repo.save(&workspace).await.unwrap();

        let report = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(mailer.sent_count(), 0);

        let events = ctx
            .repos
            .reminder_event_repo
            .find_by_invoice(&invoice.id)
            .await
            .unwrap();
        assert_eq!(events[0].status, ReminderEventStatus::Skipped);
        assert_eq!(
            events[0].error_message.as_deref(),
            Some("Workspace has no automation settings")
        );
    }

    #[actix_web::main]
    #[test]
    async fn future_scheduled_reminders_stay_queued() {
        let mut ctx = test_context(ts(2026, 3, 6, 12, 0));
        let mailer = Arc::new(InMemoryMailer::new());
        ctx.mailer = mailer.clone();
        let workspace = test_workspace(&ctx).await;
        test_invoice(&ctx, &workspace, ts(2026, 3, 10, 0, 0)).await;

        // Nothing has been queued yet at all
        let report = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        assert_eq!(report.processed, 0);
        assert_eq!(mailer.sent_count(), 0);
    }

    #[actix_web::main]
    #[test]
    async fn workspace_template_overrides_the_default() {
        let mut ctx = test_context(ts(2026, 3, 7, 12, 0));
        let mailer = Arc::new(InMemoryMailer::new());
        ctx.mailer = mailer.clone();
        let workspace = test_workspace(&ctx).await;
        test_invoice(&ctx, &workspace, ts(2026, 3, 10, 0, 0)).await;

        let template = ReminderTemplate {
            id: Default::default(),
            workspace_id: workspace.id.clone(),
            stage: ReminderStage::PreDue,
            subject_template: "Heads up about {{invoiceNumber}}".into(),
            body_template: "{{clientName}}, {{amountDue}} is due soon. Pay at {{paymentLink}}"
                .into(),
        };
        ctx.repos.template_repo.insert(&template).await.unwrap();

        execute(ScanInvoicesUseCase { workspace_filter: None }, &ctx).await.unwrap();
        execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].subject,
            "[Friendly Reminder] Heads up about INV-1001"
        );
        assert!(sent[0].text.starts_with("Jordan Lee, USD 1250.00 is due soon."));
    }

    struct FlakyPaymentLinkRepo {
        inner: Arc<dyn IPaymentLinkRepo>,
        poisoned: ID,
    }

    #[async_trait::async_trait]
    impl IPaymentLinkRepo for FlakyPaymentLinkRepo {
        async fn insert(&self, link: &PaymentLink) -> anyhow::Result<()> {
            if link.invoice_id == self.poisoned {
                anyhow::bail!("connection reset by peer");
            }
            self.inner.insert(link).await
        }

        async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<PaymentLink>> {
            self.inner.find_by_invoice(invoice_id).await
        }
    }

    #[actix_web::main]
    #[test]
    async fn a_datastore_hiccup_on_one_reminder_does_not_abort_the_batch() {
        let mut ctx = test_context(ts(2026, 3, 7, 12, 0));
        let mailer = Arc::new(InMemoryMailer::new());
        ctx.mailer = mailer.clone();
        let workspace = test_workspace(&ctx).await;
        let poisoned = test_invoice(&ctx, &workspace, ts(2026, 3, 10, 0, 0)).await;
        let healthy = test_invoice(&ctx, &workspace, ts(2026, 3, 10, 0, 0)).await;

        execute(ScanInvoicesUseCase { workspace_filter: None }, &ctx).await.unwrap();

        ctx.repos.payment_link_repo = Arc::new(FlakyPaymentLinkRepo {
            inner: ctx.repos.payment_link_repo.clone(),
            poisoned: poisoned.id.clone(),
        });

        let report = execute(SendDueRemindersUseCase {}, &ctx).await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.sent, 1);
        assert_eq!(mailer.sent_count(), 1);

        // The broken event is untouched and stays eligible for the next
        // pass
        let events = ctx
            .repos
            .reminder_event_repo
            .find_by_invoice(&poisoned.id)
            .await
            .unwrap();
        assert_eq!(events[0].status, ReminderEventStatus::Queued);

        let events = ctx
            .repos
            .reminder_event_repo
            .find_by_invoice(&healthy.id)
            .await
            .unwrap();
        assert_eq!(events[0].status, ReminderEventStatus::Sent);
    }
}
