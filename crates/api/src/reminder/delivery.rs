use chrono::DateTime;
use remmit_domain::{
    format_amount_minor, render, AuditEvent, AutomationSettings, Invoice, InvoiceStatus,
    PaymentLink, ReminderEvent, ReminderEventStatus, ReminderTemplate, TemplateContext, Workspace,
};
use remmit_infra::{Email, RemmitContext};

#[derive(Debug, PartialEq)]
pub(crate) enum DispatchOutcome {
    Sent,
    Failed,
    Skipped,
}

/// Processes one QUEUED reminder end to end: looks up workspace and
/// invoice, renders the stage template with a freshly minted payment
/// link, and hands the email to the mailer.
///
/// A missing workspace or settings, a vanished invoice or an invoice
/// paid since queueing all end as SKIPPED without a send. A successful
/// send stores the event as SENT with the rendered snapshot together
/// with the invoice `last_reminder_at` update; any per-event failure
/// stores it as FAILED (attempts incremented) together with an audit
/// record. Both pairs of writes go through the repository as one unit.
pub(crate) async fn dispatch_reminder(
    event: &mut ReminderEvent,
    ctx: &RemmitContext,
) -> anyhow::Result<DispatchOutcome> {
    let now = ctx.sys.get_timestamp_millis();

    let (workspace, settings) = match ctx.repos.workspace_repo.find(&event.workspace_id).await {
        Some(workspace) => match workspace.settings.clone() {
            Some(settings) => (workspace, settings),
            None => return skip(event, "Workspace has no automation settings", ctx).await,
        },
        None => return skip(event, "Workspace no longer exists", ctx).await,
    };

    let invoice = match ctx.repos.invoice_repo.find(&event.invoice_id).await {
        Some(invoice) => invoice,
        None => return skip(event, "Invoice no longer exists", ctx).await,
    };
    // Paid between queueing and dispatch: never email the client
    if invoice.compute_status(now) == InvoiceStatus::Recovered {
        return skip(event, "Invoice is already paid", ctx).await;
    }

    let template = match ctx
        .repos
        .template_repo
        .find_by_workspace_and_stage(&workspace.id, event.stage)
        .await
    {
        Some(template) => template,
        None => ReminderTemplate::default_for(&workspace.id, event.stage),
    };

    // Every attempt gets its own single use token
    let payment_link = PaymentLink::new(
        invoice.id.clone(),
        event.id.clone(),
        invoice.payment_url.clone(),
        now,
    );
    let template_ctx = template_context(
        &invoice,
        &workspace,
        &settings,
        &payment_link.url(&ctx.config.app_url),
        now,
    );

    let subject = match render(&template.subject_template, &template_ctx) {
        Ok(subject) => format!("{} {}", settings.tone.subject_prefix(), subject),
        Err(e) => return fail(event, e.to_string(), now, ctx).await,
    };
    let body = match render(&template.body_template, &template_ctx) {
        Ok(body) => body,
        Err(e) => return fail(event, e.to_string(), now, ctx).await,
    };

    ctx.repos.payment_link_repo.insert(&payment_link).await?;

    let email = Email {
        to: event.recipient.clone(),
        subject: subject.clone(),
        text: body.clone(),
        reply_to: settings.reply_to_email.clone(),
    };

    match ctx.mailer.send(email).await {
        Ok(provider_message_id) => {
            event.status = ReminderEventStatus::Sent;
            event.sent_at = Some(now);
            event.subject = subject;
            event.body_snapshot = body;
            event.provider_message_id = provider_message_id;
            event.error_message = None;
            ctx.repos.reminder_event_repo.mark_sent(event, now).await?;
            Ok(DispatchOutcome::Sent)
        }
        Err(e) => fail(event, e.to_string(), now, ctx).await,
    }
}

async fn skip(
    event: &mut ReminderEvent,
    message: &str,
    ctx: &RemmitContext,
) -> anyhow::Result<DispatchOutcome> {
    event.status = ReminderEventStatus::Skipped;
    event.error_message = Some(message.into());
    ctx.repos.reminder_event_repo.save(event).await?;
    Ok(DispatchOutcome::Skipped)
}

async fn fail(
    event: &mut ReminderEvent,
    error: String,
    now: i64,
    ctx: &RemmitContext,
) -> anyhow::Result<DispatchOutcome> {
    event.status = ReminderEventStatus::Failed;
    event.attempts += 1;
    event.error_message = Some(error.clone());
    let audit = AuditEvent::reminder_send_failed(event.workspace_id.clone(), &event.id, &error, now);
    ctx.repos.reminder_event_repo.mark_failed(event, &audit).await?;
    Ok(DispatchOutcome::Failed)
}

fn template_context(
    invoice: &Invoice,
    workspace: &Workspace,
    settings: &AutomationSettings,
    payment_link_url: &str,
    now: i64,
) -> TemplateContext {
    // Due date rendered as a plain date in the workspace timezone
    let due_date = DateTime::from_timestamp_millis(invoice.due_at)
        .map(|dt| {
            dt.with_timezone(&workspace.timezone)
                .format("%Y-%m-%d")
                .to_string()
        })
        .unwrap_or_default();

    TemplateContext {
        client_name: invoice.client_name.clone(),
        invoice_number: invoice.invoice_number.clone(),
        amount_due: format_amount_minor(invoice.outstanding_minor(), &invoice.currency),
        currency: invoice.currency.clone(),
        due_date,
        days_overdue: invoice.days_overdue(now).to_string(),
        payment_link: payment_link_url.to_string(),
        business_name: workspace.name.clone(),
        signature_name: settings.signature_name.clone(),
    }
}
