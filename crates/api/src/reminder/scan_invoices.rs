use crate::error::RemmitError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use remmit_domain::{
    next_stage, AutomationSettings, Invoice, InvoiceStatus, ReminderEvent, ReminderStage,
    SendWindow, Workspace, ID,
};
use remmit_infra::RemmitContext;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanParams {
    pub workspace_id: Option<String>,
}

pub async fn scan_invoices_controller(
    ctx: web::Data<RemmitContext>,
    params: web::Query<ScanParams>,
) -> Result<HttpResponse, RemmitError> {
    let workspace_filter = match &params.workspace_id {
        Some(id) => Some(
            ID::from_str(id)
                .map_err(|e| RemmitError::BadClientData(format!("Invalid workspace id: {}", e)))?,
        ),
        None => None,
    };

    let usecase = ScanInvoicesUseCase { workspace_filter };
    execute(usecase, &ctx)
        .await
        .map(|report| HttpResponse::Ok().json(report))
        .map_err(RemmitError::from)
}

/// Walks workspaces with automation settings, refreshes invoice statuses
/// and queues the next reminder stage for invoices whose stage target has
/// passed. Safe to run any number of times: stages that already have an
/// event are never queued again.
#[derive(Debug)]
pub struct ScanInvoicesUseCase {
    /// Restricts the pass to one workspace when set
    pub workspace_filter: Option<ID>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub workspaces_scanned: usize,
    pub invoices_scanned: usize,
    pub reminders_queued: usize,
    pub invoices_recovered: usize,
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
impl UseCase for ScanInvoicesUseCase {
    type Response = ScanReport;
    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &RemmitContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let mut report = ScanReport::default();

        let workspaces = match &self.workspace_filter {
            Some(id) => ctx.repos.workspace_repo.find(id).await.into_iter().collect(),
            None => ctx
                .repos
                .workspace_repo
                .find_all()
                .await
                .map_err(|_| UseCaseErrors::StorageError)?,
        };

        for workspace in workspaces {
            let settings = match &workspace.settings {
                Some(settings) => settings,
                // Automation is off until a workspace configures it
                None => continue,
            };
            report.workspaces_scanned += 1;
            let send_window = workspace.send_window(settings);

            let invoices = ctx
                .repos
                .invoice_repo
                .find_active_by_workspace(&workspace.id)
                .await
                .map_err(|_| UseCaseErrors::StorageError)?;

            for mut invoice in invoices {
                report.invoices_scanned += 1;

                // One broken invoice must not starve the rest of the pass
                match scan_invoice(&mut invoice, &workspace, settings, &send_window, now, ctx).await
                {
                    Ok(InvoiceOutcome::Queued) => report.reminders_queued += 1,
                    Ok(InvoiceOutcome::Recovered) => report.invoices_recovered += 1,
                    Ok(InvoiceOutcome::Nothing) => {}
                    Err(e) => error!(
                        "Scheduling reminders for invoice {} failed: {:?}",
                        invoice.id, e
                    ),
                }
            }
        }

        Ok(report)
    }
}

enum InvoiceOutcome {
    Queued,
    Recovered,
    Nothing,
}

async fn scan_invoice(
    invoice: &mut Invoice,
    workspace: &Workspace,
    settings: &AutomationSettings,
    send_window: &SendWindow,
    now: i64,
    ctx: &RemmitContext,
) -> anyhow::Result<InvoiceOutcome> {
    let status = invoice.compute_status(now);
    let flipped = status != invoice.status;
    if flipped {
        invoice.status = status;
        ctx.repos.invoice_repo.save(invoice).await?;
    }
    if status == InvoiceStatus::Recovered {
        return Ok(if flipped {
            InvoiceOutcome::Recovered
        } else {
            InvoiceOutcome::Nothing
        });
    }

    let existing = ctx
        .repos
        .reminder_event_repo
        .find_by_invoice(&invoice.id)
        .await?;
    let recorded: Vec<ReminderStage> = existing.iter().map(|e| e.stage).collect();

    let (stage, target) = match next_stage(invoice.due_at, &settings.cadence, &recorded, now) {
        Some(next) => next,
        None => return Ok(InvoiceOutcome::Nothing),
    };

    // Stage targets in the past still go out, but never outside the
    // workspace send window.
    let scheduled_for = send_window.clamp(target.max(now))?;

    let event = ReminderEvent::new_queued(
        workspace.id.clone(),
        invoice.id.clone(),
        stage,
        scheduled_for,
        invoice.client_email.clone(),
        now,
    );
    let stored = ctx
        .repos
        .reminder_event_repo
        .insert_if_absent(&event)
        .await?;
    Ok(if stored.id == event.id {
        InvoiceOutcome::Queued
    } else {
        InvoiceOutcome::Nothing
    })
}
