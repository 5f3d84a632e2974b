use crate::error::RemmitError;
use crate::reminder::delivery::dispatch_reminder;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use remmit_domain::{next_stage, InvoiceStatus, ReminderEvent, ReminderStage, ID};
use remmit_infra::RemmitContext;
use serde::Serialize;
use std::str::FromStr;

pub async fn send_reminder_now_controller(
    ctx: web::Data<RemmitContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, RemmitError> {
    let invoice_id = ID::from_str(&path)
        .map_err(|e| RemmitError::BadClientData(format!("Invalid invoice id: {}", e)))?;

    let usecase = SendReminderNowUseCase { invoice_id };
    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse { reminder: res }))
        .map_err(RemmitError::from)
}

#[derive(Debug, Serialize)]
pub struct APIResponse {
    pub reminder: ReminderEvent,
}

/// Manual trigger for a single invoice. Picks the next pending stage, or
/// the final stage when the cadence is spent, and dispatches right away
/// when the send window allows it.
#[derive(Debug)]
pub struct SendReminderNowUseCase {
    pub invoice_id: ID,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvoiceNotFound(ID),
    InvoiceRecovered(ID),
    AutomationNotConfigured,
    InvalidSendWindow(String),
    StorageError,
}

impl From<UseCaseErrors> for RemmitError {
    fn from(e: UseCaseErrors) -> Self {
        match e {
            UseCaseErrors::InvoiceNotFound(id) => {
                Self::NotFound(format!("The invoice with id: {} was not found", id))
            }
            UseCaseErrors::InvoiceRecovered(id) => Self::Conflict(format!(
                "The invoice with id: {} is already paid, no reminder to send",
                id
            )),
            UseCaseErrors::AutomationNotConfigured => Self::BadClientData(
                "The workspace has no reminder automation settings configured".into(),
            ),
            UseCaseErrors::InvalidSendWindow(e) => {
                Self::BadClientData(format!("The workspace send window is invalid: {}", e))
            }
            UseCaseErrors::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendReminderNowUseCase {
    type Response = ReminderEvent;
    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &RemmitContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();

        let invoice = ctx
            .repos
            .invoice_repo
            .find(&self.invoice_id)
            .await
            .ok_or_else(|| UseCaseErrors::InvoiceNotFound(self.invoice_id.clone()))?;

        if invoice.compute_status(now) == InvoiceStatus::Recovered {
            return Err(UseCaseErrors::InvoiceRecovered(invoice.id));
        }

        let workspace = ctx
            .repos
            .workspace_repo
            .find(&invoice.workspace_id)
            .await
            .ok_or(UseCaseErrors::StorageError)?;
        let settings = workspace
            .settings
            .clone()
            .ok_or(UseCaseErrors::AutomationNotConfigured)?;

        let existing = ctx
            .repos
            .reminder_event_repo
            .find_by_invoice(&invoice.id)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        let recorded: Vec<ReminderStage> = existing.iter().map(|e| e.stage).collect();

        // Past the cadence the manual trigger falls back to the final
        // notice
        let stage = next_stage(invoice.due_at, &settings.cadence, &recorded, now)
            .map(|(stage, _)| stage)
            .unwrap_or(ReminderStage::Final);

        let scheduled_for = workspace
            .send_window(&settings)
            .clamp(now)
            .map_err(|e| UseCaseErrors::InvalidSendWindow(e.to_string()))?;

        let queued = ReminderEvent::new_queued(
            workspace.id.clone(),
            invoice.id.clone(),
            stage,
            scheduled_for,
            invoice.client_email.clone(),
            now,
        );
        let mut event = ctx
            .repos
            .reminder_event_repo
            .insert_if_absent(&queued)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;
        // Someone already recorded this stage: hand back their event
        // untouched instead of erroring or double sending
        if event.id != queued.id {
            return Ok(event);
        }

        // Inside the send window it goes out immediately, otherwise the
        // dispatcher picks it up when the window opens
        if event.scheduled_for <= now {
            dispatch_reminder(&mut event, ctx)
                .await
                .map_err(|_| UseCaseErrors::StorageError)?;
        }

        Ok(event)
    }
}
