use crate::error::RemmitError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use remmit_domain::{retry_backoff_minutes, ReminderEventStatus};
use remmit_infra::RemmitContext;
use serde::Serialize;

const RETRY_BATCH_SIZE: i64 = 100;

pub async fn retry_failed_reminders_controller(
    ctx: web::Data<RemmitContext>,
) -> Result<HttpResponse, RemmitError> {
    let usecase = RetryFailedRemindersUseCase {};
    execute(usecase, &ctx)
        .await
        .map(|report| HttpResponse::Ok().json(report))
        .map_err(RemmitError::from)
}

/// Puts FAILED reminders back in the queue with an exponential backoff,
/// capped at one hour. Events that already burned through their send
/// attempts are left FAILED for good.
#[derive(Debug)]
pub struct RetryFailedRemindersUseCase {}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryReport {
    pub requeued: usize,
    pub exhausted: usize,
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
impl UseCase for RetryFailedRemindersUseCase {
    type Response = RetryReport;
    type Errors = UseCaseErrors;

    async fn execute(&mut self, ctx: &RemmitContext) -> Result<Self::Response, Self::Errors> {
        let now = ctx.sys.get_timestamp_millis();
        let mut report = RetryReport::default();

        let failed = ctx
            .repos
            .reminder_event_repo
            .find_failed(RETRY_BATCH_SIZE)
            .await
            .map_err(|_| UseCaseErrors::StorageError)?;

        for mut event in failed {
            if event.is_exhausted() {
                report.exhausted += 1;
                continue;
            }

            let backoff_millis = retry_backoff_minutes(event.attempts) * 60 * 1000;
            event.status = ReminderEventStatus::Queued;
            event.scheduled_for = now + backoff_millis;
            ctx.repos
                .reminder_event_repo
                .save(&event)
                .await
                .map_err(|_| UseCaseErrors::StorageError)?;
            report.requeued += 1;
        }

        Ok(report)
    }
}
