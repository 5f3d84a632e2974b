use crate::reminder::{RetryFailedRemindersUseCase, ScanInvoicesUseCase, SendDueRemindersUseCase};
use crate::shared::usecase::execute;
use actix_web::rt::time::interval;
use remmit_infra::RemmitContext;
use std::time::Duration;

const SCAN_INTERVAL_SECS: u64 = 15 * 60;
const DISPATCH_INTERVAL_SECS: u64 = 5 * 60;

/// Scans all workspaces for reminders to queue every 15 minutes. The
/// first pass runs right after startup so a restart never delays
/// scheduling by a full interval.
pub fn start_invoice_scan_job(ctx: RemmitContext) {
    actix_web::rt::spawn(async move {
        let mut scan_interval = interval(Duration::from_secs(SCAN_INTERVAL_SECS));
        loop {
            scan_interval.tick().await;

            let usecase = ScanInvoicesUseCase { workspace_filter: None };
            let _ = execute(usecase, &ctx).await;
        }
    });
}

/// Dispatches due reminders and requeues failed ones every 5 minutes.
/// Retry runs after dispatch in the same tick so a fresh failure gets
/// its backoff applied without waiting for the next pass.
pub fn start_dispatch_reminders_job(ctx: RemmitContext) {
    actix_web::rt::spawn(async move {
        let mut dispatch_interval = interval(Duration::from_secs(DISPATCH_INTERVAL_SECS));
        loop {
            dispatch_interval.tick().await;

            let usecase = SendDueRemindersUseCase {};
            let _ = execute(usecase, &ctx).await;

            let usecase = RetryFailedRemindersUseCase {};
            let _ = execute(usecase, &ctx).await;
        }
    });
}
