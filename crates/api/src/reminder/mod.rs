mod delivery;
#[cfg(test)]
pub(crate) mod test_helpers;
mod retry_failed_reminders;
mod scan_invoices;
mod send_due_reminders;
mod send_reminder_now;

pub(crate) use retry_failed_reminders::RetryFailedRemindersUseCase;
pub(crate) use scan_invoices::ScanInvoicesUseCase;
pub(crate) use send_due_reminders::SendDueRemindersUseCase;

use actix_web::web;
use retry_failed_reminders::retry_failed_reminders_controller;
use scan_invoices::scan_invoices_controller;
use send_due_reminders::send_due_reminders_controller;
use send_reminder_now::send_reminder_now_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/reminders/scan", web::post().to(scan_invoices_controller));
    cfg.route(
        "/reminders/dispatch",
        web::post().to(send_due_reminders_controller),
    );
    cfg.route(
        "/reminders/retry",
        web::post().to(retry_failed_reminders_controller),
    );
    cfg.route(
        "/invoices/{invoice_id}/reminders/send-now",
        web::post().to(send_reminder_now_controller),
    );
}
