mod audit;
mod cadence;
mod invoice;
mod payment_link;
mod reminder;
mod send_window;
mod shared;
mod template;
mod workspace;

pub use audit::{AuditEvent, REMINDER_SEND_FAILED};
pub use cadence::{next_stage, stage_schedule, Cadence, ReminderStage, StageSchedule};
pub use invoice::{format_amount_minor, Invoice, InvoiceStatus, DUE_SOON_WINDOW_DAYS};
pub use payment_link::PaymentLink;
pub use reminder::{
    retry_backoff_minutes, ReminderEvent, ReminderEventStatus, MAX_SEND_ATTEMPTS,
};
pub use send_window::{SendWindow, SendWindowError, TimeOfDay};
pub use shared::entity::{Entity, ID};
pub use template::{
    render, ReminderTemplate, TemplateContext, Tone, UnknownVariableError, ALLOWED_VARIABLES,
};
pub use workspace::{AutomationSettings, Workspace};
