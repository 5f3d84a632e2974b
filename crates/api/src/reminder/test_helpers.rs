use chrono::{TimeZone, Utc};
use remmit_domain::{
    AutomationSettings, Cadence, Invoice, InvoiceStatus, TimeOfDay, Tone, Workspace,
};
use remmit_infra::{setup_context_inmemory, ISys, RemmitContext};
use std::sync::Arc;

pub struct StaticSys(pub i64);

impl ISys for StaticSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0
    }
}

pub fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
        .timestamp_millis()
}

pub fn test_context(now: i64) -> RemmitContext {
    let mut ctx = setup_context_inmemory();
    ctx.sys = Arc::new(StaticSys(now));
    ctx
}

pub fn set_time(ctx: &mut RemmitContext, now: i64) {
    ctx.sys = Arc::new(StaticSys(now));
}

/// Workspace with the default 3/1/4/10 cadence and a send window that
/// spans the whole day, so clamping does not move timestamps around
/// unless a test asks for it.
pub async fn test_workspace(ctx: &RemmitContext) -> Workspace {
    let workspace = Workspace {
        id: Default::default(),
        name: "Acme Studio".into(),
        timezone: chrono_tz::UTC,
        settings: Some(AutomationSettings {
            cadence: Cadence {
                pre_due_days: 3,
                overdue1_days: 1,
                overdue2_days: 4,
                final_days: 10,
            },
            send_window_start: TimeOfDay::new(0, 0).unwrap(),
            send_window_end: TimeOfDay::new(23, 59).unwrap(),
            weekdays_only: false,
            tone: Tone::Friendly,
            signature_name: "Maria".into(),
            reply_to_email: None,
        }),
    };
    ctx.repos.workspace_repo.insert(&workspace).await.unwrap();
    workspace
}

pub async fn test_invoice(ctx: &RemmitContext, workspace: &Workspace, due_at: i64) -> Invoice {
    let invoice = Invoice {
        id: Default::default(),
        workspace_id: workspace.id.clone(),
        client_name: "Jordan Lee".into(),
        client_email: "jordan@example.com".into(),
        invoice_number: "INV-1001".into(),
        currency: "USD".into(),
        amount_due_minor: 125_000,
        amount_paid_minor: 0,
        issued_at: due_at - 14 * 24 * 60 * 60 * 1000,
        due_at,
        paid_at: None,
        status: InvoiceStatus::Pending,
        last_reminder_at: None,
        payment_url: "https://pay.example.com/inv-1001".into(),
    };
    ctx.repos.invoice_repo.insert(&invoice).await.unwrap();
    invoice
}
