use actix_web::{http::StatusCode, test, web, App};
use chrono::{TimeZone, Utc};
use remmit_api::configure_server_api;
use remmit_domain::{
    AutomationSettings, Cadence, Invoice, InvoiceStatus, TimeOfDay, Tone, Workspace,
};
use remmit_infra::{setup_context_inmemory, ISys, InMemoryMailer, RemmitContext};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

struct AdjustableSys(AtomicI64);

impl AdjustableSys {
    fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }
}

impl ISys for AdjustableSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

fn ts(year: i32, month: u32, day: u32, hour: u32) -> i64 {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .unwrap()
        .timestamp_millis()
}

struct TestApp {
    ctx: RemmitContext,
    sys: Arc<AdjustableSys>,
    mailer: Arc<InMemoryMailer>,
}

fn test_app(now: i64) -> TestApp {
    let mut ctx = setup_context_inmemory();
    let sys = Arc::new(AdjustableSys(AtomicI64::new(now)));
    let mailer = Arc::new(InMemoryMailer::new());
    ctx.sys = sys.clone();
    ctx.mailer = mailer.clone();
    TestApp { ctx, sys, mailer }
}

async fn seed_workspace(ctx: &RemmitContext) -> Workspace {
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
            tone: Tone::Firm,
            signature_name: "Maria".into(),
            reply_to_email: Some("billing@acme.example".into()),
        }),
    };
    ctx.repos.workspace_repo.insert(&workspace).await.unwrap();
    workspace
}

async fn seed_invoice(ctx: &RemmitContext, workspace: &Workspace, due_at: i64) -> Invoice {
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

#[actix_web::test]
async fn health_check_works() {
    let TestApp { ctx, .. } = test_app(ts(2026, 3, 7, 12));
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ctx))
            .service(web::scope("/api/v1").configure(configure_server_api)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn reminder_lifecycle_over_http() {
    let TestApp { ctx, sys, mailer } = test_app(ts(2026, 3, 7, 12));
    let workspace = seed_workspace(&ctx).await;
    let mut invoice = seed_invoice(&ctx, &workspace, ts(2026, 3, 10, 0)).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ctx.clone()))
            .service(web::scope("/api/v1").configure(configure_server_api)),
    )
    .await;

    // Three days before the due date the pre due reminder is queued and
    // dispatched
    let req = test::TestRequest::post()
        .uri("/api/v1/reminders/scan")
        .to_request();
    let scan: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(scan["remindersQueued"], 1);

    let req = test::TestRequest::post()
        .uri("/api/v1/reminders/dispatch")
        .to_request();
    let dispatch: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dispatch["sent"], 1);
    assert_eq!(mailer.sent_count(), 1);

    // A day past due the first overdue reminder goes out
    sys.set(ts(2026, 3, 11, 12));
    let req = test::TestRequest::post()
        .uri("/api/v1/reminders/scan")
        .to_request();
    let scan: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(scan["remindersQueued"], 1);

    let req = test::TestRequest::post()
        .uri("/api/v1/reminders/dispatch")
        .to_request();
    let dispatch: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(dispatch["sent"], 1);
    assert_eq!(mailer.sent_count(), 2);

    {
        let sent = mailer.sent.lock().unwrap();
        assert!(sent[1].subject.starts_with("[Reminder]"));
        assert_eq!(sent[1].reply_to.as_deref(), Some("billing@acme.example"));
    }

    // Once the client pays, the next scan flips the invoice to recovered
    // and queues nothing further
    invoice.paid_at = Some(ts(2026, 3, 12, 9));
    ctx.repos.invoice_repo.save(&invoice).await.unwrap();
    sys.set(ts(2026, 3, 14, 12));

    let req = test::TestRequest::post()
        .uri("/api/v1/reminders/scan")
        .to_request();
    let scan: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(scan["invoicesRecovered"], 1);
    assert_eq!(scan["remindersQueued"], 0);
    assert_eq!(mailer.sent_count(), 2);
}

#[actix_web::test]
async fn send_now_validates_its_input() {
    let TestApp { ctx, .. } = test_app(ts(2026, 3, 7, 12));
    seed_workspace(&ctx).await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ctx))
            .service(web::scope("/api/v1").configure(configure_server_api)),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/invoices/not-a-uuid/reminders/send-now")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/invoices/9e9e1a12-72b7-4c3f-a36f-f64f31f1a7a3/reminders/send-now")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
