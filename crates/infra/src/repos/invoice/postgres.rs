use super::IInvoiceRepo;
use remmit_domain::{Invoice, InvoiceStatus, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::str::FromStr;
use tracing::error;

pub struct PostgresInvoiceRepo {
    pool: PgPool,
}

impl PostgresInvoiceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct InvoiceRaw {
    invoice_uid: Uuid,
    workspace_uid: Uuid,
    client_name: String,
    client_email: String,
    invoice_number: String,
    currency: String,
    amount_due_minor: i64,
    amount_paid_minor: i64,
    issued_at: i64,
    due_at: i64,
    paid_at: Option<i64>,
    status: String,
    last_reminder_at: Option<i64>,
    payment_url: String,
}

impl InvoiceRaw {
    fn into_domain(self) -> anyhow::Result<Invoice> {
        let status = InvoiceStatus::from_str(&self.status)
            .map_err(|_| anyhow::anyhow!("Invalid invoice status stored: {}", self.status))?;
        Ok(Invoice {
            id: self.invoice_uid.into(),
            workspace_id: self.workspace_uid.into(),
            client_name: self.client_name,
            client_email: self.client_email,
            invoice_number: self.invoice_number,
            currency: self.currency,
            amount_due_minor: self.amount_due_minor,
            amount_paid_minor: self.amount_paid_minor,
            issued_at: self.issued_at,
            due_at: self.due_at,
            paid_at: self.paid_at,
            status,
            last_reminder_at: self.last_reminder_at,
            payment_url: self.payment_url,
        })
    }
}

#[async_trait::async_trait]
impl IInvoiceRepo for PostgresInvoiceRepo {
    async fn insert(&self, invoice: &Invoice) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO invoices
            (invoice_uid, workspace_uid, client_name, client_email, invoice_number,
             currency, amount_due_minor, amount_paid_minor, issued_at, due_at,
             paid_at, status, last_reminder_at, payment_url)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(invoice.id.inner_ref())
        .bind(invoice.workspace_id.inner_ref())
        .bind(&invoice.client_name)
        .bind(&invoice.client_email)
        .bind(&invoice.invoice_number)
        .bind(&invoice.currency)
        .bind(invoice.amount_due_minor)
        .bind(invoice.amount_paid_minor)
        .bind(invoice.issued_at)
        .bind(invoice.due_at)
        .bind(invoice.paid_at)
        .bind(invoice.status.as_str())
        .bind(invoice.last_reminder_at)
        .bind(&invoice.payment_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, invoice: &Invoice) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE invoices
            SET amount_due_minor = $2, amount_paid_minor = $3, paid_at = $4,
                status = $5, last_reminder_at = $6
            WHERE invoice_uid = $1
            "#,
        )
        .bind(invoice.id.inner_ref())
        .bind(invoice.amount_due_minor)
        .bind(invoice.amount_paid_minor)
        .bind(invoice.paid_at)
        .bind(invoice.status.as_str())
        .bind(invoice.last_reminder_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, invoice_id: &ID) -> Option<Invoice> {
        let res = sqlx::query_as::<_, InvoiceRaw>(
            r#"
            SELECT * FROM invoices
            WHERE invoice_uid = $1
            "#,
        )
        .bind(invoice_id.inner_ref())
        .fetch_optional(&self.pool)
        .await;

        match res {
            Ok(raw) => raw.and_then(|raw| match raw.into_domain() {
                Ok(invoice) => Some(invoice),
                Err(e) => {
                    error!("Unable to decode invoice {}: {:?}", invoice_id, e);
                    None
                }
            }),
            Err(e) => {
                error!("Unable to find invoice {}: {:?}", invoice_id, e);
                None
            }
        }
    }

    async fn find_active_by_workspace(&self, workspace_id: &ID) -> anyhow::Result<Vec<Invoice>> {
        sqlx::query_as::<_, InvoiceRaw>(
            r#"
            SELECT * FROM invoices
            WHERE workspace_uid = $1 AND status != 'RECOVERED'
            ORDER BY due_at ASC
            "#,
        )
        .bind(workspace_id.inner_ref())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|raw| raw.into_domain())
        .collect()
    }
}
