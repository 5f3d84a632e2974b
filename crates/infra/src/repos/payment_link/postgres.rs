use super::IPaymentLinkRepo;
use remmit_domain::{PaymentLink, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresPaymentLinkRepo {
    pool: PgPool,
}

impl PostgresPaymentLinkRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PaymentLinkRaw {
    payment_link_uid: Uuid,
    invoice_uid: Uuid,
    reminder_event_uid: Uuid,
    token: String,
    destination_url: String,
    clicks: i64,
    created_at: i64,
}

impl PaymentLinkRaw {
    fn into_domain(self) -> PaymentLink {
        PaymentLink {
            id: self.payment_link_uid.into(),
            invoice_id: self.invoice_uid.into(),
            reminder_event_id: self.reminder_event_uid.into(),
            token: self.token,
            destination_url: self.destination_url,
            clicks: self.clicks,
            created_at: self.created_at,
        }
    }
}

#[async_trait::async_trait]
impl IPaymentLinkRepo for PostgresPaymentLinkRepo {
    async fn insert(&self, link: &PaymentLink) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_links
            (payment_link_uid, invoice_uid, reminder_event_uid, token,
             destination_url, clicks, created_at)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(link.id.inner_ref())
        .bind(link.invoice_id.inner_ref())
        .bind(link.reminder_event_id.inner_ref())
        .bind(&link.token)
        .bind(&link.destination_url)
        .bind(link.clicks)
        .bind(link.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_invoice(&self, invoice_id: &ID) -> anyhow::Result<Vec<PaymentLink>> {
        let rows = sqlx::query_as::<_, PaymentLinkRaw>(
            r#"
            SELECT * FROM payment_links
            WHERE invoice_uid = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(invoice_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|raw| raw.into_domain()).collect())
    }
}
