use crate::shared::entity::{Entity, ID};
use remmit_utils::create_random_secret;
use serde::{Deserialize, Serialize};

const TOKEN_LEN: usize = 24;

/// A single use payment link minted for one dispatched reminder. The
/// token is resolved by a public redirect endpoint that counts clicks;
/// the engine only mints tokens and renders the url into emails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub id: ID,
    pub invoice_id: ID,
    pub reminder_event_id: ID,
    pub token: String,
    pub destination_url: String,
    pub clicks: i64,
    pub created_at: i64,
}

impl PaymentLink {
    pub fn new(
        invoice_id: ID,
        reminder_event_id: ID,
        destination_url: String,
        created_at: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            invoice_id,
            reminder_event_id,
            token: create_random_secret(TOKEN_LEN),
            destination_url,
            clicks: 0,
            created_at,
        }
    }

    pub fn url(&self, app_url: &str) -> String {
        format!("{}/r/{}", app_url.trim_end_matches('/'), self.token)
    }
}

impl Entity for PaymentLink {
    fn id(&self) -> &ID {
        &self.id
    }
}
