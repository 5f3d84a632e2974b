use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::warn;

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, Clone, PartialEq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub reply_to: Option<String>,
}

/// Transactional email delivery. Implementations return the provider
/// message id when the provider reports one; any provider failure is a
/// plain error for the caller's retry bookkeeping.
#[async_trait::async_trait]
pub trait IMailer: Send + Sync {
    async fn send(&self, email: Email) -> anyhow::Result<Option<String>>;
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from,
        }
    }
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[async_trait::async_trait]
impl IMailer for ResendMailer {
    async fn send(&self, email: Email) -> anyhow::Result<Option<String>> {
        let api_key = match &self.api_key {
            Some(api_key) => api_key,
            None => {
                warn!(
                    "RESEND_API_KEY not set, email send to {} skipped",
                    email.to
                );
                return Ok(None);
            }
        };

        let body = SendEmailRequest {
            from: &self.from,
            to: vec![&email.to],
            subject: &email.subject,
            text: &email.text,
            reply_to: email.reply_to.as_deref(),
        };

        let res = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(anyhow::anyhow!(
                "Email provider rejected the send with status: {}",
                res.status()
            ));
        }

        let res: SendEmailResponse = res.json().await?;
        Ok(res.id)
    }
}

/// Mailer for tests: records every send and can be flipped into a
/// failing state to exercise the retry path.
pub struct InMemoryMailer {
    pub sent: Mutex<Vec<Email>>,
    failing: AtomicBool,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for InMemoryMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IMailer for InMemoryMailer {
    async fn send(&self, email: Email) -> anyhow::Result<Option<String>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("Email provider unavailable"));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email);
        Ok(Some(format!("in-memory-{}", sent.len())))
    }
}
