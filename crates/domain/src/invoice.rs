use crate::shared::entity::{Entity, ID};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How close to the due date an unpaid invoice starts counting as due
/// soon. Fixed constant, not workspace configurable.
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Pending,
    DueSoon,
    Overdue,
    Recovered,
}

impl InvoiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "PENDING",
            InvoiceStatus::DueSoon => "DUE_SOON",
            InvoiceStatus::Overdue => "OVERDUE",
            InvoiceStatus::Recovered => "RECOVERED",
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(InvoiceStatus::Pending),
            "DUE_SOON" => Ok(InvoiceStatus::DueSoon),
            "OVERDUE" => Ok(InvoiceStatus::Overdue),
            "RECOVERED" => Ok(InvoiceStatus::Recovered),
            _ => Err(()),
        }
    }
}

/// An invoice owned by a `Workspace`, tracked for overdue collection.
/// Amounts are in integer minor units (cents), timestamps in unix millis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: ID,
    pub workspace_id: ID,
    pub client_name: String,
    pub client_email: String,
    pub invoice_number: String,
    pub currency: String,
    pub amount_due_minor: i64,
    pub amount_paid_minor: i64,
    pub issued_at: i64,
    pub due_at: i64,
    pub paid_at: Option<i64>,
    pub status: InvoiceStatus,
    pub last_reminder_at: Option<i64>,
    pub payment_url: String,
}

impl Invoice {
    /// Derives the lifecycle status from the invoice snapshot and `now`.
    /// Pure function: full or over payment wins over any date logic, and
    /// an invoice due exactly at `now` already counts as overdue.
    pub fn compute_status(&self, now: i64) -> InvoiceStatus {
        if self.paid_at.is_some() || self.amount_paid_minor >= self.amount_due_minor {
            return InvoiceStatus::Recovered;
        }
        if self.due_at <= now {
            return InvoiceStatus::Overdue;
        }
        let due_soon_edge = now + Duration::days(DUE_SOON_WINDOW_DAYS).num_milliseconds();
        if self.due_at <= due_soon_edge {
            return InvoiceStatus::DueSoon;
        }
        InvoiceStatus::Pending
    }

    pub fn outstanding_minor(&self) -> i64 {
        self.amount_due_minor - self.amount_paid_minor
    }

    /// Whole days past the due date, never negative.
    pub fn days_overdue(&self, now: i64) -> i64 {
        let day = Duration::days(1).num_milliseconds();
        std::cmp::max(0, (now - self.due_at) / day)
    }
}

impl Entity for Invoice {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Formats a minor unit amount for email display, e.g. `USD 120.50`.
/// Only used for rendering; money stays in integer minor units.
pub fn format_amount_minor(amount_minor: i64, currency: &str) -> String {
    format!("{} {:.2}", currency, amount_minor as f64 / 100.0)
}
