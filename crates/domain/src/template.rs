use crate::cadence::ReminderStage;
use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// The closed set of placeholders a reminder template may reference.
pub const ALLOWED_VARIABLES: [&str; 9] = [
    "clientName",
    "invoiceNumber",
    "amountDue",
    "currency",
    "dueDate",
    "daysOverdue",
    "paymentLink",
    "businessName",
    "signatureName",
];

/// Voice of the reminder emails for a workspace, controls the subject
/// prefix at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tone {
    Friendly,
    Firm,
    Direct,
}

impl Tone {
    pub fn subject_prefix(self) -> &'static str {
        match self {
            Tone::Friendly => "[Friendly Reminder]",
            Tone::Firm => "[Reminder]",
            Tone::Direct => "[Action Required]",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Friendly => "FRIENDLY",
            Tone::Firm => "FIRM",
            Tone::Direct => "DIRECT",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tone {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FRIENDLY" => Ok(Tone::Friendly),
            "FIRM" => Ok(Tone::Firm),
            "DIRECT" => Ok(Tone::Direct),
            _ => Err(()),
        }
    }
}

/// Subject and body templates for one reminder stage of a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderTemplate {
    pub id: ID,
    pub workspace_id: ID,
    pub stage: ReminderStage,
    pub subject_template: String,
    pub body_template: String,
}

impl ReminderTemplate {
    /// Built in fallback used when the workspace has not customized the
    /// given stage.
    pub fn default_for(workspace_id: &ID, stage: ReminderStage) -> Self {
        let (subject_template, body_template) = match stage {
            ReminderStage::PreDue => (
                "Friendly reminder: invoice {{invoiceNumber}} is due on {{dueDate}}",
                "Hi {{clientName}},\n\nJust a quick reminder that invoice {{invoiceNumber}} for {{amountDue}} ({{currency}}) is due on {{dueDate}}.\n\nYou can pay securely here: {{paymentLink}}\n\nThank you,\n{{signatureName}}\n{{businessName}}",
            ),
            ReminderStage::Overdue1 => (
                "Invoice {{invoiceNumber}} is now overdue",
                "Hi {{clientName}},\n\nInvoice {{invoiceNumber}} is now {{daysOverdue}} day(s) overdue. The outstanding amount is {{amountDue}}.\n\nPayment link: {{paymentLink}}\n\nThanks for taking care of this,\n{{signatureName}}\n{{businessName}}",
            ),
            ReminderStage::Overdue2 => (
                "Second reminder: invoice {{invoiceNumber}} remains unpaid",
                "Hi {{clientName}},\n\nFollowing up again on invoice {{invoiceNumber}}. It is currently {{daysOverdue}} day(s) overdue, with {{amountDue}} still outstanding.\n\nPay here: {{paymentLink}}\n\nPlease reply if you need anything clarified.\n{{signatureName}}\n{{businessName}}",
            ),
            ReminderStage::Final => (
                "Final reminder for invoice {{invoiceNumber}}",
                "Hi {{clientName}},\n\nThis is a final non-legal reminder that invoice {{invoiceNumber}} remains unpaid ({{daysOverdue}} day(s) overdue, {{amountDue}} outstanding).\n\nPlease complete payment here: {{paymentLink}}\n\nIf payment has already been processed, please ignore this message.\n{{signatureName}}\n{{businessName}}",
            ),
        };

        Self {
            id: Default::default(),
            workspace_id: workspace_id.clone(),
            stage,
            subject_template: subject_template.into(),
            body_template: body_template.into(),
        }
    }
}

impl Entity for ReminderTemplate {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Values substituted into a template. A fixed struct so a template can
/// never reference data outside this set.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub client_name: String,
    pub invoice_number: String,
    pub amount_due: String,
    pub currency: String,
    pub due_date: String,
    pub days_overdue: String,
    pub payment_link: String,
    pub business_name: String,
    pub signature_name: String,
}

impl TemplateContext {
    fn get(&self, variable: &str) -> Option<&str> {
        match variable {
            "clientName" => Some(&self.client_name),
            "invoiceNumber" => Some(&self.invoice_number),
            "amountDue" => Some(&self.amount_due),
            "currency" => Some(&self.currency),
            "dueDate" => Some(&self.due_date),
            "daysOverdue" => Some(&self.days_overdue),
            "paymentLink" => Some(&self.payment_link),
            "businessName" => Some(&self.business_name),
            "signatureName" => Some(&self.signature_name),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Template references unknown variables: {}", names.join(", "))]
pub struct UnknownVariableError {
    pub names: Vec<String>,
}

/// Substitutes `{{identifier}}` placeholders with context values.
/// Identifiers outside `ALLOWED_VARIABLES` fail the whole render, with
/// every offending name collected. Literal text, including brace pairs
/// that do not wrap an identifier, passes through untouched. There is no
/// recursive expansion.
pub fn render(template: &str, ctx: &TemplateContext) -> Result<String, UnknownVariableError> {
    let mut out = String::with_capacity(template.len());
    let mut unknown: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after = &rest[open + 2..];

        let placeholder = after.find("}}").and_then(|close| {
            let name = &after[..close];
            let is_identifier = !name.is_empty()
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if is_identifier {
                Some((name, close))
            } else {
                None
            }
        });

        match placeholder {
            Some((name, close)) => {
                match ctx.get(name) {
                    Some(value) => out.push_str(value),
                    None => unknown.push(name.to_string()),
                }
                rest = &after[close + 2..];
            }
            None => {
                // Advance a single brace so an overlapping placeholder
                // like `{{{currency}}}` is still found.
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }
    out.push_str(rest);

    if unknown.is_empty() {
        Ok(out)
    } else {
        Err(UnknownVariableError { names: unknown })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> TemplateContext {
        TemplateContext {
            client_name: "Taylor".into(),
            invoice_number: "INV-12".into(),
            amount_due: "USD 1200.00".into(),
            currency: "USD".into(),
            due_date: "2026-03-10".into(),
            days_overdue: "4".into(),
            payment_link: "https://example.com/r/abc".into(),
            business_name: "Studio".into(),
            signature_name: "Taylor".into(),
        }
    }

    #[test]
    fn it_substitutes_allowed_placeholders() {
        let rendered = render("Hi {{clientName}}, pay {{amountDue}} now", &ctx()).unwrap();
        assert_eq!(rendered, "Hi Taylor, pay USD 1200.00 now");
    }

    #[test]
    fn it_rejects_unknown_placeholders_with_names() {
        let err = render("{{unknown}} and {{alsoBad}} but {{currency}}", &ctx()).unwrap_err();
        assert_eq!(err.names, vec!["unknown".to_string(), "alsoBad".to_string()]);
    }

    #[test]
    fn it_leaves_non_placeholder_braces_alone() {
        let rendered = render("{{not a var}} {{}} {{{currency}}}", &ctx()).unwrap();
        assert_eq!(rendered, "{{not a var}} {{}} {USD}");
    }

    #[test]
    fn it_renders_every_default_template() {
        let workspace_id = ID::new();
        for stage in ReminderStage::ORDERED {
            let template = ReminderTemplate::default_for(&workspace_id, stage);
            assert!(render(&template.subject_template, &ctx()).is_ok());
            let body = render(&template.body_template, &ctx()).unwrap();
            assert!(body.contains("Taylor"));
            assert!(body.contains("https://example.com/r/abc"));
        }
    }

    #[test]
    fn tone_prefixes() {
        assert_eq!(Tone::Friendly.subject_prefix(), "[Friendly Reminder]");
        assert_eq!(Tone::Firm.subject_prefix(), "[Reminder]");
        assert_eq!(Tone::Direct.subject_prefix(), "[Action Required]");
    }
}
