use crate::cadence::Cadence;
use crate::send_window::{SendWindow, TimeOfDay};
use crate::shared::entity::{Entity, ID};
use crate::template::Tone;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Reminder automation policy for a workspace. A workspace without
/// settings never has reminders scheduled or dispatched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationSettings {
    pub cadence: Cadence,
    pub send_window_start: TimeOfDay,
    pub send_window_end: TimeOfDay,
    pub weekdays_only: bool,
    pub tone: Tone,
    pub signature_name: String,
    pub reply_to_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: ID,
    pub name: String,
    pub timezone: Tz,
    pub settings: Option<AutomationSettings>,
}

impl Workspace {
    /// The send window combines the workspace timezone with its
    /// automation settings.
    pub fn send_window(&self, settings: &AutomationSettings) -> SendWindow {
        SendWindow {
            timezone: self.timezone,
            start: settings.send_window_start,
            end: settings.send_window_end,
            weekdays_only: settings.weekdays_only,
        }
    }
}

impl Entity for Workspace {
    fn id(&self) -> &ID {
        &self.id
    }
}
