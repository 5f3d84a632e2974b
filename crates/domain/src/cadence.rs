use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four reminder points in an invoice's lifecycle. The declaration
/// order is load bearing: `next_stage` always walks stages in this order
/// when looking for the next unsent stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderStage {
    PreDue,
    Overdue1,
    Overdue2,
    Final,
}

impl ReminderStage {
    pub const ORDERED: [ReminderStage; 4] = [
        ReminderStage::PreDue,
        ReminderStage::Overdue1,
        ReminderStage::Overdue2,
        ReminderStage::Final,
    ];

    fn index(self) -> usize {
        match self {
            ReminderStage::PreDue => 0,
            ReminderStage::Overdue1 => 1,
            ReminderStage::Overdue2 => 2,
            ReminderStage::Final => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderStage::PreDue => "PRE_DUE",
            ReminderStage::Overdue1 => "OVERDUE_1",
            ReminderStage::Overdue2 => "OVERDUE_2",
            ReminderStage::Final => "FINAL",
        }
    }
}

impl std::fmt::Display for ReminderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReminderStage {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PRE_DUE" => Ok(ReminderStage::PreDue),
            "OVERDUE_1" => Ok(ReminderStage::Overdue1),
            "OVERDUE_2" => Ok(ReminderStage::Overdue2),
            "FINAL" => Ok(ReminderStage::Final),
            _ => Err(()),
        }
    }
}

/// Per workspace day offsets defining when each stage becomes due,
/// measured relative to the invoice due date. `pre_due_days` subtracts,
/// the other three add. Offsets do not have to be strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cadence {
    pub pre_due_days: i64,
    pub overdue1_days: i64,
    pub overdue2_days: i64,
    pub final_days: i64,
}

/// Stage target timestamps indexed by `ReminderStage`. The stage set is
/// closed, so this is a fixed array rather than a map.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSchedule([i64; 4]);

impl StageSchedule {
    pub fn get(&self, stage: ReminderStage) -> i64 {
        self.0[stage.index()]
    }
}

pub fn stage_schedule(due_at: i64, cadence: &Cadence) -> StageSchedule {
    let day = Duration::days(1).num_milliseconds();
    StageSchedule([
        due_at - cadence.pre_due_days * day,
        due_at + cadence.overdue1_days * day,
        due_at + cadence.overdue2_days * day,
        due_at + cadence.final_days * day,
    ])
}

/// Picks the next reminder stage for an invoice: the first stage in the
/// fixed order that has not been recorded yet and whose target timestamp
/// has passed, together with that timestamp. Stages in `sent_stages` are
/// never proposed again, which is what makes scheduling exactly once per
/// stage.
pub fn next_stage(
    due_at: i64,
    cadence: &Cadence,
    sent_stages: &[ReminderStage],
    now: i64,
) -> Option<(ReminderStage, i64)> {
    let schedule = stage_schedule(due_at, cadence);

    ReminderStage::ORDERED
        .iter()
        .copied()
        .filter(|stage| !sent_stages.contains(stage))
        .find_map(|stage| {
            let target = schedule.get(stage);
            if target <= now {
                Some((stage, target))
            } else {
                None
            }
        })
}
