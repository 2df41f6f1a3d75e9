use std::{fmt, str::FromStr};

use jiff::Timestamp;
use jiff::civil::Weekday;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Repetition class of a task.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Cycle {
    /// Records written before cycles existed carry no `cycle` field and were daily lists.
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Cycle {
    pub const ALL: [Cycle; 3] = [Cycle::Daily, Cycle::Weekly, Cycle::Monthly];

    pub fn as_str(self) -> &'static str {
        match self {
            Cycle::Daily => "daily",
            Cycle::Weekly => "weekly",
            Cycle::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("Unknown cycle '{0}' (expected daily, weekly or monthly)")]
pub struct UnknownCycle(String);

impl FromStr for Cycle {
    type Err = UnknownCycle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(Cycle::Daily),
            "weekly" | "week" | "w" => Ok(Cycle::Weekly),
            "monthly" | "month" | "m" => Ok(Cycle::Monthly),
            _ => Err(UnknownCycle(s.to_string())),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Creation time in Unix milliseconds, unique within a store
    pub id: u64,
    /// Title of the task
    pub title: String,
    /// Whether the task is checked off for the current period
    #[serde(default)]
    pub is_completed: bool,
    /// Repetition cycle, fixed at creation
    #[serde(default)]
    pub cycle: Cycle,
    /// Hour of the day (0-23) the task is due, `null` when no time is tracked
    #[serde(default)]
    pub deadline_hour: Option<i8>,
    /// Day of the week for weekly tasks, 0 = Sunday
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_day_of_week: Option<i8>,
    /// Day of the month (1-31) for monthly tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_day_of_month: Option<i8>,
    /// The upcoming instant this task is due
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Timestamp>,
}

/// Where in its cycle a task falls due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    Daily,
    Weekly(Weekday),
    /// Day of the month, 1-31. Days past the end of a short month spill into
    /// the following month.
    Monthly(i8),
}

/// Typed view of a task's deadline parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub recurrence: Recurrence,
    /// Hour of the day, 0-23.
    pub hour: i8,
}

impl Task {
    /// Returns the task's schedule, or `None` when it tracks no time of day.
    ///
    /// Records missing the day parameter their cycle needs, or carrying
    /// out-of-range values (imports are not validated field by field), are
    /// treated as untracked as well.
    pub fn schedule(&self) -> Option<Schedule> {
        let hour = self.deadline_hour.filter(|h| (0..=23).contains(h))?;
        let recurrence = match self.cycle {
            Cycle::Daily => Recurrence::Daily,
            Cycle::Weekly => {
                let day = self.deadline_day_of_week?;
                Recurrence::Weekly(Weekday::from_sunday_zero_offset(day).ok()?)
            }
            Cycle::Monthly => {
                Recurrence::Monthly(self.deadline_day_of_month.filter(|d| (1..=31).contains(d))?)
            }
        };
        Some(Schedule { recurrence, hour })
    }

    /// A task is overdue once its deadline has passed while it is still unchecked.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        !self.is_completed && self.deadline.is_some_and(|deadline| deadline < now)
    }
}
