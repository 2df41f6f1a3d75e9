use jiff::{ToSpan, Zoned};

use crate::cycle::{CycleError, at_hour, day_of_month, days_until, end_of_day};
use crate::models::task::{Recurrence, Schedule};

/// Computes the instant at which a task's current period rolls over.
///
/// The boundary is distinct from the display deadline. Daily periods turn
/// over at the deadline hour itself; weekly and monthly periods turn over at
/// the midnight ending the target day, so a task stays in its period (and can
/// still be checked off late) for the rest of the day it was due.
///
/// With a stored `deadline`, the boundary is the one closing the period that
/// deadline belongs to. Without one (legacy or imported records) it is the
/// most recent turnover at or before `now`.
pub fn reset_boundary(
    schedule: &Schedule,
    deadline: Option<&Zoned>,
    now: &Zoned,
) -> Result<Zoned, CycleError> {
    match deadline {
        Some(deadline) => closing_boundary(schedule, deadline),
        None => latest_turnover(schedule, now),
    }
}

/// Whether a period ending at `boundary` has rolled over by `now`.
pub fn is_reset_due(boundary: &Zoned, now: &Zoned) -> bool {
    now.timestamp() >= boundary.timestamp()
}

fn closing_boundary(schedule: &Schedule, deadline: &Zoned) -> Result<Zoned, CycleError> {
    match schedule.recurrence {
        Recurrence::Daily => Ok(deadline.clone()),
        Recurrence::Weekly(_) | Recurrence::Monthly(_) => {
            end_of_day(deadline.date(), deadline.time_zone())
        }
    }
}

fn latest_turnover(schedule: &Schedule, now: &Zoned) -> Result<Zoned, CycleError> {
    let tz = now.time_zone();
    let today = now.date();

    match schedule.recurrence {
        Recurrence::Daily => {
            let candidate = at_hour(today, schedule.hour, tz)?;
            if candidate.timestamp() <= now.timestamp() {
                Ok(candidate)
            } else {
                at_hour(today.yesterday()?, schedule.hour, tz)
            }
        }
        Recurrence::Weekly(weekday) => {
            let target = today.checked_add(days_until(now.weekday(), weekday).days())?;
            let candidate = end_of_day(target, tz)?;
            if candidate.timestamp() <= now.timestamp() {
                Ok(candidate)
            } else {
                end_of_day(target.checked_sub(7.days())?, tz)
            }
        }
        Recurrence::Monthly(day) => {
            // A day that overflowed a short previous month can still lie
            // ahead of `now`, hence a loop rather than a single step back.
            let mut first = today.first_of_month();
            loop {
                let candidate = end_of_day(day_of_month(first, day)?, tz)?;
                if candidate.timestamp() <= now.timestamp() {
                    return Ok(candidate);
                }
                first = first.checked_sub(1.month())?;
            }
        }
    }
}
