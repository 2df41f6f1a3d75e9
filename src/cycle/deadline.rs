use jiff::{ToSpan, Zoned};

use crate::cycle::{CycleError, at_hour, day_of_month, days_until};
use crate::models::task::{Recurrence, Schedule};

/// Computes the deadline of the next occurrence of `schedule` after `now`.
///
/// The result is always strictly later than `now`: an occurrence falling
/// exactly on `now` counts as already passed. Days are stepped on the civil
/// calendar and resolved in `now`'s time zone, so the wall-clock hour holds
/// across DST changes.
///
/// `schedule.hour` must be in `0..=23`; callers validate it.
pub fn next_deadline(schedule: &Schedule, now: &Zoned) -> Result<Zoned, CycleError> {
    let tz = now.time_zone();
    let today = now.date();

    match schedule.recurrence {
        Recurrence::Daily => {
            let candidate = at_hour(today, schedule.hour, tz)?;
            if candidate.timestamp() > now.timestamp() {
                Ok(candidate)
            } else {
                at_hour(today.tomorrow()?, schedule.hour, tz)
            }
        }
        Recurrence::Weekly(weekday) => {
            let target = today.checked_add(days_until(now.weekday(), weekday).days())?;
            let candidate = at_hour(target, schedule.hour, tz)?;
            if candidate.timestamp() > now.timestamp() {
                Ok(candidate)
            } else {
                at_hour(target.checked_add(7.days())?, schedule.hour, tz)
            }
        }
        Recurrence::Monthly(day) => {
            let first = today.first_of_month();
            let candidate = at_hour(day_of_month(first, day)?, schedule.hour, tz)?;
            if candidate.timestamp() > now.timestamp() {
                Ok(candidate)
            } else {
                let next_first = first.checked_add(1.month())?;
                at_hour(day_of_month(next_first, day)?, schedule.hour, tz)
            }
        }
    }
}
