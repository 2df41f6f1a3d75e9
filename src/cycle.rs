//! Recurring-deadline engine.
//!
//! Everything here is a pure function of a task's schedule and the current
//! time. Instants are produced in the time zone of the `now` they are given;
//! the CLI passes the host's local clock.

use jiff::civil::{Date, Weekday};
use jiff::tz::TimeZone;
use jiff::{ToSpan, Zoned};
use thiserror::Error;

pub mod boundary;
pub mod deadline;
pub mod reset;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Date arithmetic out of range: {0}")]
    OutOfRange(#[from] jiff::Error),
}

/// Days from `from` forward to the next `to`, in `0..=6`.
fn days_until(from: Weekday, to: Weekday) -> i64 {
    i64::from((to.to_sunday_zero_offset() - from.to_sunday_zero_offset() + 7) % 7)
}

/// Day `day` of the month starting at `first`.
///
/// Counted as `first + (day - 1)` days, so a day past the end of the month
/// spills into the next one: day 31 of April is May 1st.
fn day_of_month(first: Date, day: i8) -> Result<Date, CycleError> {
    Ok(first.checked_add(i64::from(day - 1).days())?)
}

fn at_hour(date: Date, hour: i8, tz: &TimeZone) -> Result<Zoned, CycleError> {
    Ok(date.at(hour, 0, 0, 0).to_zoned(tz.clone())?)
}

/// The midnight that ends `date`.
fn end_of_day(date: Date, tz: &TimeZone) -> Result<Zoned, CycleError> {
    at_hour(date.tomorrow()?, 0, tz)
}
