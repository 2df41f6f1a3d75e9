use jiff::Zoned;

use crate::cycle::CycleError;
use crate::cycle::boundary::{is_reset_due, reset_boundary};
use crate::cycle::deadline::next_deadline;
use crate::models::task::{Cycle, Task};

/// What a reset request did, for the caller to report.
#[derive(Debug, Clone, PartialEq)]
pub enum ResetFeedback {
    /// The cycle has no tasks at all.
    NothingToReset,
    /// No task of the cycle has reached its boundary; the earliest one is given.
    NotYet { next_boundary: Zoned },
    /// `reset` tasks rolled over, `pending` are still inside their period.
    Reset { reset: usize, pending: usize },
}

/// Rolls over every task of `cycle` whose period has ended by `now`.
///
/// Rolled-over tasks are unchecked and, when they track a deadline hour, get
/// the deadline of their next occurrence after `now`. Tasks without a
/// deadline hour have no boundary and are always rolled over. Tasks of other
/// cycles, and tasks still inside their period, are returned untouched and in
/// their original order.
pub fn reset_cycle(
    cycle: Cycle,
    tasks: Vec<Task>,
    now: &Zoned,
) -> Result<(Vec<Task>, ResetFeedback), CycleError> {
    let mut matched = 0;
    let mut reset = 0;
    let mut next_boundary: Option<Zoned> = None;
    let mut updated = Vec::with_capacity(tasks.len());

    for mut task in tasks {
        if task.cycle != cycle {
            updated.push(task);
            continue;
        }
        matched += 1;

        match task.schedule() {
            None => {
                task.is_completed = false;
                reset += 1;
            }
            Some(schedule) => {
                let deadline = task
                    .deadline
                    .map(|ts| ts.to_zoned(now.time_zone().clone()));
                let boundary = reset_boundary(&schedule, deadline.as_ref(), now)?;

                if is_reset_due(&boundary, now) {
                    task.is_completed = false;
                    task.deadline = Some(next_deadline(&schedule, now)?.timestamp());
                    reset += 1;
                } else if next_boundary
                    .as_ref()
                    .is_none_or(|earliest| boundary.timestamp() < earliest.timestamp())
                {
                    next_boundary = Some(boundary);
                }
            }
        }
        updated.push(task);
    }

    let feedback = if matched == 0 {
        ResetFeedback::NothingToReset
    } else if reset == 0
        && let Some(next_boundary) = next_boundary
    {
        ResetFeedback::NotYet { next_boundary }
    } else {
        ResetFeedback::Reset {
            reset,
            pending: matched - reset,
        }
    };

    Ok((updated, feedback))
}
