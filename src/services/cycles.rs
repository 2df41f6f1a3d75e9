use jiff::Zoned;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cycle::{
        CycleError,
        reset::{self, ResetFeedback},
    },
    models::{store::Store, task::Cycle},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum ResetCycleError {
    #[error("Could not compute the next deadline: {0}")]
    Cycle(#[from] CycleError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Rolls over the tasks of `cycle` whose period has ended, persisting the
/// store only when something was reset.
pub fn reset_cycle(
    store: &mut Store,
    storage: &impl Storage,
    cycle: Cycle,
    now: &Zoned,
) -> Result<ResetFeedback, ResetCycleError> {
    let (tasks, feedback) = reset::reset_cycle(cycle, store.tasks.clone(), now)?;

    match &feedback {
        ResetFeedback::Reset { reset, pending } => {
            store.tasks = tasks;
            storage.save(store)?;
            info!(%cycle, reset, pending, "cycle reset");
        }
        ResetFeedback::NotYet { next_boundary } => {
            debug!(%cycle, %next_boundary, "reset not due yet");
        }
        ResetFeedback::NothingToReset => {
            debug!(%cycle, "no tasks to reset");
        }
    }

    Ok(feedback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tasks::{AddTaskParameters, add_task, toggle_complete};
    use crate::services::testing::MemoryStorage;
    use jiff::civil::date;
    use jiff::tz::TimeZone;

    fn at(d: i8, h: i8, min: i8) -> Zoned {
        date(2025, 4, d).at(h, min, 0, 0).to_zoned(TimeZone::UTC).unwrap()
    }

    fn add_daily(store: &mut Store, storage: &MemoryStorage, title: &str, now: &Zoned) -> u64 {
        let parameters = AddTaskParameters {
            title: title.to_string(),
            cycle: Cycle::Daily,
            hour: Some(0),
            day_of_week: None,
            day_of_month: None,
        };
        add_task(store, storage, parameters, now).unwrap().id
    }

    #[test]
    fn test_reset_persists_only_when_tasks_roll_over() {
        let mut store = Store::default();
        let created = at(9, 10, 0);
        let setup = MemoryStorage::default();
        let first = add_daily(&mut store, &setup, "Daily quests", &created);
        let second = add_daily(&mut store, &setup, "Login bonus", &created);
        toggle_complete(&mut store, &setup, first).unwrap();
        toggle_complete(&mut store, &setup, second).unwrap();

        let storage = MemoryStorage::default();
        let feedback = reset_cycle(&mut store, &storage, Cycle::Daily, &at(9, 23, 0)).unwrap();
        assert!(matches!(feedback, ResetFeedback::NotYet { .. }));
        assert!(storage.saved().is_none());
        assert!(store.tasks.iter().all(|t| t.is_completed));

        let feedback = reset_cycle(&mut store, &storage, Cycle::Daily, &at(10, 0, 30)).unwrap();
        assert_eq!(feedback, ResetFeedback::Reset { reset: 2, pending: 0 });
        assert!(store.tasks.iter().all(|t| !t.is_completed));
        assert_eq!(storage.saved().unwrap(), store);
    }

    #[test]
    fn test_reset_empty_cycle() {
        let mut store = Store::default();
        let storage = MemoryStorage::default();
        let feedback = reset_cycle(&mut store, &storage, Cycle::Weekly, &at(9, 10, 0)).unwrap();
        assert_eq!(feedback, ResetFeedback::NothingToReset);
        assert!(storage.saved().is_none());
    }
}
