use std::collections::HashSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::models::task::{Cycle, Task};

/// Current schema version
pub const CURRENT_VERSION: u32 = 2;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Store {
    pub version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            tasks: vec![],
        }
    }
}

impl Store {
    pub fn get_task_mut(&mut self, id: u64) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn get_tasks_in_cycle(&self, cycle: Cycle) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.cycle == cycle)
    }

    /// Id for a task created at `now`: its Unix milliseconds, bumped past the
    /// largest existing id when several tasks share a millisecond.
    ///
    /// When an imported id already sits at `u64::MAX`, the first free id at or
    /// after `now` (wrapping to zero) is used instead.
    pub fn next_id(&self, now: Timestamp) -> u64 {
        let millis = u64::try_from(now.as_millisecond()).unwrap_or(0);
        match self.tasks.iter().map(|t| t.id).max() {
            Some(max) if max >= millis => max
                .checked_add(1)
                .unwrap_or_else(|| self.first_free_id(millis)),
            _ => millis,
        }
    }

    fn first_free_id(&self, from: u64) -> u64 {
        let taken: HashSet<u64> = self.tasks.iter().map(|t| t.id).collect();
        (from..=u64::MAX)
            .chain(0..from)
            .find(|id| !taken.contains(id))
            .unwrap_or(from)
    }

    /// `(completed, total)` over all tasks, or over one cycle.
    pub fn completion(&self, cycle: Option<Cycle>) -> (usize, usize) {
        self.tasks
            .iter()
            .filter(|t| cycle.is_none_or(|c| t.cycle == c))
            .fold((0, 0), |(completed, total), t| {
                (completed + usize::from(t.is_completed), total + 1)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: u64, cycle: Cycle, is_completed: bool) -> Task {
        Task {
            id,
            title: format!("Task {id}"),
            is_completed,
            cycle,
            deadline_hour: None,
            deadline_day_of_week: None,
            deadline_day_of_month: None,
            deadline: None,
        }
    }

    #[test]
    fn test_next_id_uses_creation_millis() {
        let store = Store::default();
        let now = Timestamp::from_millisecond(1_712_640_000_123).unwrap();
        assert_eq!(store.next_id(now), 1_712_640_000_123);
    }

    #[test]
    fn test_next_id_is_unique_within_same_millisecond() {
        let now = Timestamp::from_millisecond(1_712_640_000_123).unwrap();
        let store = Store {
            version: CURRENT_VERSION,
            tasks: vec![task(1_712_640_000_123, Cycle::Daily, false)],
        };
        assert_eq!(store.next_id(now), 1_712_640_000_124);
    }

    #[test]
    fn test_next_id_after_max_id_picks_a_free_id() {
        let now = Timestamp::from_millisecond(1_712_640_000_123).unwrap();
        let mut store = Store {
            version: CURRENT_VERSION,
            tasks: vec![task(u64::MAX, Cycle::Daily, false)],
        };
        assert_eq!(store.next_id(now), 1_712_640_000_123);

        store.tasks.push(task(1_712_640_000_123, Cycle::Daily, false));
        assert_eq!(store.next_id(now), 1_712_640_000_124);
    }

    #[test]
    fn test_completion_counts() {
        let store = Store {
            version: CURRENT_VERSION,
            tasks: vec![
                task(1, Cycle::Daily, true),
                task(2, Cycle::Daily, false),
                task(3, Cycle::Weekly, true),
            ],
        };
        assert_eq!(store.completion(None), (2, 3));
        assert_eq!(store.completion(Some(Cycle::Daily)), (1, 2));
        assert_eq!(store.completion(Some(Cycle::Monthly)), (0, 0));
        assert_eq!(store.get_tasks_in_cycle(Cycle::Weekly).count(), 1);
    }
}
