use jiff::Zoned;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cycle::{CycleError, deadline::next_deadline},
    models::{
        store::Store,
        task::{Cycle, Task},
    },
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum AddTaskError {
    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Weekly tasks need a day of the week")]
    MissingDayOfWeek,

    #[error("Monthly tasks need a day of the month")]
    MissingDayOfMonth,

    #[error("A {0} task cannot take a {1}")]
    ConflictingSchedule(Cycle, &'static str),

    #[error("Could not compute the first deadline: {0}")]
    Deadline(#[from] CycleError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

pub struct AddTaskParameters {
    pub title: String,
    pub cycle: Cycle,
    pub hour: Option<i8>,
    pub day_of_week: Option<i8>,
    pub day_of_month: Option<i8>,
}

pub fn add_task(
    store: &mut Store,
    storage: &impl Storage,
    parameters: AddTaskParameters,
    now: &Zoned,
) -> Result<Task, AddTaskError> {
    // 1. Validate title and the day parameter belonging to the cycle
    let title = parameters.title.trim();
    if title.is_empty() {
        return Err(AddTaskError::EmptyTitle);
    }

    match parameters.cycle {
        Cycle::Daily => {}
        Cycle::Weekly if parameters.day_of_week.is_none() => {
            return Err(AddTaskError::MissingDayOfWeek);
        }
        Cycle::Monthly if parameters.day_of_month.is_none() => {
            return Err(AddTaskError::MissingDayOfMonth);
        }
        Cycle::Weekly | Cycle::Monthly => {}
    }
    if parameters.cycle != Cycle::Weekly && parameters.day_of_week.is_some() {
        return Err(AddTaskError::ConflictingSchedule(
            parameters.cycle,
            "day of the week",
        ));
    }
    if parameters.cycle != Cycle::Monthly && parameters.day_of_month.is_some() {
        return Err(AddTaskError::ConflictingSchedule(
            parameters.cycle,
            "day of the month",
        ));
    }

    // 2. Create the task and its first deadline
    let mut task = Task {
        id: store.next_id(now.timestamp()),
        title: title.to_string(),
        is_completed: false,
        cycle: parameters.cycle,
        deadline_hour: parameters.hour,
        deadline_day_of_week: parameters.day_of_week,
        deadline_day_of_month: parameters.day_of_month,
        deadline: None,
    };
    if let Some(schedule) = task.schedule() {
        task.deadline = Some(next_deadline(&schedule, now)?.timestamp());
    }

    // 3. Add to store and persist
    store.tasks.push(task.clone());
    storage.save(store)?;

    info!(id = task.id, cycle = %task.cycle, "task added");
    Ok(task)
}

#[derive(Debug, Error)]
pub enum TaskLookupError {
    #[error("Task '{0}' not found")]
    TaskNotFound(String),

    #[error("Task name is ambiguous. Multiple tasks found: {}", .0.join(", "))]
    AmbiguousTaskName(Vec<String>),
}

/// Resolves a list number (1-based position in the store) or a title
/// fragment to a task id.
pub fn resolve_task(store: &Store, number_or_fuzzy_name: &str) -> Result<u64, TaskLookupError> {
    if let Ok(number) = number_or_fuzzy_name.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|index| store.tasks.get(index))
            .map(|task| task.id)
            .ok_or_else(|| TaskLookupError::TaskNotFound(number_or_fuzzy_name.to_string()));
    }

    let needle = number_or_fuzzy_name.to_lowercase();
    let matching_tasks: Vec<_> = store
        .tasks
        .iter()
        .filter(|t| t.title.to_lowercase().contains(&needle))
        .collect();

    match matching_tasks.len() {
        0 => Err(TaskLookupError::TaskNotFound(
            number_or_fuzzy_name.to_string(),
        )),
        1 => Ok(matching_tasks[0].id),
        _ => {
            let titles: Vec<String> = matching_tasks.iter().map(|t| t.title.clone()).collect();
            Err(TaskLookupError::AmbiguousTaskName(titles))
        }
    }
}

#[derive(Debug, Error)]
pub enum ToggleTaskError {
    #[error("Task {0} not found")]
    TaskNotFound(u64),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Flips the completion state of a task.
pub fn toggle_complete(
    store: &mut Store,
    storage: &impl Storage,
    id: u64,
) -> Result<Task, ToggleTaskError> {
    let task = store
        .get_task_mut(id)
        .ok_or(ToggleTaskError::TaskNotFound(id))?;
    task.is_completed = !task.is_completed;
    let toggled = task.clone();

    storage.save(store)?;

    debug!(id, completed = toggled.is_completed, "task toggled");
    Ok(toggled)
}

#[derive(Debug, Error)]
pub enum DeleteTaskError {
    #[error("Task {0} not found")]
    TaskNotFound(u64),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Removes a task for good, returning it.
pub fn delete_task(
    store: &mut Store,
    storage: &impl Storage,
    id: u64,
) -> Result<Task, DeleteTaskError> {
    let index = store
        .tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or(DeleteTaskError::TaskNotFound(id))?;
    let removed = store.tasks.remove(index);

    storage.save(store)?;

    info!(id, "task deleted");
    Ok(removed)
}
