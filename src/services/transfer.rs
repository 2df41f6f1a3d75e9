use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::{
    models::{store::Store, task::Task},
    storage::{Storage, StorageError},
};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Nothing to export: there are no tasks")]
    NothingToExport,

    #[error("Import file is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Import file must contain a JSON array of tasks")]
    NotAnArray,

    #[error("Task record #{index} could not be read: {source}")]
    InvalidTask {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Task id {0} appears more than once")]
    DuplicateId(u64),

    #[error("Failed to serialize tasks to JSON: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Serializes every task, verbatim, as a pretty-printed JSON array.
pub fn export_all(store: &Store) -> Result<String, TransferError> {
    if store.tasks.is_empty() {
        return Err(TransferError::NothingToExport);
    }
    serde_json::to_string_pretty(&store.tasks).map_err(TransferError::Serialize)
}

/// Replaces every task with the contents of `json`, which must be an array.
///
/// Absent optional fields are tolerated. Any failure leaves the store as it
/// was.
pub fn import_all(
    store: &mut Store,
    storage: &impl Storage,
    json: &str,
) -> Result<usize, TransferError> {
    let value: Value = serde_json::from_str(json).map_err(TransferError::Parse)?;
    let Value::Array(records) = value else {
        return Err(TransferError::NotAnArray);
    };

    let tasks = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_value::<Task>(record)
                .map_err(|source| TransferError::InvalidTask { index: index + 1, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Lookups by id must find exactly one task
    let mut seen = HashSet::with_capacity(tasks.len());
    if let Some(task) = tasks.iter().find(|t| !seen.insert(t.id)) {
        return Err(TransferError::DuplicateId(task.id));
    }

    let imported = Store {
        tasks,
        ..store.clone()
    };
    storage.save(&imported)?;
    *store = imported;

    info!(tasks = store.tasks.len(), "tasks imported");
    Ok(store.tasks.len())
}

pub fn export_to_file(store: &Store, path: &Path) -> Result<usize, TransferError> {
    let json = export_all(store)?;
    std::fs::write(path, json).map_err(|source| TransferError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(store.tasks.len())
}

pub fn import_from_file(
    store: &mut Store,
    storage: &impl Storage,
    path: &Path,
) -> Result<usize, TransferError> {
    let json = std::fs::read_to_string(path).map_err(|source| TransferError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    import_all(store, storage, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::Cycle;
    use crate::services::tasks::{resolve_task, toggle_complete};
    use crate::services::testing::MemoryStorage;

    fn sample_store() -> Store {
        Store {
            tasks: vec![
                Task {
                    id: 1712640000000,
                    title: String::from("Daily quests"),
                    is_completed: true,
                    cycle: Cycle::Daily,
                    deadline_hour: Some(5),
                    deadline_day_of_week: None,
                    deadline_day_of_month: None,
                    deadline: Some("2025-04-10T05:00:00Z".parse().unwrap()),
                },
                Task {
                    id: 1712640000001,
                    title: String::from("Laundry"),
                    is_completed: false,
                    cycle: Cycle::Weekly,
                    deadline_hour: None,
                    deadline_day_of_week: Some(6),
                    deadline_day_of_month: None,
                    deadline: None,
                },
                Task {
                    id: 1712640000002,
                    title: String::from("Pay rent"),
                    is_completed: false,
                    cycle: Cycle::Monthly,
                    deadline_hour: Some(9),
                    deadline_day_of_week: None,
                    deadline_day_of_month: Some(31),
                    deadline: Some("2025-05-01T09:00:00.250Z".parse().unwrap()),
                },
            ],
            ..Store::default()
        }
    }

    #[test]
    fn test_export_then_import_round_trips() {
        let original = sample_store();
        let json = export_all(&original).unwrap();

        let mut store = Store::default();
        let storage = MemoryStorage::default();
        let count = import_all(&mut store, &storage, &json).unwrap();

        assert_eq!(count, 3);
        assert_eq!(store.tasks, original.tasks);
        assert_eq!(storage.saved().unwrap().tasks, original.tasks);
    }

    #[test]
    fn test_export_empty_store_is_rejected() {
        assert!(matches!(
            export_all(&Store::default()),
            Err(TransferError::NothingToExport)
        ));
    }

    #[test]
    fn test_export_uses_browser_field_names() {
        let json = export_all(&sample_store()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["isCompleted"], Value::Bool(true));
        assert_eq!(value[0]["deadlineHour"], Value::from(5));
        assert_eq!(value[1]["deadlineHour"], Value::Null);
        assert_eq!(value[2]["deadlineDayOfMonth"], Value::from(31));
        assert_eq!(value[2]["cycle"], Value::from("monthly"));
    }

    #[test]
    fn test_import_rejects_non_array_and_keeps_tasks() {
        let mut store = sample_store();
        let storage = MemoryStorage::default();

        let result = import_all(&mut store, &storage, r#"{"tasks": []}"#);
        assert!(matches!(result, Err(TransferError::NotAnArray)));

        let result = import_all(&mut store, &storage, "[{ not json");
        assert!(matches!(result, Err(TransferError::Parse(_))));

        assert_eq!(store, sample_store());
        assert!(storage.saved().is_none());
    }

    #[test]
    fn test_import_is_all_or_nothing() {
        let mut store = sample_store();
        let storage = MemoryStorage::default();
        let json = r#"[
            {"id": 1, "title": "Fine"},
            {"id": 2, "isCompleted": true}
        ]"#;

        let result = import_all(&mut store, &storage, json);
        assert!(matches!(result, Err(TransferError::InvalidTask { index: 2, .. })));
        assert_eq!(store, sample_store());
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let mut store = sample_store();
        let storage = MemoryStorage::default();
        let json = r#"[{"id": 1, "title": "A"}, {"id": 1, "title": "B"}]"#;

        let result = import_all(&mut store, &storage, json);
        assert!(matches!(result, Err(TransferError::DuplicateId(1))));
        assert_eq!(store, sample_store());
        assert!(storage.saved().is_none());
    }

    #[test]
    fn test_done_by_number_after_import_checks_that_task() {
        let mut store = Store::default();
        let storage = MemoryStorage::default();
        let json = r#"[{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]"#;
        import_all(&mut store, &storage, json).unwrap();

        let id = resolve_task(&store, "2").unwrap();
        let toggled = toggle_complete(&mut store, &storage, id).unwrap();

        assert_eq!(toggled.title, "B");
        assert!(!store.tasks[0].is_completed);
        assert!(store.tasks[1].is_completed);
    }

    #[test]
    fn test_import_tolerates_absent_optional_fields() {
        let mut store = Store::default();
        let storage = MemoryStorage::default();
        let json = r#"[{"id": 1, "title": "Stretch", "isCompleted": true}]"#;

        import_all(&mut store, &storage, json).unwrap();
        assert_eq!(store.tasks[0].cycle, Cycle::Daily);
        assert_eq!(store.tasks[0].deadline_hour, None);
        assert!(store.tasks[0].is_completed);
    }

    #[test]
    fn test_export_and_import_files() {
        let dir = std::env::temp_dir().join(format!("cadence-transfer-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("tasks.json");

        assert_eq!(export_to_file(&sample_store(), &path).unwrap(), 3);

        let mut store = Store::default();
        let storage = MemoryStorage::default();
        assert_eq!(import_from_file(&mut store, &storage, &path).unwrap(), 3);
        assert_eq!(store.tasks, sample_store().tasks);

        let missing = dir.join("missing.json");
        assert!(matches!(
            import_from_file(&mut store, &storage, &missing),
            Err(TransferError::Read { .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
