use serde_json::{Value, json};
use tracing::info;

use crate::storage::StorageError;

type MigrationFn = fn(Value) -> Result<Value, StorageError>;

fn get_migrations() -> Vec<MigrationFn> {
    vec![migrate_v1_to_v2]
}

/// Version 1 is the browser layout: the bare task array stored under the
/// `tasks` key. Objects without a version field are read as v2, the first
/// envelope layout.
pub fn detect_version(value: &Value) -> Result<u32, StorageError> {
    match value {
        Value::Array(_) => Ok(1),
        Value::Object(obj) => match obj.get("version") {
            Some(v) => v
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| StorageError::MalformedLayout(format!("invalid version {v}"))),
            None => Ok(2),
        },
        other => Err(StorageError::MalformedLayout(format!(
            "expected an object or an array, found {}",
            kind(other)
        ))),
    }
}

/// Migrations are applied sequentially: v1→v2→v3→...→target
pub fn apply_migrations(
    mut data: Value,
    from_version: u32,
    to_version: u32,
) -> Result<Value, StorageError> {
    if from_version == to_version {
        return Ok(data);
    }

    if from_version > to_version {
        return Err(StorageError::FutureVersion(from_version));
    }

    let migrations = get_migrations();

    for version in from_version..to_version {
        let migration_idx = (version - 1) as usize; // v1→v2 is at index 0

        let Some(migration) = migrations.get(migration_idx) else {
            return Err(StorageError::UnsupportedVersion(version));
        };

        info!(from = version, to = version + 1, "migrating store");
        data = migration(data)?;
    }

    Ok(data)
}

/// Wraps the bare task array into the versioned envelope.
fn migrate_v1_to_v2(value: Value) -> Result<Value, StorageError> {
    match value {
        Value::Array(tasks) => Ok(json!({ "version": 2, "tasks": tasks })),
        other => Err(StorageError::MalformedLayout(format!(
            "version 1 store must be an array, found {}",
            kind(&other)
        ))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
