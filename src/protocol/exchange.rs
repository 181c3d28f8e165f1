//! Boundary operations in host-native form
//!
//! The nine operations the boundary exposes, over owned Rust types. The FFI
//! layer is a thin codec around these; everything protocol-shaped (locking,
//! staging, staleness) happens here so it is testable without a C caller.

use std::path::Path;

use super::registry;
use super::staging::{current_session, Stageable};
use crate::errors::{LoreError, LoreResult};
use crate::model::{EntityColumn, EntityRelationship, HistoryItem};
use crate::observability::Logger;
use crate::storage::{RecordEncoding, Store};

/// Appends a batch of entity columns to the store at `path`. All or nothing.
pub fn write_entity_columns(path: &Path, records: &[EntityColumn]) -> LoreResult<()> {
    write_batch(path, records, |store, records| {
        store.append_entity_columns(records)
    })
}

/// Appends a batch of history items to the store at `path`. All or nothing.
pub fn write_history_items(path: &Path, records: &[HistoryItem]) -> LoreResult<()> {
    write_batch(path, records, |store, records| {
        store.append_history_items(records)
    })
}

/// Appends a batch of relationships to the store at `path`. All or nothing.
pub fn write_relationships(path: &Path, records: &[EntityRelationship]) -> LoreResult<()> {
    write_batch(path, records, |store, records| {
        store.append_relationships(records)
    })
}

/// Counts entity columns and stages the snapshot the matching read serves.
pub fn count_entity_columns(path: &Path) -> LoreResult<i32> {
    count_records(path, Store::read_entity_columns)
}

/// Counts history items and stages the snapshot the matching read serves.
pub fn count_history_items(path: &Path) -> LoreResult<i32> {
    count_records(path, Store::read_history_items)
}

/// Counts relationships and stages the snapshot the matching read serves.
pub fn count_relationships(path: &Path) -> LoreResult<i32> {
    count_records(path, Store::read_relationships)
}

/// Serves the entity columns staged by the preceding count.
pub fn read_entity_columns(path: &Path) -> LoreResult<Vec<EntityColumn>> {
    read_staged(path)
}

/// Serves the history items staged by the preceding count.
pub fn read_history_items(path: &Path) -> LoreResult<Vec<HistoryItem>> {
    read_staged(path)
}

/// Serves the relationships staged by the preceding count.
pub fn read_relationships(path: &Path) -> LoreResult<Vec<EntityRelationship>> {
    read_staged(path)
}

fn write_batch<T: RecordEncoding>(
    path: &Path,
    records: &[T],
    append: impl FnOnce(&Store, &[T]) -> LoreResult<()>,
) -> LoreResult<()> {
    let cell = registry::cell_for(path)?;
    let _guard = cell.lock_write()?;

    append(&Store::open(path), records)?;

    Logger::info(
        "store_write",
        &[
            ("kind", T::kind().as_str()),
            ("path", &path.display().to_string()),
            ("records", &records.len().to_string()),
        ],
    );
    Ok(())
}

fn count_records<T: RecordEncoding + Stageable>(
    path: &Path,
    read: impl FnOnce(&Store) -> LoreResult<Vec<T>>,
) -> LoreResult<i32> {
    let cell = registry::cell_for(path)?;
    let _guard = cell.lock_write()?;

    let store = Store::open(path);
    let records = read(&store)?;
    let generation = store.generation()?;

    let count = i32::try_from(records.len()).map_err(|_| {
        LoreError::validation(format!(
            "{} {} records exceed the int32 count slot",
            records.len(),
            T::kind().as_str()
        ))
    })?;

    cell.lock_staging()?
        .stage(current_session(), records, generation);
    Ok(count)
}

fn read_staged<T: RecordEncoding + Stageable>(path: &Path) -> LoreResult<Vec<T>> {
    let cell = registry::cell_for(path)?;

    let snapshot = cell
        .lock_staging()?
        .take::<T>(current_session())
        .ok_or_else(|| {
            LoreError::concurrency(format!(
                "no live {} count precedes this read; issue the count operation first",
                T::kind().as_str()
            ))
        })?;

    // The caller sized its buffer from the staged count. If the store moved
    // on since, that size can no longer be trusted.
    let _guard = cell.lock_write()?;
    let current = Store::open(path).generation()?;
    if current != snapshot.generation {
        Logger::warn(
            "stale_read",
            &[
                ("kind", T::kind().as_str()),
                ("path", &path.display().to_string()),
                ("counted_generation", &snapshot.generation.to_string()),
                ("current_generation", &current.to_string()),
            ],
        );
        return Err(LoreError::concurrency(format!(
            "{} count went stale: store generation moved from {} to {} between count and read",
            T::kind().as_str(),
            snapshot.generation,
            current
        )));
    }

    Ok(snapshot.records)
}
