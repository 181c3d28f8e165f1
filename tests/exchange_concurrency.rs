//! Concurrency contract tests
//!
//! - concurrent writers to one path lose nothing: 50 + 50 records end as
//!   exactly 100, all recoverable with uncorrupted fields
//! - a read whose count went stale under a concurrent write fails loudly
//!   instead of overrunning the caller's buffer
//! - lock waits are bounded; contention surfaces as an error, not a hang

use loredb::errors::LoreError;
use loredb::model::{EntityColumn, HistoryItem};
use loredb::protocol::{
    count_entity_columns, count_history_items, read_entity_columns, read_history_items,
    write_entity_columns, write_history_items,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::thread;
use tempfile::TempDir;

fn fresh_store(dir: &TempDir) -> PathBuf {
    dir.path().join("store")
}

#[test]
fn test_two_concurrent_writers_of_fifty_yield_one_hundred() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);

    let mut handles = Vec::new();
    for writer in 0..2 {
        let path = path.clone();
        handles.push(thread::spawn(move || {
            let batch: Vec<_> = (0..50)
                .map(|i| {
                    EntityColumn::new(
                        format!("writer{}-record{}", writer, i),
                        format!("descriptor{}", i),
                        format!("value-{}-{}", writer, i),
                    )
                })
                .collect();
            write_entity_columns(&path, &batch).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(count_entity_columns(&path).unwrap(), 100);
    let records = read_entity_columns(&path).unwrap();
    assert_eq!(records.len(), 100);

    // Every record is present exactly once, with fields intact.
    let labels: HashSet<_> = records.iter().map(|r| r.label.clone()).collect();
    assert_eq!(labels.len(), 100);
    for writer in 0..2 {
        for i in 0..50 {
            let label = format!("writer{}-record{}", writer, i);
            let record = records.iter().find(|r| r.label == label).unwrap();
            assert_eq!(record.descriptor, format!("descriptor{}", i));
            assert_eq!(record.description, format!("value-{}-{}", writer, i));
        }
    }
}

#[test]
fn test_concurrent_batch_writers_keep_batches_whole() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);

    let mut handles = Vec::new();
    for writer in 0..4 {
        let path = path.clone();
        handles.push(thread::spawn(move || {
            for batch_index in 0..5 {
                let batch: Vec<_> = (0..10)
                    .map(|i| {
                        HistoryItem::new(
                            (writer * 1000 + batch_index * 10 + i) as i64,
                            2021,
                            batch_index as i32,
                            format!("w{}b{}i{}", writer, batch_index, i),
                            "",
                        )
                    })
                    .collect();
                write_history_items(&path, &batch).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(count_history_items(&path).unwrap(), 200);
    let items = read_history_items(&path).unwrap();
    assert_eq!(items.len(), 200);

    // Batches commit atomically, so the ten records of each batch sit
    // consecutively in insertion order.
    for chunk in items.chunks(10) {
        let prefix: Vec<_> = chunk[0].content.split('i').collect();
        for (i, item) in chunk.iter().enumerate() {
            assert_eq!(item.content, format!("{}i{}", prefix[0], i));
        }
    }
}

#[test]
fn test_stale_count_fails_the_read_loudly() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    write_entity_columns(&path, &[EntityColumn::new("l", "d", "v")]).unwrap();

    // Phase one of the pairing.
    assert_eq!(count_entity_columns(&path).unwrap(), 1);

    // A concurrent writer lands between count and read.
    {
        let path = path.clone();
        thread::spawn(move || {
            write_entity_columns(&path, &[EntityColumn::new("late", "d", "v")]).unwrap();
        })
        .join()
        .unwrap();
    }

    let err = read_entity_columns(&path).unwrap_err();
    assert!(matches!(err, LoreError::Concurrency(_)));

    // The pairing can simply be repeated.
    assert_eq!(count_entity_columns(&path).unwrap(), 2);
    assert_eq!(read_entity_columns(&path).unwrap().len(), 2);
}

#[test]
fn test_pairings_on_different_threads_do_not_disturb_each_other() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);
    write_entity_columns(&path, &[EntityColumn::new("l", "d", "v")]).unwrap();

    assert_eq!(count_entity_columns(&path).unwrap(), 1);

    // Another thread runs a complete pairing of its own.
    {
        let path = path.clone();
        thread::spawn(move || {
            assert_eq!(count_entity_columns(&path).unwrap(), 1);
            assert_eq!(read_entity_columns(&path).unwrap().len(), 1);
        })
        .join()
        .unwrap();
    }

    // This thread's snapshot is still live.
    assert_eq!(read_entity_columns(&path).unwrap().len(), 1);
}

#[test]
fn test_failure_leaves_store_and_process_usable() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);

    assert!(write_entity_columns(&path, &[EntityColumn::new("bad\0", "d", "v")]).is_err());

    // The same path keeps working after a failed operation.
    write_entity_columns(&path, &[EntityColumn::new("good", "d", "v")]).unwrap();
    assert_eq!(count_entity_columns(&path).unwrap(), 1);
    assert_eq!(read_entity_columns(&path).unwrap()[0].label, "good");
}

#[test]
fn test_many_writers_complete_without_hanging() {
    let dir = TempDir::new().unwrap();
    let path = fresh_store(&dir);

    let mut handles = Vec::new();
    for writer in 0..8 {
        let path = path.clone();
        handles.push(thread::spawn(move || {
            for i in 0..3 {
                write_entity_columns(
                    &path,
                    &[EntityColumn::new(format!("w{}i{}", writer, i), "d", "v")],
                )
                .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(count_entity_columns(&path).unwrap(), 24);
}
