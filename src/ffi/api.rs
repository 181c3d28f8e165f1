//! Exported boundary operations
//!
//! The `extern "C"` surface declared in `loredb_api.h`. Each operation
//! decodes its arguments, delegates to the protocol layer, and renders the
//! outcome into the error channel. Read buffers are filled either with
//! exactly the record count the preceding count call answered, or not at
//! all.

use std::path::PathBuf;

use libc::c_char;

use super::error::report;
use super::strings::read_c_string;
use super::types::{BoundaryRecord, CEntityColumn, CEntityRelationship, CHistoryItem};
use crate::errors::{LoreError, LoreResult};
use crate::protocol;
use crate::timestamp::current_timestamp;

/// # Safety
///
/// `db_path` must be a valid C string. `records` must point to an array of
/// at least `size` records, each of whose string fields is a valid C
/// string.
#[no_mangle]
pub unsafe extern "C" fn write_entity_columns(
    db_path: *const c_char,
    records: *const CEntityColumn,
    size: isize,
) -> *const c_char {
    report(
        "write_entity_columns",
        write_batch(db_path, records, size, protocol::write_entity_columns),
    )
}

/// # Safety
///
/// `db_path` must be a valid C string. `count` must point to writable
/// memory for one `int32_t`.
#[no_mangle]
pub unsafe extern "C" fn get_number_of_entity_columns(
    db_path: *const c_char,
    count: *mut i32,
) -> *const c_char {
    report(
        "get_number_of_entity_columns",
        count_into(db_path, count, protocol::count_entity_columns),
    )
}

/// # Safety
///
/// `db_path` must be a valid C string. `buffer` must point to writable
/// memory for as many records as the preceding count call reported.
#[no_mangle]
pub unsafe extern "C" fn read_entity_columns(
    db_path: *const c_char,
    buffer: *mut CEntityColumn,
) -> *const c_char {
    report(
        "read_entity_columns",
        fill_buffer(db_path, buffer, protocol::read_entity_columns),
    )
}

/// # Safety
///
/// `db_path` must be a valid C string. `records` must point to an array of
/// at least `size` records, each of whose string fields is a valid C
/// string.
#[no_mangle]
pub unsafe extern "C" fn write_history_items(
    db_path: *const c_char,
    records: *const CHistoryItem,
    size: isize,
) -> *const c_char {
    report(
        "write_history_items",
        write_batch(db_path, records, size, protocol::write_history_items),
    )
}

/// # Safety
///
/// `db_path` must be a valid C string. `count` must point to writable
/// memory for one `int32_t`.
#[no_mangle]
pub unsafe extern "C" fn get_number_of_history_items(
    db_path: *const c_char,
    count: *mut i32,
) -> *const c_char {
    report(
        "get_number_of_history_items",
        count_into(db_path, count, protocol::count_history_items),
    )
}

/// # Safety
///
/// `db_path` must be a valid C string. `buffer` must point to writable
/// memory for as many records as the preceding count call reported.
#[no_mangle]
pub unsafe extern "C" fn read_history_items(
    db_path: *const c_char,
    buffer: *mut CHistoryItem,
) -> *const c_char {
    report(
        "read_history_items",
        fill_buffer(db_path, buffer, protocol::read_history_items),
    )
}

/// # Safety
///
/// `db_path` must be a valid C string. `records` must point to an array of
/// at least `size` records, each of whose string fields is a valid C
/// string.
#[no_mangle]
pub unsafe extern "C" fn write_relationships(
    db_path: *const c_char,
    records: *const CEntityRelationship,
    size: isize,
) -> *const c_char {
    report(
        "write_relationships",
        write_batch(db_path, records, size, protocol::write_relationships),
    )
}

/// # Safety
///
/// `db_path` must be a valid C string. `count` must point to writable
/// memory for one `int32_t`.
#[no_mangle]
pub unsafe extern "C" fn get_number_of_relationships(
    db_path: *const c_char,
    count: *mut i32,
) -> *const c_char {
    report(
        "get_number_of_relationships",
        count_into(db_path, count, protocol::count_relationships),
    )
}

/// # Safety
///
/// `db_path` must be a valid C string. `buffer` must point to writable
/// memory for as many records as the preceding count call reported.
#[no_mangle]
pub unsafe extern "C" fn read_relationships(
    db_path: *const c_char,
    buffer: *mut CEntityRelationship,
) -> *const c_char {
    report(
        "read_relationships",
        fill_buffer(db_path, buffer, protocol::read_relationships),
    )
}

/// Returns the current timestamp, strictly increasing within the process.
#[no_mangle]
pub extern "C" fn get_current_timestamp() -> i64 {
    current_timestamp()
}

/// Releases one string previously handed to the caller through a read
/// buffer. Error-channel strings stay owned by the library and must not be
/// passed here.
///
/// # Safety
///
/// `s` must be null or a string obtained from a read buffer that has not
/// been released before.
#[no_mangle]
pub unsafe extern "C" fn free_lore_string(s: *mut c_char) {
    if !s.is_null() {
        drop(std::ffi::CString::from_raw(s));
    }
}

unsafe fn write_batch<C: BoundaryRecord>(
    db_path: *const c_char,
    records: *const C,
    size: isize,
    write: impl FnOnce(&std::path::Path, &[C::Native]) -> LoreResult<()>,
) -> LoreResult<()> {
    let path = PathBuf::from(read_c_string(db_path)?);
    if size < 0 {
        return Err(LoreError::validation(format!(
            "negative batch size: {}",
            size
        )));
    }
    if size > 0 && records.is_null() {
        return Err(LoreError::validation(
            "null records pointer for a non-empty batch",
        ));
    }

    let mut batch = Vec::with_capacity(size as usize);
    for i in 0..size as usize {
        batch.push((*records.add(i)).to_native()?);
    }
    write(&path, &batch)
}

unsafe fn count_into(
    db_path: *const c_char,
    count: *mut i32,
    count_records: impl FnOnce(&std::path::Path) -> LoreResult<i32>,
) -> LoreResult<()> {
    let path = PathBuf::from(read_c_string(db_path)?);
    if count.is_null() {
        return Err(LoreError::validation("null count output pointer"));
    }
    *count = count_records(&path)?;
    Ok(())
}

unsafe fn fill_buffer<C: BoundaryRecord>(
    db_path: *const c_char,
    buffer: *mut C,
    read: impl FnOnce(&std::path::Path) -> LoreResult<Vec<C::Native>>,
) -> LoreResult<()> {
    let path = PathBuf::from(read_c_string(db_path)?);
    let records = read(&path)?;
    if records.is_empty() {
        return Ok(());
    }
    if buffer.is_null() {
        return Err(LoreError::validation(
            "null buffer pointer for a non-empty read",
        ));
    }

    // Convert everything before touching the caller's buffer, so a failed
    // conversion leaves it untouched and leaks nothing.
    let mut converted: Vec<C> = Vec::with_capacity(records.len());
    for record in &records {
        match C::from_native(record) {
            Ok(c) => converted.push(c),
            Err(e) => {
                for c in converted {
                    c.release();
                }
                return Err(e);
            }
        }
    }
    for (i, c) in converted.into_iter().enumerate() {
        buffer.add(i).write(c);
    }
    Ok(())
}
