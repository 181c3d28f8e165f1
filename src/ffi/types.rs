//! Fixed-layout record structs
//!
//! Field order and widths of these structs are the external contract and
//! mirror `loredb_api.h` exactly: text as NUL-terminated byte sequences,
//! integers as fixed-width little-endian scalars of the running platform.
//! Neither side's native object model crosses the boundary.

use libc::c_char;

use super::strings::{alloc_c_string, read_c_string, release_c_string};
use crate::errors::LoreResult;
use crate::model::{EntityColumn, EntityRelationship, HistoryItem};

/// An entity attribute slot as it crosses the boundary.
#[repr(C)]
#[derive(Clone)]
pub struct CEntityColumn {
    pub label: *const c_char,
    pub descriptor: *const c_char,
    pub description: *const c_char,
}

/// A history event as it crosses the boundary.
#[repr(C)]
#[derive(Clone)]
pub struct CHistoryItem {
    pub timestamp: i64,
    pub year: i32,
    pub day: i32,
    pub content: *const c_char,
    pub properties: *const c_char,
}

/// A relationship edge as it crosses the boundary.
#[repr(C)]
#[derive(Clone)]
pub struct CEntityRelationship {
    pub parent: *const c_char,
    pub child: *const c_char,
    pub role: *const c_char,
}

/// Codec between a boundary struct and its host-native record.
pub(super) trait BoundaryRecord: Sized {
    type Native;

    /// Builds the boundary struct, allocating caller-owned strings.
    fn from_native(record: &Self::Native) -> LoreResult<Self>;

    /// Copies the boundary struct into a host-native record.
    ///
    /// # Safety
    ///
    /// Every string field must be null or point to a NUL-terminated byte
    /// sequence.
    unsafe fn to_native(&self) -> LoreResult<Self::Native>;

    /// Releases the strings `from_native` allocated.
    ///
    /// # Safety
    ///
    /// Must only be called on a struct built by `from_native` whose fields
    /// have not been handed to the caller or released before.
    unsafe fn release(self);
}

impl BoundaryRecord for CEntityColumn {
    type Native = EntityColumn;

    fn from_native(record: &EntityColumn) -> LoreResult<Self> {
        let label = alloc_c_string(&record.label)?;
        let descriptor = match alloc_c_string(&record.descriptor) {
            Ok(ptr) => ptr,
            Err(e) => {
                unsafe { release_c_string(label) };
                return Err(e);
            }
        };
        let description = match alloc_c_string(&record.description) {
            Ok(ptr) => ptr,
            Err(e) => {
                unsafe {
                    release_c_string(label);
                    release_c_string(descriptor);
                }
                return Err(e);
            }
        };
        Ok(Self {
            label,
            descriptor,
            description,
        })
    }

    unsafe fn to_native(&self) -> LoreResult<EntityColumn> {
        Ok(EntityColumn {
            label: read_c_string(self.label)?,
            descriptor: read_c_string(self.descriptor)?,
            description: read_c_string(self.description)?,
        })
    }

    unsafe fn release(self) {
        release_c_string(self.label);
        release_c_string(self.descriptor);
        release_c_string(self.description);
    }
}

impl BoundaryRecord for CHistoryItem {
    type Native = HistoryItem;

    fn from_native(record: &HistoryItem) -> LoreResult<Self> {
        let content = alloc_c_string(&record.content)?;
        let properties = match alloc_c_string(&record.properties) {
            Ok(ptr) => ptr,
            Err(e) => {
                unsafe { release_c_string(content) };
                return Err(e);
            }
        };
        Ok(Self {
            timestamp: record.timestamp,
            year: record.year,
            day: record.day,
            content,
            properties,
        })
    }

    unsafe fn to_native(&self) -> LoreResult<HistoryItem> {
        Ok(HistoryItem {
            timestamp: self.timestamp,
            year: self.year,
            day: self.day,
            content: read_c_string(self.content)?,
            properties: read_c_string(self.properties)?,
        })
    }

    unsafe fn release(self) {
        release_c_string(self.content);
        release_c_string(self.properties);
    }
}

impl BoundaryRecord for CEntityRelationship {
    type Native = EntityRelationship;

    fn from_native(record: &EntityRelationship) -> LoreResult<Self> {
        let parent = alloc_c_string(&record.parent)?;
        let child = match alloc_c_string(&record.child) {
            Ok(ptr) => ptr,
            Err(e) => {
                unsafe { release_c_string(parent) };
                return Err(e);
            }
        };
        let role = match alloc_c_string(&record.role) {
            Ok(ptr) => ptr,
            Err(e) => {
                unsafe {
                    release_c_string(parent);
                    release_c_string(child);
                }
                return Err(e);
            }
        };
        Ok(Self {
            parent,
            child,
            role,
        })
    }

    unsafe fn to_native(&self) -> LoreResult<EntityRelationship> {
        Ok(EntityRelationship {
            parent: read_c_string(self.parent)?,
            child: read_c_string(self.child)?,
            role: read_c_string(self.role)?,
        })
    }

    unsafe fn release(self) {
        release_c_string(self.parent);
        release_c_string(self.child);
        release_c_string(self.role);
    }
}
