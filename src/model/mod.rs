//! Record kinds exchanged across the boundary
//!
//! Three append-oriented record kinds live in a store, each scoped to the
//! store's path. None of them has an update-by-key operation; every write is
//! a batch insert and every read returns the full collection in insertion
//! order.
//!
//! Text fields travel across the boundary as NUL-terminated byte sequences,
//! so an embedded NUL byte can never be represented faithfully. Validation
//! rejects it up front instead of truncating silently.

mod entity;
mod history;
mod relationship;

pub use entity::EntityColumn;
pub use history::HistoryItem;
pub use relationship::EntityRelationship;

use crate::errors::{LoreError, LoreResult};

/// The three record kinds a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Entity attribute slots
    EntityColumn,
    /// Timestamped history events
    HistoryItem,
    /// Directed, role-labeled edges between entities
    Relationship,
}

impl RecordKind {
    /// Returns the kind name used in log fields and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::EntityColumn => "entity_column",
            RecordKind::HistoryItem => "history_item",
            RecordKind::Relationship => "relationship",
        }
    }

    /// Returns the record file name for this kind inside a store directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            RecordKind::EntityColumn => "columns.dat",
            RecordKind::HistoryItem => "history.dat",
            RecordKind::Relationship => "relationships.dat",
        }
    }
}

/// Rejects text that cannot cross the boundary as a C string.
///
/// `field` names the offending field in the error message.
pub(crate) fn reject_embedded_nul(field: &str, value: &str) -> LoreResult<()> {
    if value.as_bytes().contains(&0) {
        return Err(LoreError::validation(format!(
            "field '{}' contains an embedded NUL byte",
            field
        )));
    }
    Ok(())
}
