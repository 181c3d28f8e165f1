//! C ABI boundary
//!
//! The surface a host process loads: fixed-layout record structs, the
//! empty-string error channel, and the exported operations declared in
//! `loredb_api.h`. Everything here is a codec around the protocol layer;
//! no locking or store logic lives on this side.
//!
//! Ownership at the boundary:
//! - Input strings and record arrays stay owned by the caller; the library
//!   copies what it needs during the call.
//! - Text fields written into a read buffer are owned by the caller and
//!   must be returned one by one through `free_lore_string`.
//! - Error-channel strings are owned by the library (a thread-local slot,
//!   valid until the next boundary call on the same thread) and must NOT
//!   be passed to `free_lore_string`.

mod api;
mod error;
mod strings;
mod types;

pub use api::*;
pub use types::{CEntityColumn, CEntityRelationship, CHistoryItem};
