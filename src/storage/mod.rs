//! Persistence engine for lore stores
//!
//! A store is a directory identified by its path, created lazily by the
//! first non-empty write. Each record kind lives in its own append-oriented
//! record file; a JSON manifest carries the format version and the store
//! generation, which advances by one per committed batch.
//!
//! # Design Principles
//!
//! - Batches commit atomically: serialize everything, stage to a temp file,
//!   fsync, rename over the live file. A failed write leaves the previously
//!   visible state intact.
//! - Checksum-verified on every read; undecodable bytes abort the read.
//! - Append-oriented: no in-place updates, no per-record deletes.
//! - Insertion order is the read order.

mod checksum;
mod manifest;
mod record;
mod store;

pub use checksum::compute_checksum;
pub use manifest::Manifest;
pub use store::Store;

pub(crate) use record::RecordEncoding;
