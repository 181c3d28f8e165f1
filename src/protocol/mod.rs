//! The exchange protocol
//!
//! The boundary has no dynamically sized collection type, so retrieval is a
//! two-phase pairing: a count operation reports how many records exist, the
//! caller sizes a buffer, and the matching read fills it. The two calls
//! share no transaction handle, which makes the pairing racy by
//! construction; this module closes the race.
//!
//! At count time the full result set is materialized into a staging cache
//! keyed by record kind and calling thread, together with the store
//! generation observed. The matching read consumes that snapshot verbatim,
//! after checking that the generation has not advanced. A read whose count
//! went stale (an intervening write), whose snapshot expired, or that was
//! never preceded by a count reports a concurrency error and leaves the
//! caller's buffer untouched. The protocol never writes more records than
//! the count it answered.
//!
//! Writers to one path serialize on a per-path lock held in a process-wide
//! registry. Every lock acquisition is deadline-bounded; contention beyond
//! the deadline surfaces as an error instead of a hang.

mod exchange;
mod registry;
mod staging;

pub use exchange::{
    count_entity_columns, count_history_items, count_relationships, read_entity_columns,
    read_history_items, read_relationships, write_entity_columns, write_history_items,
    write_relationships,
};
