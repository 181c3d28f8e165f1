//! Count/read snapshot staging
//!
//! One staging cache lives in each path cell. A count operation stages the
//! result set it answered from, keyed by record kind and calling thread (the
//! session of the two-phase pairing); the matching read consumes it. A
//! snapshot is served at most once and only within its lifetime; expiry is
//! reported to the caller as a broken pairing, never served as stale data.

use std::collections::HashMap;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::model::{EntityColumn, EntityRelationship, HistoryItem};

/// Bounded lifetime of a staged snapshot.
const SNAPSHOT_TTL: Duration = Duration::from_secs(30);

/// Returns the session key of the calling thread.
pub(crate) fn current_session() -> ThreadId {
    thread::current().id()
}

/// A result set materialized at count time.
pub(crate) struct Snapshot<T> {
    /// Records in insertion order, exactly as counted.
    pub records: Vec<T>,
    /// Store generation observed when the count was answered.
    pub generation: u64,
    staged_at: Instant,
}

impl<T> Snapshot<T> {
    fn new(records: Vec<T>, generation: u64) -> Self {
        Self {
            records,
            generation,
            staged_at: Instant::now(),
        }
    }

    fn is_expired(&self) -> bool {
        self.staged_at.elapsed() > SNAPSHOT_TTL
    }
}

/// Record kinds that can be staged. Maps each kind to its slot in the cache
/// so a read can only ever receive records of the kind it asked for.
pub(crate) trait Stageable: Sized {
    fn slot(cache: &mut StagingCache) -> &mut HashMap<ThreadId, Snapshot<Self>>;
}

impl Stageable for EntityColumn {
    fn slot(cache: &mut StagingCache) -> &mut HashMap<ThreadId, Snapshot<Self>> {
        &mut cache.columns
    }
}

impl Stageable for HistoryItem {
    fn slot(cache: &mut StagingCache) -> &mut HashMap<ThreadId, Snapshot<Self>> {
        &mut cache.history
    }
}

impl Stageable for EntityRelationship {
    fn slot(cache: &mut StagingCache) -> &mut HashMap<ThreadId, Snapshot<Self>> {
        &mut cache.relationships
    }
}

/// Per-path staging cache, one slot per record kind.
pub(crate) struct StagingCache {
    columns: HashMap<ThreadId, Snapshot<EntityColumn>>,
    history: HashMap<ThreadId, Snapshot<HistoryItem>>,
    relationships: HashMap<ThreadId, Snapshot<EntityRelationship>>,
}

impl StagingCache {
    pub fn new() -> Self {
        Self {
            columns: HashMap::new(),
            history: HashMap::new(),
            relationships: HashMap::new(),
        }
    }

    /// Stages a snapshot for `session`, replacing any previous one of the
    /// same kind. Expired snapshots of other sessions are dropped in
    /// passing, which keeps the cache bounded without a sweeper thread.
    pub fn stage<T: Stageable>(&mut self, session: ThreadId, records: Vec<T>, generation: u64) {
        let slot = T::slot(self);
        slot.retain(|_, snapshot| !snapshot.is_expired());
        slot.insert(session, Snapshot::new(records, generation));
    }

    /// Consumes the snapshot staged for `session`, if any is still live.
    pub fn take<T: Stageable>(&mut self, session: ThreadId) -> Option<Snapshot<T>> {
        let snapshot = T::slot(self).remove(&session)?;
        if snapshot.is_expired() {
            return None;
        }
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_then_take_roundtrips() {
        let mut cache = StagingCache::new();
        let session = current_session();
        cache.stage(session, vec![EntityColumn::new("l", "d", "v")], 3);

        let snapshot = cache.take::<EntityColumn>(session).unwrap();
        assert_eq!(snapshot.generation, 3);
        assert_eq!(snapshot.records.len(), 1);
    }

    #[test]
    fn test_snapshot_is_served_at_most_once() {
        let mut cache = StagingCache::new();
        let session = current_session();
        cache.stage::<HistoryItem>(session, Vec::new(), 0);

        assert!(cache.take::<HistoryItem>(session).is_some());
        assert!(cache.take::<HistoryItem>(session).is_none());
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let mut cache = StagingCache::new();
        let session = current_session();
        cache.stage(session, vec![EntityColumn::new("l", "d", "v")], 1);
        cache.stage(session, vec![EntityRelationship::new("p", "c", "r")], 1);

        assert!(cache.take::<EntityColumn>(session).is_some());
        assert!(cache.take::<EntityRelationship>(session).is_some());
    }

    #[test]
    fn test_sessions_do_not_collide() {
        let mut cache = StagingCache::new();
        let here = current_session();
        let elsewhere = std::thread::spawn(current_session).join().unwrap();

        cache.stage(here, vec![EntityColumn::new("mine", "d", "v")], 1);
        cache.stage(elsewhere, vec![EntityColumn::new("theirs", "d", "v")], 1);

        let snapshot = cache.take::<EntityColumn>(here).unwrap();
        assert_eq!(snapshot.records[0].label, "mine");
    }

    #[test]
    fn test_restaging_replaces_the_previous_snapshot() {
        let mut cache = StagingCache::new();
        let session = current_session();
        cache.stage(session, vec![EntityColumn::new("old", "d", "v")], 1);
        cache.stage(session, vec![EntityColumn::new("new", "d", "v")], 2);

        let snapshot = cache.take::<EntityColumn>(session).unwrap();
        assert_eq!(snapshot.generation, 2);
        assert_eq!(snapshot.records[0].label, "new");
    }

    #[test]
    fn test_expired_snapshot_is_not_served() {
        let mut cache = StagingCache::new();
        let session = current_session();
        cache.stage::<EntityColumn>(session, Vec::new(), 1);

        // Age the snapshot past its lifetime by hand.
        if let Some(snapshot) = EntityColumn::slot(&mut cache).get_mut(&session) {
            snapshot.staged_at = Instant::now() - SNAPSHOT_TTL - Duration::from_secs(1);
        }

        assert!(cache.take::<EntityColumn>(session).is_none());
    }
}
