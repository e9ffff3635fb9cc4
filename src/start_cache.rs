//! First-observed start instants for the users running a drill.
//!
//! Server refreshes can report a slightly different `startedAt` for the same
//! running session, or briefly omit it. The cache pins the first value seen so
//! a running timer keeps its start point for the whole active streak.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::domain::{DrillId, Timestamp, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub drill_id: DrillId,
    pub user_id: UserId,
}

impl SessionKey {
    pub fn new(drill_id: DrillId, user_id: UserId) -> Self {
        Self { drill_id, user_id }
    }
}

#[derive(Debug, Default)]
pub struct StartTimeCache {
    entries: HashMap<SessionKey, Timestamp>,
}

impl StartTimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brings the cache in line with the latest active set of `drill_id`.
    ///
    /// New users get the reported start, or `now` when the server sent none.
    /// Existing entries are never overwritten. Users that left the active set
    /// lose their entry.
    pub fn reconcile(
        &mut self,
        drill_id: DrillId,
        active_user_ids: &[UserId],
        reported_starts: &HashMap<UserId, Timestamp>,
        now: Timestamp,
    ) {
        let active: HashSet<UserId> = active_user_ids.iter().copied().collect();

        for &user_id in active_user_ids {
            let key = SessionKey::new(drill_id, user_id);
            if self.entries.contains_key(&key) {
                continue;
            }
            let started_at = match reported_starts.get(&user_id) {
                Some(&t) => t,
                None => {
                    debug!(drill_id, user_id, "No reported start, pinning current instant");
                    now
                }
            };
            self.entries.insert(key, started_at);
        }

        self.entries
            .retain(|key, _| key.drill_id != drill_id || active.contains(&key.user_id));
    }

    pub fn start_of(&self, drill_id: DrillId, user_id: UserId) -> Option<Timestamp> {
        self.entries.get(&SessionKey::new(drill_id, user_id)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
