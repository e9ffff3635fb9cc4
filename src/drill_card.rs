//! Display state of one drill: who is on it and for how long.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::clock::SharedClock;
use crate::domain::{Drill, Timestamp, User, UserId};
use crate::drill_actor::DrillError;
use crate::start_cache::StartTimeCache;
use crate::timer::LiveTimer;
use crate::timing::format_cost;

/// Users that a start request will actually carry.
#[derive(Debug, Clone, PartialEq)]
pub struct StartPlan {
    pub user_ids: Vec<UserId>,
    /// Distinct selected users dropped because they already run this drill.
    pub skipped: usize,
}

/// One active user and their elapsed time, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    pub user: User,
    pub elapsed: String,
}

pub struct DrillCard {
    drill: Drill,
    cache: StartTimeCache,
    timers: HashMap<UserId, LiveTimer>,
    clock: SharedClock,
}

impl DrillCard {
    /// An empty card. Call [`DrillCard::sync`] to start timers.
    pub fn new(drill: Drill, clock: SharedClock) -> Self {
        Self {
            drill,
            cache: StartTimeCache::new(),
            timers: HashMap::new(),
            clock,
        }
    }

    pub fn drill(&self) -> &Drill {
        &self.drill
    }

    /// Adopts the latest drill snapshot.
    ///
    /// Timers of users who left the active set are frozen at the stop the
    /// server reported for them and handed back. A stop older than the
    /// timer's start belongs to an earlier streak and is ignored; without a
    /// usable stop the current instant is pinned. New users get a timer from
    /// their cached start.
    pub fn sync(
        &mut self,
        drill: Drill,
        reported_starts: &HashMap<UserId, Timestamp>,
        reported_stops: &HashMap<UserId, Timestamp>,
    ) -> Vec<(UserId, LiveTimer)> {
        if drill.id != self.drill.id {
            warn!(card = self.drill.id, received = drill.id, "Ignoring snapshot of another drill");
            return Vec::new();
        }

        let now = self.clock.now_millis();
        let active = drill.active_user_ids();
        self.cache.reconcile(drill.id, &active, reported_starts, now);

        let departed: Vec<UserId> = self
            .timers
            .keys()
            .filter(|id| !active.contains(id))
            .copied()
            .collect();
        let mut finished = Vec::with_capacity(departed.len());
        for user_id in departed {
            if let Some(mut timer) = self.timers.remove(&user_id) {
                let stopped_at = match reported_stops.get(&user_id) {
                    Some(&t) if t >= timer.started_at() => t,
                    _ => {
                        debug!(drill_id = drill.id, user_id, "No reported stop, pinning current instant");
                        now
                    }
                };
                timer.freeze(stopped_at);
                finished.push((user_id, timer));
            }
        }

        for &user_id in &active {
            if self.timers.contains_key(&user_id) {
                continue;
            }
            let started_at = self.cache.start_of(drill.id, user_id).unwrap_or(now);
            debug!(drill_id = drill.id, user_id, started_at, "Starting timer");
            self.timers
                .insert(user_id, LiveTimer::start(started_at, None, self.clock.clone()));
        }

        self.drill = drill;
        finished
    }

    /// Filters `selected` down to users not yet on this drill.
    pub fn plan_start(&self, selected: &[UserId]) -> Result<StartPlan, DrillError> {
        if selected.is_empty() {
            return Err(DrillError::NoUsersSelected);
        }

        let mut seen: HashSet<UserId> = HashSet::with_capacity(selected.len());
        let mut user_ids: Vec<UserId> = Vec::with_capacity(selected.len());
        let mut skipped = 0;
        for &id in selected {
            if !seen.insert(id) {
                continue;
            }
            if self.drill.is_user_active(id) {
                skipped += 1;
            } else {
                user_ids.push(id);
            }
        }
        if user_ids.is_empty() {
            return Err(DrillError::AllUsersAlreadyActive);
        }

        Ok(StartPlan { user_ids, skipped })
    }

    pub fn stop_targets(&self) -> Vec<UserId> {
        self.drill.active_user_ids()
    }

    /// Active users in the order the server lists them.
    pub fn rows(&self) -> Vec<CardRow> {
        self.drill
            .users
            .iter()
            .filter_map(|user| {
                self.timers.get(&user.id).map(|timer| CardRow {
                    user: user.clone(),
                    elapsed: timer.formatted(),
                })
            })
            .collect()
    }

    pub fn elapsed_of(&self, user_id: UserId) -> Option<i64> {
        self.timers.get(&user_id).map(LiveTimer::seconds)
    }

    pub fn active_count(&self) -> usize {
        self.drill.users.len()
    }

    pub fn price_label(&self) -> String {
        format!("{}/хв", format_cost(self.drill.price_per_minute))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;

    const T: Timestamp = 1_764_835_200_000;

    fn user(id: UserId, first: &str) -> User {
        User {
            id,
            email: None,
            first_name: first.to_string(),
            last_name: "Test".to_string(),
            created_at: 0,
        }
    }

    fn drill(users: Vec<User>) -> Drill {
        Drill {
            id: 7,
            title: "Spiral".to_string(),
            price_per_minute: 2.5,
            created_at: 0,
            users,
        }
    }

    #[test]
    fn plan_start_filters_active_users() {
        let clock = ManualClock::new(T);
        let card = DrillCard::new(drill(vec![user(1, "Ivan")]), Arc::new(clock));

        assert!(matches!(card.plan_start(&[]), Err(DrillError::NoUsersSelected)));
        assert!(matches!(
            card.plan_start(&[1]),
            Err(DrillError::AllUsersAlreadyActive)
        ));

        let plan = card.plan_start(&[1, 2, 3]).unwrap();
        assert_eq!(plan.user_ids, vec![2, 3]);
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn repeated_selection_is_not_counted_as_skipped() {
        let clock = ManualClock::new(T);
        let card = DrillCard::new(drill(vec![user(1, "Ivan")]), Arc::new(clock));

        let plan = card.plan_start(&[2, 2]).unwrap();
        assert_eq!(plan.user_ids, vec![2]);
        assert_eq!(plan.skipped, 0);

        let plan = card.plan_start(&[1, 1, 2]).unwrap();
        assert_eq!(plan.user_ids, vec![2]);
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn labels_and_targets() {
        let clock = ManualClock::new(T);
        let card = DrillCard::new(drill(vec![user(1, "Ivan"), user(2, "Olena")]), Arc::new(clock));
        assert_eq!(card.price_label(), "2.50 грн/хв");
        assert_eq!(card.stop_targets(), vec![1, 2]);
        assert_eq!(card.active_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn timers_keep_first_start_across_jittery_refreshes() {
        let clock = ManualClock::new(T);
        let mut card = DrillCard::new(drill(Vec::new()), Arc::new(clock.clone()));

        let starts = HashMap::from([(1, T - 10_000)]);
        assert!(card.sync(drill(vec![user(1, "Ivan")]), &starts, &HashMap::new()).is_empty());
        assert_eq!(card.elapsed_of(1), Some(10));

        // the server now reports a later start for the same streak
        let jitter = HashMap::from([(1, T + 5_000)]);
        card.sync(drill(vec![user(1, "Ivan")]), &jitter, &HashMap::new());

        clock.advance_secs(20);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(card.elapsed_of(1), Some(30));
        assert_eq!(
            card.rows(),
            vec![CardRow {
                user: user(1, "Ivan"),
                elapsed: "00:00:30".to_string()
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn departed_users_come_back_frozen() {
        let clock = ManualClock::new(T);
        let mut card = DrillCard::new(drill(Vec::new()), Arc::new(clock.clone()));
        card.sync(drill(vec![user(1, "Ivan"), user(2, "Olena")]), &HashMap::new(), &HashMap::new());

        clock.advance_secs(42);
        let finished = card.sync(drill(vec![user(2, "Olena")]), &HashMap::new(), &HashMap::new());
        assert_eq!(finished.len(), 1);
        let (user_id, timer) = &finished[0];
        assert_eq!(*user_id, 1);
        assert!(!timer.is_running());
        assert_eq!(timer.formatted(), "00:00:42");

        assert_eq!(card.elapsed_of(1), None);
        assert_eq!(card.rows().len(), 1);

        // re-entry starts a fresh streak
        card.sync(drill(vec![user(1, "Ivan"), user(2, "Olena")]), &HashMap::new(), &HashMap::new());
        assert_eq!(card.elapsed_of(1), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn late_sync_freezes_at_the_reported_stop() {
        let clock = ManualClock::new(T);
        let mut card = DrillCard::new(drill(Vec::new()), Arc::new(clock.clone()));
        card.sync(drill(vec![user(1, "Ivan")]), &HashMap::from([(1, T)]), &HashMap::new());

        // stopped at +65 s, but the next refresh only arrives at +600 s
        clock.advance_secs(600);
        let stops = HashMap::from([(1, T + 65_000)]);
        let finished = card.sync(drill(Vec::new()), &HashMap::new(), &stops);

        assert_eq!(finished.len(), 1);
        assert_eq!(finished[0].1.formatted(), "00:01:05");
    }

    #[tokio::test(start_paused = true)]
    async fn stop_from_an_earlier_streak_is_ignored() {
        let clock = ManualClock::new(T);
        let mut card = DrillCard::new(drill(Vec::new()), Arc::new(clock.clone()));
        card.sync(drill(vec![user(1, "Ivan")]), &HashMap::from([(1, T)]), &HashMap::new());

        clock.advance_secs(90);
        let stale = HashMap::from([(1, T - 5_000)]);
        let finished = card.sync(drill(Vec::new()), &HashMap::new(), &stale);
        assert_eq!(finished[0].1.formatted(), "00:01:30");
    }

    #[test]
    fn snapshot_of_another_drill_is_ignored() {
        let clock = ManualClock::new(T);
        let mut card = DrillCard::new(drill(Vec::new()), Arc::new(clock));
        let mut other = drill(vec![user(1, "Ivan")]);
        other.id = 8;
        assert!(card.sync(other, &HashMap::new(), &HashMap::new()).is_empty());
        assert_eq!(card.drill().id, 7);
        assert_eq!(card.active_count(), 0);
    }
}
