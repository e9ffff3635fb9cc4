use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{DrillId, SessionFilter, Timestamp, UserDrillSession, UserId};
use crate::session_actor::SessionError;

/// Client for the session history store. Read-only.
#[derive(Clone)]
pub struct SessionClient {
    inner: ResourceClient<UserDrillSession>,
}

impl SessionClient {
    pub fn new(inner: ResourceClient<UserDrillSession>) -> Self {
        Self { inner }
    }

    /// Switches the listed slice and reloads in the foreground.
    #[instrument(skip(self))]
    pub async fn apply_filter(
        &self,
        filter: SessionFilter,
    ) -> Result<Vec<UserDrillSession>, SessionError> {
        debug!("Sending request");
        Ok(self.inner.load(Some(filter)).await?)
    }

    /// Reported starts of running sessions, keyed by drill then user.
    pub async fn active_starts(
        &self,
    ) -> Result<HashMap<DrillId, HashMap<UserId, Timestamp>>, SessionError> {
        let snapshot = self.snapshot().await?;
        Ok(active_starts_by_drill(&snapshot.items))
    }

    /// Latest reported stop of each user's completed sessions, keyed by drill
    /// then user. Empty unless the listed slice includes completed sessions.
    pub async fn recent_stops(
        &self,
    ) -> Result<HashMap<DrillId, HashMap<UserId, Timestamp>>, SessionError> {
        let snapshot = self.snapshot().await?;
        Ok(recent_stops_by_drill(&snapshot.items))
    }
}

impl_client_methods!(SessionClient, UserDrillSession, SessionError, sessions);

/// Groups the start instants of running sessions by drill.
pub fn active_starts_by_drill(
    sessions: &[UserDrillSession],
) -> HashMap<DrillId, HashMap<UserId, Timestamp>> {
    let mut starts: HashMap<DrillId, HashMap<UserId, Timestamp>> = HashMap::new();
    for session in sessions.iter().filter(|s| s.is_active()) {
        starts
            .entry(session.drill_id)
            .or_default()
            .insert(session.user_id, session.started_at);
    }
    starts
}

/// Groups the latest stop instant per user by drill.
pub fn recent_stops_by_drill(
    sessions: &[UserDrillSession],
) -> HashMap<DrillId, HashMap<UserId, Timestamp>> {
    let mut stops: HashMap<DrillId, HashMap<UserId, Timestamp>> = HashMap::new();
    for session in sessions {
        let Some(stopped_at) = session.stopped_at else {
            continue;
        };
        let latest = stops
            .entry(session.drill_id)
            .or_default()
            .entry(session.user_id)
            .or_insert(stopped_at);
        *latest = (*latest).max(stopped_at);
    }
    stops
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::mock_framework::{create_mock_client, expect_load, FakeDrillApi};

    const T0: i64 = 1_764_835_200_000;

    #[tokio::test]
    async fn apply_filter_sends_the_new_query() {
        let (inner, mut rx) = create_mock_client::<UserDrillSession>(4);
        let client = SessionClient::new(inner);

        let task = tokio::spawn(async move { client.apply_filter(SessionFilter::Completed).await });

        let (query, responder) = expect_load(&mut rx).await.expect("Expected Load");
        assert_eq!(query, Some(SessionFilter::Completed));
        responder.send(Ok(Vec::new())).unwrap();
        assert!(task.await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn active_starts_only_cover_running_sessions() {
        let api = Arc::new(FakeDrillApi::new(T0));
        let spiral = api.seed_drill("Spiral", 2.5);
        let ladder = api.seed_drill("Ladder", 1.0);
        let ivan = api.seed_user("Ivan", "Petrov");
        let olena = api.seed_user("Olena", "Koval");

        api.start(spiral, &[ivan]).unwrap();
        api.advance_secs(30);
        api.start(ladder, &[olena]).unwrap();
        api.advance_secs(30);
        api.stop(spiral, &[ivan]).unwrap();

        let (actor, inner) = ResourceActor::<UserDrillSession>::new(8, api.clone());
        tokio::spawn(actor.run());
        let client = SessionClient::new(inner);
        assert_eq!(client.load_sessions().await.unwrap().len(), 2);

        let starts = client.active_starts().await.unwrap();
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[&ladder][&olena], T0 + 30_000);
        assert!(!starts.contains_key(&spiral));
    }

    #[tokio::test]
    async fn recent_stops_keep_the_latest_streak() {
        let api = Arc::new(FakeDrillApi::new(T0));
        let spiral = api.seed_drill("Spiral", 2.5);
        let ivan = api.seed_user("Ivan", "Petrov");

        api.start(spiral, &[ivan]).unwrap();
        api.advance_secs(60);
        api.stop(spiral, &[ivan]).unwrap();
        api.advance_secs(60);
        api.start(spiral, &[ivan]).unwrap();
        api.advance_secs(45);
        api.stop(spiral, &[ivan]).unwrap();

        let (actor, inner) = ResourceActor::<UserDrillSession>::new(8, api.clone());
        tokio::spawn(actor.run());
        let client = SessionClient::new(inner);
        client.apply_filter(SessionFilter::Completed).await.unwrap();

        let stops = client.recent_stops().await.unwrap();
        assert_eq!(stops[&spiral][&ivan], T0 + 165_000);
        assert!(client.active_starts().await.unwrap().is_empty());
    }
}
