//! # Mock Framework
//!
//! Test doubles for the two seams of the console.
//!
//! - Store side: [`create_mock_client`] hands out a [`ResourceClient`] wired to a
//!   receiver the test controls; [`expect_insert`], [`expect_replace`] and
//!   [`expect_load`] pull the next request and its responder.
//! - Remote side: [`FakeDrillApi`] is an in-memory drill service driven by a
//!   [`ManualClock`], so sessions get deterministic start and stop instants.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use crate::api::DrillApi;
use crate::clock::{Clock, ManualClock, SharedClock};
use crate::domain::{
    Drill, DrillAssignment, DrillEnvelope, DrillId, SessionFilter, User, UserDrillSession, UserId,
};
use crate::drill_actor::CreateDrillRequest;
use crate::error::ApiError;
use crate::user_actor::CreateUserRequest;

// =============================================================================
// STORE MOCKS
// =============================================================================

pub type Responder<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Creates a client whose requests land on a receiver the test inspects.
pub fn create_mock_client<T: Entity>(
    buffer_size: usize,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is an Insert request
pub async fn expect_insert<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T, Responder<()>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Insert { item, respond_to }) => Some((item, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Replace request
pub async fn expect_replace<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T, Responder<bool>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Replace { item, respond_to }) => Some((item, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Load request
pub async fn expect_load<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Option<T::Query>, Responder<Vec<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Load { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

// =============================================================================
// FAKE REMOTE SERVICE
// =============================================================================

#[derive(Default)]
struct FakeState {
    users: Vec<User>,
    drills: Vec<Drill>,
    sessions: Vec<UserDrillSession>,
    next_id: i64,
    fail_next: Option<ApiError>,
    calls: HashMap<&'static str, usize>,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, call: &'static str) -> Result<(), ApiError> {
        *self.calls.entry(call).or_default() += 1;
        match self.fail_next.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn drill_mut(&mut self, drill_id: DrillId) -> Result<&mut Drill, ApiError> {
        self.drills
            .iter_mut()
            .find(|d| d.id == drill_id)
            .ok_or_else(|| ApiError::new("Drill not found", Some(404)))
    }
}

/// In-memory drill service. Enforces the one-active-drill-per-user rule the
/// way the real server does: such users are skipped on start.
pub struct FakeDrillApi {
    clock: ManualClock,
    state: Mutex<FakeState>,
}

impl FakeDrillApi {
    pub fn new(start_millis: i64) -> Self {
        Self {
            clock: ManualClock::new(start_millis),
            state: Mutex::new(FakeState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn clock(&self) -> ManualClock {
        self.clock.clone()
    }

    pub fn shared_clock(&self) -> SharedClock {
        Arc::new(self.clock.clone())
    }

    pub fn advance_secs(&self, secs: i64) {
        self.clock.advance_secs(secs);
    }

    /// Makes the next call of any kind fail with `error`.
    pub fn fail_next(&self, error: ApiError) {
        self.state().fail_next = Some(error);
    }

    pub fn calls(&self, call: &str) -> usize {
        self.state().calls.get(call).copied().unwrap_or(0)
    }

    pub fn list_drills_calls(&self) -> usize {
        self.calls("list_drills")
    }

    pub fn seed_user(&self, first_name: &str, last_name: &str) -> UserId {
        let request = CreateUserRequest::new(first_name, last_name, None);
        self.insert_user(&request).id
    }

    pub fn seed_drill(&self, title: &str, price_per_minute: f64) -> DrillId {
        let request = CreateDrillRequest::new(title, price_per_minute);
        self.insert_drill(&request).id
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.state().users.iter().find(|u| u.id == id).cloned()
    }

    /// Overwrites the reported start of the running session, as a jittery
    /// server would.
    pub fn shift_start(&self, drill_id: DrillId, user_id: UserId, started_at: i64) {
        let mut state = self.state();
        if let Some(session) = state
            .sessions
            .iter_mut()
            .find(|s| s.drill_id == drill_id && s.user_id == user_id && s.is_active())
        {
            session.started_at = started_at;
        }
    }

    fn insert_user(&self, request: &CreateUserRequest) -> User {
        let mut state = self.state();
        let user = User {
            id: state.next_id(),
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            created_at: self.clock.now_millis(),
        };
        state.users.push(user.clone());
        user
    }

    fn insert_drill(&self, request: &CreateDrillRequest) -> Drill {
        let mut state = self.state();
        let drill = Drill {
            id: state.next_id(),
            title: request.title.clone(),
            price_per_minute: request.price_per_minute,
            created_at: self.clock.now_millis(),
            users: Vec::new(),
        };
        state.drills.push(drill.clone());
        drill
    }

    pub fn start(&self, drill_id: DrillId, user_ids: &[UserId]) -> Result<Drill, ApiError> {
        let now = self.clock.now_millis();
        let mut state = self.state();
        state.drill_mut(drill_id)?;

        for &user_id in user_ids {
            let busy = state.drills.iter().any(|d| d.is_user_active(user_id));
            let user = state.users.iter().find(|u| u.id == user_id).cloned();
            let Some(user) = user else { continue };
            if busy {
                continue;
            }

            let drill = state.drill_mut(drill_id)?;
            drill.users.push(user.clone());
            let snapshot = drill.clone();
            let id = state.next_id();
            state.sessions.push(UserDrillSession {
                id,
                user_id,
                user,
                drill_id,
                drill: snapshot,
                started_at: now,
                stopped_at: None,
            });
        }

        state.drill_mut(drill_id).map(|d| d.clone())
    }

    pub fn stop(&self, drill_id: DrillId, user_ids: &[UserId]) -> Result<Drill, ApiError> {
        let now = self.clock.now_millis();
        let mut state = self.state();
        state.drill_mut(drill_id)?;

        for session in state
            .sessions
            .iter_mut()
            .filter(|s| s.drill_id == drill_id && user_ids.contains(&s.user_id) && s.is_active())
        {
            session.stopped_at = Some(now);
        }

        let drill = state.drill_mut(drill_id)?;
        drill.users.retain(|u| !user_ids.contains(&u.id));
        Ok(drill.clone())
    }
}

#[async_trait]
impl DrillApi for FakeDrillApi {
    async fn create_user(&self, request: &CreateUserRequest) -> Result<User, ApiError> {
        self.state().record("create_user")?;
        Ok(self.insert_user(request))
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let mut state = self.state();
        state.record("list_users")?;
        Ok(state.users.clone())
    }

    async fn create_drill(&self, request: &CreateDrillRequest) -> Result<Drill, ApiError> {
        self.state().record("create_drill")?;
        Ok(self.insert_drill(request))
    }

    async fn list_drills(&self) -> Result<Vec<Drill>, ApiError> {
        let mut state = self.state();
        state.record("list_drills")?;
        Ok(state.drills.clone())
    }

    async fn start_drill(&self, assignment: &DrillAssignment) -> Result<DrillEnvelope, ApiError> {
        self.state().record("start_drill")?;
        let drill = self.start(assignment.drill_id, &assignment.user_ids)?;
        Ok(DrillEnvelope { drill })
    }

    async fn stop_drill(&self, assignment: &DrillAssignment) -> Result<DrillEnvelope, ApiError> {
        self.state().record("stop_drill")?;
        let drill = self.stop(assignment.drill_id, &assignment.user_ids)?;
        Ok(DrillEnvelope { drill })
    }

    async fn list_sessions(&self, filter: SessionFilter) -> Result<Vec<UserDrillSession>, ApiError> {
        let mut state = self.state();
        state.record("list_sessions")?;
        Ok(state
            .sessions
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let insert_task = tokio::spawn(async move {
            let user = User {
                id: 1,
                email: None,
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                created_at: 0,
            };
            client.insert(user).await
        });

        let (item, responder) = expect_insert(&mut receiver).await.expect("Expected Insert request");
        assert_eq!(item.first_name, "Test");
        responder.send(Ok(())).unwrap();

        assert_eq!(insert_task.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn fake_service_skips_users_busy_elsewhere() {
        let api = FakeDrillApi::new(1_000_000_000_000);
        let spiral = api.seed_drill("Spiral", 2.5);
        let ladder = api.seed_drill("Ladder", 1.0);
        let ivan = api.seed_user("Ivan", "Petrov");

        api.start(spiral, &[ivan]).unwrap();
        let ladder_after = api.start(ladder, &[ivan]).unwrap();
        assert!(ladder_after.users.is_empty());
        assert_eq!(api.list_sessions(SessionFilter::Active).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fake_service_failure_is_one_shot() {
        let api = FakeDrillApi::new(0);
        api.fail_next(ApiError::unknown());
        assert!(api.list_users().await.is_err());
        assert!(api.list_users().await.is_ok());
        assert_eq!(api.calls("list_users"), 2);
    }
}
