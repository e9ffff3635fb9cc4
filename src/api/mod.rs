//! Remote accessors for users, drills and session records.

mod http;

pub use http::*;

use async_trait::async_trait;

use crate::domain::{Drill, DrillAssignment, DrillEnvelope, SessionFilter, User, UserDrillSession};
use crate::drill_actor::CreateDrillRequest;
use crate::error::ApiError;
use crate::user_actor::CreateUserRequest;

pub const CREATE_USER_PATH: &str = "/api/User/CreateUser";
pub const LIST_USERS_PATH: &str = "/api/User/ListAllUsers/list";
pub const CREATE_DRILL_PATH: &str = "/api/Drill/CreateDrill";
pub const LIST_DRILLS_PATH: &str = "/api/Drill/ListAllDrills/list";
pub const START_DRILL_PATH: &str = "/api/Drill/StartDrill/start";
pub const STOP_DRILL_PATH: &str = "/api/Drill/StopDrill/stop";
pub const LIST_SESSIONS_PATH: &str = "/api/UserDrill/ListAll/list";
pub const ACTIVE_SESSIONS_PATH: &str = "/api/UserDrill/GetActive/active";
pub const COMPLETED_SESSIONS_PATH: &str = "/api/UserDrill/GetCompleted/completed";

pub fn sessions_path(filter: SessionFilter) -> &'static str {
    match filter {
        SessionFilter::All => LIST_SESSIONS_PATH,
        SessionFilter::Active => ACTIVE_SESSIONS_PATH,
        SessionFilter::Completed => COMPLETED_SESSIONS_PATH,
    }
}

/// The operations the console needs from the drill service.
#[async_trait]
pub trait DrillApi: Send + Sync + 'static {
    async fn create_user(&self, request: &CreateUserRequest) -> Result<User, ApiError>;
    async fn list_users(&self) -> Result<Vec<User>, ApiError>;
    async fn create_drill(&self, request: &CreateDrillRequest) -> Result<Drill, ApiError>;
    async fn list_drills(&self) -> Result<Vec<Drill>, ApiError>;
    async fn start_drill(&self, assignment: &DrillAssignment) -> Result<DrillEnvelope, ApiError>;
    async fn stop_drill(&self, assignment: &DrillAssignment) -> Result<DrillEnvelope, ApiError>;
    async fn list_sessions(&self, filter: SessionFilter) -> Result<Vec<UserDrillSession>, ApiError>;
}
