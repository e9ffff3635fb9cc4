use thiserror::Error;
use validator::ValidationErrors;

use crate::actor_framework::FrameworkError;
use crate::error::ApiError;

/// Errors that can occur during drill operations.
#[derive(Debug, Error)]
pub enum DrillError {
    #[error("Drill validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("Select at least one user")]
    NoUsersSelected,
    #[error("All selected users are already active on this drill")]
    AllUsersAlreadyActive,
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for DrillError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::Remote(api) => DrillError::Api(api),
            other => DrillError::ActorCommunicationError(other.to_string()),
        }
    }
}
