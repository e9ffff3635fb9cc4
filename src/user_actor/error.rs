use thiserror::Error;
use validator::ValidationErrors;

use crate::actor_framework::FrameworkError;
use crate::error::ApiError;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for UserError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::Remote(api) => UserError::Api(api),
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}
