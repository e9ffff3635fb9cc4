use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::error::ApiError;

/// Errors that can occur while reading session history.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError> for SessionError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::Remote(api) => SessionError::Api(api),
            other => SessionError::ActorCommunicationError(other.to_string()),
        }
    }
}
