use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::actor_framework::ResourceClient;
use crate::api::DrillApi;
use crate::domain::User;
use crate::user_actor::{CreateUserRequest, UserError};

/// Client for the user store.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    api: Arc<dyn DrillApi>,
}

impl_basic_client!(UserClient, User, UserError, users);

impl UserClient {
    /// Validates, creates remotely, then appends the created user locally.
    #[instrument(
        fields(first_name = %request.first_name, last_name = %request.last_name),
        skip(self, request)
    )]
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserError> {
        if let Err(e) = request.validate() {
            warn!(error = %e, "Validation failed");
            return Err(e.into());
        }

        debug!("Sending request");
        let user = self.api.create_user(&request).await.map_err(|e| {
            error!(error = %e, "Create user failed");
            e
        })?;

        info!(user_id = user.id, "User created successfully");
        self.inner.insert(user.clone()).await?;
        Ok(user)
    }
}
