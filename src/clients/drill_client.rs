use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::actor_framework::ResourceClient;
use crate::api::DrillApi;
use crate::domain::{Drill, DrillId, UserId};
use crate::drill_actor::{CreateDrillRequest, DrillAction, DrillError};

/// Client for the drill store, including start and stop.
#[derive(Clone)]
pub struct DrillClient {
    inner: ResourceClient<Drill>,
    api: Arc<dyn DrillApi>,
}

impl_basic_client!(DrillClient, Drill, DrillError, drills);

impl DrillClient {
    #[instrument(fields(title = %request.title), skip(self, request))]
    pub async fn create_drill(&self, request: CreateDrillRequest) -> Result<Drill, DrillError> {
        if let Err(e) = request.validate() {
            warn!(error = %e, "Validation failed");
            return Err(e.into());
        }

        debug!("Sending request");
        let drill = self.api.create_drill(&request).await.map_err(|e| {
            error!(error = %e, "Create drill failed");
            e
        })?;

        info!(drill_id = drill.id, "Drill created successfully");
        self.inner.insert(drill.clone()).await?;
        Ok(drill)
    }

    pub async fn start_drill(
        &self,
        drill_id: DrillId,
        user_ids: Vec<UserId>,
    ) -> Result<Drill, DrillError> {
        self.perform(drill_id, DrillAction::Start(user_ids)).await
    }

    pub async fn stop_drill(
        &self,
        drill_id: DrillId,
        user_ids: Vec<UserId>,
    ) -> Result<Drill, DrillError> {
        self.perform(drill_id, DrillAction::Stop(user_ids)).await
    }

    /// Runs `action` remotely and swaps the returned drill into the store.
    /// Other drills are left as they are until the next refresh.
    #[instrument(fields(action = action.name(), users = action.user_ids().len()), skip(self, action))]
    pub async fn perform(&self, drill_id: DrillId, action: DrillAction) -> Result<Drill, DrillError> {
        if action.user_ids().is_empty() {
            warn!("No users selected");
            return Err(DrillError::NoUsersSelected);
        }

        let assignment = action.assignment(drill_id);
        debug!("Sending request");
        let result = match action {
            DrillAction::Start(_) => self.api.start_drill(&assignment).await,
            DrillAction::Stop(_) => self.api.stop_drill(&assignment).await,
        };
        let drill = result
            .map_err(|e| {
                error!(error = %e, "Drill action failed");
                e
            })?
            .drill;

        if !self.inner.replace(drill.clone()).await? {
            debug!("Drill not in store yet, waiting for next refresh");
        }
        info!(active = drill.users.len(), "Drill action applied");
        Ok(drill)
    }
}
