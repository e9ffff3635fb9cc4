use async_trait::async_trait;

use crate::actor_framework::Entity;
use crate::api::DrillApi;
use crate::domain::{SessionFilter, SessionId, UserDrillSession};
use crate::error::ApiError;

#[async_trait]
impl Entity for UserDrillSession {
    type Id = SessionId;
    type Query = SessionFilter;

    const KIND: &'static str = "user_drill";

    fn id(&self) -> &SessionId {
        &self.id
    }

    async fn fetch(api: &dyn DrillApi, filter: &SessionFilter) -> Result<Vec<Self>, ApiError> {
        api.list_sessions(*filter).await
    }
}
