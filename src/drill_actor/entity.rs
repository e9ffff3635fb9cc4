use async_trait::async_trait;

use crate::actor_framework::Entity;
use crate::api::DrillApi;
use crate::domain::{Drill, DrillId};
use crate::error::ApiError;

#[async_trait]
impl Entity for Drill {
    type Id = DrillId;
    type Query = ();

    const KIND: &'static str = "drill";

    fn id(&self) -> &DrillId {
        &self.id
    }

    async fn fetch(api: &dyn DrillApi, _query: &()) -> Result<Vec<Self>, ApiError> {
        api.list_drills().await
    }
}
