use async_trait::async_trait;

use crate::actor_framework::Entity;
use crate::api::DrillApi;
use crate::domain::{User, UserId};
use crate::error::ApiError;

#[async_trait]
impl Entity for User {
    type Id = UserId;
    type Query = ();

    const KIND: &'static str = "user";

    fn id(&self) -> &UserId {
        &self.id
    }

    async fn fetch(api: &dyn DrillApi, _query: &()) -> Result<Vec<Self>, ApiError> {
        api.list_users().await
    }
}
