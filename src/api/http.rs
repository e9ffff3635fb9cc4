use async_trait::async_trait;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::*;
use crate::config::ApiConfig;

/// [`DrillApi`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpDrillApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDrillApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::from_transport(&e))?;
        Ok(Self::with_client(client, &config.base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[instrument(name = "outgoing_http", skip(self), fields(http.method = "GET"))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .request(Method::GET, self.url(path))
            .send()
            .await
            .map_err(|e| transport_failure(path, e))?;
        read_json(path, response).await
    }

    #[instrument(name = "outgoing_http", skip(self, body), fields(http.method = "POST"))]
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .request(Method::POST, self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_failure(path, e))?;
        read_json(path, response).await
    }
}

fn transport_failure(path: &str, err: reqwest::Error) -> ApiError {
    let api_error = ApiError::from_transport(&err);
    warn!(path, error = %api_error, "Request failed before a response arrived");
    api_error
}

async fn read_json<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, ApiError> {
    let status = response.status();
    debug!(path, status = status.as_u16(), "Response received");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let api_error = ApiError::from_response(status.as_u16(), &body);
        warn!(path, status = status.as_u16(), error = %api_error, "API error");
        return Err(api_error);
    }

    response.json::<T>().await.map_err(|e| {
        let mut api_error = ApiError::from_transport(&e);
        api_error.status_code = Some(status.as_u16());
        warn!(path, error = %api_error, "Malformed response body");
        api_error
    })
}

#[async_trait]
impl DrillApi for HttpDrillApi {
    async fn create_user(&self, request: &CreateUserRequest) -> Result<User, ApiError> {
        self.post_json(CREATE_USER_PATH, request).await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json(LIST_USERS_PATH).await
    }

    async fn create_drill(&self, request: &CreateDrillRequest) -> Result<Drill, ApiError> {
        self.post_json(CREATE_DRILL_PATH, request).await
    }

    async fn list_drills(&self) -> Result<Vec<Drill>, ApiError> {
        self.get_json(LIST_DRILLS_PATH).await
    }

    async fn start_drill(&self, assignment: &DrillAssignment) -> Result<DrillEnvelope, ApiError> {
        self.post_json(START_DRILL_PATH, assignment).await
    }

    async fn stop_drill(&self, assignment: &DrillAssignment) -> Result<DrillEnvelope, ApiError> {
        self.post_json(STOP_DRILL_PATH, assignment).await
    }

    async fn list_sessions(&self, filter: SessionFilter) -> Result<Vec<UserDrillSession>, ApiError> {
        self.get_json(sessions_path(filter)).await
    }
}
