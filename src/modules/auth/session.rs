use crate::infrastructure::http::ApiClient;
use crate::shared::errors::AppResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Backend session descriptor for the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub uid: i64,
    pub username: String,
    pub name: String,
    pub session_id: String,
    pub db: String,
}

/// Introspects the current backend session. Issued through the
/// authenticated client so it participates in the 401 retry path.
pub struct SessionService {
    api: Arc<ApiClient>,
}

impl SessionService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub async fn session(&self) -> AppResult<SessionResponse> {
        self.api.get_json("/api/v1/auth/session", &[]).await
    }
}
