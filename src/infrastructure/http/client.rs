use crate::log_debug;
use crate::modules::auth::AuthManager;
use crate::shared::config::Config;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::dto::ErrorBody;

/// Authenticated wrapper over the ERP REST proxy.
///
/// Every call goes through one execute path that attaches the current
/// bearer token and, on a 401, re-authenticates once and re-issues the
/// original request. A request is never retried more than once.
pub struct ApiClient {
    client: Client,
    base_url: String,
    upload_timeout: Duration,
    auth: Arc<AuthManager>,
}

impl ApiClient {
    pub fn new(config: &Config, auth: Arc<AuthManager>) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_timeout: config.upload_timeout,
            auth,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = self.url(path);
        let response = self
            .execute("GET", path, || self.client.get(&url).query(query))
            .await?;
        Self::parse_json(response).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.url(path);
        let response = self
            .execute("POST", path, || self.client.post(&url).json(body))
            .await?;
        Self::parse_json(response).await
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.url(path);
        let response = self
            .execute("PUT", path, || self.client.put(&url).json(body))
            .await?;
        Self::parse_json(response).await
    }

    pub async fn delete(&self, path: &str) -> AppResult<()> {
        let url = self.url(path);
        self.execute("DELETE", path, || self.client.delete(&url))
            .await?;
        Ok(())
    }

    /// Multipart POST with the longer upload timeout. The form is rebuilt
    /// through the closure when the request is re-issued after a 401.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: impl Fn() -> Form,
    ) -> AppResult<T> {
        let url = self.url(path);
        let response = self
            .execute("POST", path, || {
                self.client
                    .post(&url)
                    .multipart(form())
                    .timeout(self.upload_timeout)
            })
            .await?;
        Self::parse_json(response).await
    }

    async fn execute<F>(&self, method: &str, path: &str, build: F) -> AppResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let started = std::time::Instant::now();
        let mut retried = false;

        loop {
            let stale = self.auth.current_token().await;
            let mut request = build();
            if let Some(token) = &stale {
                request = request.bearer_auth(token);
            }
            let response = request.send().await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                if !retried {
                    retried = true;
                    log_debug!("401 on {} {}, refreshing token and retrying once", method, path);
                    self.auth.handle_unauthorized(stale.as_deref()).await?;
                    continue;
                }
                // The refreshed token was rejected too; the session is gone.
                self.auth.logout().await;
                return Err(AppError::Unauthorized(
                    "Session expired and re-authentication was rejected".to_string(),
                ));
            }

            if !response.status().is_success() {
                return Err(Self::error_from_response(response).await);
            }

            LogContext::api_call(
                method,
                path,
                response.status().as_str(),
                Some(started.elapsed().as_millis() as u64),
            );
            return Ok(response);
        }
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let text = response.text().await.map_err(|e| {
            AppError::SerializationError(format!("Failed to read response: {}", e))
        })?;

        serde_json::from_str(&text).map_err(|e| {
            AppError::SerializationError(format!(
                "Failed to parse response: {}. Response: {}",
                e,
                if text.len() > 200 {
                    format!("{}...", &text[..200])
                } else {
                    text
                }
            ))
        })
    }

    /// Map a non-success response to the error taxonomy, preferring the
    /// server-provided detail message. Validation and generic failures are
    /// surfaced to the caller, never retried.
    async fn error_from_response(response: Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message())
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        match status {
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::UNPROCESSABLE_ENTITY => AppError::ValidationError(message),
            StatusCode::TOO_MANY_REQUESTS => AppError::RateLimitError(message),
            s if s.is_server_error() => {
                AppError::ExternalServiceError(format!("HTTP {}: {}", s, message))
            }
            _ => AppError::ApiError(format!("HTTP {}: {}", status, message)),
        }
    }
}
