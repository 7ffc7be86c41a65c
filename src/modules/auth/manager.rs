use crate::log_warn;
use crate::shared::config::{Config, Credentials};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::LogContext;
use chrono::Duration;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::store::TokenStore;
use super::token::Token;

/// Re-authenticate when the held token is within this margin of its expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    refresh_token: Option<String>,
}

/// Owns the one bearer token of a client instance and keeps it fresh.
///
/// Constructed explicitly and injected wherever requests are issued; the
/// token is mutated only through login/refresh here.
pub struct AuthManager {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    store: Arc<dyn TokenStore>,
    state: Mutex<Option<Token>>,
}

impl AuthManager {
    pub fn new(config: &Config, store: Arc<dyn TokenStore>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalServiceError(format!("Failed to create HTTP client: {}", e))
            })?;

        // Reload a cached session from the previous run, if any. Expiry is
        // re-derived from the token's own claims.
        let initial = match store.load() {
            Ok(Some(raw)) => Some(Token::new(raw)),
            Ok(None) => None,
            Err(e) => {
                log_warn!("Could not reload cached token: {}", e);
                None
            }
        };

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
            store,
            state: Mutex::new(initial),
        })
    }

    pub async fn is_logged_in(&self) -> bool {
        self.state.lock().await.is_some()
    }

    pub async fn current_token(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .as_ref()
            .map(|token| token.value().to_string())
    }

    /// Return a token that is valid for at least the safety margin,
    /// re-authenticating with the configured credentials when needed.
    ///
    /// Concurrent callers queue on the state lock, so only the first one to
    /// observe a stale token performs the exchange; the rest find the fresh
    /// token already in place and return it without a network call.
    pub async fn ensure_valid(&self) -> AppResult<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.as_ref() {
            if token.is_fresh(Duration::seconds(EXPIRY_MARGIN_SECS)) {
                return Ok(token.value().to_string());
            }
        }

        match self.request_token(&self.credentials.username, &self.credentials.password).await {
            Ok(token) => {
                let value = token.value().to_string();
                self.persist(&value);
                *state = Some(token);
                Ok(value)
            }
            Err(e) => {
                *state = None;
                self.discard();
                Err(e)
            }
        }
    }

    /// Exchange credentials for a token. Returns `false` on any failure so
    /// callers can branch without unwinding; the cause is logged here.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        match self.request_token(username, password).await {
            Ok(token) => {
                let mut state = self.state.lock().await;
                self.persist(token.value());
                *state = Some(token);
                true
            }
            Err(e) => {
                LogContext::error_with_context(&e, "Login failed");
                *self.state.lock().await = None;
                self.discard();
                false
            }
        }
    }

    /// Set the Authorization header when a token is held.
    pub async fn attach(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.current_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// React to a 401: one re-authentication with the configured
    /// credentials. `stale` is the token the rejected request carried; when
    /// another caller already refreshed past it, that newer token is reused
    /// without a second exchange. On failure all auth state is cleared.
    ///
    /// The caller is responsible for attempting this at most once per
    /// original request.
    pub async fn handle_unauthorized(&self, stale: Option<&str>) -> AppResult<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.as_ref() {
            if stale != Some(token.value())
                && token.is_fresh(Duration::seconds(EXPIRY_MARGIN_SECS))
            {
                return Ok(token.value().to_string());
            }
        }

        match self.request_token(&self.credentials.username, &self.credentials.password).await {
            Ok(token) => {
                let value = token.value().to_string();
                self.persist(&value);
                *state = Some(token);
                Ok(value)
            }
            Err(e) => {
                *state = None;
                self.discard();
                Err(e)
            }
        }
    }

    pub async fn logout(&self) {
        *self.state.lock().await = None;
        self.discard();
    }

    /// Form-encoded `POST /token`. Never retried: a failed exchange clears
    /// state and surfaces the error to exactly one caller.
    async fn request_token(&self, username: &str, password: &str) -> AppResult<Token> {
        let url = format!("{}/token", self.base_url);
        let response = self
            .http
            .post(&url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| AppError::AuthenticationError(format!("Token request failed: {}", e)))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AppError::AuthenticationError(
                "Credentials rejected by the API".to_string(),
            ));
        }
        if !response.status().is_success() {
            return Err(AppError::AuthenticationError(format!(
                "Token endpoint returned HTTP {}",
                response.status()
            )));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            AppError::SerializationError(format!("Failed to parse token response: {}", e))
        })?;
        Ok(Token::new(body.access_token))
    }

    fn persist(&self, value: &str) {
        if let Err(e) = self.store.save(value) {
            log_warn!("Could not persist token: {}", e);
        }
    }

    fn discard(&self) {
        if let Err(e) = self.store.clear() {
            log_warn!("Could not clear cached token: {}", e);
        }
    }
}
