use crate::shared::errors::{AppError, AppResult};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 120;

/// API credentials, sourced from configuration and immutable for the
/// process lifetime.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub credentials: Credentials,
    /// Timeout for ordinary API calls
    pub request_timeout: Duration,
    /// Uploads run server-side batch processing and need a longer timeout
    pub upload_timeout: Duration,
    /// Where the bearer token is cached between runs; `None` keeps it in memory
    pub token_cache: Option<PathBuf>,
}

impl Config {
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into(),
            credentials,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
            token_cache: None,
        }
    }

    /// Load configuration from the environment. Credentials are mandatory:
    /// a missing username or password is a fatal configuration error, not a
    /// silent fallback to a demo login.
    pub fn from_env() -> AppResult<Self> {
        let base_url =
            env::var("ERP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if base_url.trim().is_empty() {
            return Err(AppError::ConfigError(
                "ERP_API_URL must not be empty".to_string(),
            ));
        }

        let username = Self::required_var("ERP_USERNAME")?;
        let password = Self::required_var("ERP_PASSWORD")?;

        let request_timeout =
            Self::timeout_var("ERP_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let upload_timeout =
            Self::timeout_var("ERP_UPLOAD_TIMEOUT_SECS", DEFAULT_UPLOAD_TIMEOUT_SECS)?;

        let token_cache = env::var("ERP_TOKEN_CACHE").ok().map(PathBuf::from);

        Ok(Self {
            base_url,
            credentials: Credentials { username, password },
            request_timeout,
            upload_timeout,
            token_cache,
        })
    }

    fn required_var(name: &str) -> AppResult<String> {
        let value = env::var(name)
            .map_err(|_| AppError::ConfigError(format!("{} environment variable not found", name)))?;
        if value.trim().is_empty() {
            return Err(AppError::ConfigError(format!("{} must not be empty", name)));
        }
        Ok(value)
    }

    fn timeout_var(name: &str, default_secs: u64) -> AppResult<Duration> {
        match env::var(name) {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    AppError::ConfigError(format!("{} must be a number of seconds", name))
                })?;
                if secs == 0 {
                    return Err(AppError::ConfigError(format!("{} must be positive", name)));
                }
                Ok(Duration::from_secs(secs))
            }
            Err(_) => Ok(Duration::from_secs(default_secs)),
        }
    }
}
