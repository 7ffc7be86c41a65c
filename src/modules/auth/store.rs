use crate::shared::errors::{AppError, AppResult};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

/// Persistence seam for the bearer token, so a session survives process
/// restarts the way the browser client survived page reloads.
#[cfg_attr(test, mockall::automock)]
pub trait TokenStore: Send + Sync {
    fn load(&self) -> AppResult<Option<String>>;
    fn save(&self, token: &str) -> AppResult<()>;
    fn clear(&self) -> AppResult<()>;
}

/// Keeps the token for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> AppResult<Option<String>> {
        Ok(self.token.lock().expect("token store lock").clone())
    }

    fn save(&self, token: &str) -> AppResult<()> {
        *self.token.lock().expect("token store lock") = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.token.lock().expect("token store lock") = None;
        Ok(())
    }
}

/// Caches the token in a single file under a fixed path.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default cache location under the user's cache directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|dir| dir.join("electroerp").join("token"))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> AppResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim().to_string();
                Ok(if token.is_empty() { None } else { Some(token) })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::CacheError(format!(
                "Failed to read token cache {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn save(&self, token: &str) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::CacheError(format!(
                    "Failed to create token cache directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
        fs::write(&self.path, token).map_err(|e| {
            AppError::CacheError(format!(
                "Failed to write token cache {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::CacheError(format!(
                "Failed to remove token cache {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
