use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::ApiError;

/// Key under which the bearer token is cached.
pub const ACCESS_TOKEN_KEY: &str = "access-token";
/// Key under which the identity provider keeps the signed-in profile.
pub const SESSION_KEY: &str = "session";

/// Browser-style key/value persistence. Values are opaque strings.
pub trait LocalStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError>;
    fn set(&self, key: &str, value: &str) -> Result<(), ApiError>;
    fn remove(&self, key: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let mut items = HashMap::new();
        items.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        Self { items: Mutex::new(items) }
    }
}

impl LocalStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        let items = self.items.lock().map_err(|_| ApiError::Storage("memory storage poisoned".into()))?;
        Ok(items.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let mut items = self.items.lock().map_err(|_| ApiError::Storage("memory storage poisoned".into()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let mut items = self.items.lock().map_err(|_| ApiError::Storage("memory storage poisoned".into()))?;
        items.remove(key);
        Ok(())
    }
}

/// Single JSON object on disk, rewritten on every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, ApiError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(HashMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::Storage(format!("{}: corrupt storage file: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(ApiError::Storage(format!("{}: {}", self.path.display(), e))),
        }
    }

    fn write_all(&self, items: &HashMap<String, String>) -> Result<(), ApiError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| ApiError::Storage(format!("{}: {}", dir.display(), e)))?;
        }
        let payload = serde_json::to_vec_pretty(items)?;
        let io_err = |e: std::io::Error| ApiError::Storage(format!("{}: {}", self.path.display(), e));

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path).map_err(io_err)?;
        // mode only applies on creation; tighten files left by older versions
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600)).map_err(io_err)?;
        }
        file.write_all(&payload).map_err(io_err)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>, ApiError> {
        self.lock.lock().map_err(|_| ApiError::Storage("file storage poisoned".into()))
    }
}

impl LocalStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, ApiError> {
        let _g = self.guard()?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ApiError> {
        let _g = self.guard()?;
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove(&self, key: &str) -> Result<(), ApiError> {
        let _g = self.guard()?;
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}
