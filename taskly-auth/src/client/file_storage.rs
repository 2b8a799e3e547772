use crate::error::AuthError;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use taskly_api::{Storage, StorageError};

const STORE_FILE: &str = "session.json";

/// `Storage` backed by a single owner-only JSON file.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open the store in the user cache directory.
    pub fn new() -> Result<Self, AuthError> {
        Self::in_dir(Self::get_cache_dir()?)
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let dir = dir.into();

        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                AuthError::TokenStorage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        let path = dir.join(STORE_FILE);
        let entries = Self::load(&path)?;

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn get_cache_dir() -> Result<PathBuf, AuthError> {
        dirs::cache_dir()
            .map(|dir| dir.join("taskly"))
            .ok_or_else(|| AuthError::TokenStorage("No cache directory available".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, AuthError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let json = fs::read_to_string(path)
            .map_err(|e| AuthError::TokenStorage(format!("Failed to read store: {}", e)))?;

        match serde_json::from_str(&json) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!("Discarding unreadable store at {}: {}", path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;

        // Tokens live here: owner read/write only, from the moment the file exists.
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options
            .open(&self.path)
            .map_err(|e| StorageError(format!("Failed to open store: {}", e)))?;
        file.write_all(json.as_bytes())
            .map_err(|e| StorageError(format!("Failed to write store: {}", e)))?;

        // `mode` only applies on creation; tighten a file left by an older version.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&self.path)
                .map_err(|e| StorageError(format!("Failed to get file permissions: {}", e)))?
                .permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&self.path, perms)
                .map_err(|e| StorageError(format!("Failed to set file permissions: {}", e)))?;
        }

        Ok(())
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries();
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
