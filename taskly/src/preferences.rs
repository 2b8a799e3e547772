use std::sync::Arc;
use taskly_api::{Storage, StorageError};

pub const DARK_MODE_KEY: &str = "darkMode";
pub const DISPLAY_NAME_KEY: &str = "displayName";
pub const PROFILE_PICTURE_KEY: &str = "profilePicture";

/// UI preferences kept next to the session tokens.
#[derive(Clone)]
pub struct Preferences {
    storage: Arc<dyn Storage>,
}

impl Preferences {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Stored as a JSON boolean; anything unreadable counts as `false`.
    pub fn dark_mode(&self) -> bool {
        match self.storage.get(DARK_MODE_KEY) {
            Ok(Some(value)) => serde_json::from_str(&value).unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!("Failed to read dark mode preference: {}", e);
                false
            }
        }
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StorageError> {
        self.storage
            .set(DARK_MODE_KEY, &serde_json::to_string(&enabled)?)
    }

    pub fn display_name(&self) -> Option<String> {
        self.read(DISPLAY_NAME_KEY)
    }

    pub fn set_display_name(&self, name: &str) -> Result<(), StorageError> {
        self.storage.set(DISPLAY_NAME_KEY, name)
    }

    pub fn profile_picture(&self) -> Option<String> {
        self.read(PROFILE_PICTURE_KEY)
    }

    pub fn set_profile_picture(&self, url: &str) -> Result<(), StorageError> {
        self.storage.set(PROFILE_PICTURE_KEY, url)
    }

    pub fn clear_profile_picture(&self) -> Result<(), StorageError> {
        self.storage.remove(PROFILE_PICTURE_KEY)
    }

    /// Forget the signed-in user's name and picture. Dark mode is kept.
    pub fn clear_profile(&self) {
        for key in [DISPLAY_NAME_KEY, PROFILE_PICTURE_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to remove '{}' from storage: {}", key, e);
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read '{}' from storage: {}", key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskly_api::MemoryStorage;

    fn preferences() -> (Preferences, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (Preferences::new(storage.clone()), storage)
    }

    #[test]
    fn test_dark_mode_defaults_to_false() {
        let (preferences, _) = preferences();
        assert!(!preferences.dark_mode());
    }

    #[test]
    fn test_dark_mode_stored_as_json() {
        let (preferences, storage) = preferences();

        preferences.set_dark_mode(true).unwrap();

        assert!(preferences.dark_mode());
        assert_eq!(storage.get(DARK_MODE_KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_unreadable_dark_mode_is_false() {
        let (preferences, storage) = preferences();
        storage.set(DARK_MODE_KEY, "yes please").unwrap();

        assert!(!preferences.dark_mode());
    }

    #[test]
    fn test_clear_profile_keeps_dark_mode() {
        let (preferences, _) = preferences();
        preferences.set_dark_mode(true).unwrap();
        preferences.set_display_name("Ada").unwrap();
        preferences.set_profile_picture("http://api.test/a.png").unwrap();

        preferences.clear_profile();

        assert_eq!(preferences.display_name(), None);
        assert_eq!(preferences.profile_picture(), None);
        assert!(preferences.dark_mode());
    }

    #[test]
    fn test_empty_values_read_as_none() {
        let (preferences, _) = preferences();
        preferences.set_display_name("").unwrap();

        assert_eq!(preferences.display_name(), None);
    }
}
