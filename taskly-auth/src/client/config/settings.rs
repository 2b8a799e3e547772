use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where the session file lives; the user cache directory when unset.
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    taskly_api::DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    taskly_api::DEFAULT_TIMEOUT.as_secs()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            storage_dir: None,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("TASKLY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Load `config_path` (optional) with `TASKLY__*` environment overrides.
    pub fn from_file(config_path: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("TASKLY").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.is_empty() {
            return Err("api_base_url is required".to_string());
        }
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err("api_base_url must be a valid HTTP(S) URL".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();

        assert_eq!(settings.api_base_url, "http://localhost:3000");
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        let settings = Settings::from_file(path.to_str().unwrap()).unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_loads_values_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "api_base_url = \"https://tasks.example.com\"\nrequest_timeout_secs = 30\nstorage_dir = \"/tmp/taskly\""
        )
        .unwrap();

        let settings = Settings::from_file(file.path().to_str().unwrap()).unwrap();

        assert_eq!(settings.api_base_url, "https://tasks.example.com");
        assert_eq!(settings.request_timeout_secs, 30);
        assert_eq!(settings.storage_dir, Some(PathBuf::from("/tmp/taskly")));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = Settings {
            api_base_url: "ftp://tasks.example.com".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());

        settings.api_base_url = String::new();
        assert!(settings.validate().is_err());

        settings.api_base_url = "https://tasks.example.com".to_string();
        settings.request_timeout_secs = 0;
        assert!(settings.validate().is_err());
    }
}
