use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{ProbeError, ProbeResult};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_PASSWORD: &str = "password123";
pub const DEFAULT_EMAIL_DOMAIN: &str = "example.com";
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub base_url: String,
    /// Password used for every generated test user.
    pub password: String,
    pub email_domain: String,
    /// Pause before the first request so a freshly started server can come up.
    pub startup_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ProbeConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/kanban-probe/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("kanban-probe/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("kanban-probe\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Loads the config from the platform location, falling back to defaults
    /// when the file is absent or unreadable.
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(config) = Self::load_from(&config_path) {
                    return config;
                }
            }
        }
        Self::default()
    }

    /// Loads an explicitly requested config file. Unlike [`ProbeConfig::load`]
    /// a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> ProbeResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| ProbeError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_point_at_local_server() {
        let config = ProbeConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/api");
        assert_eq!(config.password, "password123");
        assert_eq!(config.startup_delay(), Duration::from_secs(2));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_load_from_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://api.test:9000/api/\"").unwrap();
        writeln!(file, "startup_delay_ms = 0").unwrap();

        let config = ProbeConfig::load_from(file.path()).unwrap();
        assert_eq!(config.base_url, "http://api.test:9000/api/");
        assert_eq!(config.normalized_base_url(), "http://api.test:9000/api");
        assert_eq!(config.startup_delay_ms, 0);
        assert_eq!(config.email_domain, "example.com");
    }

    #[test]
    fn test_load_from_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "startup_delay_ms = \"soon\"").unwrap();

        let err = ProbeConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ProbeError::Config(_)));
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ProbeConfig::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ProbeError::Io(_)));
    }
}
