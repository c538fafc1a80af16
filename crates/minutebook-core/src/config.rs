//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/minutebook/config.toml)
//! 3. Environment variables (MINUTEBOOK_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "MINUTEBOOK";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the local document cache
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Whether reads pull from the remote first (writes always do)
    #[serde(default = "default_pull_on_read")]
    pub pull_on_read: bool,

    /// Remote mirror settings; absent or incomplete means local-only
    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

/// Settings for the remote content host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteConfig {
    /// Access token for the host API
    #[serde(default)]
    pub token: String,

    /// Repository in "owner/name" form
    #[serde(default)]
    pub repository: String,

    /// Branch holding the mirrored files
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Path of the JSON document within the repository
    #[serde(default = "default_document_path")]
    pub document_path: String,

    /// Directory within the repository for uploaded attachments
    #[serde(default = "default_attachment_dir")]
    pub attachment_dir: String,

    /// Base URL of the host API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            pull_on_read: default_pull_on_read(),
            remote: None,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            repository: String::new(),
            branch: default_branch(),
            document_path: default_document_path(),
            attachment_dir: default_attachment_dir(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    /// Whether enough is set to reach the remote
    ///
    /// A blank token or repository disables sync without being an error.
    pub fn is_configured(&self) -> bool {
        !self.token.trim().is_empty() && !self.repository.trim().is_empty()
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (MINUTEBOOK_DATA_DIR, MINUTEBOOK_REMOTE_TOKEN, ...)
    /// 2. Config file (~/.config/minutebook/config.toml or MINUTEBOOK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // MINUTEBOOK_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // MINUTEBOOK_PULL_ON_READ
        if let Ok(val) = std::env::var(format!("{}_PULL_ON_READ", ENV_PREFIX)) {
            self.pull_on_read = val.eq_ignore_ascii_case("true") || val == "1";
        }

        // MINUTEBOOK_REMOTE_TOKEN
        if let Ok(val) = std::env::var(format!("{}_REMOTE_TOKEN", ENV_PREFIX)) {
            self.remote.get_or_insert_with(RemoteConfig::default).token = val;
        }

        // MINUTEBOOK_REMOTE_REPOSITORY
        if let Ok(val) = std::env::var(format!("{}_REMOTE_REPOSITORY", ENV_PREFIX)) {
            self.remote
                .get_or_insert_with(RemoteConfig::default)
                .repository = val;
        }

        // MINUTEBOOK_REMOTE_BRANCH
        if let Ok(val) = std::env::var(format!("{}_REMOTE_BRANCH", ENV_PREFIX)) {
            if !val.is_empty() {
                self.remote.get_or_insert_with(RemoteConfig::default).branch = val;
            }
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with MINUTEBOOK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("minutebook")
            .join("config.toml")
    }

    /// Get the path to the cached JSON document
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("document.json")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("minutebook")
}

fn default_pull_on_read() -> bool {
    true
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_document_path() -> String {
    "data.json".to_string()
}

fn default_attachment_dir() -> String {
    "attachments".to_string()
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap();
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            // Clear all the vars
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "MINUTEBOOK_DATA_DIR",
        "MINUTEBOOK_PULL_ON_READ",
        "MINUTEBOOK_REMOTE_TOKEN",
        "MINUTEBOOK_REMOTE_REPOSITORY",
        "MINUTEBOOK_REMOTE_BRANCH",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.pull_on_read);
        assert!(config.remote.is_none());
        assert!(config.data_dir.ends_with("minutebook"));
    }

    #[test]
    fn test_default_remote_config() {
        let remote = RemoteConfig::default();
        assert_eq!(remote.branch, "main");
        assert_eq!(remote.document_path, "data.json");
        assert_eq!(remote.attachment_dir, "attachments");
        assert_eq!(remote.api_url, "https://api.github.com");
        assert_eq!(remote.timeout_secs, 10);
        assert!(!remote.is_configured());
    }

    #[test]
    fn test_cache_path() {
        let config = Config::default();
        assert!(config.cache_path().ends_with("document.json"));
    }

    #[test]
    fn test_blank_token_disables_remote() {
        let remote = RemoteConfig {
            token: "   ".to_string(),
            repository: "alice/minutes".to_string(),
            ..RemoteConfig::default()
        };
        assert!(!remote.is_configured());

        let remote = RemoteConfig {
            token: "ghp_abc".to_string(),
            repository: "alice/minutes".to_string(),
            ..RemoteConfig::default()
        };
        assert!(remote.is_configured());
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();

        env::set_var("MINUTEBOOK_DATA_DIR", "/tmp/minutebook-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/minutebook-test"));
    }

    #[test]
    fn test_env_override_pull_on_read() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.pull_on_read);

        env::set_var("MINUTEBOOK_PULL_ON_READ", "false");
        config.apply_env_overrides();
        assert!(!config.pull_on_read);

        env::set_var("MINUTEBOOK_PULL_ON_READ", "1");
        config.apply_env_overrides();
        assert!(config.pull_on_read);

        env::set_var("MINUTEBOOK_PULL_ON_READ", "0");
        config.apply_env_overrides();
        assert!(!config.pull_on_read);
    }

    #[test]
    fn test_env_override_creates_remote_section() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        assert!(config.remote.is_none());

        env::set_var("MINUTEBOOK_REMOTE_TOKEN", "ghp_test");
        env::set_var("MINUTEBOOK_REMOTE_REPOSITORY", "alice/minutes");
        config.apply_env_overrides();

        let remote = config.remote.as_ref().unwrap();
        assert_eq!(remote.token, "ghp_test");
        assert_eq!(remote.repository, "alice/minutes");
        assert_eq!(remote.branch, "main");
        assert!(remote.is_configured());
    }

    #[test]
    fn test_env_override_branch() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config {
            remote: Some(RemoteConfig {
                token: "ghp_test".to_string(),
                repository: "alice/minutes".to_string(),
                ..RemoteConfig::default()
            }),
            ..Config::default()
        };

        env::set_var("MINUTEBOOK_REMOTE_BRANCH", "archive");
        config.apply_env_overrides();
        assert_eq!(config.remote.as_ref().unwrap().branch, "archive");

        // Empty string keeps the configured branch
        env::set_var("MINUTEBOOK_REMOTE_BRANCH", "");
        config.apply_env_overrides();
        assert_eq!(config.remote.as_ref().unwrap().branch, "archive");
    }

    #[test]
    fn test_serialization() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config {
            data_dir: PathBuf::from("/data/minutebook"),
            pull_on_read: false,
            remote: Some(RemoteConfig {
                token: "ghp_test".to_string(),
                repository: "alice/minutes".to_string(),
                ..RemoteConfig::default()
            }),
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("data_dir"));
        assert!(toml_str.contains("pull_on_read"));
        assert!(toml_str.contains("[remote]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.data_dir, config.data_dir);
        assert_eq!(parsed.pull_on_read, config.pull_on_read);
        assert_eq!(parsed.remote, config.remote);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            pull_on_read = false

            [remote]
            token = "ghp_abc123"
            repository = "alice/minutes"
            branch = "records"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert!(!config.pull_on_read);

        let remote = config.remote.as_ref().unwrap();
        assert_eq!(remote.token, "ghp_abc123");
        assert_eq!(remote.repository, "alice/minutes");
        assert_eq!(remote.branch, "records");
        // Unset keys fall back to defaults
        assert_eq!(remote.document_path, "data.json");
        assert_eq!(remote.timeout_secs, 10);
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        // Should return defaults when file doesn't exist
        assert!(config.pull_on_read);
        assert!(config.remote.is_none());
    }
}
