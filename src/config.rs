//! Configuration module for NexoDrive.

use serde::Deserialize;
use std::path::Path;

use crate::{DriveError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Service name reported by the health endpoint.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    80
}

fn default_service_name() -> String {
    "NexoDrive".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            service_name: default_service_name(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Storage root. Holds the ledger document and the upload directory.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "data".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

impl FilesConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Wireless access point settings.
///
/// These are consumed by the network provisioning side of the device, not by
/// the file store. They live here so a single file configures the device.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Access point SSID.
    #[serde(default = "default_ssid")]
    pub ssid: String,
    /// WPA2 passphrase. Empty means an open network.
    #[serde(default = "default_passphrase")]
    pub passphrase: String,
}

fn default_ssid() -> String {
    "NexoDrive_AP".to_string()
}

fn default_passphrase() -> String {
    "nexodrive123".to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: default_ssid(),
            passphrase: default_passphrase(),
        }
    }
}

/// Web dispatcher configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// CORS allowed origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve static files.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to static files directory. Directories serve their `index.html`.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_static_path() -> String {
    "www".to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec![],
            serve_static: false,
            static_path: default_static_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/nexodrive.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Access point configuration.
    #[serde(default)]
    pub network: NetworkConfig,
    /// Web dispatcher configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(DriveError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DriveError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `NEXODRIVE_STORAGE_PATH`: Override the storage root
    /// - `NEXODRIVE_AP_PASSPHRASE`: Override the access point passphrase
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("NEXODRIVE_STORAGE_PATH") {
            if !path.is_empty() {
                self.files.storage_path = path;
            }
        }

        // An empty passphrase is meaningful (open network), so it is honoured.
        if let Ok(passphrase) = std::env::var("NEXODRIVE_AP_PASSPHRASE") {
            self.network.passphrase = passphrase;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - The maximum upload size is zero
    /// - The SSID is empty or longer than 32 bytes
    /// - The passphrase is neither empty nor 8 to 63 characters
    pub fn validate(&self) -> Result<()> {
        if self.files.max_upload_size_mb == 0 {
            return Err(DriveError::Config(
                "files.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }

        if self.network.ssid.is_empty() || self.network.ssid.len() > 32 {
            return Err(DriveError::Config(
                "network.ssid must be 1 to 32 bytes long".to_string(),
            ));
        }

        let pass_len = self.network.passphrase.chars().count();
        if pass_len != 0 && !(8..=63).contains(&pass_len) {
            return Err(DriveError::Config(
                "network.passphrase must be empty (open network) or 8 to 63 characters"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 80);
        assert_eq!(config.server.service_name, "NexoDrive");

        assert_eq!(config.files.storage_path, "data");
        assert_eq!(config.files.max_upload_size_mb, 10);
        assert_eq!(config.files.max_upload_size_bytes(), 10 * 1024 * 1024);

        assert_eq!(config.network.ssid, "NexoDrive_AP");
        assert_eq!(config.network.passphrase, "nexodrive123");

        assert!(config.web.cors_origins.is_empty());
        assert!(!config.web.serve_static);
        assert_eq!(config.web.static_path, "www");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/nexodrive.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "192.168.4.1"
port = 8080
service_name = "Drive"

[files]
storage_path = "/mnt/littlefs"
max_upload_size_mb = 4

[network]
ssid = "ShareBox"
passphrase = "correct horse"

[web]
cors_origins = ["http://192.168.4.1"]
serve_static = true
static_path = "public"

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "192.168.4.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.service_name, "Drive");

        assert_eq!(config.files.storage_path, "/mnt/littlefs");
        assert_eq!(config.files.max_upload_size_bytes(), 4 * 1024 * 1024);

        assert_eq!(config.network.ssid, "ShareBox");
        assert_eq!(config.network.passphrase, "correct horse");

        assert_eq!(config.web.cors_origins, vec!["http://192.168.4.1"]);
        assert!(config.web.serve_static);
        assert_eq!(config.web.static_path, "public");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[files]
max_upload_size_mb = 2
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.files.max_upload_size_mb, 2);
        assert_eq!(config.files.storage_path, "data");
        assert_eq!(config.server.port, 80);
        assert_eq!(config.network.ssid, "NexoDrive_AP");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.files.max_upload_size_mb, 10);
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(DriveError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(matches!(result, Err(DriveError::Io(_))));
    }

    #[test]
    fn test_load_with_env_overrides() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[files]\nstorage_path = \"from-file\"\n").unwrap();

        let original = std::env::var("NEXODRIVE_STORAGE_PATH").ok();
        std::env::set_var("NEXODRIVE_STORAGE_PATH", "from-env");

        let config = Config::load_with_env(&path).unwrap();
        assert_eq!(config.files.storage_path, "from-env");

        if let Some(val) = original {
            std::env::set_var("NEXODRIVE_STORAGE_PATH", val);
        } else {
            std::env::remove_var("NEXODRIVE_STORAGE_PATH");
        }
    }

    #[test]
    fn test_apply_env_overrides_passphrase() {
        let original = std::env::var("NEXODRIVE_AP_PASSPHRASE").ok();

        std::env::set_var("NEXODRIVE_AP_PASSPHRASE", "");

        let mut config = Config::default();
        config.apply_env_overrides();

        // Empty passphrase switches the access point to an open network
        assert_eq!(config.network.passphrase, "");

        if let Some(val) = original {
            std::env::set_var("NEXODRIVE_AP_PASSPHRASE", val);
        } else {
            std::env::remove_var("NEXODRIVE_AP_PASSPHRASE");
        }
    }

    #[test]
    fn test_validate_default() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_upload_size() {
        let mut config = Config::default();
        config.files.max_upload_size_mb = 0;

        let result = config.validate();
        if let Err(DriveError::Config(msg)) = result {
            assert!(msg.contains("max_upload_size_mb"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_validate_short_passphrase() {
        let mut config = Config::default();
        config.network.passphrase = "short".to_string();
        assert!(config.validate().is_err());

        config.network.passphrase = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ssid_length() {
        let mut config = Config::default();
        config.network.ssid = String::new();
        assert!(config.validate().is_err());

        config.network.ssid = "x".repeat(33);
        assert!(config.validate().is_err());
    }
}
