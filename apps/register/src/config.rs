//! # Register Configuration
//!
//! Configuration for one stand's register.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SNACK_DEVICE_NAME, SNACK_ADMIN_PIN,                                │
//! │     SNACK_SYNC_MODE, SNACK_DATA_DIR                                    │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pos/pos.toml (Linux)                                     │
//! │     ~/Library/Application Support/com.snackstand.pos/pos.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     name "Snack Stand", PIN 1234, live sync                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # pos.toml
//! [stand]
//! name = "Front Yard Stand"
//! admin_pin = "1234"
//!
//! [sync]
//! mode = "live"  # live | offline
//!
//! [storage]
//! # data_dir = "/var/lib/snack-pos"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// PIN every register ships with until someone changes it.
pub const DEFAULT_ADMIN_PIN: &str = "1234";

// =============================================================================
// Sync Mode
// =============================================================================

/// Whether this register talks to the shared remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Reconcile against the remote store (pull, fold, mirror).
    #[default]
    Live,

    /// Local operations only; nothing leaves the device.
    Offline,
}

impl SyncMode {
    /// Returns true if sync is enabled at all.
    pub fn is_sync_enabled(&self) -> bool {
        matches!(self, SyncMode::Live)
    }
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::Live => write!(f, "live"),
            SyncMode::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for SyncMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" | "online" => Ok(SyncMode::Live),
            "offline" | "disabled" => Ok(SyncMode::Offline),
            other => Err(ConfigError::InvalidValue(format!(
                "Unknown sync mode: '{other}'. Valid options: live, offline"
            ))),
        }
    }
}

// =============================================================================
// Stand Configuration
// =============================================================================

/// Identity and access settings for this stand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandConfig {
    /// Display name for this register (shows up in logs).
    #[serde(default = "default_stand_name")]
    pub name: String,

    /// Four-digit PIN that unlocks the admin screen.
    #[serde(default = "default_admin_pin")]
    pub admin_pin: String,
}

fn default_stand_name() -> String {
    "Snack Stand".to_string()
}

fn default_admin_pin() -> String {
    DEFAULT_ADMIN_PIN.to_string()
}

impl Default for StandConfig {
    fn default() -> Self {
        StandConfig {
            name: default_stand_name(),
            admin_pin: default_admin_pin(),
        }
    }
}

// =============================================================================
// Sync Settings
// =============================================================================

/// Sync behavior settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Sync mode for this register.
    #[serde(default)]
    pub mode: SyncMode,
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the snapshot document lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Override for the data directory. When unset, the platform data
    /// dir is used.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

// =============================================================================
// Main App Configuration
// =============================================================================

/// Complete register configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Stand identity and access.
    #[serde(default)]
    pub stand: StandConfig,

    /// Sync behavior.
    #[serde(default)]
    pub sync: SyncSettings,

    /// Storage locations.
    #[serde(default)]
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (pos.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading register config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns the default if the load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load register config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stand.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "stand.name must not be empty".into(),
            ));
        }

        // The lock screen is a speed bump for the stand's kid sibling,
        // not a vault, but the PIN shape is fixed.
        let pin = &self.stand.admin_pin;
        if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidPin);
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(name) = std::env::var("SNACK_DEVICE_NAME") {
            self.stand.name = name;
        }

        if let Ok(pin) = std::env::var("SNACK_ADMIN_PIN") {
            self.stand.admin_pin = pin;
        }

        if let Ok(mode) = std::env::var("SNACK_SYNC_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding sync mode from environment");
                    self.sync.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown sync mode in environment"),
            }
        }

        if let Ok(dir) = std::env::var("SNACK_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "snackstand", "pos")
            .map(|dirs| dirs.config_dir().join("pos.toml"))
    }

    /// Resolves the directory the snapshot document lives in.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.storage.data_dir {
            return dir.clone();
        }
        directories::ProjectDirs::from("com", "snackstand", "pos")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the stand's display name.
    pub fn device_name(&self) -> &str {
        &self.stand.name
    }

    /// Returns the admin PIN.
    pub fn admin_pin(&self) -> &str {
        &self.stand.admin_pin
    }

    /// Returns true if sync is enabled.
    pub fn is_sync_enabled(&self) -> bool {
        self.sync.mode.is_sync_enabled()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidValue(String),

    #[error("admin_pin must be exactly four digits")]
    InvalidPin,

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.admin_pin(), "1234");
        assert_eq!(config.sync.mode, SyncMode::Live);
        assert!(config.is_sync_enabled());
    }

    #[test]
    fn test_sync_mode_parsing() {
        assert_eq!("live".parse::<SyncMode>().unwrap(), SyncMode::Live);
        assert_eq!("online".parse::<SyncMode>().unwrap(), SyncMode::Live);
        assert_eq!("offline".parse::<SyncMode>().unwrap(), SyncMode::Offline);
        assert_eq!("disabled".parse::<SyncMode>().unwrap(), SyncMode::Offline);
        assert!("sometimes".parse::<SyncMode>().is_err());
    }

    #[test]
    fn test_pin_validation() {
        let mut config = AppConfig::default();

        config.stand.admin_pin = "0000".to_string();
        assert!(config.validate().is_ok());

        for bad in ["123", "12345", "12a4", "", "١٢٣٤"] {
            config.stand.admin_pin = bad.to_string();
            assert!(config.validate().is_err(), "PIN {bad:?} should be rejected");
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.toml");
        std::fs::write(
            &path,
            r#"
[stand]
name = "Corner Stand"
admin_pin = "4321"

[sync]
mode = "offline"
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(path)).unwrap();
        assert_eq!(config.device_name(), "Corner Stand");
        assert_eq!(config.admin_pin(), "4321");
        assert!(!config.is_sync_enabled());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.toml");
        std::fs::write(&path, "[stand]\nname = \"Just A Name\"\n").unwrap();

        let config = AppConfig::load(Some(path)).unwrap();
        assert_eq!(config.device_name(), "Just A Name");
        assert_eq!(config.admin_pin(), DEFAULT_ADMIN_PIN);
        assert_eq!(config.sync.mode, SyncMode::Live);
    }

    #[test]
    fn test_bad_pin_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pos.toml");
        std::fs::write(&path, "[stand]\nadmin_pin = \"abcd\"\n").unwrap();

        assert!(AppConfig::load(Some(path)).is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[stand]"));
        assert!(toml_str.contains("[sync]"));
        let back: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.admin_pin(), config.admin_pin());
    }
}
