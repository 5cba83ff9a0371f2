//! Configuration schema definitions

use serde::{Deserialize, Serialize};

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Android project layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Application id before variant and channel suffixes
    #[serde(default = "default_base_application_id")]
    pub base_application_id: String,

    /// Android project directory, relative to the project root
    #[serde(default = "default_android_dir")]
    pub android_dir: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            base_application_id: default_base_application_id(),
            android_dir: default_android_dir(),
        }
    }
}

fn default_base_application_id() -> String {
    "com.example.demo".to_string()
}

fn default_android_dir() -> String {
    "android".to_string()
}

/// Property files feeding the variant resolver, relative to the Android directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Developer properties (`flutter.versionCode`, `flutter.versionName`, `flutter.sdk`)
    #[serde(default = "default_local_properties")]
    pub local_properties: String,

    /// Signing properties (`keyAlias`, `keyPassword`, `storeFile`, `storePassword`)
    #[serde(default = "default_key_properties")]
    pub key_properties: String,

    /// Optional project-wide defaults, below `local_properties` in precedence
    #[serde(default)]
    pub defaults: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            local_properties: default_local_properties(),
            key_properties: default_key_properties(),
            defaults: None,
        }
    }
}

fn default_local_properties() -> String {
    "local.properties".to_string()
}

fn default_key_properties() -> String {
    "key.properties".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON log lines instead of the compact format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
