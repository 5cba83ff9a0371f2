//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

const CANDIDATES: [&str; 3] = [".flavorkit.toml", "flavorkit.toml", ".config/flavorkit.toml"];

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
    /// Directory relative paths in the schema are resolved against
    pub root: PathBuf,
}

impl Config {
    /// Load configuration for the project at `root`.
    ///
    /// An explicit `path` must exist. Without one, the standard locations
    /// under `root` are searched and defaults are used if none is found.
    pub fn load(root: &Path, path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(root),
        };

        let schema = if let Some(ref p) = config_path {
            load_config_file(p)?
        } else {
            ConfigSchema::default()
        };

        Ok(Self {
            schema,
            path: config_path,
            root: root.to_path_buf(),
        })
    }

    /// Defaults only (no file)
    #[must_use]
    pub fn defaults(root: &Path) -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
            root: root.to_path_buf(),
        }
    }

    /// Android project directory
    #[must_use]
    pub fn android_dir(&self) -> PathBuf {
        self.root.join(&self.schema.project.android_dir)
    }

    /// Path of the developer properties file
    #[must_use]
    pub fn local_properties_path(&self) -> PathBuf {
        self.android_dir().join(&self.schema.sources.local_properties)
    }

    /// Path of the signing properties file
    #[must_use]
    pub fn key_properties_path(&self) -> PathBuf {
        self.android_dir().join(&self.schema.sources.key_properties)
    }

    /// Path of the optional defaults properties file
    #[must_use]
    pub fn defaults_path(&self) -> Option<PathBuf> {
        self.schema
            .sources
            .defaults
            .as_ref()
            .map(|p| self.android_dir().join(p))
    }
}

/// Find configuration file in standard locations
fn find_config_file(root: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|p| p.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {e}", path.display()))
    })?;

    let schema: ConfigSchema = toml::from_str(&content)
        .map_err(Error::from)
        .context(format!("In {}", path.display()))?;

    tracing::debug!(path = %path.display(), "Loaded configuration");
    Ok(schema)
}
