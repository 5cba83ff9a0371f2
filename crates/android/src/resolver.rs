//! Build-variant resolution
//!
//! A [`ResolvedConfig`] is computed by layering, lowest to highest precedence:
//!
//! 1. Compiled-in defaults (`versionCode = 1`, `versionName = "1.0"`)
//! 2. The `defaults` and `local` property sources
//! 3. The `keystore` source (signing identity, release only)
//! 4. The static variant and channel tables
//!
//! Resolution is a pure function of its inputs and never fails: missing or
//! malformed optional values fall back to the layer below.
//!
//! # Example
//!
//! ```rust
//! use flavorkit_android::{resolve, BuildVariant, Channel, PropertySources};
//! use flavorkit_core::properties::PropertySource;
//!
//! let sources = PropertySources {
//!     local: PropertySource::parse("flutter.versionCode=42\nflutter.versionName=2.1.0\n"),
//!     ..PropertySources::default()
//! };
//!
//! let config = resolve(BuildVariant::Debug, Channel::Xiaomi, &sources);
//! assert_eq!(config.version_code, 42);
//! assert_eq!(config.full_version_name(), "2.1.0-debug-mi");
//! assert_eq!(config.application_id("com.example.demo"), "com.example.demo.debug.xiaomi");
//! ```

use crate::channel::Channel;
use crate::signing::SigningIdentity;
use crate::variant::BuildVariant;
use chrono::{DateTime, Local};
use flavorkit_core::config::Config;
use flavorkit_core::error::{Result, ResultExt};
use flavorkit_core::git;
use flavorkit_core::properties::{PropertyLayers, PropertySource};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Developer-supplied version code
pub const KEY_VERSION_CODE: &str = "flutter.versionCode";
/// Developer-supplied version name
pub const KEY_VERSION_NAME: &str = "flutter.versionName";
/// Flutter SDK location, used only for toolchain discovery
pub const KEY_FLUTTER_SDK: &str = "flutter.sdk";

/// Version code when no source supplies a valid one
pub const DEFAULT_VERSION_CODE: u32 = 1;
/// Version name when no source supplies one
pub const DEFAULT_VERSION_NAME: &str = "1.0";
/// Value of the `BUILD_TYPE_NAME` build constant
pub const BUILD_TYPE_NAME: &str = "android";

/// The property inputs to a resolution
#[derive(Debug, Clone, Default)]
pub struct PropertySources {
    /// Project-wide defaults, lowest precedence
    pub defaults: PropertySource,
    /// Developer properties (`local.properties`)
    pub local: PropertySource,
    /// Signing properties (`key.properties`)
    pub keystore: PropertySource,
}

impl PropertySources {
    /// Load all sources from the locations named in `config`.
    ///
    /// Absent files yield empty sources; unreadable files are errors.
    pub fn load(config: &Config) -> Result<Self> {
        let defaults = match config.defaults_path() {
            Some(path) => PropertySource::load_optional(&path)
                .context("While loading default properties")?,
            None => PropertySource::new(),
        };
        let local = PropertySource::load_optional(&config.local_properties_path())
            .context("While loading developer properties")?;
        let keystore = PropertySource::load_optional(&config.key_properties_path())
            .context("While loading signing properties")?;

        Ok(Self {
            defaults,
            local,
            keystore,
        })
    }
}

/// Build provenance embedded alongside a resolved configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Traceability {
    /// Short commit hash, or `unknown`
    pub git_commit: String,
    /// Local time the build was configured
    pub build_time: DateTime<Local>,
    /// Platform tag
    pub build_type_name: String,
}

impl Traceability {
    /// Stamp with explicit values
    #[must_use]
    pub fn new(git_commit: impl Into<String>, build_time: DateTime<Local>) -> Self {
        Self {
            git_commit: git_commit.into(),
            build_time,
            build_type_name: BUILD_TYPE_NAME.to_string(),
        }
    }

    /// Look up the commit of the repository containing `dir` and stamp the current time
    #[must_use]
    pub fn capture(dir: &Path) -> Self {
        Self::new(git::short_commit_or_unknown(dir), Local::now())
    }

    /// Build time as a local date-time without offset, e.g. `2024-05-01T10:20:30.123`
    #[must_use]
    pub fn build_time_string(&self) -> String {
        self.build_time.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
    }
}

/// Flat configuration record for one (variant, channel) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ResolvedConfig {
    pub variant: BuildVariant,
    pub channel: Channel,
    /// Flavor dimension the channel belongs to
    pub flavor_dimension: &'static str,
    /// Channel suffix of the application id
    pub application_id_suffix: String,
    /// Channel suffix of the version name
    pub version_name_suffix: String,
    /// Variant suffix of the application id, applied by the packaging tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_application_id_suffix: Option<String>,
    /// Variant suffix of the version name, applied by the packaging tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_version_name_suffix: Option<String>,
    pub version_code: u32,
    pub version_name: String,
    pub is_debug: bool,
    pub debuggable: bool,
    pub api_base_url: String,
    pub channel_label: String,
    pub minify_enabled: bool,
    pub shrink_resources: bool,
    /// Variants a dependency may substitute when it lacks this one
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matching_fallbacks: Vec<BuildVariant>,
    pub manifest_placeholders: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signing: Option<SigningIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traceability: Option<Traceability>,
}

impl ResolvedConfig {
    /// `base` + variant suffix + channel suffix
    #[must_use]
    pub fn application_id(&self, base: &str) -> String {
        let mut id = base.to_string();
        if let Some(suffix) = &self.variant_application_id_suffix {
            id.push_str(suffix);
        }
        id.push_str(&self.application_id_suffix);
        id
    }

    /// Version name + variant suffix + channel suffix
    #[must_use]
    pub fn full_version_name(&self) -> String {
        let mut name = self.version_name.clone();
        if let Some(suffix) = &self.variant_version_name_suffix {
            name.push_str(suffix);
        }
        name.push_str(&self.version_name_suffix);
        name
    }

    /// Gradle's name for the flavor/build-type combination, e.g. `huaweiRelease`
    #[must_use]
    pub fn gradle_variant_name(&self) -> String {
        format!("{}{}", self.channel.as_str(), self.variant.gradle_name())
    }

    /// Attach build provenance
    #[must_use]
    pub fn with_traceability(mut self, traceability: Traceability) -> Self {
        self.traceability = Some(traceability);
        self
    }

    /// Copy safe to print: signing passwords masked
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            signing: self.signing.as_ref().map(SigningIdentity::redacted),
            ..self.clone()
        }
    }
}

/// Version identity shared by every (variant, channel) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppVersion {
    /// Monotonic build number
    pub version_code: u32,
    /// Human-readable version, before any suffixes
    pub version_name: String,
}

/// Version code and name from the `defaults` and `local` sources
#[must_use]
pub fn resolve_version(sources: &PropertySources) -> AppVersion {
    let layers = PropertyLayers::new()
        .with(&sources.defaults)
        .with(&sources.local);

    let version_code = layers
        .get_where(KEY_VERSION_CODE, parse_version_code)
        .unwrap_or(DEFAULT_VERSION_CODE);
    let version_name = layers
        .get(KEY_VERSION_NAME)
        .map_or_else(|| DEFAULT_VERSION_NAME.to_string(), str::to_string);

    AppVersion {
        version_code,
        version_name,
    }
}

/// Resolve the configuration for one (variant, channel) pair
#[must_use]
pub fn resolve(variant: BuildVariant, channel: Channel, sources: &PropertySources) -> ResolvedConfig {
    let AppVersion {
        version_code,
        version_name,
    } = resolve_version(sources);

    let v = variant.profile();
    let c = channel.profile();

    let mut manifest_placeholders = BTreeMap::new();
    if let Some(app_name) = v.app_name {
        manifest_placeholders.insert("app_name".to_string(), app_name.to_string());
    }
    if let Some(app_icon) = v.app_icon {
        manifest_placeholders.insert("app_icon".to_string(), app_icon.to_string());
    }
    manifest_placeholders.insert("channel_name".to_string(), c.label.to_string());

    let signing = if v.release_signing {
        SigningIdentity::from_source(&sources.keystore)
    } else {
        None
    };

    tracing::debug!(
        %variant,
        %channel,
        version_code,
        version_name = %version_name,
        signed = signing.is_some(),
        "Resolved build configuration"
    );

    ResolvedConfig {
        variant,
        channel,
        flavor_dimension: Channel::DIMENSION,
        application_id_suffix: c.application_id_suffix.to_string(),
        version_name_suffix: c.version_name_suffix.to_string(),
        variant_application_id_suffix: v.application_id_suffix.map(String::from),
        variant_version_name_suffix: v.version_name_suffix.map(String::from),
        version_code,
        version_name,
        is_debug: v.is_debug,
        debuggable: v.debuggable,
        api_base_url: v.api_base_url.to_string(),
        channel_label: c.label.to_string(),
        minify_enabled: v.minify_enabled,
        shrink_resources: v.shrink_resources,
        matching_fallbacks: v.matching_fallbacks.to_vec(),
        manifest_placeholders,
        signing,
        traceability: None,
    }
}

/// Resolve every (variant, channel) pair, variant-major
#[must_use]
pub fn resolve_matrix(sources: &PropertySources) -> Vec<ResolvedConfig> {
    BuildVariant::ALL
        .into_iter()
        .flat_map(|variant| {
            Channel::ALL
                .into_iter()
                .map(move |channel| resolve(variant, channel, sources))
        })
        .collect()
}

/// Parse a version code; only positive 32-bit integers are accepted
#[must_use]
pub fn parse_version_code(raw: &str) -> Option<u32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|code| *code >= 1)
        .and_then(|code| u32::try_from(code).ok())
}
