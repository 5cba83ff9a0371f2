//! Flutter SDK discovery

use crate::resolver::KEY_FLUTTER_SDK;
use flavorkit_core::health::{CheckResult, HealthCheck};
use flavorkit_core::properties::PropertySource;
use std::fmt;
use std::path::PathBuf;

/// Environment variable consulted when `flutter.sdk` is not set
pub const FLUTTER_ROOT_ENV: &str = "FLUTTER_ROOT";

/// Where an SDK location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkSource {
    /// `flutter.sdk` in the developer properties
    LocalProperties,
    /// The `FLUTTER_ROOT` environment variable
    Environment,
}

impl fmt::Display for SdkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocalProperties => f.write_str(KEY_FLUTTER_SDK),
            Self::Environment => f.write_str(FLUTTER_ROOT_ENV),
        }
    }
}

/// A configured Flutter SDK location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlutterSdk {
    /// SDK root with `~` expanded
    pub root: PathBuf,
    /// Where the location was configured
    pub source: SdkSource,
}

impl FlutterSdk {
    /// Whether the root directory exists
    #[must_use]
    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }
}

/// Locate the SDK from `flutter.sdk`, falling back to `env_root`.
///
/// Blank values are treated as unset.
#[must_use]
pub fn discover_flutter_sdk(local: &PropertySource, env_root: Option<&str>) -> Option<FlutterSdk> {
    let configured = |raw: &str| {
        let raw = raw.trim();
        (!raw.is_empty()).then(|| PathBuf::from(shellexpand::tilde(raw).as_ref()))
    };

    if let Some(root) = local.get(KEY_FLUTTER_SDK).and_then(configured) {
        return Some(FlutterSdk {
            root,
            source: SdkSource::LocalProperties,
        });
    }

    env_root.and_then(configured).map(|root| FlutterSdk {
        root,
        source: SdkSource::Environment,
    })
}

/// Health check reporting the discovered SDK; a missing SDK only degrades
pub struct FlutterSdkCheck {
    sdk: Option<FlutterSdk>,
}

impl FlutterSdkCheck {
    /// Check the SDK configured by `local` or the process environment
    #[must_use]
    pub fn new(local: &PropertySource) -> Self {
        let env_root = std::env::var(FLUTTER_ROOT_ENV).ok();
        Self::with_env(local, env_root.as_deref())
    }

    /// Check the SDK configured by `local` or the given `FLUTTER_ROOT` value
    #[must_use]
    pub fn with_env(local: &PropertySource, env_root: Option<&str>) -> Self {
        Self {
            sdk: discover_flutter_sdk(local, env_root),
        }
    }
}

impl HealthCheck for FlutterSdkCheck {
    fn check(&self) -> CheckResult {
        const NAME: &str = "flutter-sdk";

        match &self.sdk {
            None => CheckResult::degraded(
                NAME,
                format!("Neither {KEY_FLUTTER_SDK} nor {FLUTTER_ROOT_ENV} is set"),
            ),
            Some(sdk) if !sdk.exists() => CheckResult::degraded(
                NAME,
                format!("{} (from {}) does not exist", sdk.root.display(), sdk.source),
            ),
            Some(sdk) => CheckResult::healthy(NAME)
                .with_detail("path", sdk.root.display().to_string())
                .with_detail("source", sdk.source.to_string()),
        }
    }
}
