//! Build variants and their static override table

use flavorkit_core::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Build configuration profile controlling optimization and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    /// Debuggable development build against the dev backend
    Debug,
    /// Minified, signed production build
    Release,
    /// Minified build against staging, signed with the debug key
    Profile,
}

/// Per-variant overrides applied on top of the property sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantProfile {
    /// Value of the `IS_DEBUG` build constant
    pub is_debug: bool,
    /// Whether the packaged app is debuggable
    pub debuggable: bool,
    /// Backend the build talks to
    pub api_base_url: &'static str,
    /// Request code minification from the packaging tool
    pub minify_enabled: bool,
    /// Request resource shrinking from the packaging tool
    pub shrink_resources: bool,
    /// Appended to the application id by the packaging tool
    pub application_id_suffix: Option<&'static str>,
    /// Appended to the version name by the packaging tool
    pub version_name_suffix: Option<&'static str>,
    /// `app_name` manifest placeholder
    pub app_name: Option<&'static str>,
    /// `app_icon` manifest placeholder
    pub app_icon: Option<&'static str>,
    /// Signed with the release keystore rather than the debug key
    pub release_signing: bool,
    /// Variants a dependency may substitute when it lacks this one
    pub matching_fallbacks: &'static [BuildVariant],
}

static DEBUG: VariantProfile = VariantProfile {
    is_debug: true,
    debuggable: true,
    api_base_url: "https://api-dev.example.com",
    minify_enabled: false,
    shrink_resources: false,
    application_id_suffix: Some(".debug"),
    version_name_suffix: Some("-debug"),
    app_name: Some("Demo Debug"),
    app_icon: Some("@mipmap/ic_launcher_debug"),
    release_signing: false,
    matching_fallbacks: &[],
};

static RELEASE: VariantProfile = VariantProfile {
    is_debug: false,
    debuggable: false,
    api_base_url: "https://api.example.com",
    minify_enabled: true,
    shrink_resources: true,
    application_id_suffix: None,
    version_name_suffix: None,
    app_name: Some("Demo"),
    app_icon: Some("@mipmap/ic_launcher"),
    release_signing: true,
    matching_fallbacks: &[],
};

static PROFILE: VariantProfile = VariantProfile {
    is_debug: false,
    debuggable: false,
    api_base_url: "https://api-staging.example.com",
    minify_enabled: true,
    shrink_resources: true,
    application_id_suffix: None,
    version_name_suffix: None,
    app_name: None,
    app_icon: None,
    release_signing: false,
    matching_fallbacks: &[BuildVariant::Debug, BuildVariant::Release],
};

impl BuildVariant {
    /// Every variant, in declaration order
    pub const ALL: [BuildVariant; 3] = [Self::Debug, Self::Release, Self::Profile];

    /// Static overrides for this variant
    #[must_use]
    pub fn profile(self) -> &'static VariantProfile {
        match self {
            Self::Debug => &DEBUG,
            Self::Release => &RELEASE,
            Self::Profile => &PROFILE,
        }
    }

    /// Lowercase name as used on the command line
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::Profile => "profile",
        }
    }

    /// Capitalized name as it appears in Gradle task names
    #[must_use]
    pub fn gradle_name(self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::Profile => "Profile",
        }
    }
}

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::validation(format!("Unknown build variant: {s}"))
                    .with_suggestion("Use one of: debug, release, profile")
            })
    }
}
