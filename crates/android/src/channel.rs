//! Distribution channels and their static override table

use flavorkit_core::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distribution target; orthogonal to [`crate::BuildVariant`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Google Play Store
    Googleplay,
    /// Huawei AppGallery
    Huawei,
    /// Xiaomi GetApps
    Xiaomi,
    /// Direct APK download
    Direct,
}

/// Per-channel overrides
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelProfile {
    /// Appended to the application id
    pub application_id_suffix: &'static str,
    /// Appended to the version name
    pub version_name_suffix: &'static str,
    /// Value of the `CHANNEL` build constant and `channel_name` placeholder
    pub label: &'static str,
}

static GOOGLEPLAY: ChannelProfile = ChannelProfile {
    application_id_suffix: ".googleplay",
    version_name_suffix: "-gp",
    label: "GooglePlay",
};

static HUAWEI: ChannelProfile = ChannelProfile {
    application_id_suffix: ".huawei",
    version_name_suffix: "-hw",
    label: "Huawei",
};

static XIAOMI: ChannelProfile = ChannelProfile {
    application_id_suffix: ".xiaomi",
    version_name_suffix: "-mi",
    label: "Xiaomi",
};

static DIRECT: ChannelProfile = ChannelProfile {
    application_id_suffix: ".direct",
    version_name_suffix: "-direct",
    label: "Direct",
};

impl Channel {
    /// Every channel, in declaration order
    pub const ALL: [Channel; 4] = [Self::Googleplay, Self::Huawei, Self::Xiaomi, Self::Direct];

    /// Flavor dimension the channels belong to
    pub const DIMENSION: &'static str = "channel";

    /// Static overrides for this channel
    #[must_use]
    pub fn profile(self) -> &'static ChannelProfile {
        match self {
            Self::Googleplay => &GOOGLEPLAY,
            Self::Huawei => &HUAWEI,
            Self::Xiaomi => &XIAOMI,
            Self::Direct => &DIRECT,
        }
    }

    /// Lowercase flavor name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Googleplay => "googleplay",
            Self::Huawei => "huawei",
            Self::Xiaomi => "xiaomi",
            Self::Direct => "direct",
        }
    }

    /// Flavor name with its first letter capitalized, as in Gradle task names
    #[must_use]
    pub fn gradle_name(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::validation(format!("Unknown channel: {s}"))
                    .with_suggestion("Use one of: googleplay, huawei, xiaomi, direct")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_huawei_profile() {
        let p = Channel::Huawei.profile();
        assert_eq!(p.application_id_suffix, ".huawei");
        assert_eq!(p.version_name_suffix, "-hw");
        assert_eq!(p.label, "Huawei");
    }

    #[test]
    fn test_channel_suffixes_are_distinct() {
        let ids: HashSet<_> = Channel::ALL
            .iter()
            .map(|c| c.profile().application_id_suffix)
            .collect();
        let names: HashSet<_> = Channel::ALL
            .iter()
            .map(|c| c.profile().version_name_suffix)
            .collect();
        assert_eq!(ids.len(), Channel::ALL.len());
        assert_eq!(names.len(), Channel::ALL.len());
    }

    #[test]
    fn test_id_suffix_matches_flavor_name() {
        for channel in Channel::ALL {
            assert_eq!(
                channel.profile().application_id_suffix,
                format!(".{}", channel.as_str())
            );
        }
    }

    #[test]
    fn test_gradle_name() {
        assert_eq!(Channel::Googleplay.gradle_name(), "Googleplay");
        assert_eq!(Channel::Xiaomi.gradle_name(), "Xiaomi");
    }

    #[test]
    fn test_from_str() {
        assert_eq!("HUAWEI".parse::<Channel>().unwrap(), Channel::Huawei);
        assert!("appstore".parse::<Channel>().is_err());
    }
}
