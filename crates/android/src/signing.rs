//! Release signing identity from `key.properties`
//!
//! Values are copied verbatim. Whether the alias or passwords are correct is
//! only discovered when the packaging tool opens the keystore.

use flavorkit_core::properties::PropertySource;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Key alias property
pub const KEY_ALIAS: &str = "keyAlias";
/// Key password property
pub const KEY_PASSWORD: &str = "keyPassword";
/// Keystore path property
pub const STORE_FILE: &str = "storeFile";
/// Keystore password property
pub const STORE_PASSWORD: &str = "storePassword";

const REDACTED: &str = "********";

/// Credentials for signing a release artifact
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningIdentity {
    /// Alias of the signing key inside the keystore
    pub key_alias: Option<String>,
    /// Password of the signing key
    pub key_password: Option<String>,
    /// Keystore location, unresolved
    pub store_file: Option<PathBuf>,
    /// Password of the keystore
    pub store_password: Option<String>,
}

impl SigningIdentity {
    /// Read the identity from a keystore source; `None` when the source is empty
    #[must_use]
    pub fn from_source(keystore: &PropertySource) -> Option<Self> {
        if keystore.is_empty() {
            return None;
        }

        Some(Self {
            key_alias: keystore.get(KEY_ALIAS).map(String::from),
            key_password: keystore.get(KEY_PASSWORD).map(String::from),
            store_file: keystore.get(STORE_FILE).map(PathBuf::from),
            store_password: keystore.get(STORE_PASSWORD).map(String::from),
        })
    }

    /// Whether all four fields are present
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.key_alias.is_some()
            && self.key_password.is_some()
            && self.store_file.is_some()
            && self.store_password.is_some()
    }

    /// Names of the properties that were not supplied
    #[must_use]
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.key_alias.is_none() {
            missing.push(KEY_ALIAS);
        }
        if self.key_password.is_none() {
            missing.push(KEY_PASSWORD);
        }
        if self.store_file.is_none() {
            missing.push(STORE_FILE);
        }
        if self.store_password.is_none() {
            missing.push(STORE_PASSWORD);
        }
        missing
    }

    /// Copy with both passwords masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            key_password: self.key_password.as_ref().map(|_| REDACTED.to_string()),
            store_password: self.store_password.as_ref().map(|_| REDACTED.to_string()),
            ..self.clone()
        }
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = self.redacted();
        f.debug_struct("SigningIdentity")
            .field("key_alias", &redacted.key_alias)
            .field("key_password", &redacted.key_password)
            .field("store_file", &redacted.store_file)
            .field("store_password", &redacted.store_password)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keystore() -> PropertySource {
        PropertySource::from_pairs([
            ("keyAlias", "k"),
            ("keyPassword", "p"),
            ("storeFile", "/ks.jks"),
            ("storePassword", "s"),
        ])
    }

    #[test]
    fn test_from_source_copies_verbatim() {
        let identity = SigningIdentity::from_source(&keystore()).unwrap();
        assert_eq!(identity.key_alias.as_deref(), Some("k"));
        assert_eq!(identity.key_password.as_deref(), Some("p"));
        assert_eq!(identity.store_file, Some(PathBuf::from("/ks.jks")));
        assert_eq!(identity.store_password.as_deref(), Some("s"));
        assert!(identity.is_complete());
        assert!(identity.missing_keys().is_empty());
    }

    #[test]
    fn test_empty_source_has_no_identity() {
        assert!(SigningIdentity::from_source(&PropertySource::new()).is_none());
    }

    #[test]
    fn test_partial_source() {
        let source = PropertySource::from_pairs([("keyAlias", "upload")]);
        let identity = SigningIdentity::from_source(&source).unwrap();
        assert!(!identity.is_complete());
        assert_eq!(
            identity.missing_keys(),
            vec![KEY_PASSWORD, STORE_FILE, STORE_PASSWORD]
        );
    }

    #[test]
    fn test_debug_output_hides_passwords() {
        let identity = SigningIdentity::from_source(&keystore()).unwrap();
        let debug = format!("{identity:?}");
        assert!(debug.contains("\"k\""));
        assert!(!debug.contains("\"p\""));
        assert!(!debug.contains("\"s\""));
        assert!(debug.contains(REDACTED));
    }

    #[test]
    fn test_redacted_keeps_absent_passwords_absent() {
        let source = PropertySource::from_pairs([("keyAlias", "upload"), ("storePassword", "x")]);
        let redacted = SigningIdentity::from_source(&source).unwrap().redacted();
        assert_eq!(redacted.key_password, None);
        assert_eq!(redacted.store_password.as_deref(), Some(REDACTED));
        assert_eq!(redacted.key_alias.as_deref(), Some("upload"));
    }
}
