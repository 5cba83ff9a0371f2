//! Android build-variant resolution
//!
//! This crate turns layered property files plus a (variant, channel) pair
//! into the flat configuration an Android build consumes:
//! - Variant and channel override tables
//! - Release signing identity
//! - The resolver and the full variant matrix
//! - `BuildConfig` constant rendering
//! - Gradle task naming and wrapper delegation
//! - Flutter SDK discovery

#![warn(missing_docs)]

pub mod build_config;
pub mod channel;
pub mod gradle;
pub mod resolver;
pub mod sdk;
pub mod signing;
pub mod variant;

pub use channel::Channel;
pub use resolver::{
    resolve, resolve_matrix, resolve_version, AppVersion, PropertySources, ResolvedConfig,
    Traceability,
};
pub use signing::SigningIdentity;
pub use variant::BuildVariant;
