//! Core utilities for flavorkit development tools
//!
//! This crate provides shared functionality used by the Android variant tooling:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Properties**: Java-style `.properties` sources and layered lookup
//! - **Git operations**: Best-effort revision lookup using command-line git
//! - **Process execution**: Command execution with captured output
//! - **Configuration**: TOML-based tool configuration
//! - **Health checks**: Verify tool dependencies and environment
//!
//! # Example
//!
//! ```rust,no_run
//! use flavorkit_core::git;
//! use flavorkit_core::properties::PropertySource;
//! use std::path::Path;
//!
//! let local = PropertySource::load_optional(Path::new("android/local.properties"))
//!     .expect("local.properties is unreadable");
//! let version = local.get("flutter.versionName").unwrap_or("1.0");
//!
//! // Never fails: falls back to "unknown"
//! let commit = git::short_commit_or_unknown(Path::new("."));
//! println!("{version} ({commit})");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod git;
pub mod health;
pub mod process;
pub mod properties;

pub use error::{Error, ErrorCode, Result, ResultExt};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result, ResultExt};
    pub use crate::git::{short_commit_or_unknown, GitRepo, UNKNOWN_REVISION};
    pub use crate::health::{HealthChecker, HealthReport, HealthStatus};
    pub use crate::properties::{PropertyLayers, PropertySource};
}
