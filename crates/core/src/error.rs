//! Error type shared by the flavorkit crates
//!
//! Every failure carries an [`ErrorCode`] that decides the process exit
//! status, plus optional context and a hint printed beneath the message.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Stable failure codes; the thousands digit selects the exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum ErrorCode {
    // Filesystem (2xxx)
    InvalidPath = 2003,

    // Tool configuration and property files (3xxx)
    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    PropertiesError = 3005,

    // Git (4xxx)
    GitError = 4000,
    NotAGitRepo = 4001,

    // Child processes (5xxx)
    ProcessError = 5000,
    CommandNotFound = 5001,

    // Rejected user input (6xxx)
    ValidationError = 6000,

    // Gradle (8xxx)
    GradleError = 8002,
}

impl ErrorCode {
    /// Numeric value, e.g. `3005`
    #[must_use]
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Process exit status for a command failing with this code
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self.code() / 1000 {
            3 => exit_codes::CONFIG_ERROR,
            4 => exit_codes::GIT_ERROR,
            6 => exit_codes::VALIDATION_ERROR,
            _ if *self == ErrorCode::CommandNotFound => exit_codes::COMMAND_NOT_FOUND,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// A failure with its code, where it happened and what to try next
#[derive(Error, Debug)]
pub struct Error {
    /// Decides the exit status
    pub code: ErrorCode,
    /// One-line description
    pub message: String,
    /// What was being done when the failure occurred
    pub context: Option<String>,
    /// Hint shown to the user
    pub suggestion: Option<String>,
    /// Underlying cause
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Error with `code` and `message` and nothing else attached
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Replace the context line
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Replace the hint
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach the underlying cause
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Flat form for structured logs
    #[must_use]
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(ToString::to_string),
        }
    }

    /// `.flavorkit.toml` could not be read
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// The file named by `--config` does not exist
    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .flavorkit.toml file or use --config to specify a path")
    }

    /// A `.properties` file could not be read or written
    pub fn properties(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::PropertiesError,
            format!("{}: {}", path.as_ref().display(), message.into()),
        )
    }

    /// `git` ran but did not produce a revision
    pub fn git(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GitError, message)
    }

    /// The directory is outside any git work tree
    #[must_use]
    pub fn not_a_git_repo() -> Self {
        Self::new(ErrorCode::NotAGitRepo, "Not a git repository")
    }

    /// A child process could not be started
    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    /// `cmd` is not on `PATH` or not executable
    #[must_use]
    pub fn command_not_found(cmd: &str) -> Self {
        Self::new(ErrorCode::CommandNotFound, format!("Command not found: {cmd}"))
            .with_suggestion(format!("Install {cmd} and ensure it's in your PATH"))
    }

    /// A variant, channel, format or version value was rejected
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// The Gradle wrapper is missing or exited with a failure
    pub fn gradle(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GradleError, message)
    }
}

/// Serializable snapshot of an [`Error`]
#[derive(Debug, Clone, Serialize)]
#[allow(missing_docs)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit statuses
#[allow(missing_docs)]
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const VALIDATION_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const GIT_ERROR: i32 = 4;
    pub const COMMAND_NOT_FOUND: i32 = 127;
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("JSON error: {err}")).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {err}"))
            .with_source(err)
    }
}

/// Attach context or a hint to the error side of a [`Result`]
pub trait ResultExt<T> {
    /// Set the context line of the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
    /// Set the hint of the error, if any
    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_suggestion(self, suggestion: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_suggestion(suggestion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::InvalidPath.to_string(), "E2003");
        assert_eq!(ErrorCode::PropertiesError.to_string(), "E3005");
    }

    #[test]
    fn test_error_code_exit_code() {
        assert_eq!(ErrorCode::ConfigParseError.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorCode::PropertiesError.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(ErrorCode::NotAGitRepo.exit_code(), exit_codes::GIT_ERROR);
        assert_eq!(ErrorCode::ValidationError.exit_code(), exit_codes::VALIDATION_ERROR);
        assert_eq!(ErrorCode::CommandNotFound.exit_code(), exit_codes::COMMAND_NOT_FOUND);
        assert_eq!(ErrorCode::ProcessError.exit_code(), exit_codes::FAILURE);
        assert_eq!(ErrorCode::GradleError.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_display_includes_context_and_hint() {
        let err = Error::config_not_found("/work/custom.toml")
            .with_context("While loading --config");

        assert_eq!(err.code, ErrorCode::ConfigNotFound);
        let text = err.to_string();
        assert!(text.starts_with("[E3001] Configuration file not found: /work/custom.toml"));
        assert!(text.contains("Context: While loading --config"));
        assert!(text.contains("Suggestion: Create a .flavorkit.toml"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<()> = Err(Error::config("bad value"));
        let err = result.context("In [project]").unwrap_err();
        assert_eq!(err.context.as_deref(), Some("In [project]"));
    }

    #[test]
    fn test_error_report_serialization() {
        let err = Error::properties("local.properties", "Permission denied")
            .with_context("While resolving huawei/release");

        let report = err.to_report();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["code"], "PROPERTIES_ERROR");
        assert_eq!(json["code_str"], "E3005");
        assert_eq!(json["message"], "local.properties: Permission denied");
        assert!(json.get("source").is_none());
    }
}
