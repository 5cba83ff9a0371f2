//! Health check system for verifying tool dependencies and environment
//!
//! Checks are either required (a failure makes the report unhealthy) or
//! optional (a failure only degrades it).

use crate::process::{command_exists, run_command};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Health check status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All checks passed
    Healthy,
    /// Some optional checks failed
    Degraded,
    /// Required checks failed
    Unhealthy,
}

impl HealthStatus {
    /// Returns true if status is healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    /// Returns true if status is healthy or degraded (still operational)
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(self, HealthStatus::Healthy | HealthStatus::Degraded)
    }
}

/// Individual health check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Status of the check
    pub status: HealthStatus,
    /// Optional message with details
    pub message: Option<String>,
    /// Duration of the check in milliseconds
    pub duration_ms: u64,
    /// Additional details as key-value pairs
    pub details: BTreeMap<String, String>,
}

impl CheckResult {
    /// Create a healthy check result
    pub fn healthy(name: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Healthy, None)
    }

    /// Create an unhealthy check result with a message
    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Unhealthy, Some(message.into()))
    }

    /// Create a degraded check result with a message
    pub fn degraded(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(name, HealthStatus::Degraded, Some(message.into()))
    }

    /// Unhealthy when `required`, degraded otherwise
    pub fn failed(name: impl Into<String>, message: impl Into<String>, required: bool) -> Self {
        if required {
            Self::unhealthy(name, message)
        } else {
            Self::degraded(name, message)
        }
    }

    fn with_status(name: impl Into<String>, status: HealthStatus, message: Option<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message,
            duration_ms: 0,
            details: BTreeMap::new(),
        }
    }

    /// Add a detail key-value pair
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Overall health report containing all check results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Overall status based on all checks
    pub status: HealthStatus,
    /// Individual check results
    pub checks: Vec<CheckResult>,
    /// Total duration of all checks in milliseconds
    pub total_duration_ms: u64,
    /// Timestamp when the report was generated
    pub timestamp: String,
}

impl HealthReport {
    /// Create a new health report from check results
    #[must_use]
    pub fn new(checks: Vec<CheckResult>, duration: Duration) -> Self {
        let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
            HealthStatus::Healthy
        } else if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        };

        Self {
            status,
            checks,
            total_duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Returns true if overall status is healthy
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.is_healthy()
    }

    /// Get all checks that failed (not healthy)
    #[must_use]
    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks
            .iter()
            .filter(|c| !c.status.is_healthy())
            .collect()
    }
}

/// Health checker with configurable checks
#[derive(Default)]
pub struct HealthChecker {
    checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthChecker {
    /// Create a new health checker with no checks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a health check
    #[must_use]
    pub fn add_check(mut self, check: impl HealthCheck + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Tools every build host is expected to have.
    ///
    /// Git is optional: without it builds are stamped with the `unknown` revision.
    #[must_use]
    pub fn with_standard_checks(self) -> Self {
        self.add_check(CommandCheck::optional("git", Some("--version")))
            .add_check(CommandCheck::optional("java", Some("-version")))
    }

    /// Run all health checks
    #[must_use]
    pub fn run(&self) -> HealthReport {
        let start = Instant::now();
        let results = self
            .checks
            .iter()
            .map(|check| {
                let check_start = Instant::now();
                let mut result = check.check();
                result.duration_ms =
                    u64::try_from(check_start.elapsed().as_millis()).unwrap_or(u64::MAX);
                result
            })
            .collect();

        HealthReport::new(results, start.elapsed())
    }
}

/// Trait for implementing health checks
pub trait HealthCheck: Send + Sync {
    /// Perform the health check and return a result
    fn check(&self) -> CheckResult;
}

/// Check if a command is available
pub struct CommandCheck {
    command: String,
    version_arg: Option<String>,
    required: bool,
}

impl CommandCheck {
    /// Create a required command check
    pub fn new(command: impl Into<String>, version_arg: Option<&str>) -> Self {
        Self {
            command: command.into(),
            version_arg: version_arg.map(String::from),
            required: true,
        }
    }

    /// Create an optional command check (degraded if missing, not unhealthy)
    pub fn optional(command: impl Into<String>, version_arg: Option<&str>) -> Self {
        Self {
            required: false,
            ..Self::new(command, version_arg)
        }
    }
}

impl HealthCheck for CommandCheck {
    fn check(&self) -> CheckResult {
        if !command_exists(&self.command) {
            let suffix = if self.required { "" } else { " (optional)" };
            return CheckResult::failed(
                &self.command,
                format!("{} is not installed{suffix}", self.command),
                self.required,
            );
        }

        let Some(arg) = &self.version_arg else {
            return CheckResult::healthy(&self.command);
        };

        // java prints its version on stderr
        match run_command(&self.command, &[arg.as_str()]) {
            Ok(output) if output.success => {
                let version = output
                    .combined_output()
                    .lines()
                    .next()
                    .unwrap_or("")
                    .trim()
                    .to_string();
                CheckResult::healthy(&self.command).with_detail("version", version)
            }
            _ => CheckResult::healthy(&self.command),
        }
    }
}

/// Check that a file or directory exists
pub struct PathCheck {
    name: String,
    path: PathBuf,
    required: bool,
    hint: Option<String>,
}

impl PathCheck {
    /// Create a required path check
    pub fn required(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            required: true,
            hint: None,
        }
    }

    /// Create an optional path check
    pub fn optional(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            required: false,
            ..Self::required(name, path)
        }
    }

    /// Message appended when the path is missing
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl HealthCheck for PathCheck {
    fn check(&self) -> CheckResult {
        if self.path.exists() {
            return CheckResult::healthy(&self.name)
                .with_detail("path", self.path.display().to_string());
        }

        let mut message = format!("{} does not exist", self.path.display());
        if let Some(hint) = &self.hint {
            message.push_str(": ");
            message.push_str(hint);
        }
        CheckResult::failed(&self.name, message, self.required)
            .with_detail("path", self.path.display().to_string())
    }
}
