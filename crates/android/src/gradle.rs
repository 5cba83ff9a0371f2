//! Gradle build system integration
//!
//! Task naming for the flavor/build-type matrix and delegation to the
//! project's Gradle wrapper.

use crate::channel::Channel;
use crate::variant::BuildVariant;
use flavorkit_core::error::{Error, Result};
use flavorkit_core::process::run_command_streaming_in_dir;
use std::path::{Path, PathBuf};

/// Packaging step to run for a variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GradleAction {
    /// Build an APK
    #[default]
    Assemble,
    /// Build an app bundle (AAB)
    Bundle,
}

impl GradleAction {
    fn prefix(self) -> &'static str {
        match self {
            Self::Assemble => "assemble",
            Self::Bundle => "bundle",
        }
    }
}

/// Gradle task for `action` on one (channel, variant) pair, e.g. `assembleHuaweiRelease`
#[must_use]
pub fn task_name(action: GradleAction, variant: BuildVariant, channel: Channel) -> String {
    format!(
        "{}{}{}",
        action.prefix(),
        channel.gradle_name(),
        variant.gradle_name()
    )
}

/// Whether `task` assembles a release APK.
///
/// Bundle tasks are not reported; only `assemble*Release` counts.
#[must_use]
pub fn is_release_task(task: &str) -> bool {
    task.starts_with("assemble") && task.contains("Release")
}

const WRAPPER: &str = if cfg!(windows) { "gradlew.bat" } else { "gradlew" };

/// Wrapper program as spawned with the project directory as working directory
const WRAPPER_PROGRAM: &str = if cfg!(windows) { "gradlew.bat" } else { "./gradlew" };

/// Location of the Gradle wrapper script inside `project_dir`
#[must_use]
pub fn wrapper_path(project_dir: &Path) -> PathBuf {
    project_dir.join(WRAPPER)
}

/// Run Gradle tasks through the wrapper, streaming its output
pub fn run_tasks(project_dir: &Path, tasks: &[&str]) -> Result<()> {
    let wrapper = wrapper_path(project_dir);
    if !wrapper.is_file() {
        return Err(Error::gradle(format!(
            "Gradle wrapper not found: {}",
            wrapper.display()
        ))
        .with_suggestion("Run `gradle wrapper` in the Android project directory"));
    }

    tracing::info!(wrapper = %wrapper.display(), ?tasks, "Running Gradle");

    let code = run_command_streaming_in_dir(WRAPPER_PROGRAM, tasks, project_dir)?;
    if code != 0 {
        return Err(Error::gradle(format!(
            "Gradle exited with code {code} running {}",
            tasks.join(" ")
        )));
    }
    Ok(())
}

/// Run a single Gradle task
pub fn run_task(project_dir: &Path, task: &str) -> Result<()> {
    run_tasks(project_dir, &[task])
}

/// Clean build artifacts
pub fn clean(project_dir: &Path) -> Result<()> {
    run_task(project_dir, "clean")
}
