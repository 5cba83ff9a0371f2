//! Git operations using command-line git
//!
//! Uses command-line git to avoid dependency issues with git2/libgit2.
//! The revision lookup used for build traceability never fails: any problem
//! collapses into [`UNKNOWN_REVISION`].

use crate::error::{Error, Result};
use crate::process::run_command_in_dir;
use std::path::{Path, PathBuf};

/// Sentinel substituted when the commit hash cannot be determined
pub const UNKNOWN_REVISION: &str = "unknown";

/// Git repository wrapper
pub struct GitRepo {
    workdir: PathBuf,
}

impl GitRepo {
    /// Open a git repository at the given path
    pub fn open(path: &Path) -> Result<Self> {
        let result = run_command_in_dir("git", &["rev-parse", "--show-toplevel"], path)?;
        if !result.success {
            return Err(Error::not_a_git_repo());
        }

        Ok(Self {
            workdir: PathBuf::from(result.stdout.trim()),
        })
    }

    /// Abbreviated hash of `HEAD`
    pub fn short_commit(&self) -> Result<String> {
        let result = run_command_in_dir("git", &["rev-parse", "--short", "HEAD"], &self.workdir)?;

        let hash = result.stdout.trim();
        if !result.success || hash.is_empty() {
            return Err(Error::git(format!(
                "Failed to resolve HEAD: {}",
                result.stderr.trim()
            )));
        }

        Ok(hash.to_string())
    }
}

/// Short commit hash of `HEAD` for the repository containing `dir`.
///
/// Returns [`UNKNOWN_REVISION`] when git is missing, `dir` does not exist or
/// is not inside a repository, or the repository has no commits yet.
#[must_use]
pub fn short_commit_or_unknown(dir: &Path) -> String {
    match GitRepo::open(dir).and_then(|repo| repo.short_commit()) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Commit lookup failed, using sentinel");
            UNKNOWN_REVISION.to_string()
        }
    }
}
