//! Build and startup info, captured once at process start.

use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

static COMMIT_HASH: OnceLock<Option<String>> = OnceLock::new();

/// Crate version baked in at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Capture the commit hash of the project the agent operates on.
///
/// Runs `git rev-parse HEAD` in `project_dir` on first call and caches the
/// outcome for the lifetime of the process; later calls return the cached
/// value regardless of the argument. Returns `None` when the directory is
/// not a git checkout (or git is unavailable) — startup proceeds either way.
pub fn capture_commit_hash(project_dir: &Path) -> Option<&'static str> {
    COMMIT_HASH
        .get_or_init(|| read_commit_hash(project_dir))
        .as_deref()
}

/// The commit hash captured at startup, if any.
pub fn commit_hash() -> Option<&'static str> {
    COMMIT_HASH.get().and_then(|hash| hash.as_deref())
}

fn read_commit_hash(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?.trim().to_owned();
    (!hash.is_empty()).then_some(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_nonempty() {
        assert!(!version().is_empty());
    }

    #[test]
    fn non_repo_directory_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_commit_hash(dir.path()).is_none());
    }
}
