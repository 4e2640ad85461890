use std::io;
use std::path::Path;

use tracing::debug;

/// Captured output of a version-control query.
#[derive(Debug, Clone)]
pub struct DiffOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Source of "most recent change" diffs for a single file.
///
/// Implementations block; callers run them under `spawn_blocking`. The trait
/// exists so handlers can be tested against a mock instead of a real
/// repository.
pub trait ChangeLog: Send + Sync {
    /// Diff of the latest recorded change to `file_name`, with `work_dir`
    /// (the file's containing directory) as the working context.
    fn latest_change(&self, work_dir: &Path, file_name: &str) -> io::Result<DiffOutput>;
}

/// `git log -1 -p` against the repository that owns the file's directory.
pub struct GitChangeLog;

impl ChangeLog for GitChangeLog {
    fn latest_change(&self, work_dir: &Path, file_name: &str) -> io::Result<DiffOutput> {
        debug!("running git log -1 -p for {:?} in {:?}", file_name, work_dir);

        // output() waits for exit and drains both pipes first, so a chatty
        // subprocess cannot deadlock on a full pipe buffer
        let output = std::process::Command::new("git")
            .args(["log", "-1", "-p", "--"])
            .arg(file_name)
            .current_dir(work_dir)
            .output()?;

        Ok(DiffOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }
}
