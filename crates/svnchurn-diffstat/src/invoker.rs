//! Bounded invocation of `svn diff` piped through `diffstat`.
//!
//! The two children are spawned with explicit argv lists (never a shell
//! string) and share one wall-clock deadline. A child still running when
//! the deadline passes is killed rather than left behind.

use std::process::Stdio;
use std::time::Duration;

use svnchurn_core::{ChurnError, DiffConfig};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Result of one revision's diff invocation.
#[derive(Debug)]
pub enum DiffOutcome {
    /// Both children exited in time; holds the captured diffstat stdout.
    Completed(String),
    /// The deadline passed. The revision is skipped for this run; since no
    /// fact was written, the selector will re-offer it on the next run.
    TimedOut,
}

/// Builds and executes the external diff/stat command pair for a fixed
/// repository URI.
///
/// # Examples
///
/// ```
/// use svnchurn_core::DiffConfig;
/// use svnchurn_diffstat::DiffStat;
///
/// let diffstat = DiffStat::new(&DiffConfig::default(), "svn://host/repo");
/// let args = diffstat.svn_args(41, 42);
/// assert_eq!(args, ["diff", "-x", "-bw", "-r", "41:42", "svn://host/repo"]);
/// ```
pub struct DiffStat {
    svn_bin: String,
    diffstat_bin: String,
    repo_uri: String,
    timeout: Duration,
}

impl DiffStat {
    /// Create an invoker for `repo_uri` using the configured binaries and
    /// timeout.
    pub fn new(config: &DiffConfig, repo_uri: impl Into<String>) -> Self {
        Self {
            svn_bin: config.svn_bin.clone(),
            diffstat_bin: config.diffstat_bin.clone(),
            repo_uri: repo_uri.into(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// The argv passed to the SVN client for a `prev:rev` diff.
    ///
    /// `-x -bw` makes the diff whitespace-insensitive so reformatting does
    /// not count as churn.
    pub fn svn_args(&self, prev: i64, rev: i64) -> Vec<String> {
        vec![
            "diff".into(),
            "-x".into(),
            "-bw".into(),
            "-r".into(),
            format!("{prev}:{rev}"),
            self.repo_uri.clone(),
        ]
    }

    /// Run `svn diff -x -bw -r prev:rev <uri>` and pipe the captured diff
    /// through `diffstat -t`, all under one wall-clock deadline.
    ///
    /// # Errors
    ///
    /// Returns [`ChurnError::Invoke`] if either child cannot be spawned or
    /// exits non-zero. A deadline overrun is not an error: it yields
    /// [`DiffOutcome::TimedOut`].
    pub async fn diff(&self, prev: i64, rev: i64) -> Result<DiffOutcome, ChurnError> {
        let deadline = Instant::now() + self.timeout;
        let args = self.svn_args(prev, rev);
        debug!(svn = %self.svn_bin, ?args, "running svn diff");

        let mut svn = Command::new(&self.svn_bin);
        svn.args(&args);
        let Some(diff_output) = run_bounded(svn, None, deadline).await? else {
            warn!(rev, "svn diff did not finish before the deadline");
            return Ok(DiffOutcome::TimedOut);
        };
        log_stderr(&self.svn_bin, &diff_output.stderr);
        if !diff_output.status.success() {
            return Err(ChurnError::Invoke(format!(
                "{} diff -r {prev}:{rev} exited with {}",
                self.svn_bin, diff_output.status
            )));
        }

        let mut stat = Command::new(&self.diffstat_bin);
        stat.arg("-t");
        let Some(stat_output) = run_bounded(stat, Some(diff_output.stdout), deadline).await? else {
            warn!(rev, "diffstat did not finish before the deadline");
            return Ok(DiffOutcome::TimedOut);
        };
        log_stderr(&self.diffstat_bin, &stat_output.stderr);
        if !stat_output.status.success() {
            return Err(ChurnError::Invoke(format!(
                "{} -t exited with {}",
                self.diffstat_bin, stat_output.status
            )));
        }

        Ok(DiffOutcome::Completed(
            String::from_utf8_lossy(&stat_output.stdout).into_owned(),
        ))
    }
}

/// Spawn `cmd`, optionally feed `input` to its stdin, and wait for exit or
/// `deadline`, whichever comes first. Both stdout and stderr are drained
/// fully to avoid pipe-buffer deadlock. Returns `None` on deadline overrun;
/// `kill_on_drop` ensures the overrunning child is terminated.
async fn run_bounded(
    mut cmd: Command,
    input: Option<Vec<u8>>,
    deadline: Instant,
) -> Result<Option<std::process::Output>, ChurnError> {
    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|e| ChurnError::Invoke(format!("failed to spawn process: {e}")))?;

    let stdin = child.stdin.take();
    let feed = async {
        if let (Some(mut stdin), Some(bytes)) = (stdin, input) {
            // A write error here just means the child stopped reading early;
            // its exit status tells the real story.
            if let Err(e) = stdin.write_all(&bytes).await {
                debug!("stdin write ended early: {e}");
            }
        }
    };

    match tokio::time::timeout_at(deadline, async {
        let (_, output) = tokio::join!(feed, child.wait_with_output());
        output
    })
    .await
    {
        Ok(output) => {
            let output = output.map_err(|e| ChurnError::Invoke(format!("process wait failed: {e}")))?;
            Ok(Some(output))
        }
        Err(_) => Ok(None),
    }
}

fn log_stderr(bin: &str, stderr: &[u8]) {
    // Only logged, never parsed.
    for line in String::from_utf8_lossy(stderr).lines() {
        debug!(%bin, "stderr: {line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(svn_bin: &str, diffstat_bin: &str, timeout_secs: u64) -> DiffConfig {
        DiffConfig {
            timeout_secs,
            svn_bin: svn_bin.into(),
            diffstat_bin: diffstat_bin.into(),
        }
    }

    #[test]
    fn svn_args_interpolate_revisions_and_uri() {
        let diffstat = DiffStat::new(&DiffConfig::default(), "file:///srv/repo");
        let args = diffstat.svn_args(99, 100);
        assert_eq!(args[4], "99:100");
        assert_eq!(args[5], "file:///srv/repo");
    }

    #[tokio::test]
    async fn run_bounded_passes_input_through_cat() {
        let deadline = Instant::now() + Duration::from_secs(5);
        let output = run_bounded(Command::new("cat"), Some(b"hello\n".to_vec()), deadline)
            .await
            .unwrap()
            .expect("cat should finish well within the deadline");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"hello\n");
    }

    #[tokio::test]
    async fn run_bounded_reports_deadline_overrun() {
        let deadline = Instant::now() + Duration::from_millis(50);
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let result = run_bounded(cmd, None, deadline).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn run_bounded_spawn_failure_is_invoke_error() {
        let deadline = Instant::now() + Duration::from_secs(1);
        let err = run_bounded(Command::new("/nonexistent/bin"), None, deadline)
            .await
            .unwrap_err();
        assert!(matches!(err, ChurnError::Invoke(_)));
    }

    #[tokio::test]
    async fn diff_surfaces_nonzero_exit() {
        let config = config_with("false", "cat", 5);
        let diffstat = DiffStat::new(&config, "file:///srv/repo");
        let err = diffstat.diff(1, 2).await.unwrap_err();
        assert!(matches!(err, ChurnError::Invoke(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn diff_times_out_on_stuck_svn() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("stuck-svn");
        std::fs::write(&script, "#!/bin/sh\nsleep 30\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = config_with("svn", "cat", 600);
        config.svn_bin = script.to_string_lossy().into_owned();
        config.timeout_secs = 1;
        let diffstat = DiffStat::new(&config, "file:///srv/repo");

        let outcome = diffstat.diff(1, 2).await.unwrap();
        assert!(matches!(outcome, DiffOutcome::TimedOut));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn diff_completes_through_the_stat_stage() {
        use std::os::unix::fs::PermissionsExt;

        // Fake svn that ignores its args and emits a fixed diff; `cat -t`
        // stands in for diffstat and passes it through.
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-svn");
        std::fs::write(&script, "#!/bin/sh\nprintf 'some diff body\\n'\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let mut config = config_with("svn", "cat", 5);
        config.svn_bin = script.to_string_lossy().into_owned();
        let diffstat = DiffStat::new(&config, "file:///srv/repo");

        match diffstat.diff(41, 42).await.unwrap() {
            DiffOutcome::Completed(stdout) => assert_eq!(stdout, "some diff body\n"),
            DiffOutcome::TimedOut => panic!("should not time out"),
        }
    }
}
