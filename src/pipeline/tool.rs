//! External tool execution.
//!
//! Both stages shell out to a program that is a black box to us: we only
//! control its arguments, where its stdin comes from, where its stdout goes,
//! and how long we are willing to wait. The child is spawned through
//! `tokio::process` so a slow tool parks its conversion future instead of a
//! runtime worker thread.

use crate::config::ToolCommand;
use std::ffi::OsStr;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Longest stderr excerpt carried into an error message.
const MAX_STDERR_CHARS: usize = 2000;

/// Why a single tool run failed.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The program could not be started (not on PATH, not executable).
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Waiting on the child failed.
    #[error("failed waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program ran and reported failure.
    #[error("`{program}` exited with {status}{}", stderr_suffix(.stderr))]
    Exit {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The program was killed after exceeding the configured timeout.
    #[error("`{program}` timed out after {secs}s")]
    Timeout { program: String, secs: u64 },

    /// The program reported success but left no output behind.
    #[error("`{program}` exited successfully but produced no output at '{}'", .path.display())]
    EmptyOutput { program: String, path: PathBuf },

    /// The stage input could not be opened.
    #[error("input file '{}': {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Preparing or installing the output file failed.
    #[error("output file '{}': {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

/// Run `command` followed by `extra_args`, wiring the given stdin and stdout.
///
/// Stderr is always captured and folded into [`ToolError::Exit`] on failure.
/// When `timeout_secs` is set the child is killed once the deadline passes.
pub async fn run<I, S>(
    command: &ToolCommand,
    extra_args: I,
    stdin: Stdio,
    stdout: Stdio,
    timeout_secs: Option<u64>,
) -> Result<(), ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let program = command.program.clone();

    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .args(extra_args)
        .stdin(stdin)
        .stdout(stdout)
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!("Running {:?}", cmd.as_std());

    let child = cmd.spawn().map_err(|source| ToolError::Spawn {
        program: program.clone(),
        source,
    })?;

    // `output()` would force stdout to a pipe; wait_with_output keeps the
    // caller's stdout wiring and still drains stderr.
    let wait = child.wait_with_output();
    let output = match timeout_secs {
        Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), wait).await {
            Ok(res) => res,
            // dropping the future drops the child, and kill_on_drop reaps it
            Err(_) => return Err(ToolError::Timeout { program, secs }),
        },
        None => wait.await,
    }
    .map_err(|source| ToolError::Wait {
        program: program.clone(),
        source,
    })?;

    if !output.stdout.is_empty() {
        debug!(
            "`{}` stdout: {}",
            program,
            String::from_utf8_lossy(&output.stdout).trim()
        );
    }

    if !output.status.success() {
        let stderr: String = String::from_utf8_lossy(&output.stderr)
            .chars()
            .take(MAX_STDERR_CHARS)
            .collect();
        return Err(ToolError::Exit {
            program,
            status: output.status,
            stderr,
        });
    }

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> ToolCommand {
        ToolCommand::new("sh").args(["-c", script])
    }

    #[tokio::test]
    async fn success_is_ok() {
        let res = run(
            &sh("exit 0"),
            Vec::<&str>::new(),
            Stdio::null(),
            Stdio::null(),
            None,
        )
        .await;
        assert!(res.is_ok(), "{res:?}");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let err = run(
            &sh("echo 'bad chord on line 3' >&2; exit 4"),
            Vec::<&str>::new(),
            Stdio::null(),
            Stdio::null(),
            None,
        )
        .await
        .unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, ToolError::Exit { .. }));
        assert!(msg.contains("bad chord on line 3"), "got: {msg}");
        assert!(msg.contains('4'), "got: {msg}");
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let err = run(
            &ToolCommand::new("crd2score-definitely-not-installed"),
            Vec::<&str>::new(),
            Stdio::null(),
            Stdio::null(),
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn extra_args_follow_leading_args() {
        // $0 is "probe", so the appended args become $1 and $2
        let err = run(
            &sh("echo \"$1-$2\" >&2; exit 1").arg("probe"),
            ["in.musicxml", "out.pdf"],
            Stdio::null(),
            Stdio::null(),
            None,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("in.musicxml-out.pdf"), "got: {err}");
    }

    #[tokio::test]
    async fn slow_tool_times_out() {
        let err = run(
            &sh("sleep 5"),
            Vec::<&str>::new(),
            Stdio::null(),
            Stdio::null(),
            Some(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { secs: 1, .. }), "{err:?}");
    }
}
