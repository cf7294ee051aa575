//! External tool invocation.

use std::path::Path;
use std::process::Command;

use strata_core::StrataError;

/// Run an external tool and capture its standard output.
///
/// The command is spawned directly, never through a shell, so arguments
/// with spaces or metacharacters pass through unmodified. Output is
/// decoded lossily: a stray invalid byte in a commit message should not
/// abort a whole analysis.
///
/// # Errors
///
/// Returns [`StrataError::Tool`] when the program cannot be started or
/// exits with a failure status; the captured stderr rides along in the
/// error.
///
/// # Examples
///
/// ```no_run
/// use strata_scm::run_tool;
///
/// let version = run_tool("git", &["--version"], None).unwrap();
/// assert!(version.starts_with("git version"));
/// ```
pub fn run_tool(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<String, StrataError> {
    log::debug!("running: {} {}", program, args.join(" "));

    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|e| StrataError::Tool {
        program: program.to_string(),
        status: "failed to start".into(),
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        return Err(StrataError::Tool {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
