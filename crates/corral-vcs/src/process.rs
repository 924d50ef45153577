use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::Error;

/// The captured output of a successful subprocess invocation.
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: String,
}

/// Run `program args...` in `cwd`, returning its stdout on success.
///
/// This is the single chokepoint every VCS adapter routes through — the
/// retry-once-after-fetch policy and the local-clone ref-listing fallback
/// both live one layer up, in the source manager, which is the only place
/// that has enough context (a prior fetch, a known-good local clone) to
/// decide whether to retry at all. The driver itself just runs the command
/// once and reports exactly what happened.
pub(crate) async fn run(program: &str, args: &[&str], cwd: &Path) -> Result<ProcessOutput, Error> {
    debug!(program, ?args, dir = %cwd.display(), "running VCS command");

    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| Error::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(Error::command_failed(
            program,
            args,
            cwd,
            &output.stderr,
            output.status.code(),
        ));
    }

    Ok(ProcessOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}
