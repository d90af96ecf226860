//! Command builder for dev-server scripts.

use std::process::Stdio;
use tokio::process::Command;

use crate::process::DevServerSpec;

/// Build the shell command that runs a dev-server script.
///
/// Unix runs `sh -c <script>` in a new process group so a stop reaches the
/// whole process tree. Windows runs `cmd /C <script>`.
pub fn build_command(spec: &DevServerSpec) -> Command {
    #[cfg(unix)]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&spec.script);
        cmd.process_group(0);
        cmd
    };

    #[cfg(not(unix))]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(&spec.script);
        cmd
    };

    if let Some(dir) = &spec.working_dir {
        cmd.current_dir(dir);
    }
    cmd.envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    cmd
}
