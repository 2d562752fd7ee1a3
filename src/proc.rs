// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External process invocation.
//!
//! Most maintenance work delegates to system tools: the AUR helper, xdg
//! utilities, `web2app-remove`, `sudo ln`, and friends. These helpers wrap
//! [`std::process::Command`] so the rest of the crate never touches raw
//! process plumbing.

use std::{ffi::OsStr, process::Command};

/// Call external command, inheriting stdio of current process.
///
/// Blocks until the command finishes so the user can interact with it
/// directly, e.g., answer a sudo password prompt.
///
/// # Errors
///
/// - Return [`ProcError::Spawn`] if the command cannot be spawned.
/// - Return [`ProcError::Failed`] if the command exits non-zero.
pub fn call_interactive(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<()> {
    let status = Command::new(cmd.as_ref())
        .args(args)
        .spawn()
        .map_err(|source| ProcError::Spawn {
            source,
            cmd: cmd.as_ref().to_string_lossy().into_owned(),
        })?
        .wait()
        .map_err(|source| ProcError::Spawn {
            source,
            cmd: cmd.as_ref().to_string_lossy().into_owned(),
        })?;

    if !status.success() {
        return Err(ProcError::Failed {
            cmd: cmd.as_ref().to_string_lossy().into_owned(),
            message: String::new(),
        });
    }

    Ok(())
}

/// Call external command, capturing its output.
///
/// Stdout and stderr are combined into one message with trailing newlines
/// chomped. A non-zero exit status carries that message in the error.
///
/// # Errors
///
/// - Return [`ProcError::Spawn`] if the command cannot be spawned.
/// - Return [`ProcError::Failed`] if the command exits non-zero.
pub fn call_quiet(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<String> {
    let output = Command::new(cmd.as_ref())
        .args(args)
        .output()
        .map_err(|source| ProcError::Spawn {
            source,
            cmd: cmd.as_ref().to_string_lossy().into_owned(),
        })?;

    let stdout = String::from_utf8_lossy(output.stdout.as_slice()).into_owned();
    let stderr = String::from_utf8_lossy(output.stderr.as_slice()).into_owned();
    let mut message = String::new();

    if !stdout.is_empty() {
        message.push_str(stdout.as_str());
    }

    if !stderr.is_empty() {
        message.push_str(stderr.as_str());
    }

    // INVARIANT: Chomp trailing newlines.
    let message = message
        .strip_suffix("\r\n")
        .or(message.strip_suffix('\n'))
        .map(ToString::to_string)
        .unwrap_or(message);

    if !output.status.success() {
        return Err(ProcError::Failed {
            cmd: cmd.as_ref().to_string_lossy().into_owned(),
            message,
        });
    }

    Ok(message)
}

/// Check if a command is reachable through `PATH`.
///
/// Only executable files count; a stray plain file shadowing a command
/// name does not make the command available. Never an error; a broken
/// `PATH` just means "not found".
pub fn in_path(cmd: impl AsRef<OsStr>) -> bool {
    which::which(cmd.as_ref()).is_ok()
}

/// External process error types.
#[derive(Debug, thiserror::Error)]
pub enum ProcError {
    /// Command cannot be spawned or waited on.
    #[error("failed to spawn command {cmd:?}")]
    Spawn {
        #[source]
        source: std::io::Error,
        cmd: String,
    },

    /// Command ran, but exited non-zero.
    #[error("command {cmd:?} failed:\n{message}")]
    Failed { cmd: String, message: String },
}

/// Friendly result alias :3
pub type Result<T, E = ProcError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[test]
    fn call_quiet_captures_stdout() -> anyhow::Result<()> {
        let result = call_quiet("echo", ["hello there"])?;
        assert_eq!(result, "hello there");
        Ok(())
    }

    #[test]
    fn call_quiet_reports_failure_with_message() {
        let result = call_quiet("sh", ["-c", "echo oops >&2; exit 3"]);
        match result {
            Err(ProcError::Failed { message, .. }) => assert_eq!(message, "oops"),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn call_quiet_spawn_error_for_missing_binary() {
        let result = call_quiet("definitely-not-a-real-binary-here", [""; 0]);
        assert!(matches!(result, Err(ProcError::Spawn { .. })));
    }

    #[test]
    fn in_path_finds_common_shell() {
        assert!(in_path("sh"));
        assert!(!in_path("definitely-not-a-real-binary-here"));
    }

    #[sealed_test]
    fn in_path_requires_executable_bit() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        use std::fs::{metadata, set_permissions, write};

        std::fs::create_dir("bin")?;
        write("bin/yay", "not a binary")?;
        let mut perms = metadata("bin/yay")?.permissions();
        perms.set_mode(0o644);
        set_permissions("bin/yay", perms)?;
        std::env::set_var("PATH", std::env::current_dir()?.join("bin"));

        assert!(!in_path("yay"));

        let mut perms = metadata("bin/yay")?.permissions();
        perms.set_mode(0o755);
        set_permissions("bin/yay", perms)?;
        assert!(in_path("yay"));

        Ok(())
    }
}
