//! External command runner for platform probes
//!
//! Commands run without a shell, with stdin closed, and are killed if the
//! calling task is aborted (e.g. by the dispatcher's timeout).

use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use crate::error::CollectError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0} is not installed")]
    NotFound(String),

    #[error("{program}: {message}")]
    PermissionDenied { program: String, message: String },

    #[error("{program} exited with {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("IO error running {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },
}

impl From<CommandError> for CollectError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::NotFound(_) => CollectError::Unavailable(err.to_string()),
            CommandError::PermissionDenied { .. } => {
                CollectError::PermissionDenied(err.to_string())
            }
            CommandError::Failed { .. } | CommandError::Io { .. } => {
                CollectError::Failed(err.to_string())
            }
        }
    }
}

/// Phrases platform tools print when they lack privileges
const PERMISSION_MARKERS: [&str; 6] = [
    "permission denied",
    "operation not permitted",
    "access is denied",
    "unauthorized operation",
    "insufficient permissions",
    "must be root",
];

pub(crate) fn looks_like_permission_error(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    PERMISSION_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Run a program and return its stdout, classifying failures
pub async fn run(program: &str, args: &[&str]) -> Result<String, CommandError> {
    tracing::debug!("Running {} {:?}", program, args);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => CommandError::NotFound(program.to_string()),
            std::io::ErrorKind::PermissionDenied => CommandError::PermissionDenied {
                program: program.to_string(),
                message: source.to_string(),
            },
            _ => CommandError::Io {
                program: program.to_string(),
                source,
            },
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if output.status.success() {
        return Ok(stdout);
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if looks_like_permission_error(&stderr) || looks_like_permission_error(&stdout) {
        return Err(CommandError::PermissionDenied {
            program: program.to_string(),
            message: stderr,
        });
    }

    Err(CommandError::Failed {
        program: program.to_string(),
        code: output.status.code(),
        stderr,
    })
}

/// Run a PowerShell snippet non-interactively
pub async fn powershell(script: &str) -> Result<String, CommandError> {
    run(
        "powershell",
        &["-NoProfile", "-NonInteractive", "-Command", script],
    )
    .await
}

/// Whether an executable with this name exists on `PATH`
pub fn on_path(program: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(program);
        candidate.is_file() || candidate.with_extension("exe").is_file()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_markers() {
        assert!(looks_like_permission_error(
            "/dev/mem: Permission denied"
        ));
        assert!(looks_like_permission_error(
            "Attempted to perform an unauthorized operation."
        ));
        assert!(!looks_like_permission_error("No such file or directory"));
    }

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let result = run("sysdiag-definitely-not-a-real-binary", &[]).await;
        assert!(matches!(result, Err(CommandError::NotFound(_))));
    }

    #[test]
    fn test_not_found_maps_to_unavailable() {
        let err: CollectError = CommandError::NotFound("journalctl".into()).into();
        assert!(matches!(err, CollectError::Unavailable(_)));
    }
}
