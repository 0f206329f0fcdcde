// SPDX-FileCopyrightText: 2026 mkrepo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Running external programs (`git`, `gh`).

use std::path::Path;
use std::process::{Command, Stdio};

use mkrepo_core::MkrepoError;
use tracing::debug;

/// Captured result of a finished process.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Executes external programs. Swapped for a recording fake in tests.
pub trait CommandRunner {
    /// Run `program` in `cwd` with extra environment variables and wait for it.
    ///
    /// An `Err` means the process could not be started; a non-zero exit is
    /// reported through [`CommandOutput::success`].
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        envs: &[(&str, &str)],
    ) -> Result<CommandOutput, MkrepoError>;

    /// Like [`CommandRunner::run`] but turns a non-zero exit into an error.
    fn run_checked(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        envs: &[(&str, &str)],
    ) -> Result<CommandOutput, MkrepoError> {
        let output = self.run(program, args, cwd, envs)?;
        if output.success {
            Ok(output)
        } else {
            Err(MkrepoError::ExternalCommand {
                program: program.to_string(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs programs with `std::process::Command`.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: &Path,
        envs: &[(&str, &str)],
    ) -> Result<CommandOutput, MkrepoError> {
        // Environment values may hold the token, so only names are logged.
        debug!(
            program,
            ?args,
            env = ?envs.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            cwd = %cwd.display(),
            "running command"
        );

        let output = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .envs(envs.iter().copied())
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MkrepoError::ExternalCommand {
                program: program.to_string(),
                code: None,
                stderr: format!("failed to start: {e}"),
            })?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(program, code = ?result.code, "command finished");
        Ok(result)
    }
}
