//! Azure CLI command execution.
//!
//! Provides utilities for running Azure CLI commands and parsing their output.

use crate::config::MAX_RESPONSE_BYTES;
use crate::error::FetchError;
use colored::Colorize;
use regex::Regex;
use std::process::Output;
use std::sync::OnceLock;
use tokio::process::Command;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Run a command and return its stdout.
///
/// The command string is split on spaces, with quoted substrings preserved.
/// Several commands may be in flight at once, each in its own child process.
///
/// # Returns
/// * `Ok(String)` - The stdout output on success
/// * `Err` - If the command cannot start, exits non-zero, or produces too much output
pub async fn run(cmd: &str) -> Result<String, FetchError> {
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let cmds: Vec<&str> = split_and_strip(cmd);
    log::trace!("split cmds={:?}", cmds);

    let program = cmds.first().ok_or("Empty command")?;
    let mut command = Command::new(program);
    command.args(cmds.iter().skip(1));

    let output = command.output().await.map_err(|e| {
        log::error!("Command execution failed: {}", e);
        format!("Failed to execute command '{program}': {e}")
    })?;

    check_output(cmd, output)
}

/// Turn a finished command's output into its stdout, or an error.
fn check_output(cmd: &str, output: Output) -> Result<String, FetchError> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(format!("ERROR running: {}", stderr.trim()).into());
    }

    log::debug!("Success output.stdout.len(): {}", output.stdout.len());
    if output.stdout.len() > MAX_RESPONSE_BYTES {
        return Err(format!(
            "Response too large: {} bytes for command: {cmd}",
            output.stdout.len()
        )
        .into());
    }

    String::from_utf8(output.stdout).map_err(|e| format!("Invalid UTF-8: {}", e).into())
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .collect()
}
