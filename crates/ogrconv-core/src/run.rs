//! Conversion tool execution.
//!
//! Runs the external conversion tool as a child process with piped output,
//! waiting for full exit. There is no timeout and no cancellation: the tool
//! runs to completion. The real exit code and captured error stream are
//! always surfaced instead of an unconditional success message.

use std::process::Stdio;

use async_trait::async_trait;
use log::{error, info};
use tokio::process::Command;

use crate::error::ExecutionError;

/// Outcome of one successful tool invocation.
#[derive(Debug, Clone)]
pub struct RunStatus {
    /// Exit code, always zero here; non-zero exits become
    /// [`ExecutionError::ProcessFailed`].
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Executes the conversion tool with an assembled argument string and blocks
/// until the spawned process exits.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `tool` with `arguments` and waits for full exit.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the tool is missing, cannot be
    /// launched, or exits with a non-zero code.
    async fn run(&self, tool: &str, arguments: &str) -> Result<RunStatus, ExecutionError>;
}

/// Default runner over [`tokio::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolRunner;

#[async_trait]
impl ProcessRunner for ToolRunner {
    async fn run(&self, tool: &str, arguments: &str) -> Result<RunStatus, ExecutionError> {
        let args = split_arguments(arguments);
        info!("Executing conversion: tool='{tool}', args={args:?}");

        let output = Command::new(tool)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExecutionError::ToolNotFound {
                        tool: tool.to_string(),
                    }
                } else {
                    ExecutionError::Launch {
                        tool: tool.to_string(),
                        source: e,
                    }
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            error!("Conversion failed: tool='{tool}', exit_code={code}");
            return Err(ExecutionError::ProcessFailed {
                code,
                stderr: stderr.chars().take(2000).collect(),
            });
        }

        Ok(RunStatus {
            exit_code: output.status.code().unwrap_or(0),
            stdout,
            stderr,
        })
    }
}

/// Splits an assembled argument string back into individual arguments.
///
/// Mirrors the builder's quoting rules: double quotes group, nothing is
/// escaped. An unterminated quote runs to the end of the string.
///
/// # Examples
///
/// ```
/// use ogrconv_core::run::split_arguments;
///
/// let args = split_arguments(r#"-f "ESRI Shapefile" "/out dir/a.shp" -overwrite"#);
/// assert_eq!(args, ["-f", "ESRI Shapefile", "/out dir/a.shp", "-overwrite"]);
/// ```
#[must_use]
pub fn split_arguments(arguments: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in arguments.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                // A quoted span yields an argument even when empty.
                pending = true;
            },
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    args.push(std::mem::take(&mut current));
                    pending = false;
                }
            },
            c => {
                current.push(c);
                pending = true;
            },
        }
    }
    if pending {
        args.push(current);
    }

    args
}

/// One per-entry result of a conversion run.
#[derive(Debug)]
pub struct EntryOutcome {
    /// The concrete source this entry converted.
    pub source: String,
    /// The target it was written to.
    pub target: String,
    /// The tool invocation outcome.
    pub result: Result<RunStatus, ExecutionError>,
}

impl EntryOutcome {
    /// Whether this entry converted successfully.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregated per-entry outcomes of one conversion run.
///
/// One failing entry never aborts the remaining queued entries; every entry
/// gets an outcome.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Outcomes in entry order.
    pub outcomes: Vec<EntryOutcome>,
}

impl RunReport {
    /// Number of entries that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.succeeded()).count()
    }

    /// Whether every entry converted successfully.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}
