//! Shell Tool
//!
//! `execute_command`: runs a shell command in the session's working
//! directory with a hard wall-clock timeout and an output-size cap. Both
//! limits surface as tool errors, never as process crashes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;

use codeloom_llm::ParameterSchema;

use crate::context::ToolExecutionContext;
use crate::trait_def::{Tool, ToolResult};

use super::{missing_param, str_arg};

/// Hard wall-clock limit per command.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);
/// Hard cap on combined stdout + stderr.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Run a shell command.
pub struct ExecuteCommandTool {
    timeout: Duration,
    max_output_bytes: usize,
}

impl ExecuteCommandTool {
    pub fn new() -> Self {
        Self {
            timeout: COMMAND_TIMEOUT,
            max_output_bytes: MAX_OUTPUT_BYTES,
        }
    }

    /// Override the limits, for hosts with different budgets.
    pub fn with_limits(timeout: Duration, max_output_bytes: usize) -> Self {
        Self {
            timeout,
            max_output_bytes,
        }
    }
}

impl Default for ExecuteCommandTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ExecuteCommandTool {
    fn name(&self) -> &str {
        "execute_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command in the working directory. Commands are killed after 30 seconds and output is capped at 10 MB."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "command".to_string(),
            ParameterSchema::string(Some("The shell command to run")),
        );
        properties.insert(
            "description".to_string(),
            ParameterSchema::string(Some("Short description of what the command does")),
        );
        ParameterSchema::object(
            Some("Execute command parameters"),
            properties,
            vec!["command".to_string()],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let command = match str_arg(&args, "command") {
            Some(c) if !c.trim().is_empty() => c,
            Some(_) => return ToolResult::err("Command must not be empty".to_string()),
            None => return missing_param("command"),
        };

        let working_dir = ctx.working_directory_snapshot();

        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        cmd.current_dir(&working_dir).kill_on_drop(true);

        let output = tokio::select! {
            result = tokio::time::timeout(self.timeout, cmd.output()) => {
                match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => {
                        return ToolResult::err(format!("Failed to run command: {}", e))
                    }
                    Err(_) => {
                        return ToolResult::err(format!(
                            "Command timed out after {} seconds: {}",
                            self.timeout.as_secs(),
                            command
                        ))
                    }
                }
            }
            _ = ctx.cancellation_token.cancelled() => {
                return ToolResult::err("Command cancelled".to_string());
            }
        };

        if output.stdout.len() + output.stderr.len() > self.max_output_bytes {
            return ToolResult::err(format!(
                "Command output exceeded the {} MB cap",
                self.max_output_bytes / (1024 * 1024)
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let mut text = stdout.trim_end().to_string();
        if !stderr.trim().is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("[stderr]\n");
            text.push_str(stderr.trim_end());
        }
        if text.is_empty() {
            text = "(no output)".to_string();
        }

        if output.status.success() {
            ToolResult::ok(text)
        } else {
            ToolResult::err(format!(
                "Command exited with {}:\n{}",
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                text
            ))
        }
    }
}
