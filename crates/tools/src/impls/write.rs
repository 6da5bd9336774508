//! Write Tools
//!
//! `write_file`, `append_to_file`, and `delete_file`. Writes create parent
//! directories as needed.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use codeloom_llm::ParameterSchema;

use crate::context::ToolExecutionContext;
use crate::paths::validate_path;
use crate::trait_def::{Tool, ToolResult};

use super::{missing_param, str_arg};

fn missing_write_param(param: &str) -> ToolResult {
    let example = r#"{"path": "path/to/file", "content": "file content"}"#;
    ToolResult::err(format!(
        "Missing required parameter: {}. Correct format:\n{}",
        param, example
    ))
}

/// Write content to a file, overwriting any existing content.
pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }

    fn description(&self) -> &str {
        "Write content to a file. Creates the file if it doesn't exist, overwrites if it does. Creates parent directories as needed."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "path".to_string(),
            ParameterSchema::string(Some("Path of the file to write")),
        );
        properties.insert(
            "content".to_string(),
            ParameterSchema::string(Some("The content to write")),
        );
        ParameterSchema::object(
            Some("Write file parameters"),
            properties,
            vec!["path".to_string(), "content".to_string()],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let raw = match str_arg(&args, "path") {
            Some(p) => p,
            None => return missing_write_param("path"),
        };
        let content = match str_arg(&args, "content") {
            Some(c) => c,
            None => return missing_write_param("content"),
        };
        let path = match validate_path(raw, &ctx.working_directory_snapshot(), &ctx.project_root) {
            Ok(p) => p,
            Err(e) => return ToolResult::err(e),
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    return ToolResult::err(format!("Failed to create directories: {}", e));
                }
            }
        }

        match std::fs::write(&path, content) {
            Ok(_) => ToolResult::ok(format!(
                "Successfully wrote {} lines to {}",
                content.lines().count(),
                path.display()
            )),
            Err(e) => ToolResult::err(format!("Failed to write file: {}", e)),
        }
    }
}

/// Append content to the end of a file, creating it when absent.
pub struct AppendToFileTool;

#[async_trait]
impl Tool for AppendToFileTool {
    fn name(&self) -> &str {
        "append_to_file"
    }

    fn description(&self) -> &str {
        "Append content to the end of a file. Creates the file if it doesn't exist."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "path".to_string(),
            ParameterSchema::string(Some("Path of the file to append to")),
        );
        properties.insert(
            "content".to_string(),
            ParameterSchema::string(Some("The content to append")),
        );
        ParameterSchema::object(
            Some("Append parameters"),
            properties,
            vec!["path".to_string(), "content".to_string()],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let raw = match str_arg(&args, "path") {
            Some(p) => p,
            None => return missing_param("path"),
        };
        let content = match str_arg(&args, "content") {
            Some(c) => c,
            None => return missing_param("content"),
        };
        let path = match validate_path(raw, &ctx.working_directory_snapshot(), &ctx.project_root) {
            Ok(p) => p,
            Err(e) => return ToolResult::err(e),
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    return ToolResult::err(format!("Failed to create directories: {}", e));
                }
            }
        }

        let existing = std::fs::read_to_string(&path).unwrap_or_default();
        let combined = format!("{}{}", existing, content);
        match std::fs::write(&path, &combined) {
            Ok(_) => ToolResult::ok(format!(
                "Appended {} bytes to {} ({} lines total)",
                content.len(),
                path.display(),
                combined.lines().count()
            )),
            Err(e) => ToolResult::err(format!("Failed to append to file: {}", e)),
        }
    }
}

/// Delete a file.
pub struct DeleteFileTool;

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }

    fn description(&self) -> &str {
        "Delete a file."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "path".to_string(),
            ParameterSchema::string(Some("Path of the file to delete")),
        );
        ParameterSchema::object(
            Some("Delete parameters"),
            properties,
            vec!["path".to_string()],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let raw = match str_arg(&args, "path") {
            Some(p) => p,
            None => return missing_param("path"),
        };
        let path = match validate_path(raw, &ctx.working_directory_snapshot(), &ctx.project_root) {
            Ok(p) => p,
            Err(e) => return ToolResult::err(e),
        };

        match std::fs::remove_file(&path) {
            Ok(_) => ToolResult::ok(format!("Deleted {}", path.display())),
            Err(e) => ToolResult::err(format!("Failed to delete {}: {}", path.display(), e)),
        }
    }
}
