//! Directory Tools
//!
//! `list_directory`, `create_directory`, `copy_file`, `move_file`, and
//! `get_project_structure`.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use codeloom_llm::ParameterSchema;

use crate::context::ToolExecutionContext;
use crate::paths::validate_path;
use crate::trait_def::{Tool, ToolResult};

use super::{missing_param, str_arg, usize_arg};

/// Directories the structure tree never descends into.
const TREE_SKIP_DIRS: &[&str] = &["node_modules", "target", "dist", "build", ".git"];

const DEFAULT_TREE_DEPTH: usize = 3;

/// List the entries of a directory.
pub struct ListDirectoryTool;

#[async_trait]
impl Tool for ListDirectoryTool {
    fn name(&self) -> &str {
        "list_directory"
    }

    fn description(&self) -> &str {
        "List the entries of a directory. Directories are suffixed with '/'."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "path".to_string(),
            ParameterSchema::string(Some("Directory to list. Defaults to the working directory")),
        );
        ParameterSchema::object(Some("List directory parameters"), properties, vec![])
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let raw = str_arg(&args, "path").unwrap_or(".");
        let path = match validate_path(raw, &ctx.working_directory_snapshot(), &ctx.project_root) {
            Ok(p) => p,
            Err(e) => return ToolResult::err(e),
        };

        let entries = match std::fs::read_dir(&path) {
            Ok(e) => e,
            Err(e) => {
                return ToolResult::err(format!("Failed to list {}: {}", path.display(), e))
            }
        };

        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                if entry.path().is_dir() {
                    format!("{}/", name)
                } else {
                    name
                }
            })
            .collect();
        names.sort();

        if names.is_empty() {
            ToolResult::ok(format!("{} is empty", path.display()))
        } else {
            ToolResult::ok(names.join("\n"))
        }
    }
}

/// Create a directory and its parents.
pub struct CreateDirectoryTool;

#[async_trait]
impl Tool for CreateDirectoryTool {
    fn name(&self) -> &str {
        "create_directory"
    }

    fn description(&self) -> &str {
        "Create a directory, including any missing parent directories."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "path".to_string(),
            ParameterSchema::string(Some("Directory path to create")),
        );
        ParameterSchema::object(
            Some("Create directory parameters"),
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

        match std::fs::create_dir_all(&path) {
            Ok(_) => ToolResult::ok(format!("Created directory {}", path.display())),
            Err(e) => ToolResult::err(format!("Failed to create {}: {}", path.display(), e)),
        }
    }
}

/// Copy a file.
pub struct CopyFileTool;

#[async_trait]
impl Tool for CopyFileTool {
    fn name(&self) -> &str {
        "copy_file"
    }

    fn description(&self) -> &str {
        "Copy a file to a new location. Creates destination directories as needed."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "source".to_string(),
            ParameterSchema::string(Some("Path of the file to copy")),
        );
        properties.insert(
            "destination".to_string(),
            ParameterSchema::string(Some("Destination path")),
        );
        ParameterSchema::object(
            Some("Copy parameters"),
            properties,
            vec!["source".to_string(), "destination".to_string()],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        transfer(ctx, &args, false).await
    }
}

/// Move (rename) a file.
pub struct MoveFileTool;

#[async_trait]
impl Tool for MoveFileTool {
    fn name(&self) -> &str {
        "move_file"
    }

    fn description(&self) -> &str {
        "Move or rename a file. Creates destination directories as needed."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "source".to_string(),
            ParameterSchema::string(Some("Path of the file to move")),
        );
        properties.insert(
            "destination".to_string(),
            ParameterSchema::string(Some("Destination path")),
        );
        ParameterSchema::object(
            Some("Move parameters"),
            properties,
            vec!["source".to_string(), "destination".to_string()],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        transfer(ctx, &args, true).await
    }
}

/// Shared copy/move implementation.
async fn transfer(ctx: &ToolExecutionContext, args: &Value, remove_source: bool) -> ToolResult {
    let source_raw = match str_arg(args, "source") {
        Some(s) => s,
        None => return missing_param("source"),
    };
    let dest_raw = match str_arg(args, "destination") {
        Some(d) => d,
        None => return missing_param("destination"),
    };

    let working = ctx.working_directory_snapshot();
    let source = match validate_path(source_raw, &working, &ctx.project_root) {
        Ok(p) => p,
        Err(e) => return ToolResult::err(e),
    };
    let dest = match validate_path(dest_raw, &working, &ctx.project_root) {
        Ok(p) => p,
        Err(e) => return ToolResult::err(e),
    };

    if let Some(parent) = dest.parent() {
        if !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return ToolResult::err(format!("Failed to create directories: {}", e));
            }
        }
    }

    if let Err(e) = std::fs::copy(&source, &dest) {
        return ToolResult::err(format!(
            "Failed to copy {} to {}: {}",
            source.display(),
            dest.display(),
            e
        ));
    }
    if remove_source {
        if let Err(e) = std::fs::remove_file(&source) {
            return ToolResult::err(format!(
                "Copied, but failed to remove source {}: {}",
                source.display(),
                e
            ));
        }
        ToolResult::ok(format!(
            "Moved {} to {}",
            source.display(),
            dest.display()
        ))
    } else {
        ToolResult::ok(format!(
            "Copied {} to {}",
            source.display(),
            dest.display()
        ))
    }
}

/// Render an indented directory tree of the project.
pub struct GetProjectStructureTool;

#[async_trait]
impl Tool for GetProjectStructureTool {
    fn name(&self) -> &str {
        "get_project_structure"
    }

    fn description(&self) -> &str {
        "Show the project's directory tree up to a depth limit, skipping dependency and build directories."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "max_depth".to_string(),
            ParameterSchema::integer(Some("Maximum tree depth (default 3)")),
        );
        ParameterSchema::object(Some("Project structure parameters"), properties, vec![])
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let max_depth = usize_arg(&args, "max_depth").unwrap_or(DEFAULT_TREE_DEPTH);
        let mut out = String::new();
        render_tree(&ctx.project_root, 0, max_depth, &mut out);
        if out.is_empty() {
            ToolResult::ok("(empty project)".to_string())
        } else {
            ToolResult::ok(out.trim_end().to_string())
        }
    }
}

fn render_tree(dir: &Path, depth: usize, max_depth: usize, out: &mut String) {
    if depth >= max_depth {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut items: Vec<(String, bool)> = entries
        .flatten()
        .map(|e| {
            let name = e.file_name().to_string_lossy().into_owned();
            (name, e.path().is_dir())
        })
        .filter(|(name, _)| !name.starts_with('.'))
        .collect();
    items.sort();

    for (name, is_dir) in items {
        let indent = "  ".repeat(depth);
        if is_dir {
            if TREE_SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            out.push_str(&format!("{}{}/\n", indent, name));
            render_tree(&dir.join(&name), depth + 1, max_depth, out);
        } else {
            out.push_str(&format!("{}{}\n", indent, name));
        }
    }
}
