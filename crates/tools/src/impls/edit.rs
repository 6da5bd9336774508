//! Edit Tools
//!
//! In-place file patching: `replace_in_file`, `insert_at_line`,
//! `delete_lines`, `replace_block`, and `replace_line_range`. Line numbers
//! are 1-based and inclusive; marker-based replacement keeps the marker
//! lines and swaps what lies between them.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use codeloom_llm::ParameterSchema;

use crate::context::ToolExecutionContext;
use crate::paths::validate_path;
use crate::trait_def::{Tool, ToolResult};

use super::{missing_param, str_arg, usize_arg};

/// Resolve and read the target file, or produce the error result.
fn load(ctx: &ToolExecutionContext, raw: &str) -> Result<(PathBuf, String), ToolResult> {
    let path = validate_path(raw, &ctx.working_directory_snapshot(), &ctx.project_root)
        .map_err(ToolResult::err)?;
    let content = std::fs::read_to_string(&path)
        .map_err(|e| ToolResult::err(format!("Failed to read {}: {}", path.display(), e)))?;
    Ok((path, content))
}

fn store(path: &PathBuf, content: &str, summary: String) -> ToolResult {
    match std::fs::write(path, content) {
        Ok(_) => ToolResult::ok(summary),
        Err(e) => ToolResult::err(format!("Failed to write {}: {}", path.display(), e)),
    }
}

fn path_schema(extra: &[(&str, ParameterSchema)], required: &[&str]) -> ParameterSchema {
    let mut properties = HashMap::new();
    properties.insert(
        "path".to_string(),
        ParameterSchema::string(Some("Path of the file to edit")),
    );
    for (name, schema) in extra {
        properties.insert(name.to_string(), schema.clone());
    }
    let mut req = vec!["path".to_string()];
    req.extend(required.iter().map(|s| s.to_string()));
    ParameterSchema::object(Some("Edit parameters"), properties, req)
}

/// Replace every occurrence of a search string.
pub struct ReplaceInFileTool;

#[async_trait]
impl Tool for ReplaceInFileTool {
    fn name(&self) -> &str {
        "replace_in_file"
    }

    fn description(&self) -> &str {
        "Replace all occurrences of a search string in a file with a replacement string."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        path_schema(
            &[
                (
                    "search",
                    ParameterSchema::string(Some("Exact text to search for")),
                ),
                (
                    "replace",
                    ParameterSchema::string(Some("Text to replace it with")),
                ),
            ],
            &["search", "replace"],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let raw = match str_arg(&args, "path") {
            Some(p) => p,
            None => return missing_param("path"),
        };
        let search = match str_arg(&args, "search") {
            Some(s) => s,
            None => return missing_param("search"),
        };
        let replace = match str_arg(&args, "replace") {
            Some(r) => r,
            None => return missing_param("replace"),
        };
        if search.is_empty() {
            return ToolResult::err("Search string must not be empty".to_string());
        }

        let (path, content) = match load(ctx, raw) {
            Ok(v) => v,
            Err(e) => return e,
        };

        let count = content.matches(search).count();
        if count == 0 {
            return ToolResult::err(format!(
                "Search string not found in {}",
                path.display()
            ));
        }

        let updated = content.replace(search, replace);
        store(
            &path,
            &updated,
            format!("Replaced {} occurrence(s) in {}", count, path.display()),
        )
    }
}

/// Insert content before a given 1-based line.
pub struct InsertAtLineTool;

#[async_trait]
impl Tool for InsertAtLineTool {
    fn name(&self) -> &str {
        "insert_at_line"
    }

    fn description(&self) -> &str {
        "Insert content before the given line number (1-based). Line number may be one past the end to append."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        path_schema(
            &[
                (
                    "line",
                    ParameterSchema::integer(Some("Line number to insert before (1-based)")),
                ),
                (
                    "content",
                    ParameterSchema::string(Some("Content to insert")),
                ),
            ],
            &["line", "content"],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let raw = match str_arg(&args, "path") {
            Some(p) => p,
            None => return missing_param("path"),
        };
        let line = match usize_arg(&args, "line") {
            Some(l) => l,
            None => return missing_param("line"),
        };
        let content = match str_arg(&args, "content") {
            Some(c) => c,
            None => return missing_param("content"),
        };

        let (path, existing) = match load(ctx, raw) {
            Ok(v) => v,
            Err(e) => return e,
        };

        let mut lines: Vec<&str> = existing.lines().collect();
        if line == 0 || line > lines.len() + 1 {
            return ToolResult::err(format!(
                "Line {} is out of range (file has {} lines)",
                line,
                lines.len()
            ));
        }

        let inserted: Vec<&str> = content.lines().collect();
        let insert_count = inserted.len();
        lines.splice(line - 1..line - 1, inserted);
        let mut updated = lines.join("\n");
        if existing.ends_with('\n') {
            updated.push('\n');
        }

        store(
            &path,
            &updated,
            format!(
                "Inserted {} line(s) at line {} in {}",
                insert_count,
                line,
                path.display()
            ),
        )
    }
}

/// Delete a 1-based inclusive line range.
pub struct DeleteLinesTool;

#[async_trait]
impl Tool for DeleteLinesTool {
    fn name(&self) -> &str {
        "delete_lines"
    }

    fn description(&self) -> &str {
        "Delete a range of lines from a file (1-based, inclusive)."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        path_schema(
            &[
                (
                    "start_line",
                    ParameterSchema::integer(Some("First line to delete (1-based)")),
                ),
                (
                    "end_line",
                    ParameterSchema::integer(Some("Last line to delete (inclusive)")),
                ),
            ],
            &["start_line", "end_line"],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let raw = match str_arg(&args, "path") {
            Some(p) => p,
            None => return missing_param("path"),
        };
        let start = match usize_arg(&args, "start_line") {
            Some(n) => n,
            None => return missing_param("start_line"),
        };
        let end = match usize_arg(&args, "end_line") {
            Some(n) => n,
            None => return missing_param("end_line"),
        };

        let (path, existing) = match load(ctx, raw) {
            Ok(v) => v,
            Err(e) => return e,
        };

        let mut lines: Vec<&str> = existing.lines().collect();
        if start == 0 || end < start || start > lines.len() {
            return ToolResult::err(format!(
                "Invalid line range {}..{} (file has {} lines)",
                start,
                end,
                lines.len()
            ));
        }
        let end = end.min(lines.len());
        let removed = end - start + 1;
        lines.drain(start - 1..end);
        let mut updated = lines.join("\n");
        if existing.ends_with('\n') && !updated.is_empty() {
            updated.push('\n');
        }

        store(
            &path,
            &updated,
            format!("Deleted {} line(s) from {}", removed, path.display()),
        )
    }
}

/// Replace the content between a start marker and an end marker.
pub struct ReplaceBlockTool;

#[async_trait]
impl Tool for ReplaceBlockTool {
    fn name(&self) -> &str {
        "replace_block"
    }

    fn description(&self) -> &str {
        "Replace the lines between a start marker line and an end marker line. The marker lines themselves are kept."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        path_schema(
            &[
                (
                    "start_marker",
                    ParameterSchema::string(Some("Text identifying the line before the block")),
                ),
                (
                    "end_marker",
                    ParameterSchema::string(Some("Text identifying the line after the block")),
                ),
                (
                    "content",
                    ParameterSchema::string(Some("Replacement content for the block")),
                ),
            ],
            &["start_marker", "end_marker", "content"],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let raw = match str_arg(&args, "path") {
            Some(p) => p,
            None => return missing_param("path"),
        };
        let start_marker = match str_arg(&args, "start_marker") {
            Some(m) => m,
            None => return missing_param("start_marker"),
        };
        let end_marker = match str_arg(&args, "end_marker") {
            Some(m) => m,
            None => return missing_param("end_marker"),
        };
        let content = match str_arg(&args, "content") {
            Some(c) => c,
            None => return missing_param("content"),
        };

        let (path, existing) = match load(ctx, raw) {
            Ok(v) => v,
            Err(e) => return e,
        };

        let lines: Vec<&str> = existing.lines().collect();
        let start_idx = match lines.iter().position(|l| l.contains(start_marker)) {
            Some(i) => i,
            None => {
                return ToolResult::err(format!(
                    "Start marker '{}' not found in {}",
                    start_marker,
                    path.display()
                ))
            }
        };
        let end_idx = match lines[start_idx + 1..]
            .iter()
            .position(|l| l.contains(end_marker))
        {
            Some(i) => start_idx + 1 + i,
            None => {
                return ToolResult::err(format!(
                    "End marker '{}' not found after start marker in {}",
                    end_marker,
                    path.display()
                ))
            }
        };

        let mut updated_lines: Vec<&str> = Vec::new();
        updated_lines.extend_from_slice(&lines[..=start_idx]);
        updated_lines.extend(content.lines());
        updated_lines.extend_from_slice(&lines[end_idx..]);
        let mut updated = updated_lines.join("\n");
        if existing.ends_with('\n') {
            updated.push('\n');
        }

        store(
            &path,
            &updated,
            format!(
                "Replaced block between markers in {} ({} lines removed)",
                path.display(),
                end_idx - start_idx - 1
            ),
        )
    }
}

/// Replace a 1-based inclusive line range with new content.
pub struct ReplaceLineRangeTool;

#[async_trait]
impl Tool for ReplaceLineRangeTool {
    fn name(&self) -> &str {
        "replace_line_range"
    }

    fn description(&self) -> &str {
        "Replace a range of lines (1-based, inclusive) with new content."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        path_schema(
            &[
                (
                    "start_line",
                    ParameterSchema::integer(Some("First line to replace (1-based)")),
                ),
                (
                    "end_line",
                    ParameterSchema::integer(Some("Last line to replace (inclusive)")),
                ),
                (
                    "content",
                    ParameterSchema::string(Some("Replacement content")),
                ),
            ],
            &["start_line", "end_line", "content"],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let raw = match str_arg(&args, "path") {
            Some(p) => p,
            None => return missing_param("path"),
        };
        let start = match usize_arg(&args, "start_line") {
            Some(n) => n,
            None => return missing_param("start_line"),
        };
        let end = match usize_arg(&args, "end_line") {
            Some(n) => n,
            None => return missing_param("end_line"),
        };
        let content = match str_arg(&args, "content") {
            Some(c) => c,
            None => return missing_param("content"),
        };

        let (path, existing) = match load(ctx, raw) {
            Ok(v) => v,
            Err(e) => return e,
        };

        let lines: Vec<&str> = existing.lines().collect();
        if start == 0 || end < start || start > lines.len() {
            return ToolResult::err(format!(
                "Invalid line range {}..{} (file has {} lines)",
                start,
                end,
                lines.len()
            ));
        }
        let end = end.min(lines.len());

        let mut updated_lines: Vec<&str> = Vec::new();
        updated_lines.extend_from_slice(&lines[..start - 1]);
        updated_lines.extend(content.lines());
        updated_lines.extend_from_slice(&lines[end..]);
        let mut updated = updated_lines.join("\n");
        if existing.ends_with('\n') {
            updated.push('\n');
        }

        store(
            &path,
            &updated,
            format!(
                "Replaced lines {}..{} in {}",
                start,
                end,
                path.display()
            ),
        )
    }
}
