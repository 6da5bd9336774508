//! Read Tools
//!
//! `read_file`, `read_lines`, and `get_file_info`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use codeloom_llm::ParameterSchema;

use crate::context::ToolExecutionContext;
use crate::paths::validate_path;
use crate::trait_def::{Tool, ToolResult};

use super::{missing_param, str_arg, usize_arg};

/// Read a whole file.
pub struct ReadFileTool;

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the full contents of a file."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "path".to_string(),
            ParameterSchema::string(Some("Path of the file to read, relative to the project root")),
        );
        ParameterSchema::object(
            Some("Read file parameters"),
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

        match std::fs::read_to_string(&path) {
            Ok(content) => ToolResult::ok(content),
            Err(e) => ToolResult::err(format!("Failed to read {}: {}", path.display(), e)),
        }
    }
}

/// Read a 1-based inclusive line range from a file.
pub struct ReadLinesTool;

#[async_trait]
impl Tool for ReadLinesTool {
    fn name(&self) -> &str {
        "read_lines"
    }

    fn description(&self) -> &str {
        "Read a range of lines from a file (1-based, inclusive)."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "path".to_string(),
            ParameterSchema::string(Some("Path of the file to read")),
        );
        properties.insert(
            "start_line".to_string(),
            ParameterSchema::integer(Some("First line to read (1-based)")),
        );
        properties.insert(
            "end_line".to_string(),
            ParameterSchema::integer(Some("Last line to read (inclusive)")),
        );
        ParameterSchema::object(
            Some("Read lines parameters"),
            properties,
            vec![
                "path".to_string(),
                "start_line".to_string(),
                "end_line".to_string(),
            ],
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
        if start == 0 || end < start {
            return ToolResult::err(format!("Invalid line range: {}..{}", start, end));
        }

        let path = match validate_path(raw, &ctx.working_directory_snapshot(), &ctx.project_root) {
            Ok(p) => p,
            Err(e) => return ToolResult::err(e),
        };
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => return ToolResult::err(format!("Failed to read {}: {}", path.display(), e)),
        };

        let lines: Vec<&str> = content.lines().collect();
        if start > lines.len() {
            return ToolResult::err(format!(
                "start_line {} is past the end of the file ({} lines)",
                start,
                lines.len()
            ));
        }
        let end = end.min(lines.len());
        let numbered: Vec<String> = lines[start - 1..end]
            .iter()
            .enumerate()
            .map(|(i, line)| format!("{}: {}", start + i, line))
            .collect();
        ToolResult::ok(numbered.join("\n"))
    }
}

/// Report size, line count, and modification time for a path.
pub struct GetFileInfoTool;

#[async_trait]
impl Tool for GetFileInfoTool {
    fn name(&self) -> &str {
        "get_file_info"
    }

    fn description(&self) -> &str {
        "Get metadata for a file: size in bytes, line count, and last modification time."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "path".to_string(),
            ParameterSchema::string(Some("Path of the file to inspect")),
        );
        ParameterSchema::object(
            Some("File info parameters"),
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

        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => return ToolResult::err(format!("Failed to stat {}: {}", path.display(), e)),
        };

        let modified = metadata
            .modified()
            .ok()
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());

        let lines = if metadata.is_file() {
            std::fs::read_to_string(&path)
                .map(|c| c.lines().count().to_string())
                .unwrap_or_else(|_| "binary".to_string())
        } else {
            "-".to_string()
        };

        ToolResult::ok(format!(
            "path: {}\ntype: {}\nsize: {} bytes\nlines: {}\nmodified: {}",
            path.display(),
            if metadata.is_dir() { "directory" } else { "file" },
            metadata.len(),
            lines,
            modified
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::make_ctx;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hello.txt"), "hello world").unwrap();
        let ctx = make_ctx(dir.path());

        let result = ReadFileTool
            .execute(&ctx, serde_json::json!({"path": "hello.txt"}))
            .await;
        assert!(result.success);
        assert_eq!(result.output.unwrap(), "hello world");
    }

    #[tokio::test]
    async fn test_read_file_missing_is_error_string() {
        let dir = TempDir::new().unwrap();
        let ctx = make_ctx(dir.path());

        let result = ReadFileTool
            .execute(&ctx, serde_json::json!({"path": "ghost.txt"}))
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Failed to read"));
    }

    #[tokio::test]
    async fn test_read_file_rejects_escape() {
        let dir = TempDir::new().unwrap();
        let ctx = make_ctx(dir.path());

        let result = ReadFileTool
            .execute(&ctx, serde_json::json!({"path": "../../etc/passwd"}))
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("escapes project root"));
    }

    #[tokio::test]
    async fn test_read_lines_range() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.txt"), "a\nb\nc\nd\n").unwrap();
        let ctx = make_ctx(dir.path());

        let result = ReadLinesTool
            .execute(
                &ctx,
                serde_json::json!({"path": "f.txt", "start_line": 2, "end_line": 3}),
            )
            .await;
        assert!(result.success);
        assert_eq!(result.output.unwrap(), "2: b\n3: c");
    }

    #[tokio::test]
    async fn test_read_lines_bad_range() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.txt"), "a\n").unwrap();
        let ctx = make_ctx(dir.path());

        let result = ReadLinesTool
            .execute(
                &ctx,
                serde_json::json!({"path": "f.txt", "start_line": 0, "end_line": 3}),
            )
            .await;
        assert!(!result.success);

        let result = ReadLinesTool
            .execute(
                &ctx,
                serde_json::json!({"path": "f.txt", "start_line": 5, "end_line": 9}),
            )
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("past the end"));
    }

    #[tokio::test]
    async fn test_get_file_info() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f.txt"), "a\nb\n").unwrap();
        let ctx = make_ctx(dir.path());

        let result = GetFileInfoTool
            .execute(&ctx, serde_json::json!({"path": "f.txt"}))
            .await;
        assert!(result.success);
        let output = result.output.unwrap();
        assert!(output.contains("type: file"));
        assert!(output.contains("size: 4 bytes"));
        assert!(output.contains("lines: 2"));
    }

    #[tokio::test]
    async fn test_missing_param() {
        let dir = TempDir::new().unwrap();
        let ctx = make_ctx(dir.path());

        let result = ReadFileTool.execute(&ctx, serde_json::json!({})).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("path"));
    }
}
