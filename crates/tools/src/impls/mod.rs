//! Tool Catalog
//!
//! The canonical file/project operations the orchestrator exposes to the
//! model, grouped by concern. `standard_registry` builds the full catalog
//! in its canonical order.

use std::sync::Arc;

use serde_json::Value;

use codeloom_core::CoreResult;

use crate::trait_def::{ToolRegistry, ToolResult};

pub mod dirs;
pub mod edit;
pub mod read;
pub mod search;
pub mod shell;
pub mod write;

/// Build the registry with the full 20-tool catalog.
pub fn standard_registry() -> CoreResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(read::ReadFileTool))?;
    registry.register(Arc::new(write::WriteFileTool))?;
    registry.register(Arc::new(write::AppendToFileTool))?;
    registry.register(Arc::new(write::DeleteFileTool))?;
    registry.register(Arc::new(dirs::ListDirectoryTool))?;
    registry.register(Arc::new(search::SearchFilesTool))?;
    registry.register(Arc::new(edit::ReplaceInFileTool))?;
    registry.register(Arc::new(edit::InsertAtLineTool))?;
    registry.register(Arc::new(edit::DeleteLinesTool))?;
    registry.register(Arc::new(edit::ReplaceBlockTool))?;
    registry.register(Arc::new(edit::ReplaceLineRangeTool))?;
    registry.register(Arc::new(read::ReadLinesTool))?;
    registry.register(Arc::new(read::GetFileInfoTool))?;
    registry.register(Arc::new(dirs::CreateDirectoryTool))?;
    registry.register(Arc::new(dirs::CopyFileTool))?;
    registry.register(Arc::new(dirs::MoveFileTool))?;
    registry.register(Arc::new(dirs::GetProjectStructureTool))?;
    registry.register(Arc::new(shell::ExecuteCommandTool::new()))?;
    registry.register(Arc::new(search::SearchSimilarCodeTool))?;
    registry.register(Arc::new(search::GetProjectContextTool))?;

    Ok(registry)
}

/// Tool names that write file content the validator should inspect.
pub const WRITE_CLASS_TOOLS: &[&str] = &[
    "write_file",
    "append_to_file",
    "replace_in_file",
    "insert_at_line",
    "replace_block",
    "replace_line_range",
];

// ── argument helpers ────────────────────────────────────────────────────────

pub(crate) fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

pub(crate) fn usize_arg(args: &Value, key: &str) -> Option<usize> {
    args.get(key).and_then(|v| v.as_u64()).map(|v| v as usize)
}

pub(crate) fn bool_arg(args: &Value, key: &str) -> Option<bool> {
    args.get(key).and_then(|v| v.as_bool())
}

pub(crate) fn missing_param(param: &str) -> ToolResult {
    ToolResult::err(format!("Missing required parameter: {}", param))
}
