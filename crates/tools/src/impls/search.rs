//! Search and Project Tools
//!
//! `search_files` (bounded substring search over the tree),
//! `search_similar_code` and `get_project_context` (delegated to external
//! collaborators when the host wired them up).

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use codeloom_llm::ParameterSchema;

use crate::context::ToolExecutionContext;
use crate::paths::validate_path;
use crate::trait_def::{Tool, ToolResult};

use super::{bool_arg, missing_param, str_arg, usize_arg};

/// Files larger than this are skipped by the search walk.
const MAX_SEARCH_FILE_BYTES: u64 = 1024 * 1024;
/// Hard cap on reported matches.
const MAX_SEARCH_MATCHES: usize = 100;
const DEFAULT_SIMILAR_LIMIT: usize = 5;

const SEARCH_SKIP_DIRS: &[&str] = &["node_modules", "target", "dist", "build", ".git"];

/// Substring search across project files. Case-insensitive by default.
pub struct SearchFilesTool;

#[async_trait]
impl Tool for SearchFilesTool {
    fn name(&self) -> &str {
        "search_files"
    }

    fn description(&self) -> &str {
        "Search project files for a substring. Case-insensitive unless case_sensitive is true. Returns matching lines as path:line: text."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "pattern".to_string(),
            ParameterSchema::string(Some("Substring to search for")),
        );
        properties.insert(
            "path".to_string(),
            ParameterSchema::string(Some("Directory to search under. Defaults to the project root")),
        );
        properties.insert(
            "case_sensitive".to_string(),
            ParameterSchema::boolean(Some("Match case exactly. Defaults to false")),
        );
        ParameterSchema::object(
            Some("Search parameters"),
            properties,
            vec!["pattern".to_string()],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let pattern = match str_arg(&args, "pattern") {
            Some(p) if !p.is_empty() => p,
            Some(_) => return ToolResult::err("Search pattern must not be empty".to_string()),
            None => return missing_param("pattern"),
        };
        let raw = str_arg(&args, "path").unwrap_or(".");
        let root = match validate_path(raw, &ctx.working_directory_snapshot(), &ctx.project_root) {
            Ok(p) => p,
            Err(e) => return ToolResult::err(e),
        };

        let case_sensitive = bool_arg(&args, "case_sensitive").unwrap_or(false);
        let needle = if case_sensitive {
            pattern.to_string()
        } else {
            pattern.to_lowercase()
        };
        let mut matches = Vec::new();
        search_dir(&root, &ctx.project_root, &needle, case_sensitive, &mut matches);

        if matches.is_empty() {
            ToolResult::ok(format!("No matches for '{}'", pattern))
        } else {
            let capped = matches.len() >= MAX_SEARCH_MATCHES;
            let mut output = matches.join("\n");
            if capped {
                output.push_str(&format!(
                    "\n[match limit of {} reached]",
                    MAX_SEARCH_MATCHES
                ));
            }
            ToolResult::ok(output)
        }
    }
}

fn search_dir(
    dir: &Path,
    project_root: &Path,
    needle: &str,
    case_sensitive: bool,
    matches: &mut Vec<String>,
) {
    if matches.len() >= MAX_SEARCH_MATCHES {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        if matches.len() >= MAX_SEARCH_MATCHES {
            return;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            if !SEARCH_SKIP_DIRS.contains(&name.as_str()) {
                search_dir(&path, project_root, needle, case_sensitive, matches);
            }
            continue;
        }
        if std::fs::metadata(&path)
            .map(|m| m.len() > MAX_SEARCH_FILE_BYTES)
            .unwrap_or(true)
        {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue; // binary file
        };
        let rel = path
            .strip_prefix(project_root)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned();
        for (i, line) in content.lines().enumerate() {
            let hit = if case_sensitive {
                line.contains(needle)
            } else {
                line.to_lowercase().contains(needle)
            };
            if hit {
                matches.push(format!("{}:{}: {}", rel, i + 1, line.trim()));
                if matches.len() >= MAX_SEARCH_MATCHES {
                    return;
                }
            }
        }
    }
}

/// Vector-similarity search, delegated to the external collaborator.
pub struct SearchSimilarCodeTool;

#[async_trait]
impl Tool for SearchSimilarCodeTool {
    fn name(&self) -> &str {
        "search_similar_code"
    }

    fn description(&self) -> &str {
        "Find code in the project semantically similar to a query. Requires the similarity-search service."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "query".to_string(),
            ParameterSchema::string(Some("What to look for")),
        );
        properties.insert(
            "limit".to_string(),
            ParameterSchema::integer(Some("Maximum number of hits (default 5)")),
        );
        ParameterSchema::object(
            Some("Similarity search parameters"),
            properties,
            vec!["query".to_string()],
        )
    }

    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult {
        let query = match str_arg(&args, "query") {
            Some(q) => q,
            None => return missing_param("query"),
        };
        let limit = usize_arg(&args, "limit").unwrap_or(DEFAULT_SIMILAR_LIMIT);

        let Some(service) = &ctx.similarity else {
            return ToolResult::err(
                "Similarity search is not available in this session".to_string(),
            );
        };

        match service.search(query, limit).await {
            Ok(hits) if hits.is_empty() => {
                ToolResult::ok(format!("No similar code found for '{}'", query))
            }
            Ok(hits) => {
                let lines: Vec<String> = hits
                    .iter()
                    .map(|h| format!("{} (score {:.2}):\n{}", h.path, h.score, h.snippet))
                    .collect();
                ToolResult::ok(lines.join("\n\n"))
            }
            Err(e) => ToolResult::err(format!("Similarity search failed: {}", e)),
        }
    }
}

/// Prose project summary, delegated to the external collaborator.
pub struct GetProjectContextTool;

#[async_trait]
impl Tool for GetProjectContextTool {
    fn name(&self) -> &str {
        "get_project_context"
    }

    fn description(&self) -> &str {
        "Get a summary of the project: purpose, structure, and conventions. Requires the project-context service."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::object(Some("No parameters"), HashMap::new(), vec![])
    }

    async fn execute(&self, ctx: &ToolExecutionContext, _args: Value) -> ToolResult {
        let Some(service) = &ctx.project_context else {
            return ToolResult::err(
                "Project context is not available in this session".to_string(),
            );
        };
        match service.project_context().await {
            Ok(context) => ToolResult::ok(context),
            Err(e) => ToolResult::err(format!("Failed to build project context: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::make_ctx;
    use crate::context::{SimilarityHit, SimilaritySearch};
    use codeloom_core::CoreResult;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedSimilarity;

    #[async_trait]
    impl SimilaritySearch for FixedSimilarity {
        async fn search(&self, _query: &str, _limit: usize) -> CoreResult<Vec<SimilarityHit>> {
            Ok(vec![SimilarityHit {
                path: "src/app.js".to_string(),
                snippet: "function render() {}".to_string(),
                score: 0.91,
            }])
        }
    }

    #[tokio::test]
    async fn test_search_files_finds_matches() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "const Color = 'red';\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.css"), "h1 { color: red; }\n").unwrap();
        let ctx = make_ctx(dir.path());

        let result = SearchFilesTool
            .execute(&ctx, serde_json::json!({"pattern": "color"}))
            .await;
        assert!(result.success);
        let output = result.output.unwrap();
        assert!(output.contains("a.js:1:"));
        assert!(output.contains("sub/b.css:1:"));
    }

    #[tokio::test]
    async fn test_search_files_case_sensitive_flag() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.js"), "const Color = 'red';\n").unwrap();
        let ctx = make_ctx(dir.path());

        let result = SearchFilesTool
            .execute(
                &ctx,
                serde_json::json!({"pattern": "color", "case_sensitive": true}),
            )
            .await;
        assert!(result.success);
        assert!(result.output.unwrap().contains("No matches"));

        let result = SearchFilesTool
            .execute(
                &ctx,
                serde_json::json!({"pattern": "Color", "case_sensitive": true}),
            )
            .await;
        assert!(result.output.unwrap().contains("a.js:1:"));
    }

    #[tokio::test]
    async fn test_search_files_no_match() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "nothing here").unwrap();
        let ctx = make_ctx(dir.path());

        let result = SearchFilesTool
            .execute(&ctx, serde_json::json!({"pattern": "absent"}))
            .await;
        assert!(result.success);
        assert!(result.output.unwrap().contains("No matches"));
    }

    #[tokio::test]
    async fn test_search_files_skips_vendored_dirs() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/x.js"), "needle").unwrap();
        let ctx = make_ctx(dir.path());

        let result = SearchFilesTool
            .execute(&ctx, serde_json::json!({"pattern": "needle"}))
            .await;
        assert!(result.output.unwrap().contains("No matches"));
    }

    #[tokio::test]
    async fn test_similar_code_without_service_is_error() {
        let dir = TempDir::new().unwrap();
        let ctx = make_ctx(dir.path());

        let result = SearchSimilarCodeTool
            .execute(&ctx, serde_json::json!({"query": "render loop"}))
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not available"));
    }

    #[tokio::test]
    async fn test_similar_code_with_service() {
        let dir = TempDir::new().unwrap();
        let ctx = make_ctx(dir.path()).with_similarity(Arc::new(FixedSimilarity));

        let result = SearchSimilarCodeTool
            .execute(&ctx, serde_json::json!({"query": "render loop"}))
            .await;
        assert!(result.success);
        let output = result.output.unwrap();
        assert!(output.contains("src/app.js"));
        assert!(output.contains("0.91"));
    }

    #[tokio::test]
    async fn test_project_context_without_service_is_error() {
        let dir = TempDir::new().unwrap();
        let ctx = make_ctx(dir.path());

        let result = GetProjectContextTool
            .execute(&ctx, serde_json::json!({}))
            .await;
        assert!(!result.success);
    }
}
