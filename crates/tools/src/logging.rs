//! Tool Call Logging
//!
//! Per-session record of every tool dispatch: what ran, with which
//! arguments, how long it took, and whether it succeeded. Records are
//! ephemeral and cleared at the session boundary; summaries feed the final
//! run report. Also owns the per-tool output truncation applied before
//! results are stored or folded back to the model.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default cap on stored/folded tool output, in characters.
const DEFAULT_OUTPUT_CAP: usize = 4_000;

/// One completed tool dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool name.
    pub tool: String,
    /// The arguments the tool was invoked with.
    pub arguments: Value,
    /// When the dispatch started.
    pub started_at: DateTime<Utc>,
    /// When the dispatch completed.
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: i64,
    /// Whether the tool reported success.
    pub success: bool,
    /// Truncated result text or error string.
    pub result: String,
}

/// Aggregated statistics over a session's tool calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCallSummary {
    pub total_calls: usize,
    pub failures: usize,
    pub total_duration_ms: i64,
    /// Per-tool (calls, failures), in name order.
    pub per_tool: BTreeMap<String, (usize, usize)>,
}

/// Session-scoped log of tool dispatches. Interior-mutable so the registry
/// can record through a shared handle.
#[derive(Debug, Default)]
pub struct ToolCallLog {
    records: Mutex<Vec<ToolCallRecord>>,
}

impl ToolCallLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed dispatch.
    pub fn record(&self, record: ToolCallRecord) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(record);
        }
    }

    /// Snapshot of every record so far.
    pub fn records(&self) -> Vec<ToolCallRecord> {
        self.records
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Aggregate statistics for the session so far.
    pub fn summary(&self) -> ToolCallSummary {
        let records = self.records();
        let mut summary = ToolCallSummary {
            total_calls: records.len(),
            ..Default::default()
        };
        for record in &records {
            let entry = summary.per_tool.entry(record.tool.clone()).or_default();
            entry.0 += 1;
            if !record.success {
                entry.1 += 1;
                summary.failures += 1;
            }
            summary.total_duration_ms += record.duration_ms;
        }
        summary
    }

    /// Drop all records (session boundary).
    pub fn clear(&self) {
        if let Ok(mut guard) = self.records.lock() {
            guard.clear();
        }
    }
}

/// Per-tool character cap for stored and folded output.
///
/// Read-heavy tools get a larger budget; everything else shares the
/// default.
pub fn output_cap(tool: &str) -> usize {
    match tool {
        "read_file" | "read_lines" | "execute_command" => 8_000,
        "get_project_structure" | "search_files" => 6_000,
        _ => DEFAULT_OUTPUT_CAP,
    }
}

/// Truncate tool output to its per-tool cap, appending a marker naming the
/// original and truncated sizes.
pub fn truncate_result(tool: &str, output: &str) -> String {
    let cap = output_cap(tool);
    if output.len() <= cap {
        return output.to_string();
    }
    // Cut on a char boundary at or below the cap.
    let mut end = cap;
    while end > 0 && !output.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}\n[truncated for context: {} -> {} chars]",
        &output[..end],
        output.len(),
        end
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tool: &str, success: bool, duration_ms: i64) -> ToolCallRecord {
        let now = Utc::now();
        ToolCallRecord {
            tool: tool.to_string(),
            arguments: serde_json::json!({}),
            started_at: now,
            finished_at: now,
            duration_ms,
            success,
            result: String::new(),
        }
    }

    #[test]
    fn test_summary_aggregates_per_tool() {
        let log = ToolCallLog::new();
        log.record(record("read_file", true, 3));
        log.record(record("read_file", false, 5));
        log.record(record("write_file", true, 2));

        let summary = log.summary();
        assert_eq!(summary.total_calls, 3);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.total_duration_ms, 10);
        assert_eq!(summary.per_tool["read_file"], (2, 1));
        assert_eq!(summary.per_tool["write_file"], (1, 0));
    }

    #[test]
    fn test_clear_drops_records() {
        let log = ToolCallLog::new();
        log.record(record("read_file", true, 1));
        log.clear();
        assert!(log.records().is_empty());
        assert_eq!(log.summary().total_calls, 0);
    }

    #[test]
    fn test_truncate_result_under_cap() {
        assert_eq!(truncate_result("write_file", "ok"), "ok");
    }

    #[test]
    fn test_truncate_result_over_cap() {
        let long = "x".repeat(10_000);
        let truncated = truncate_result("write_file", &long);
        assert!(truncated.len() < long.len());
        assert!(truncated.contains("[truncated for context: 10000 -> 4000 chars]"));
    }

    #[test]
    fn test_read_tools_get_larger_cap() {
        assert!(output_cap("read_file") > output_cap("write_file"));
    }
}
