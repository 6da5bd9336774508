//! Ceiling and failure behavior of the run loop.

use codeloom::{ChatMessage, ChatRole, EndReason, OrchestratorConfig, OrchestratorEvent};
use tempfile::TempDir;

use crate::support::{scripted_graph, text, tool_call};

#[tokio::test]
async fn test_cycle_ceiling_ends_run_when_planning_never_succeeds() {
    let dir = TempDir::new().unwrap();
    let config = OrchestratorConfig::builder().max_cycles(3).build().unwrap();
    // Empty script: every model call fails, so the plan stays empty and the
    // router keeps selecting the planner until the ceiling trips.
    let (graph, sink) = scripted_graph(vec![], dir.path(), config);

    let outcome = graph.run("build something").await;

    assert!(outcome.forced);
    assert_eq!(outcome.end_reason, EndReason::CycleCeiling);
    assert_eq!(outcome.cycles, 3);
    assert!(outcome.files().is_empty());
    // Forced or not, the run still reports a terminal outcome.
    assert!(outcome.is_complete());

    let events = sink.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, OrchestratorEvent::Error { .. })));
    assert!(matches!(
        events.last().unwrap(),
        OrchestratorEvent::Complete { forced: true, .. }
    ));
}

#[tokio::test]
async fn test_hard_ceiling_wins_over_everything_else() {
    let dir = TempDir::new().unwrap();
    let config = OrchestratorConfig::builder()
        .soft_review_cap(1)
        .hard_review_cap(1)
        .build()
        .unwrap();
    let script = vec![
        text("1. Create `index.html` with the page"),
        tool_call(
            "call_1",
            "write_file",
            serde_json::json!({"path": "index.html", "content": "<!DOCTYPE html><html><body>hi</body></html>"}),
        ),
        text("Wrote index.html."),
        text("NEEDS IMPROVEMENT: missing everything"),
    ];
    let (graph, _sink) = scripted_graph(script, dir.path(), config);

    let outcome = graph.run("build a page").await;

    // One review puts iterations at the hard ceiling; priority rule 2 ends
    // the run before approval or the fixer are even considered.
    assert!(outcome.forced);
    assert_eq!(outcome.end_reason, EndReason::ReviewCeiling);
    assert_eq!(outcome.state.review_iterations, 1);
}

#[tokio::test]
async fn test_unknown_tool_is_folded_not_fatal() {
    let dir = TempDir::new().unwrap();
    let script = vec![
        text("1. Create `index.html` with the page"),
        // The model asks for a tool that does not exist; the dispatcher
        // answers with an error string and the loop continues.
        tool_call("call_1", "compile_project", serde_json::json!({})),
        tool_call(
            "call_2",
            "write_file",
            serde_json::json!({"path": "index.html", "content": "<!DOCTYPE html><html><body>hi</body></html>"}),
        ),
        text("Wrote index.html."),
        text("APPROVED"),
    ];
    let (graph, _sink) = scripted_graph(script, dir.path(), OrchestratorConfig::default());

    let outcome = graph.run("build a page").await;

    assert!(outcome.is_complete());
    assert!(!outcome.forced);
    assert_eq!(outcome.files(), vec!["index.html".to_string()]);
    assert_eq!(outcome.tool_calls.total_calls, 2);
    assert_eq!(outcome.tool_calls.failures, 1);

    // Both dispatches show up in the session log, the failure with its
    // error text.
    let tool_entries: Vec<&ChatMessage> = outcome
        .state
        .messages
        .iter()
        .filter(|m| m.role == ChatRole::Tool)
        .collect();
    assert_eq!(tool_entries.len(), 2);
    assert!(tool_entries[0].content.starts_with("compile_project:"));
    assert!(tool_entries[0].content.contains("Unknown tool"));
    assert_eq!(tool_entries[1].content, "write_file: ok");
}
