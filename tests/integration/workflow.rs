//! Full-graph runs against a scripted provider.

use codeloom::{ChatRole, EndReason, OrchestratorConfig, OrchestratorEvent};
use tempfile::TempDir;

use crate::support::{scripted_graph, text, tool_call};

const PAGE: &str =
    "<!DOCTYPE html>\n<html>\n<body>\n<h1>Hello</h1>\n</body>\n</html>\n";

#[tokio::test]
async fn test_happy_path_plan_generate_approve() {
    let dir = TempDir::new().unwrap();
    let script = vec![
        text("1. Create `index.html` with the greeting page"),
        tool_call(
            "call_1",
            "write_file",
            serde_json::json!({"path": "index.html", "content": PAGE}),
        ),
        text("Wrote index.html with the greeting page."),
        text("APPROVED"),
    ];
    let (graph, sink) = scripted_graph(script, dir.path(), OrchestratorConfig::default());

    let outcome = graph.run("build a greeting page").await;

    assert!(outcome.is_complete());
    assert!(!outcome.forced);
    assert_eq!(outcome.end_reason, EndReason::Approved);
    assert_eq!(outcome.files(), vec!["index.html".to_string()]);
    assert_eq!(outcome.review_feedback(), "APPROVED");
    assert_eq!(outcome.state.review_iterations, 1);
    assert_eq!(outcome.tool_calls.total_calls, 1);
    assert_eq!(outcome.tool_calls.failures, 0);

    // The file really landed on disk.
    let on_disk = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert_eq!(on_disk, PAGE);

    // The session log records the tool dispatch under the tool role.
    assert!(outcome
        .state
        .messages
        .iter()
        .any(|m| m.role == ChatRole::Tool && m.content.contains("write_file: ok")));

    // Event stream covers the whole lifecycle and ends with complete.
    let events = sink.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, OrchestratorEvent::Plan { steps } if steps.len() == 1)));
    assert!(events
        .iter()
        .any(|e| matches!(e, OrchestratorEvent::FilesGenerated { files } if files == &vec!["index.html".to_string()])));
    assert!(events
        .iter()
        .any(|e| matches!(e, OrchestratorEvent::Review { approved: true, .. })));
    match events.last().unwrap() {
        OrchestratorEvent::Complete {
            is_complete,
            files,
            forced,
        } => {
            assert!(is_complete);
            assert!(!forced);
            assert_eq!(files, &vec!["index.html".to_string()]);
        }
        other => panic!("Expected Complete event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_css_is_auto_fixed_before_review() {
    let dir = TempDir::new().unwrap();
    let script = vec![
        text("1. Create `style.css` with the base styles"),
        tool_call(
            "call_1",
            "write_file",
            serde_json::json!({"path": "style.css", "content": "body { color: red;\n"}),
        ),
        text("Wrote style.css."),
        text("APPROVED"),
    ];
    let (graph, _sink) = scripted_graph(script, dir.path(), OrchestratorConfig::default());

    let outcome = graph.run("style the page").await;

    assert!(outcome.is_complete());
    let fixed = &outcome.state.generated_files["style.css"];
    assert_eq!(fixed.matches('{').count(), fixed.matches('}').count());
    // Disk carries the fixed content too.
    let on_disk = std::fs::read_to_string(dir.path().join("style.css")).unwrap();
    assert_eq!(&on_disk, fixed);
}

#[tokio::test]
async fn test_rejection_runs_fixer_then_approves() {
    let dir = TempDir::new().unwrap();
    let script = vec![
        text("1. Create `index.html` with the page"),
        tool_call(
            "call_1",
            "write_file",
            serde_json::json!({"path": "index.html", "content": PAGE}),
        ),
        text("Wrote index.html."),
        text("NEEDS IMPROVEMENT: the heading should say Welcome"),
        tool_call(
            "call_2",
            "replace_in_file",
            serde_json::json!({"path": "index.html", "search": "Hello", "replace": "Welcome"}),
        ),
        text("Changed the heading."),
        text("APPROVED"),
    ];
    let (graph, sink) = scripted_graph(script, dir.path(), OrchestratorConfig::default());

    let outcome = graph.run("build a welcome page").await;

    assert!(outcome.is_complete());
    assert!(!outcome.forced);
    assert_eq!(outcome.state.review_iterations, 2);
    assert!(outcome.state.generated_files["index.html"].contains("Welcome"));

    let events = sink.events();
    assert!(events
        .iter()
        .any(|e| matches!(e, OrchestratorEvent::Review { approved: false, iteration: 1, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e, OrchestratorEvent::FilesFixed { files } if files == &vec!["index.html".to_string()])));
    assert!(events
        .iter()
        .any(|e| matches!(e, OrchestratorEvent::Review { approved: true, iteration: 2, .. })));
}

#[tokio::test]
async fn test_soft_cap_forces_completion_without_approval() {
    let dir = TempDir::new().unwrap();
    let config = OrchestratorConfig::builder()
        .soft_review_cap(1)
        .build()
        .unwrap();
    let script = vec![
        text("1. Create `index.html` with the page"),
        tool_call(
            "call_1",
            "write_file",
            serde_json::json!({"path": "index.html", "content": PAGE}),
        ),
        text("Wrote index.html."),
        text("NEEDS IMPROVEMENT: missing the footer"),
    ];
    let (graph, sink) = scripted_graph(script, dir.path(), config);

    let outcome = graph.run("build a page").await;

    // Forced to completion: the file list and verdict still come back.
    assert!(outcome.is_complete());
    assert!(outcome.forced);
    assert_eq!(outcome.end_reason, EndReason::ForcedAcceptance);
    assert_eq!(outcome.files(), vec!["index.html".to_string()]);
    assert!(outcome.review_feedback().contains("missing the footer"));

    match sink.events().last().unwrap() {
        OrchestratorEvent::Complete { forced, .. } => assert!(forced),
        other => panic!("Expected Complete event, got {:?}", other),
    }
}

#[tokio::test]
async fn test_completion_check_runs_once_before_review() {
    let dir = TempDir::new().unwrap();
    let config = OrchestratorConfig::builder()
        .completion_check(true)
        .build()
        .unwrap();
    let script = vec![
        text("1. Create `index.html` with the page"),
        tool_call(
            "call_1",
            "write_file",
            serde_json::json!({"path": "index.html", "content": PAGE}),
        ),
        text("Wrote index.html."),
        // Completion check finds nothing to patch.
        text("The page fully implements the request."),
        text("APPROVED"),
    ];
    let (graph, sink) = scripted_graph(script, dir.path(), config);

    let outcome = graph.run("build a page").await;

    assert!(outcome.is_complete());
    assert!(!outcome.forced);

    let events = sink.events();
    let checks: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, OrchestratorEvent::CompletionCheck { .. }))
        .collect();
    assert_eq!(checks.len(), 1);
    match checks[0] {
        OrchestratorEvent::CompletionCheck { complete, .. } => assert!(complete),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn test_generated_files_last_write_wins_across_nodes() {
    let dir = TempDir::new().unwrap();
    let script = vec![
        text("1. Create `a.css`\n2. Update `a.css` with the final palette"),
        tool_call(
            "call_1",
            "write_file",
            serde_json::json!({"path": "a.css", "content": "a { color: red; }\n"}),
        ),
        text("Wrote a.css."),
        tool_call(
            "call_2",
            "write_file",
            serde_json::json!({"path": "a.css", "content": "a { color: blue; }\n"}),
        ),
        text("Updated a.css."),
        text("APPROVED"),
    ];
    let (graph, _sink) = scripted_graph(script, dir.path(), OrchestratorConfig::default());

    let outcome = graph.run("style the links").await;

    assert_eq!(outcome.files(), vec!["a.css".to_string()]);
    assert_eq!(outcome.state.generated_files["a.css"], "a { color: blue; }\n");
}
