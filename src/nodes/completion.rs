//! Completion-Check Node
//!
//! Optional pass between generation and the first review: re-reads every
//! generated file from disk, asks the model whether the implementation is
//! actually finished, and lets it patch small gaps through the normal tool
//! contract. Runs at most once per session; the graph tracks that.

use async_trait::async_trait;

use codeloom_core::{ChatMessage, OrchestratorEvent, SessionState, StateDelta};
use codeloom_llm::truncate_for_review;

use crate::prompts;

use super::tool_loop::{current_file_content, persist_outputs, run_tool_loop};
use super::{Node, OrchestratorContext};

pub struct CompletionCheckNode;

#[async_trait]
impl Node for CompletionCheckNode {
    fn name(&self) -> &'static str {
        "completion_check"
    }

    async fn run(&self, ctx: &OrchestratorContext, state: &SessionState) -> StateDelta {
        ctx.session.emit_status("Checking implementation completeness");

        if state.generated_files.is_empty() {
            ctx.session.emit(OrchestratorEvent::CompletionCheck {
                complete: true,
                detail: "No generated files to check".to_string(),
            });
            return StateDelta::new();
        }

        let known = state.touched_files();
        let summaries: Vec<String> = state
            .generated_files
            .iter()
            .map(|(path, content)| {
                let current = current_file_content(ctx, &known, path, content);
                format!(
                    "--- {} ---\n{}",
                    path,
                    truncate_for_review(path, &current, ctx.config.review_file_budget)
                )
            })
            .collect();

        let outcome = run_tool_loop(
            ctx,
            prompts::completion_system(),
            prompts::completion_prompt(&state.user_request, &summaries),
            false,
        )
        .await;

        let mut delta = StateDelta::new();
        for entry in outcome.audit {
            delta = delta.push_message(entry);
        }

        if let Some(error) = &outcome.error {
            if outcome.files_touched.is_empty() {
                // Advisory pass only; a failure never blocks review.
                ctx.session.emit(OrchestratorEvent::CompletionCheck {
                    complete: true,
                    detail: format!("Completion check skipped: {}", error),
                });
                return delta.push_message(ChatMessage::system(format!(
                    "Completion check skipped: {}",
                    error
                )));
            }
        }

        let mut files = Vec::new();
        for file in persist_outputs(ctx, &outcome.files_touched) {
            files.push(file.path.clone());
            delta = delta.with_file(file.path, file.content);
        }

        let complete = files.is_empty();
        let detail = if outcome.final_text.is_empty() {
            if complete {
                "No gaps found".to_string()
            } else {
                format!("Patched: {}", files.join(", "))
            }
        } else {
            outcome.final_text.clone()
        };

        ctx.session.emit(OrchestratorEvent::CompletionCheck {
            complete,
            detail: detail.clone(),
        });
        if !files.is_empty() {
            ctx.session.emit(OrchestratorEvent::FilesGenerated {
                files: files.clone(),
            });
        }
        tracing::info!(
            session = %ctx.session.session_id,
            complete,
            patched = files.len(),
            "completion check done"
        );

        delta.push_message(ChatMessage::assistant(detail))
    }
}
