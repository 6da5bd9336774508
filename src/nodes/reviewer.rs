//! Reviewer Node
//!
//! Summarizes every generated file (truncated to the configured budget),
//! asks the model for a verdict against the original request, and records
//! it. `review_iterations` increments on every call, verdict or not; a
//! failed review call records a non-approving verdict rather than crashing
//! the run.

use async_trait::async_trait;

use codeloom_core::{ChatMessage, OrchestratorEvent, SessionState, StateDelta};
use codeloom_llm::{truncate_for_review, Message};

use crate::prompts;
use crate::router::is_approved;

use super::tool_loop::current_file_content;
use super::{Node, OrchestratorContext};

pub struct ReviewerNode;

#[async_trait]
impl Node for ReviewerNode {
    fn name(&self) -> &'static str {
        "reviewer"
    }

    async fn run(&self, ctx: &OrchestratorContext, state: &SessionState) -> StateDelta {
        let iteration = state.review_iterations + 1;
        ctx.session.emit_status(format!(
            "Reviewing {} files (pass {})",
            state.generated_files.len(),
            iteration
        ));

        let summaries = file_summaries(ctx, state);
        let prompt = prompts::reviewer_prompt(&state.user_request, &summaries);

        let feedback = match ctx
            .provider
            .send_message(
                vec![Message::user(prompt)],
                Some(prompts::reviewer_system()),
                vec![],
            )
            .await
        {
            Ok(response) => {
                let text = response.text().trim().to_string();
                if text.is_empty() {
                    "Review returned no verdict".to_string()
                } else {
                    text
                }
            }
            Err(e) => {
                ctx.session.emit(OrchestratorEvent::Error {
                    message: e.to_string(),
                    code: Some("review".to_string()),
                });
                format!("Review failed: {}", e)
            }
        };

        let approved = is_approved(&feedback);
        ctx.session.emit(OrchestratorEvent::Review {
            approved,
            feedback: feedback.clone(),
            iteration,
        });
        tracing::info!(
            session = %ctx.session.session_id,
            iteration,
            approved,
            "review verdict recorded"
        );

        StateDelta::new()
            .push_message(ChatMessage::assistant(feedback.clone()))
            .with_review_feedback(feedback)
            .with_review_iterations(iteration)
    }
}

/// Per-file summaries for the review prompt. Disk wins over the in-state
/// copy when both exist, since tools write disk directly.
fn file_summaries(ctx: &OrchestratorContext, state: &SessionState) -> Vec<String> {
    let known = state.touched_files();
    state
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
        .collect()
}
