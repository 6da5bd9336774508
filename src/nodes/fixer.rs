//! Fixer Node
//!
//! Takes the last review verdict and drives the model through the same
//! tool-calling contract as the generator to address it. Touched files are
//! validated and merged back, and the feedback is cleared so the router
//! re-enters review instead of re-reading a stale verdict.

use async_trait::async_trait;

use codeloom_core::{ChatMessage, OrchestratorEvent, SessionState, StateDelta};

use crate::prompts;

use super::tool_loop::{persist_outputs, run_tool_loop};
use super::{Node, OrchestratorContext};

pub struct FixerNode;

#[async_trait]
impl Node for FixerNode {
    fn name(&self) -> &'static str {
        "fixer"
    }

    async fn run(&self, ctx: &OrchestratorContext, state: &SessionState) -> StateDelta {
        ctx.session.emit_status(format!(
            "Addressing review feedback (pass {})",
            state.review_iterations
        ));

        let outcome = run_tool_loop(
            ctx,
            prompts::fixer_system(),
            prompts::fixer_prompt(state),
            true,
        )
        .await;

        let mut delta = StateDelta::new();
        for entry in outcome.audit {
            delta = delta.push_message(entry);
        }

        if let Some(error) = &outcome.error {
            if outcome.files_touched.is_empty() {
                // Feedback stays in place; the router sends us back here
                // until the soft cap trips.
                return delta.push_message(ChatMessage::system(format!(
                    "Fix attempt failed: {}",
                    error
                )));
            }
            tracing::warn!(
                session = %ctx.session.session_id,
                error = %error,
                "fix loop ended abnormally but wrote files; keeping them"
            );
        }

        let mut files = Vec::new();
        for file in persist_outputs(ctx, &outcome.files_touched) {
            files.push(file.path.clone());
            delta = delta.with_file(file.path, file.content);
        }

        ctx.session.emit(OrchestratorEvent::FilesFixed {
            files: files.clone(),
        });
        tracing::info!(
            session = %ctx.session.session_id,
            files = files.len(),
            rounds = outcome.rounds,
            "fix pass applied"
        );

        let summary = if outcome.final_text.is_empty() {
            format!(
                "Applied review feedback to {}",
                if files.is_empty() {
                    "no files".to_string()
                } else {
                    files.join(", ")
                }
            )
        } else {
            outcome.final_text
        };

        delta
            .push_message(ChatMessage::assistant(summary))
            .with_review_feedback("")
    }
}
