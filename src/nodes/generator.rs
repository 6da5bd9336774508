//! Generator Node
//!
//! Executes the current plan step by driving the model in tool-calling
//! mode: read what it needs, write or patch the target files, fold every
//! tool result back. After the model's turn every write-class file goes
//! through the validator (with its single auto-fix pass) and the final
//! content lands in `generated_files`. On success the plan cursor advances
//! by one; with no step left the node short-circuits the run to complete.

use async_trait::async_trait;

use codeloom_core::{ChatMessage, OrchestratorEvent, SessionState, StateDelta};

use crate::prompts;

use super::tool_loop::{persist_outputs, run_tool_loop};
use super::{Node, OrchestratorContext};

pub struct GeneratorNode;

#[async_trait]
impl Node for GeneratorNode {
    fn name(&self) -> &'static str {
        "generator"
    }

    async fn run(&self, ctx: &OrchestratorContext, state: &SessionState) -> StateDelta {
        let Some(step) = state.current_step().cloned() else {
            // Terminal shortcut: nothing left to generate.
            return StateDelta::new().with_complete(true);
        };
        let step_index = state.current_iteration;

        ctx.session.emit_status(format!(
            "Generating step {}/{}: {}",
            step_index + 1,
            state.plan.len(),
            step.description
        ));

        let outcome = run_tool_loop(
            ctx,
            prompts::generator_system(),
            prompts::generator_prompt(state, &step, step_index),
            true,
        )
        .await;

        let mut delta = StateDelta::new();
        for entry in outcome.audit {
            delta = delta.push_message(entry);
        }

        if let Some(error) = &outcome.error {
            if outcome.files_touched.is_empty() {
                // Nothing landed; leave the cursor alone so the step is
                // retried on the next cycle, bounded by the cycle ceiling.
                return delta.push_message(ChatMessage::system(format!(
                    "Generation failed for step {}: {}",
                    step_index + 1,
                    error
                )));
            }
            tracing::warn!(
                session = %ctx.session.session_id,
                step = step_index + 1,
                error = %error,
                "generation ended abnormally but wrote files; keeping them"
            );
        }

        let mut files = Vec::new();
        for file in persist_outputs(ctx, &outcome.files_touched) {
            files.push(file.path.clone());
            delta = delta.with_file(file.path, file.content);
        }

        ctx.session.emit(OrchestratorEvent::FilesGenerated {
            files: files.clone(),
        });
        tracing::info!(
            session = %ctx.session.session_id,
            step = step_index + 1,
            files = files.len(),
            rounds = outcome.rounds,
            tokens = outcome.usage.total_tokens(),
            "step generated"
        );

        let summary = if outcome.final_text.is_empty() {
            format!(
                "Step {} done: wrote {}",
                step_index + 1,
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
            .with_iteration(step_index + 1)
    }
}
