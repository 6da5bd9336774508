//! Orchestration Graph
//!
//! Wires the router and the five nodes into the run loop: route, run the
//! selected node, merge its delta, repeat until the router returns terminal
//! or the cycle ceiling trips. The final `complete` event and outcome are
//! produced on every path, forced terminations included.

use codeloom_core::{ChatMessage, OrchestratorEvent, SessionState};
use codeloom_tools::ToolCallSummary;

use crate::nodes::{
    CompletionCheckNode, FixerNode, GeneratorNode, Node, OrchestratorContext, PlannerNode,
    ReviewerNode,
};
use crate::router::{route_safe, EndReason, Transition};

/// What one orchestration run produced.
#[derive(Debug)]
pub struct OrchestrationOutcome {
    /// The final session state, files and audit log included.
    pub state: SessionState,
    /// Why the run ended.
    pub end_reason: EndReason,
    /// True when a ceiling or failure ended the run rather than genuine
    /// completion or approval.
    pub forced: bool,
    /// Router cycles consumed.
    pub cycles: usize,
    /// Per-tool dispatch accounting for the whole run.
    pub tool_calls: ToolCallSummary,
}

impl OrchestrationOutcome {
    pub fn is_complete(&self) -> bool {
        self.state.is_complete
    }

    /// Relative paths of every file the run touched.
    pub fn files(&self) -> Vec<String> {
        self.state.touched_files()
    }

    pub fn review_feedback(&self) -> &str {
        &self.state.review_feedback
    }
}

/// The workflow runtime for one session.
pub struct OrchestrationGraph {
    ctx: OrchestratorContext,
    planner: PlannerNode,
    generator: GeneratorNode,
    completion: CompletionCheckNode,
    reviewer: ReviewerNode,
    fixer: FixerNode,
}

impl OrchestrationGraph {
    pub fn new(ctx: OrchestratorContext) -> Self {
        Self {
            ctx,
            planner: PlannerNode,
            generator: GeneratorNode,
            completion: CompletionCheckNode,
            reviewer: ReviewerNode,
            fixer: FixerNode,
        }
    }

    pub fn context(&self) -> &OrchestratorContext {
        &self.ctx
    }

    /// Run the workflow for one user request to termination.
    ///
    /// Always returns an outcome; every failure mode inside the loop is
    /// folded into state and the end reason instead of propagating.
    pub async fn run(&self, user_request: impl Into<String>) -> OrchestrationOutcome {
        let mut state = SessionState::new(user_request);
        state
            .messages
            .push(ChatMessage::user(state.user_request.clone()));

        let mut completion_checked = false;
        let mut cycles = 0;

        let end_reason = loop {
            if cycles >= self.ctx.config.max_cycles {
                tracing::warn!(
                    session = %self.ctx.session.session_id,
                    cycles,
                    "cycle ceiling reached, forcing termination"
                );
                break EndReason::CycleCeiling;
            }
            cycles += 1;

            let transition = route_safe(&state, &self.ctx.config, completion_checked);
            tracing::debug!(
                session = %self.ctx.session.session_id,
                cycle = cycles,
                ?transition,
                "routing"
            );

            let node: &dyn Node = match transition {
                Transition::Planner => &self.planner,
                Transition::Generator => &self.generator,
                Transition::CompletionCheck => {
                    completion_checked = true;
                    &self.completion
                }
                Transition::Reviewer => &self.reviewer,
                Transition::Fixer => &self.fixer,
                Transition::End(reason) => break reason,
            };

            let delta = node.run(&self.ctx, &state).await;
            delta.apply_to(&mut state);
            // The cursor never runs past the plan, whatever a node returned.
            if state.current_iteration > state.plan.len() {
                state.current_iteration = state.plan.len();
            }
        };

        let forced = matches!(
            end_reason,
            EndReason::ReviewCeiling
                | EndReason::ForcedAcceptance
                | EndReason::CycleCeiling
                | EndReason::RouterFailure
        );
        // Ceilings force completion rather than leaving the session dangling.
        state.is_complete = true;

        self.ctx.session.emit(OrchestratorEvent::Complete {
            is_complete: true,
            files: state.touched_files(),
            forced,
        });
        tracing::info!(
            session = %self.ctx.session.session_id,
            cycles,
            ?end_reason,
            forced,
            files = state.generated_files.len(),
            "run finished"
        );

        OrchestrationOutcome {
            state,
            end_reason,
            forced,
            cycles,
            tool_calls: self.ctx.tools.call_log.summary(),
        }
    }
}
