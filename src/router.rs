//! Workflow Router
//!
//! A pure function from session state to the next node. The priority order
//! is a contract: terminal conditions and the hard loop-breaker are checked
//! before anything else, and no node is ever selected while the state is
//! already complete.
//!
//! `route_safe` wraps evaluation in a panic guard; a router failure ends
//! the run instead of taking the host process down.

use std::panic::{catch_unwind, AssertUnwindSafe};

use codeloom_core::SessionState;

use crate::config::OrchestratorConfig;

/// Why the router ended the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The terminal flag was already set.
    Complete,
    /// The reviewer approved the result.
    Approved,
    /// The hard review ceiling tripped.
    ReviewCeiling,
    /// The soft review cap forced completion without approval.
    ForcedAcceptance,
    /// The graph cycle ceiling tripped.
    CycleCeiling,
    /// Router evaluation panicked.
    RouterFailure,
}

/// The next node to run, or terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Planner,
    Generator,
    CompletionCheck,
    Reviewer,
    Fixer,
    End(EndReason),
}

/// Whether review feedback counts as an approval.
///
/// Requires the literal `APPROVED` marker and the absence of the negative
/// substrings; either condition alone does not approve.
pub fn is_approved(feedback: &str) -> bool {
    if !feedback.contains("APPROVED") {
        return false;
    }
    let lower = feedback.to_lowercase();
    !lower.contains("missing") && !lower.contains("not implemented")
}

/// Select the next node for the given state.
///
/// `completion_checked` is graph-level bookkeeping: the completion pass
/// runs at most once per run, before the first review.
pub fn route(
    state: &SessionState,
    config: &OrchestratorConfig,
    completion_checked: bool,
) -> Transition {
    if state.is_complete {
        return Transition::End(EndReason::Complete);
    }
    if state.review_iterations >= config.hard_review_cap {
        return Transition::End(EndReason::ReviewCeiling);
    }
    if state.plan.is_empty() {
        return Transition::Planner;
    }
    if state.current_iteration < state.plan.len() {
        return Transition::Generator;
    }
    if !state.has_review_feedback() {
        if config.completion_check && !completion_checked {
            return Transition::CompletionCheck;
        }
        return Transition::Reviewer;
    }
    if is_approved(&state.review_feedback) {
        return Transition::End(EndReason::Approved);
    }
    if state.review_iterations >= config.soft_review_cap {
        return Transition::End(EndReason::ForcedAcceptance);
    }
    Transition::Fixer
}

/// [`route`] behind a panic guard. Any failure maps to terminal.
pub fn route_safe(
    state: &SessionState,
    config: &OrchestratorConfig,
    completion_checked: bool,
) -> Transition {
    catch_unwind(AssertUnwindSafe(|| route(state, config, completion_checked))).unwrap_or_else(
        |_| {
            tracing::error!("router evaluation panicked; ending run");
            Transition::End(EndReason::RouterFailure)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeloom_core::{PlanStep, StepAction};

    fn config() -> OrchestratorConfig {
        OrchestratorConfig::default()
    }

    fn state_with_plan(steps: usize) -> SessionState {
        let mut state = SessionState::new("build a landing page");
        state.plan = (0..steps)
            .map(|i| PlanStep::new(format!("step {}", i + 1), None, StepAction::Create))
            .collect();
        state
    }

    #[test]
    fn test_empty_plan_routes_to_planner() {
        let state = SessionState::new("build a landing page");
        assert_eq!(route(&state, &config(), false), Transition::Planner);
    }

    #[test]
    fn test_unfinished_plan_routes_to_generator() {
        let mut state = state_with_plan(3);
        state.current_iteration = 1;
        assert_eq!(route(&state, &config(), false), Transition::Generator);
    }

    #[test]
    fn test_exhausted_plan_without_feedback_routes_to_reviewer() {
        let mut state = state_with_plan(3);
        state.current_iteration = 3;
        assert_eq!(route(&state, &config(), false), Transition::Reviewer);
    }

    #[test]
    fn test_completion_check_runs_once_before_first_review() {
        let mut state = state_with_plan(2);
        state.current_iteration = 2;
        let cfg = OrchestratorConfig::builder()
            .completion_check(true)
            .build()
            .unwrap();
        assert_eq!(route(&state, &cfg, false), Transition::CompletionCheck);
        assert_eq!(route(&state, &cfg, true), Transition::Reviewer);
    }

    #[test]
    fn test_approval_ends_the_run() {
        let mut state = state_with_plan(1);
        state.current_iteration = 1;
        state.review_feedback = "APPROVED".to_string();
        state.review_iterations = 1;
        assert_eq!(
            route(&state, &config(), false),
            Transition::End(EndReason::Approved)
        );
    }

    #[test]
    fn test_rejection_routes_to_fixer() {
        let mut state = state_with_plan(1);
        state.current_iteration = 1;
        state.review_feedback = "NEEDS IMPROVEMENT: missing tests".to_string();
        state.review_iterations = 2;
        assert_eq!(route(&state, &config(), false), Transition::Fixer);
    }

    #[test]
    fn test_soft_cap_forces_completion() {
        let mut state = state_with_plan(1);
        state.current_iteration = 1;
        state.review_feedback = "NEEDS IMPROVEMENT: still broken".to_string();
        state.review_iterations = 3;
        assert_eq!(
            route(&state, &config(), false),
            Transition::End(EndReason::ForcedAcceptance)
        );
    }

    #[test]
    fn test_hard_ceiling_ends_regardless_of_other_fields() {
        let mut state = state_with_plan(3);
        state.review_iterations = 10;
        // Plan still unfinished; the loop-breaker wins anyway.
        assert_eq!(
            route(&state, &config(), false),
            Transition::End(EndReason::ReviewCeiling)
        );
    }

    #[test]
    fn test_complete_flag_is_terminal() {
        let mut state = state_with_plan(3);
        state.is_complete = true;
        assert_eq!(
            route(&state, &config(), false),
            Transition::End(EndReason::Complete)
        );
    }

    #[test]
    fn test_route_is_deterministic() {
        let mut state = state_with_plan(2);
        state.current_iteration = 1;
        let first = route(&state, &config(), false);
        let second = route(&state, &config(), false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_approval_predicate() {
        assert!(is_approved("APPROVED"));
        assert!(is_approved("Looks great. APPROVED."));
        assert!(!is_approved("approved")); // marker is case-sensitive
        assert!(!is_approved("APPROVED, but missing the stylesheet"));
        assert!(!is_approved("APPROVED although Missing tests"));
        assert!(!is_approved("APPROVED yet the footer is Not Implemented"));
        assert!(!is_approved("NEEDS IMPROVEMENT"));
    }

    #[test]
    fn test_route_safe_matches_route() {
        let mut state = state_with_plan(2);
        state.current_iteration = 2;
        assert_eq!(
            route_safe(&state, &config(), false),
            route(&state, &config(), false)
        );
    }
}
