//! Session State
//!
//! The single mutable record threaded through one orchestration run, plus
//! the delta type nodes return instead of mutating state in place.
//!
//! Merge semantics are fixed: messages append, `generated_files` merges
//! with last-write-wins, the plan is replaced wholesale, and scalar fields
//! are replaced only when the delta sets them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Chat log
// ============================================================================

/// Role tag for an entry in the session's audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
    Tool,
}

/// One role-tagged text entry in the append-only session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: content.into(),
        }
    }
}

// ============================================================================
// Plan
// ============================================================================

/// Whether a plan step creates a new file or modifies an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Create,
    Modify,
}

/// One concrete implementation step produced by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// Human-readable step description.
    pub description: String,
    /// The file this step targets, when the planner named one.
    pub target_file: Option<String>,
    /// Create vs modify bias for the generator.
    pub action: StepAction,
}

impl PlanStep {
    pub fn new(description: impl Into<String>, target_file: Option<String>, action: StepAction) -> Self {
        Self {
            description: description.into(),
            target_file,
            action,
        }
    }
}

// ============================================================================
// SessionState
// ============================================================================

/// The shared workflow state for one user request.
///
/// Created empty at session start, threaded through every node call, and
/// discarded once the router returns terminal. Nodes never mutate it
/// directly; they return a [`StateDelta`] the graph merges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Append-only log of role-tagged entries (audit/chat replay).
    pub messages: Vec<ChatMessage>,
    /// The original natural-language goal. Immutable after creation.
    pub user_request: String,
    /// Ordered implementation steps. Set by the planner; replaced only on
    /// a full re-plan.
    pub plan: Vec<PlanStep>,
    /// Relative path -> full current content. Last write wins.
    pub generated_files: BTreeMap<String, String>,
    /// Index of the next plan step to execute.
    pub current_iteration: usize,
    /// Verdict from the last review pass. Empty string means no verdict yet.
    pub review_feedback: String,
    /// Terminal flag. Once true the router must return terminal.
    pub is_complete: bool,
    /// Count of review attempts, monotonically increasing.
    pub review_iterations: u32,
}

impl SessionState {
    /// Create a fresh state for the given request.
    pub fn new(user_request: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            user_request: user_request.into(),
            plan: Vec::new(),
            generated_files: BTreeMap::new(),
            current_iteration: 0,
            review_feedback: String::new(),
            is_complete: false,
            review_iterations: 0,
        }
    }

    /// The plan step the generator should execute next, if any remains.
    pub fn current_step(&self) -> Option<&PlanStep> {
        self.plan.get(self.current_iteration)
    }

    /// True once every plan step has been executed.
    pub fn plan_exhausted(&self) -> bool {
        self.current_iteration >= self.plan.len()
    }

    /// Relative paths of every file touched so far, in map order.
    pub fn touched_files(&self) -> Vec<String> {
        self.generated_files.keys().cloned().collect()
    }

    /// True if no review verdict has been recorded yet.
    pub fn has_review_feedback(&self) -> bool {
        !self.review_feedback.is_empty()
    }
}

// ============================================================================
// StateDelta
// ============================================================================

/// Partial state update returned by a node.
///
/// Unset fields leave the corresponding state field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDelta {
    /// Messages to append to the session log.
    pub messages: Vec<ChatMessage>,
    /// Replacement plan, when the planner produced one.
    pub plan: Option<Vec<PlanStep>>,
    /// Files to merge into `generated_files` (last write wins).
    pub generated_files: BTreeMap<String, String>,
    /// New value for `current_iteration`.
    pub current_iteration: Option<usize>,
    /// New value for `review_feedback`. `Some(String::new())` clears it.
    pub review_feedback: Option<String>,
    /// New value for `is_complete`.
    pub is_complete: Option<bool>,
    /// New value for `review_iterations`.
    pub review_iterations: Option<u32>,
}

impl StateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the session log.
    pub fn push_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Replace the plan.
    pub fn with_plan(mut self, plan: Vec<PlanStep>) -> Self {
        self.plan = Some(plan);
        self
    }

    /// Record a generated file. Later calls for the same path overwrite.
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.generated_files.insert(path.into(), content.into());
        self
    }

    /// Set the generation cursor.
    pub fn with_iteration(mut self, iteration: usize) -> Self {
        self.current_iteration = Some(iteration);
        self
    }

    /// Record a review verdict (or clear it with an empty string).
    pub fn with_review_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.review_feedback = Some(feedback.into());
        self
    }

    /// Mark the session complete (or not).
    pub fn with_complete(mut self, complete: bool) -> Self {
        self.is_complete = Some(complete);
        self
    }

    /// Set the review attempt counter.
    pub fn with_review_iterations(mut self, iterations: u32) -> Self {
        self.review_iterations = Some(iterations);
        self
    }

    /// True when this delta changes nothing.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
            && self.plan.is_none()
            && self.generated_files.is_empty()
            && self.current_iteration.is_none()
            && self.review_feedback.is_none()
            && self.is_complete.is_none()
            && self.review_iterations.is_none()
    }

    /// Merge this delta into the given state.
    ///
    /// Messages append, files merge last-write-wins, everything else
    /// replaces when set.
    pub fn apply_to(self, state: &mut SessionState) {
        state.messages.extend(self.messages);
        if let Some(plan) = self.plan {
            state.plan = plan;
        }
        for (path, content) in self.generated_files {
            state.generated_files.insert(path, content);
        }
        if let Some(iteration) = self.current_iteration {
            state.current_iteration = iteration;
        }
        if let Some(feedback) = self.review_feedback {
            state.review_feedback = feedback;
        }
        if let Some(complete) = self.is_complete {
            state.is_complete = complete;
        }
        if let Some(iterations) = self.review_iterations {
            state.review_iterations = iterations;
        }
    }
}
