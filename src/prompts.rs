//! Prompt Builders
//!
//! One function per node prompt. Prompts are assembled from parts so the
//! conditional sections (existing files, prior feedback) stay readable.

use codeloom_core::{PlanStep, SessionState};

// ============================================================================
// Planner
// ============================================================================

pub fn planner_system() -> String {
    "You are a software planning assistant. You break a user's request into \
     a short ordered list of concrete implementation steps, one file per step \
     where possible."
        .to_string()
}

pub fn planner_prompt(user_request: &str, existing_files: &[String], max_steps: usize) -> String {
    let mut parts = vec![
        format!("User request:\n{}", user_request),
        format!(
            "Produce a numbered plan with at most {} steps. Each step must be a \
             single line in the form `N. description`, and should name the file \
             it creates or modifies in backticks, e.g. `index.html`.",
            max_steps
        ),
    ];
    if !existing_files.is_empty() {
        parts.insert(
            1,
            format!("Files that already exist:\n{}", existing_files.join("\n")),
        );
    }
    parts.push("Respond with the numbered list only, no prose before or after.".to_string());
    parts.join("\n\n")
}

/// Stricter retry prompt after an unparseable plan.
pub fn planner_repair_prompt(user_request: &str, max_steps: usize) -> String {
    [
        format!("User request:\n{}", user_request),
        format!(
            "Your previous answer could not be parsed. Reply with ONLY a numbered \
             list of at most {} lines, each formatted exactly as `N. description`. \
             No headings, no code fences, no commentary.",
            max_steps
        ),
    ]
    .join("\n\n")
}

// ============================================================================
// Generator
// ============================================================================

pub fn generator_system() -> String {
    "You are a code generation assistant working inside a project directory. \
     Use the provided tools to read existing files and to write or patch the \
     files your step requires. Write complete, working file contents; never \
     leave TODO or placeholder markers. When the step is done, reply with a \
     short summary instead of another tool call."
        .to_string()
}

pub fn generator_prompt(state: &SessionState, step: &PlanStep, step_index: usize) -> String {
    let mut parts = vec![
        format!("Overall goal:\n{}", state.user_request),
        format!(
            "Current step ({} of {}):\n{}",
            step_index + 1,
            state.plan.len(),
            step.description
        ),
    ];
    if let Some(target) = &step.target_file {
        parts.push(format!("Target file: {}", target));
    }
    let touched = state.touched_files();
    if !touched.is_empty() {
        parts.push(format!(
            "Files generated so far:\n{}",
            touched.join("\n")
        ));
    }
    parts.push(
        "Read any file you need for context, then write the target file via the \
         write tools. Keep cross-file references (stylesheets, scripts) consistent."
            .to_string(),
    );
    parts.join("\n\n")
}

// ============================================================================
// Reviewer
// ============================================================================

pub fn reviewer_system() -> String {
    "You are a strict code reviewer. You check generated files against the \
     original request and reply with a verdict."
        .to_string()
}

pub fn reviewer_prompt(user_request: &str, summaries: &[String]) -> String {
    [
        format!("Original request:\n{}", user_request),
        format!("Generated files:\n\n{}", summaries.join("\n\n")),
        "Check for: files the request implies but that are absent, broken \
         cross-file references (an HTML page not linking its stylesheet or \
         script), and placeholder or incomplete content."
            .to_string(),
        "If everything is acceptable, reply with a verdict containing the word \
         APPROVED. Otherwise describe precisely what is wrong and what must \
         change. Do not write APPROVED in a rejection."
            .to_string(),
    ]
    .join("\n\n")
}

// ============================================================================
// Fixer
// ============================================================================

pub fn fixer_system() -> String {
    "You are a code repair assistant. A reviewer rejected the current files; \
     address every point of the feedback using the provided tools, then reply \
     with a short summary of what you changed."
        .to_string()
}

pub fn fixer_prompt(state: &SessionState) -> String {
    let mut parts = vec![
        format!("Overall goal:\n{}", state.user_request),
        format!("Review feedback to address:\n{}", state.review_feedback),
    ];
    let touched = state.touched_files();
    if !touched.is_empty() {
        parts.push(format!("Current files:\n{}", touched.join("\n")));
    }
    parts.push(
        "Read the files involved, apply the smallest edits that resolve the \
         feedback, and do not rewrite files that were not criticized."
            .to_string(),
    );
    parts.join("\n\n")
}

// ============================================================================
// Completion check
// ============================================================================

pub fn completion_system() -> String {
    "You verify that a set of generated files fully implements a request. If \
     something small is unfinished, patch it with the provided tools; if the \
     files are complete, reply without calling any tool."
        .to_string()
}

pub fn completion_prompt(user_request: &str, summaries: &[String]) -> String {
    [
        format!("Original request:\n{}", user_request),
        format!("Current files:\n\n{}", summaries.join("\n\n")),
        "Patch any file that is clearly unfinished (empty functions, dangling \
         references). If nothing needs patching, describe in one or two \
         sentences why the implementation is complete."
            .to_string(),
    ]
    .join("\n\n")
}
