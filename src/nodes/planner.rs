//! Planner Node
//!
//! Turns the user request into an ordered list of implementation steps.
//! The model answers with a numbered list; parsing is forgiving (code
//! fences stripped, `N.` and `N)` both accepted) and an unparseable answer
//! gets exactly one stricter retry before the node gives up and leaves the
//! plan empty for the router to re-route.

use async_trait::async_trait;

use codeloom_core::{
    ChatMessage, OrchestratorEvent, PlanStep, SessionState, StateDelta, StepAction,
};
use codeloom_llm::{LlmResult, Message};

use crate::prompts;

use super::{Node, OrchestratorContext};

/// Extensions a plan step may plausibly target.
const TARGET_EXTENSIONS: &[&str] = &[
    "html", "htm", "css", "js", "jsx", "mjs", "cjs", "ts", "tsx", "json", "md", "txt", "svg",
];

/// Description words that bias a step toward modifying an existing file.
const MODIFY_HINTS: &[&str] = &["modify", "update", "edit", "change", "fix", "adjust", "extend"];

pub struct PlannerNode;

#[async_trait]
impl Node for PlannerNode {
    fn name(&self) -> &'static str {
        "planner"
    }

    async fn run(&self, ctx: &OrchestratorContext, state: &SessionState) -> StateDelta {
        ctx.session.emit_status("Planning implementation steps");

        let known = state.touched_files();
        let prompt =
            prompts::planner_prompt(&state.user_request, &known, ctx.config.max_plan_steps);

        let mut steps = match self.complete(ctx, prompt).await {
            Ok(text) => parse_plan(&text, ctx.config.max_plan_steps, &known),
            Err(e) => {
                return plan_failure(ctx, format!("Planning call failed: {}", e));
            }
        };

        if steps.is_empty() {
            let repair =
                prompts::planner_repair_prompt(&state.user_request, ctx.config.max_plan_steps);
            steps = match self.complete(ctx, repair).await {
                Ok(text) => parse_plan(&text, ctx.config.max_plan_steps, &known),
                Err(e) => {
                    return plan_failure(ctx, format!("Planning retry failed: {}", e));
                }
            };
        }

        if steps.is_empty() {
            return plan_failure(ctx, "Planner produced no usable steps".to_string());
        }

        ctx.session.emit(OrchestratorEvent::Plan {
            steps: steps.clone(),
        });
        tracing::info!(
            session = %ctx.session.session_id,
            steps = steps.len(),
            "plan settled"
        );

        StateDelta::new()
            .push_message(ChatMessage::assistant(format_plan(&steps)))
            .with_plan(steps)
            .with_iteration(0)
    }
}

impl PlannerNode {
    async fn complete(&self, ctx: &OrchestratorContext, prompt: String) -> LlmResult<String> {
        let response = ctx
            .provider
            .send_message(
                vec![Message::user(prompt)],
                Some(prompts::planner_system()),
                vec![],
            )
            .await?;
        Ok(response.text().to_string())
    }
}

/// Empty-plan delta: the router will send us back here, bounded by the
/// graph cycle ceiling.
fn plan_failure(ctx: &OrchestratorContext, message: String) -> StateDelta {
    ctx.session.emit(OrchestratorEvent::Error {
        message: message.clone(),
        code: Some("plan".to_string()),
    });
    StateDelta::new().push_message(ChatMessage::system(message))
}

/// Parse a numbered plan out of model output.
fn parse_plan(raw: &str, max_steps: usize, known_files: &[String]) -> Vec<PlanStep> {
    let mut steps = Vec::new();
    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("```") {
            continue;
        }
        let Some(description) = strip_step_number(trimmed) else {
            continue;
        };
        if description.is_empty() {
            continue;
        }
        let target = extract_target_file(description);
        let action = step_action(description, target.as_deref(), known_files);
        steps.push(PlanStep::new(description, target, action));
        if steps.len() == max_steps {
            break;
        }
    }
    steps
}

/// `"3. Create index.html"` -> `"Create index.html"`. Accepts `N.` and `N)`.
fn strip_step_number(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits > 3 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    Some(rest.trim())
}

/// The file a step targets: a backticked name first, otherwise any token
/// with a recognized extension.
fn extract_target_file(description: &str) -> Option<String> {
    if let Some(start) = description.find('`') {
        let rest = &description[start + 1..];
        if let Some(len) = rest.find('`') {
            let candidate = rest[..len].trim();
            if looks_like_file(candidate) {
                return Some(candidate.to_string());
            }
        }
    }
    description
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')'))
        .map(|token| token.trim_matches(|c: char| matches!(c, '`' | '\'' | '"' | ';' | ':')))
        .map(|token| token.trim_end_matches('.'))
        .find(|token| looks_like_file(token))
        .map(String::from)
}

fn looks_like_file(token: &str) -> bool {
    if token.is_empty() || token.contains(char::is_whitespace) {
        return false;
    }
    match token.rsplit_once('.') {
        Some((stem, ext)) => !stem.is_empty() && TARGET_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

fn step_action(description: &str, target: Option<&str>, known_files: &[String]) -> StepAction {
    if let Some(target) = target {
        if known_files.iter().any(|f| f == target) {
            return StepAction::Modify;
        }
    }
    let lower = description.to_lowercase();
    if MODIFY_HINTS.iter().any(|hint| lower.contains(hint)) {
        StepAction::Modify
    } else {
        StepAction::Create
    }
}

fn format_plan(steps: &[PlanStep]) -> String {
    let lines: Vec<String> = steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step.description))
        .collect();
    format!("Plan:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_plan() {
        let raw = "1. Create `index.html` with the page skeleton\n\
                   2. Create `style.css` for layout\n\
                   3) Add `app.js` with the click handler";
        let steps = parse_plan(raw, 5, &[]);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].target_file.as_deref(), Some("index.html"));
        assert_eq!(steps[2].target_file.as_deref(), Some("app.js"));
        assert_eq!(steps[0].action, StepAction::Create);
    }

    #[test]
    fn test_parse_skips_prose_and_fences() {
        let raw = "Here is the plan:\n```\n1. Create `a.html`\n2. Create `b.css`\n```\nDone.";
        let steps = parse_plan(raw, 5, &[]);
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_parse_caps_step_count() {
        let raw = "1. a `a.js`\n2. b `b.js`\n3. c `c.js`\n4. d `d.js`";
        let steps = parse_plan(raw, 2, &[]);
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_parse_unusable_output_is_empty() {
        assert!(parse_plan("I cannot help with that.", 5, &[]).is_empty());
        assert!(parse_plan("", 5, &[]).is_empty());
    }

    #[test]
    fn test_extract_target_prefers_backticks() {
        assert_eq!(
            extract_target_file("Update `src/app.js` to wire the button"),
            Some("src/app.js".to_string())
        );
    }

    #[test]
    fn test_extract_target_from_bare_token() {
        assert_eq!(
            extract_target_file("Create index.html."),
            Some("index.html".to_string())
        );
        assert_eq!(extract_target_file("Wire up the backend"), None);
    }

    #[test]
    fn test_version_numbers_are_not_files() {
        assert_eq!(extract_target_file("Upgrade to version 3.5"), None);
    }

    #[test]
    fn test_known_file_forces_modify() {
        let known = vec!["index.html".to_string()];
        assert_eq!(
            step_action("Create index.html", Some("index.html"), &known),
            StepAction::Modify
        );
        assert_eq!(
            step_action("Create index.html", Some("index.html"), &[]),
            StepAction::Create
        );
    }

    #[test]
    fn test_modify_hint_in_description() {
        assert_eq!(
            step_action("Update the stylesheet", None, &[]),
            StepAction::Modify
        );
    }
}
