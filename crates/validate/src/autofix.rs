//! Deterministic Auto-Fix
//!
//! Best-effort repairs for the structural failures the rules catch:
//! balance braces, close HTML documents, complete truncated JSON. Content
//! problems (TODOs, placeholders) are not fixable here; they are left for
//! the reviewer.

use crate::models::FileKind;
use crate::rules::validate;

/// Attempt a deterministic fix for the given content.
///
/// Returns `Some(fixed)` when a repair was produced, `None` when this
/// fixer has nothing to offer. The caller decides whether to persist.
pub fn auto_fix(path: &str, content: &str) -> Option<String> {
    let kind = FileKind::from_path(path);
    let fixed = match kind {
        FileKind::Html => fix_html(content),
        FileKind::Css | FileKind::JavaScript | FileKind::TypeScript => fix_braces(content),
        FileKind::Json => fix_json(content),
        FileKind::Other => None,
    }?;

    if fixed == content {
        None
    } else {
        Some(fixed)
    }
}

/// Validate, auto-fix once if invalid, and re-validate.
///
/// Returns the content to persist plus whether the final content is valid.
/// The file is persisted regardless of validity; the outcome is recorded
/// for the reviewer.
pub fn check_and_fix(path: &str, content: &str) -> FixOutcome {
    let initial = validate(path, content);
    if initial.valid {
        return FixOutcome {
            content: content.to_string(),
            was_fixed: false,
            valid: true,
            issues: Vec::new(),
        };
    }

    if let Some(fixed) = auto_fix(path, content) {
        let after = validate(path, &fixed);
        tracing::debug!(
            path,
            valid_after_fix = after.valid,
            "auto-fix applied to invalid file"
        );
        return FixOutcome {
            content: fixed,
            was_fixed: true,
            valid: after.valid,
            issues: after.issues.iter().map(|i| i.message.clone()).collect(),
        };
    }

    FixOutcome {
        content: content.to_string(),
        was_fixed: false,
        valid: false,
        issues: initial.issues.iter().map(|i| i.message.clone()).collect(),
    }
}

/// Outcome of one validate/fix/re-validate cycle.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    /// The content to persist (fixed or original).
    pub content: String,
    /// Whether an auto-fix was applied.
    pub was_fixed: bool,
    /// Whether the persisted content validates.
    pub valid: bool,
    /// Remaining issue messages when still invalid.
    pub issues: Vec<String>,
}

/// Close a dangling HTML document.
fn fix_html(content: &str) -> Option<String> {
    let lower = content.to_lowercase();
    let mut fixed = content.to_string();
    let mut changed = false;

    if lower.contains("<body") && !lower.contains("</body>") {
        fixed.push_str("\n</body>");
        changed = true;
    }
    if lower.contains("<html") && !lower.contains("</html>") {
        fixed.push_str("\n</html>");
        changed = true;
    }

    if changed {
        Some(fixed)
    } else {
        None
    }
}

/// Append closing braces until the counts balance.
fn fix_braces(content: &str) -> Option<String> {
    let open = content.matches('{').count();
    let close = content.matches('}').count();
    if open <= close {
        return None;
    }

    let mut fixed = content.to_string();
    if !fixed.ends_with('\n') {
        fixed.push('\n');
    }
    for _ in 0..(open - close) {
        fixed.push_str("}\n");
    }
    Some(fixed)
}

/// Complete a truncated JSON document by closing the open string and every
/// unclosed brace/bracket, dropping a dangling trailing comma first.
fn fix_json(content: &str) -> Option<String> {
    if serde_json::from_str::<serde_json::Value>(content).is_ok() {
        return None;
    }

    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in content.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => stack.push('}'),
            '[' => stack.push(']'),
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                }
            }
            _ => {}
        }
    }

    if !in_string && stack.is_empty() {
        // Parse failure is not a truncation problem; nothing we can do.
        return None;
    }

    let mut fixed = content.to_string();
    if in_string {
        fixed.push('"');
    }
    // A trailing comma before a close would re-break the parse.
    let trimmed_len = fixed.trim_end().len();
    if fixed[..trimmed_len].ends_with(',') {
        fixed.truncate(trimmed_len - 1);
    }
    while let Some(close) = stack.pop() {
        fixed.push(close);
    }
    Some(fixed)
}
