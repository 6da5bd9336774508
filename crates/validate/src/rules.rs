//! Validation Rules
//!
//! Pure structural-completeness checks over generated file content,
//! selected by file kind. These catch the model's characteristic failure
//! modes: truncated output, unclosed structure, and stubbed-out bodies.

use crate::models::{FileKind, ValidationIssue, ValidationReport};

/// Placeholder comment markers that flag unfinished JS/TS output.
const SCRIPT_PLACEHOLDER_MARKERS: &[&str] = &[
    "// ...",
    "/* ... */",
    "// rest of code",
    "// your code here",
    "// implementation here",
];

/// Validate one file's content against the rules for its kind.
pub fn validate(path: &str, content: &str) -> ValidationReport {
    let kind = FileKind::from_path(path);
    let mut issues = Vec::new();

    check_universal(content, &mut issues);

    match kind {
        FileKind::Html => check_html(content, &mut issues),
        FileKind::Css => check_braces(content, &mut issues),
        FileKind::Json => check_json(content, &mut issues),
        FileKind::JavaScript | FileKind::TypeScript => {
            check_braces(content, &mut issues);
            check_script_placeholders(content, &mut issues);
        }
        FileKind::Other => {}
    }

    ValidationReport {
        path: path.to_string(),
        kind,
        valid: issues.is_empty(),
        issues,
    }
}

/// Rules that apply to every file regardless of extension.
fn check_universal(content: &str, issues: &mut Vec<ValidationIssue>) {
    if content.contains("TODO") {
        issues.push(ValidationIssue::new(
            "todo_marker",
            "content contains a literal TODO",
        ));
    }
    if content.to_lowercase().contains("placeholder") {
        issues.push(ValidationIssue::new(
            "placeholder_marker",
            "content contains a literal 'placeholder'",
        ));
    }
    if content.lines().any(|line| line.trim() == "...") {
        issues.push(ValidationIssue::new(
            "bare_ellipsis",
            "content contains a bare '...' line",
        ));
    }
}

fn check_html(content: &str, issues: &mut Vec<ValidationIssue>) {
    let lower = content.to_lowercase();
    if !lower.contains("<!doctype") && !lower.contains("<html") {
        issues.push(ValidationIssue::new(
            "missing_html_open",
            "no doctype or <html> marker",
        ));
    }
    if !lower.contains("</html>") && !lower.contains("</body>") {
        issues.push(ValidationIssue::new(
            "missing_html_close",
            "no closing </html> or </body> tag",
        ));
    }
}

fn check_braces(content: &str, issues: &mut Vec<ValidationIssue>) {
    let open = content.matches('{').count();
    let close = content.matches('}').count();
    if open != close {
        issues.push(ValidationIssue::new(
            "unbalanced_braces",
            format!("{} opening braces vs {} closing braces", open, close),
        ));
    }
}

fn check_json(content: &str, issues: &mut Vec<ValidationIssue>) {
    if let Err(e) = serde_json::from_str::<serde_json::Value>(content) {
        issues.push(ValidationIssue::new(
            "invalid_json",
            format!("content does not parse as JSON: {}", e),
        ));
    }
}

fn check_script_placeholders(content: &str, issues: &mut Vec<ValidationIssue>) {
    for marker in SCRIPT_PLACEHOLDER_MARKERS {
        if content.contains(marker) {
            issues.push(ValidationIssue::new(
                "script_placeholder",
                format!("content contains placeholder marker '{}'", marker),
            ));
            return;
        }
    }
}
