//! Validation Models
//!
//! File kinds and the report returned by the rule checks.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// File kind, derived from the extension. Drives which rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Html,
    Css,
    Json,
    JavaScript,
    TypeScript,
    Other,
}

impl FileKind {
    /// Determine the kind from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "json" => Self::Json,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "ts" | "tsx" => Self::TypeScript,
            _ => Self::Other,
        }
    }

    /// Whether brace balancing applies to this kind.
    pub fn uses_braces(&self) -> bool {
        matches!(self, Self::Css | Self::JavaScript | Self::TypeScript)
    }
}

/// One failed rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Stable rule identifier ("unbalanced_braces", "todo_marker", ...).
    pub rule: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ValidationIssue {
    pub fn new(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Result of validating one file's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Relative path of the file that was checked.
    pub path: String,
    /// Kind the rules were selected by.
    pub kind: FileKind,
    /// True when every applicable rule passed.
    pub valid: bool,
    /// Failed rules, empty when valid.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// One-line summary for logs and review prompts.
    pub fn summary(&self) -> String {
        if self.valid {
            format!("{}: valid", self.path)
        } else {
            let rules: Vec<&str> = self.issues.iter().map(|i| i.rule.as_str()).collect();
            format!("{}: invalid ({})", self.path, rules.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_path() {
        assert_eq!(FileKind::from_path("index.html"), FileKind::Html);
        assert_eq!(FileKind::from_path("styles/main.CSS"), FileKind::Css);
        assert_eq!(FileKind::from_path("data.json"), FileKind::Json);
        assert_eq!(FileKind::from_path("app.jsx"), FileKind::JavaScript);
        assert_eq!(FileKind::from_path("app.tsx"), FileKind::TypeScript);
        assert_eq!(FileKind::from_path("README.md"), FileKind::Other);
        assert_eq!(FileKind::from_path("Makefile"), FileKind::Other);
    }

    #[test]
    fn test_report_summary() {
        let report = ValidationReport {
            path: "a.css".to_string(),
            kind: FileKind::Css,
            valid: false,
            issues: vec![ValidationIssue::new("unbalanced_braces", "1 unclosed brace")],
        };
        assert_eq!(report.summary(), "a.css: invalid (unbalanced_braces)");
    }
}
